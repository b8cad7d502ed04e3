//! Command-line argument dispatch and server initialization.
//!
//! This module parses validated CLI arguments and maps them to the appropriate
//! action, such as starting the API server with its full configuration state.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{
    ARG_AUTH_PROVIDER, ARG_FRONTEND_ORIGIN, ARG_JWT_SECRET, ARG_PORT, ARG_STORE_PROVIDER,
    ARG_SWEEP_INTERVAL_MINUTES, ARG_TOKEN_TTL_HOURS,
};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let auth_provider = matches
        .get_one::<String>(ARG_AUTH_PROVIDER)
        .cloned()
        .context("missing required argument: --auth-provider")?;
    let store_provider = matches
        .get_one::<String>(ARG_STORE_PROVIDER)
        .cloned()
        .context("missing required argument: --store-provider")?;
    let jwt_secret = matches
        .get_one::<String>(ARG_JWT_SECRET)
        .cloned()
        .context("missing required argument: --jwt-secret")?;
    let token_ttl_hours = matches
        .get_one::<i64>(ARG_TOKEN_TTL_HOURS)
        .copied()
        .unwrap_or(24);
    let frontend_origin = matches.get_one::<String>(ARG_FRONTEND_ORIGIN).cloned();
    let sweep_interval_minutes = matches
        .get_one::<u64>(ARG_SWEEP_INTERVAL_MINUTES)
        .copied()
        .unwrap_or(60);

    Ok(Action::Server(Args {
        port,
        auth_provider,
        store_provider,
        jwt_secret,
        token_ttl_hours,
        frontend_origin,
        sweep_interval_minutes,
    }))
}
