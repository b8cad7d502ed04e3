use crate::{api, auth, store};
use anyhow::Result;
use std::{sync::Arc, time::Duration};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub auth_provider: String,
    pub store_provider: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub frontend_origin: Option<String>,
    pub sweep_interval_minutes: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if a configured provider cannot be built or the server
/// fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let auth = auth::new_provider(auth::AuthSettings {
        provider: args.auth_provider.clone(),
        jwt_secret: args.jwt_secret,
        token_ttl_hours: args.token_ttl_hours,
    })?;
    let store = store::new_store(&args.store_provider)?;

    info!(
        auth_provider = args.auth_provider,
        store_provider = args.store_provider,
        "providers initialized"
    );

    let state = Arc::new(api::AppState { auth, store });

    api::new(
        args.port,
        state,
        args.frontend_origin,
        Duration::from_secs(args.sweep_interval_minutes * 60),
    )
    .await
}
