use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::Result;

/// Parse the command line, install the tracing subscriber and resolve the
/// action for the binary to run.
///
/// # Errors
/// Returns an error if telemetry setup or dispatch fails; invalid arguments
/// exit through clap before this returns.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity = matches
        .get_one::<u8>(commands::logging::ARG_VERBOSITY)
        .copied()
        .unwrap_or(0);
    telemetry::init(verbosity)?;

    dispatch::handler(&matches)
}
