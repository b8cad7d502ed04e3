pub mod logging;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

pub const ARG_PORT: &str = "port";
pub const ARG_AUTH_PROVIDER: &str = "auth-provider";
pub const ARG_STORE_PROVIDER: &str = "store-provider";
pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_TOKEN_TTL_HOURS: &str = "token-ttl-hours";
pub const ARG_FRONTEND_ORIGIN: &str = "frontend-origin";
pub const ARG_SWEEP_INTERVAL_MINUTES: &str = "sweep-interval-minutes";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("portiere")
        .about("Multi-tenant admin portal backend")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("PORTIERE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_AUTH_PROVIDER)
                .long("auth-provider")
                .help("Identity provider: custom, auth0, google")
                .default_value("custom")
                .env("PORTIERE_AUTH_PROVIDER"),
        )
        .arg(
            Arg::new(ARG_STORE_PROVIDER)
                .long("store-provider")
                .help("Persistence backend: memory, firestore, postgres, mysql")
                .default_value("memory")
                .env("PORTIERE_STORE_PROVIDER"),
        )
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long("jwt-secret")
                .help("HMAC secret for signing session tokens")
                .env("PORTIERE_JWT_SECRET")
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_HOURS)
                .long("token-ttl-hours")
                .help("Session token lifetime in hours")
                .default_value("24")
                .env("PORTIERE_TOKEN_TTL_HOURS")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_ORIGIN)
                .long("frontend-origin")
                .help("Frontend base URL for CORS; omit to allow any origin")
                .env("PORTIERE_FRONTEND_ORIGIN"),
        )
        .arg(
            Arg::new(ARG_SWEEP_INTERVAL_MINUTES)
                .long("sweep-interval-minutes")
                .help("Minutes between invitation expiry sweeps")
                .default_value("60")
                .env("PORTIERE_SWEEP_INTERVAL_MINUTES")
                .value_parser(clap::value_parser!(u64).range(1..)),
        );

    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "portiere");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Multi-tenant admin portal backend".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("PORTIERE_PORT", None::<&str>),
                ("PORTIERE_AUTH_PROVIDER", None),
                ("PORTIERE_STORE_PROVIDER", None),
                ("PORTIERE_TOKEN_TTL_HOURS", None),
                ("PORTIERE_SWEEP_INTERVAL_MINUTES", None),
                ("PORTIERE_JWT_SECRET", Some("s3cret")),
            ],
            || {
                let matches = new().get_matches_from(vec!["portiere"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8080));
                assert_eq!(
                    matches.get_one::<String>(ARG_AUTH_PROVIDER).cloned(),
                    Some("custom".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_STORE_PROVIDER).cloned(),
                    Some("memory".to_string())
                );
                assert_eq!(
                    matches.get_one::<i64>(ARG_TOKEN_TTL_HOURS).copied(),
                    Some(24)
                );
                assert_eq!(
                    matches.get_one::<u64>(ARG_SWEEP_INTERVAL_MINUTES).copied(),
                    Some(60)
                );
                assert_eq!(
                    matches.get_one::<String>(ARG_JWT_SECRET).cloned(),
                    Some("s3cret".to_string())
                );
            },
        );
    }

    #[test]
    fn test_jwt_secret_required() {
        temp_env::with_vars([("PORTIERE_JWT_SECRET", None::<&str>)], || {
            let result = new().try_get_matches_from(vec!["portiere"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                ("PORTIERE_JWT_SECRET", Some("s3cret")),
                ("PORTIERE_PORT", Some("9090")),
                ("PORTIERE_FRONTEND_ORIGIN", Some("http://localhost:3000")),
            ],
            || {
                let matches = new().get_matches_from(vec!["portiere"]);
                assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9090));
                assert_eq!(
                    matches.get_one::<String>(ARG_FRONTEND_ORIGIN).cloned(),
                    Some("http://localhost:3000".to_string())
                );
            },
        );
    }
}
