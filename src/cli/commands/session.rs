use crate::api::handlers::auth::Environment;
use clap::{Arg, ArgMatches, Command, builder::PossibleValuesParser};

pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";
pub const ARG_ENVIRONMENT: &str = "environment";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";

#[derive(Debug, Clone)]
pub struct Options {
    pub frontend_base_url: String,
    pub environment: Environment,
    pub session_ttl_seconds: i64,
}

impl Options {
    /// Parse session and CORS arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the TTL is not positive.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let frontend_base_url = matches
            .get_one::<String>(ARG_FRONTEND_BASE_URL)
            .cloned()
            .unwrap_or_else(|| "http://localhost:3000".to_string());

        let environment = match matches.get_one::<String>(ARG_ENVIRONMENT).map(String::as_str) {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let session_ttl_seconds = matches
            .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
            .copied()
            .unwrap_or(604_800);
        if session_ttl_seconds <= 0 {
            return Err(anyhow::anyhow!(
                "--{ARG_SESSION_TTL_SECONDS} must be greater than zero"
            ));
        }

        Ok(Self {
            frontend_base_url,
            environment,
            session_ttl_seconds,
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend origin allowed by CORS")
                .env("EXAMIFY_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new(ARG_ENVIRONMENT)
                .long(ARG_ENVIRONMENT)
                .help("Deployment environment; production marks the session cookie Secure")
                .env("EXAMIFY_ENVIRONMENT")
                .default_value("development")
                .value_parser(PossibleValuesParser::new(["development", "production"])),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("EXAMIFY_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64)),
        )
}
