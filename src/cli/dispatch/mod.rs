//! Command-line argument dispatch.
//!
//! Maps validated CLI arguments to an action: provisioning the credential
//! store with `setup`, or starting the API server.

use crate::cli::actions::{Action, server, setup};
use crate::cli::commands::{self, ARG_SEED, CMD_SETUP, session, store};
use anyhow::Result;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some(sub) = matches.subcommand_matches(CMD_SETUP) {
        commands::validate(sub).map_err(|e| anyhow::anyhow!(e))?;
        let store_opts = store::Options::parse(sub)?;

        return Ok(Action::Setup(setup::Args {
            globals: store_opts.into_globals(),
            seed: sub.get_flag(ARG_SEED),
        }));
    }

    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    commands::validate(matches).map_err(|e| anyhow::anyhow!(e))?;

    let store_opts = store::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches)?;

    Ok(Action::Server(server::Args {
        port,
        globals: store_opts.into_globals(),
        frontend_base_url: session_opts.frontend_base_url,
        environment: session_opts.environment,
        session_ttl_seconds: session_opts.session_ttl_seconds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::auth::Environment;

    const CLEAR: [(&str, Option<&str>); 6] = [
        ("EXAMIFY_STORE_URL", None),
        ("EXAMIFY_APPWRITE_PROJECT_ID", None),
        ("EXAMIFY_APPWRITE_API_KEY", None),
        ("EXAMIFY_APPWRITE_DATABASE_ID", None),
        ("EXAMIFY_ENVIRONMENT", None),
        ("EXAMIFY_SESSION_TTL_SECONDS", None),
    ];

    #[test]
    fn store_url_required() {
        temp_env::with_vars(CLEAR, || {
            let matches = commands::new().get_matches_from(vec!["examify"]);
            let result = handler(&matches);
            assert!(
                result
                    .err()
                    .is_some_and(|err| err
                        .to_string()
                        .contains("missing required argument: --store-url"))
            );
        });
    }

    #[test]
    fn server_action() {
        temp_env::with_vars(CLEAR, || {
            let matches = commands::new().get_matches_from(vec![
                "examify",
                "--store-url",
                "memory://",
                "--environment",
                "production",
                "--port",
                "9000",
            ]);
            match handler(&matches) {
                Ok(Action::Server(args)) => {
                    assert_eq!(args.port, 9000);
                    assert_eq!(args.globals.store_url, "memory://");
                    assert_eq!(args.environment, Environment::Production);
                    assert_eq!(args.frontend_base_url, "http://localhost:3000");
                    assert_eq!(args.session_ttl_seconds, 604_800);
                }
                other => panic!("unexpected action: {other:?}"),
            }
        });
    }

    #[test]
    fn setup_action() {
        temp_env::with_vars(CLEAR, || {
            let matches = commands::new().get_matches_from(vec![
                "examify",
                "--store-url",
                "postgres://user@localhost:5432/examify",
                "setup",
                "--seed",
            ]);
            match handler(&matches) {
                Ok(Action::Setup(args)) => {
                    assert!(args.seed);
                    assert_eq!(
                        args.globals.store_url,
                        "postgres://user@localhost:5432/examify"
                    );
                }
                other => panic!("unexpected action: {other:?}"),
            }
        });
    }

    #[test]
    fn non_positive_ttl_rejected() {
        temp_env::with_vars(CLEAR, || {
            let matches = commands::new().get_matches_from(vec![
                "examify",
                "--store-url",
                "memory://",
                "--session-ttl-seconds",
                "0",
            ]);
            assert!(handler(&matches).is_err());
        });
    }
}
