use clap::{Arg, ArgAction, Command, builder::ValueParser};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names accepted by `EXAMIFY_LOG_LEVEL`, indexed by verbosity count.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept either a count (`0..=5`) or a level name.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(|level: &str| -> Result<u8, String> {
        match level.parse::<u8>() {
            Ok(count) if count <= 5 => return Ok(count),
            _ => {}
        }

        let name = level.to_lowercase();
        LEVELS
            .iter()
            .position(|candidate| *candidate == name)
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| format!("invalid log level: {level}"))
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("EXAMIFY_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_map_to_counts() {
        temp_env::with_var("EXAMIFY_LOG_LEVEL", Some("DEBUG"), || {
            let matches = with_args(Command::new("examify")).get_matches_from(vec!["examify"]);
            assert_eq!(matches.get_one::<u8>(ARG_VERBOSITY).copied(), Some(3));
        });
    }

    #[test]
    fn unknown_level_rejected() {
        temp_env::with_var("EXAMIFY_LOG_LEVEL", Some("loud"), || {
            let result =
                with_args(Command::new("examify")).try_get_matches_from(vec!["examify"]);
            assert!(result.is_err());
        });
    }
}
