pub mod logging;
pub mod session;
pub mod store;

use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

use self::store::{
    ARG_APPWRITE_API_KEY, ARG_APPWRITE_DATABASE_ID, ARG_APPWRITE_PROJECT_ID, ARG_STORE_URL,
};

pub const CMD_SETUP: &str = "setup";
pub const ARG_SEED: &str = "seed";

/// Validate that Appwrite credentials are present when the store URL is HTTP(S).
///
/// # Errors
/// Returns an error string naming the first missing Appwrite argument.
pub fn validate(matches: &clap::ArgMatches) -> Result<(), String> {
    let Some(url) = matches.get_one::<String>(ARG_STORE_URL) else {
        return Ok(());
    };

    if url.starts_with("http://") || url.starts_with("https://") {
        for id in [
            ARG_APPWRITE_PROJECT_ID,
            ARG_APPWRITE_API_KEY,
            ARG_APPWRITE_DATABASE_ID,
        ] {
            if !matches.contains_id(id) {
                return Err(format!(
                    "Missing required argument: --{id} (required for Appwrite stores)"
                ));
            }
        }
    }
    Ok(())
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("examify")
        .about("Exam portal authentication service")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("EXAMIFY_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .subcommand(
            Command::new(CMD_SETUP)
                .about("Provision the credential store collections and unique indexes")
                .arg(
                    Arg::new(ARG_SEED)
                        .long(ARG_SEED)
                        .help("Insert demo students and admins into empty collections")
                        .action(ArgAction::SetTrue),
                ),
        );

    let command = store::with_args(command);
    let command = session::with_args(command);
    logging::with_args(command)
}
