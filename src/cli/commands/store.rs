//! Credential store selection. These arguments are global so `setup` accepts
//! them after the subcommand too.

use crate::cli::globals::{DEFAULT_ADMINS_COLLECTION, DEFAULT_USERS_COLLECTION, GlobalArgs};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_STORE_URL: &str = "store-url";
pub const ARG_APPWRITE_PROJECT_ID: &str = "appwrite-project-id";
pub const ARG_APPWRITE_API_KEY: &str = "appwrite-api-key";
pub const ARG_APPWRITE_DATABASE_ID: &str = "appwrite-database-id";
pub const ARG_USERS_COLLECTION: &str = "users-collection";
pub const ARG_ADMINS_COLLECTION: &str = "admins-collection";

#[derive(Clone)]
pub struct Options {
    pub store_url: String,
    pub project_id: Option<String>,
    pub api_key: Option<SecretString>,
    pub database_id: Option<String>,
    pub users_collection: String,
    pub admins_collection: String,
}

impl Options {
    /// Parse store arguments from matches.
    ///
    /// # Errors
    /// Returns an error if `--store-url` is missing or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let read_optional = |id: &str| -> Option<String> {
            matches
                .get_one::<String>(id)
                .cloned()
                .filter(|v| !v.trim().is_empty())
        };

        let store_url = read_optional(ARG_STORE_URL)
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_STORE_URL}"))?;

        Ok(Self {
            store_url,
            project_id: read_optional(ARG_APPWRITE_PROJECT_ID),
            api_key: read_optional(ARG_APPWRITE_API_KEY).map(SecretString::from),
            database_id: read_optional(ARG_APPWRITE_DATABASE_ID),
            users_collection: read_optional(ARG_USERS_COLLECTION)
                .unwrap_or_else(|| DEFAULT_USERS_COLLECTION.to_string()),
            admins_collection: read_optional(ARG_ADMINS_COLLECTION)
                .unwrap_or_else(|| DEFAULT_ADMINS_COLLECTION.to_string()),
        })
    }

    #[must_use]
    pub fn into_globals(self) -> GlobalArgs {
        let mut globals = GlobalArgs::new(self.store_url);
        globals.appwrite_project_id = self.project_id;
        globals.appwrite_database_id = self.database_id;
        if let Some(api_key) = self.api_key {
            globals.set_api_key(api_key);
        }
        globals.users_collection = self.users_collection;
        globals.admins_collection = self.admins_collection;
        globals
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("store_url", &self.store_url)
            .field("project_id", &self.project_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("database_id", &self.database_id)
            .field("users_collection", &self.users_collection)
            .field("admins_collection", &self.admins_collection)
            .finish()
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_STORE_URL)
                .long(ARG_STORE_URL)
                .help("Credential store URL")
                .long_help(
                    "Credential store URL. http(s) selects an Appwrite endpoint, postgres:// a PostgreSQL database and memory:// a process-local store.",
                )
                .env("EXAMIFY_STORE_URL")
                .global(true),
        )
        .arg(
            Arg::new(ARG_APPWRITE_PROJECT_ID)
                .long(ARG_APPWRITE_PROJECT_ID)
                .help("Appwrite project ID")
                .env("EXAMIFY_APPWRITE_PROJECT_ID")
                .global(true),
        )
        .arg(
            Arg::new(ARG_APPWRITE_API_KEY)
                .long(ARG_APPWRITE_API_KEY)
                .help("Appwrite server API key")
                .env("EXAMIFY_APPWRITE_API_KEY")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_APPWRITE_DATABASE_ID)
                .long(ARG_APPWRITE_DATABASE_ID)
                .help("Appwrite database ID")
                .env("EXAMIFY_APPWRITE_DATABASE_ID")
                .global(true),
        )
        .arg(
            Arg::new(ARG_USERS_COLLECTION)
                .long(ARG_USERS_COLLECTION)
                .help("Collection holding student accounts")
                .env("EXAMIFY_USERS_COLLECTION")
                .default_value(DEFAULT_USERS_COLLECTION)
                .global(true),
        )
        .arg(
            Arg::new(ARG_ADMINS_COLLECTION)
                .long(ARG_ADMINS_COLLECTION)
                .help("Collection holding admin and mentor accounts")
                .env("EXAMIFY_ADMINS_COLLECTION")
                .default_value(DEFAULT_ADMINS_COLLECTION)
                .global(true),
        )
}
