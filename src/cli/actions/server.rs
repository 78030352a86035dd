use crate::{
    api::{
        self,
        handlers::auth::{AuthConfig, Environment},
    },
    cli::globals::GlobalArgs,
    store,
};
use anyhow::Result;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub globals: GlobalArgs,
    pub frontend_base_url: String,
    pub environment: Environment,
    pub session_ttl_seconds: i64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the store cannot be reached or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Global args: {:?}", args.globals);

    let store = store::connect(&args.globals).await?;

    let auth_config = AuthConfig::new()
        .with_frontend_base_url(args.frontend_base_url)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_session_cookie_secure(args.environment == Environment::Production);

    api::new(args.port, store, auth_config).await
}
