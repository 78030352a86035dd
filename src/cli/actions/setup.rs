use crate::{
    cli::globals::GlobalArgs,
    store::{self, seed::seed_demo_data},
};
use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub seed: bool,
}

/// Provision the credential store and optionally insert demo data.
/// # Errors
/// Returns an error if the store cannot be reached or provisioning fails.
pub async fn execute(args: Args) -> Result<()> {
    let store = store::connect(&args.globals).await?;

    store
        .setup()
        .await
        .context("Failed to provision credential store")?;
    info!("Credential store ready ({})", store.backend());

    if args.seed {
        let report = seed_demo_data(store.as_ref())
            .await
            .context("Failed to seed demo data")?;
        info!(
            "Seeded {} students and {} admins",
            report.users_created, report.admins_created
        );
    }

    Ok(())
}
