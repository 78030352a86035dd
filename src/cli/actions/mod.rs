pub mod server;
pub mod setup;

mod run;

#[derive(Debug)]
pub enum Action {
    Server(server::Args),
    Setup(setup::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
