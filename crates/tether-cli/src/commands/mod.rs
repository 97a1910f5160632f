//! Subcommand implementations.

mod check;
mod serve;

pub use check::CheckCommand;
pub use serve::ServeCommand;

use std::sync::Arc;

use tether_common_config::{RuntimeMode, TetherConfig};
use tether_database::{connect_sqlite, Client, ClientOptions, ClientRegistry, DatabasePool, PoolConfig};

use crate::error::CliError;

/// State shared by every subcommand.
pub struct CommandContext {
    pub config: TetherConfig,
    pub mode: RuntimeMode,
    registry: ClientRegistry<DatabasePool>,
}

impl CommandContext {
    pub fn new(config: TetherConfig, mode: RuntimeMode) -> Self {
        Self {
            config,
            mode,
            registry: ClientRegistry::new(),
        }
    }

    /// The process's database handle, opened on first use.
    pub async fn client(&self) -> Result<Arc<Client<DatabasePool>>, CliError> {
        let pool_config = PoolConfig::from_section(&self.config.database);
        let options = ClientOptions::from_section(self.mode, &self.config.database);

        let client = self
            .registry
            .get_or_init(options, |options| connect_sqlite(pool_config, options))
            .await?;
        Ok(client)
    }
}
