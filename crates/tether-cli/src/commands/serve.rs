//! `tether serve`: hold the handle open and watch it until the process is
//! asked to stop.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use tether_database::{run_until_exit, Client, DatabasePool, ExitReason, ShutdownHandler, ShutdownTrigger};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::CommandContext;
use crate::error::{CliError, Exit};

const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Keep the database handle open until SIGINT or SIGTERM
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Seconds between health checks
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Run one health check, then exit normally
    #[arg(long)]
    pub once: bool,
}

impl ServeCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<Exit, CliError> {
        let client = ctx.client().await?;
        let handler = ShutdownHandler::new(Arc::clone(&client));

        info!(mode = %ctx.mode, interval_secs = self.interval, "Serving database handle");

        let watch = monitor(client, Duration::from_secs(self.interval), self.once);
        match run_until_exit(&handler, watch).await {
            ExitReason::Completed(true) => Ok(Exit::Success),
            ExitReason::Completed(false) => Err(CliError::Unhealthy(
                "last health check failed".to_string(),
            )),
            ExitReason::Signalled(ShutdownTrigger::Interrupt) => Ok(Exit::Interrupted),
            ExitReason::Signalled(_) => Ok(Exit::Success),
        }
    }
}

/// Probe the database every `every` until stopped. With `once`, returns
/// after the first probe. The result is whether the last probe passed.
async fn monitor(client: Arc<Client<DatabasePool>>, every: Duration, once: bool) -> bool {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let health = client.health(HEALTH_TIMEOUT).await;
        if health.is_healthy {
            let utilization = health.pool.as_ref().map_or(0.0, |p| p.utilization());
            info!(latency_ms = health.latency_ms, utilization, "Database healthy");
        } else {
            warn!(
                latency_ms = health.latency_ms,
                message = health.message.as_deref().unwrap_or(""),
                "Database unhealthy"
            );
        }

        if once {
            return health.is_healthy;
        }
    }
}
