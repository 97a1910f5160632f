//! `tether check`: open the handle, probe it once, close it.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use serde_json::json;
use tether_database::{Client, DatabasePool, DbHealth, ShutdownHandler, ShutdownTrigger};

use super::CommandContext;
use crate::error::{CliError, Exit};

/// Connect, run a health check and disconnect
#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Health check timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,
}

impl CheckCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<Exit, CliError> {
        let client = ctx.client().await?;
        let handler = ShutdownHandler::new(Arc::clone(&client));

        let health = client.health(Duration::from_secs(self.timeout)).await;
        let tables = if health.is_healthy {
            count_tables(&client).await.ok()
        } else {
            None
        };

        self.report(ctx, &health, tables);
        handler.shutdown(ShutdownTrigger::BeforeExit).await;

        if health.is_healthy {
            Ok(Exit::Success)
        } else {
            Err(CliError::Unhealthy(
                health
                    .message
                    .unwrap_or_else(|| "health check failed".to_string()),
            ))
        }
    }

    fn report(&self, ctx: &CommandContext, health: &DbHealth, tables: Option<i64>) {
        if self.json {
            let pool = health.pool.as_ref().map(|p| {
                json!({
                    "size": p.size,
                    "idle": p.idle,
                    "max_connections": p.max_connections,
                    "utilization": p.utilization(),
                })
            });
            let report = json!({
                "healthy": health.is_healthy,
                "latency_ms": health.latency_ms,
                "mode": ctx.mode.to_string(),
                "tables": tables,
                "pool": pool,
                "message": health.message,
            });
            println!("{report}");
            return;
        }

        if health.is_healthy {
            println!("database healthy ({}ms, {} mode)", health.latency_ms, ctx.mode);
        } else {
            println!(
                "database unhealthy: {}",
                health.message.as_deref().unwrap_or("unknown error")
            );
        }
        if let Some(tables) = tables {
            println!("  tables: {tables}");
        }
        if let Some(pool) = &health.pool {
            println!(
                "  pool: {} open, {} idle, {} max ({:.0}% in use)",
                pool.size,
                pool.idle,
                pool.max_connections,
                pool.utilization() * 100.0
            );
        }
    }
}

async fn count_tables(client: &Client<DatabasePool>) -> Result<i64, sqlx::Error> {
    client
        .model("sqlite_master")
        .run("count", |db| async move {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'")
                .fetch_one(db.pool())
                .await
        })
        .await
}
