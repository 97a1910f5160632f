//! Database health monitoring.

use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::backend::DatabaseBackend;
use crate::pool::PoolStats;

/// Database health status.
#[derive(Debug, Clone)]
pub struct DbHealth {
    pub is_healthy: bool,
    pub latency_ms: u64,
    pub pool: Option<PoolStats>,
    pub message: Option<String>,
}

/// Run the backend's health check, bounded by `timeout`.
pub async fn check_health<B: DatabaseBackend + ?Sized>(backend: &B, timeout: Duration) -> DbHealth {
    let start = Instant::now();

    let result = tokio::time::timeout(timeout, backend.health_check()).await;

    let latency_ms = start.elapsed().as_millis() as u64;
    let pool = backend.stats();

    match result {
        Ok(Ok(())) => {
            debug!(latency_ms, backend = backend.name(), "Database health check passed");
            DbHealth {
                is_healthy: true,
                latency_ms,
                pool,
                message: None,
            }
        }
        Ok(Err(e)) => {
            warn!(error = %e, backend = backend.name(), "Database health check failed");
            DbHealth {
                is_healthy: false,
                latency_ms,
                pool,
                message: Some(e.to_string()),
            }
        }
        Err(_) => {
            warn!(backend = backend.name(), "Database health check timed out");
            DbHealth {
                is_healthy: false,
                latency_ms,
                pool,
                message: Some("Connection timeout".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;
    use crate::options::ClientOptions;
    use crate::pool::{DatabasePool, PoolConfig};

    #[tokio::test]
    async fn test_healthy_backend() {
        let backend = MockBackend::new();
        let health = check_health(&backend, Duration::from_secs(1)).await;
        assert!(health.is_healthy);
        assert!(health.message.is_none());
        assert!(health.pool.is_none());
    }

    #[tokio::test]
    async fn test_unhealthy_backend() {
        let backend = MockBackend::new();
        backend.set_healthy(false);
        let health = check_health(&backend, Duration::from_secs(1)).await;
        assert!(!health.is_healthy);
        assert!(health.message.unwrap().contains("unhealthy"));
    }

    #[tokio::test]
    async fn test_sqlite_health_reports_pool_stats() {
        let pool = DatabasePool::connect(PoolConfig::in_memory(), &ClientOptions::default())
            .await
            .unwrap();
        let health = check_health(&pool, Duration::from_secs(5)).await;
        assert!(health.is_healthy);
        assert_eq!(health.pool.unwrap().max_connections, 1);

        pool.close().await;
        let health = check_health(&pool, Duration::from_secs(5)).await;
        assert!(!health.is_healthy);
    }
}
