//! The seam between a client handle and the connection machinery it wraps.

use async_trait::async_trait;

use crate::pool::{DatabasePool, PoolError, PoolStats};

/// Base client wrapped by [`Client`](crate::Client).
///
/// `disconnect` must tolerate being called on an already disconnected
/// backend.
#[async_trait]
pub trait DatabaseBackend: Send + Sync + 'static {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), PoolError>;

    async fn disconnect(&self) -> Result<(), PoolError>;

    fn is_closed(&self) -> bool;

    fn stats(&self) -> Option<PoolStats> {
        None
    }
}

#[async_trait]
impl DatabaseBackend for DatabasePool {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<(), PoolError> {
        DatabasePool::health_check(self).await
    }

    async fn disconnect(&self) -> Result<(), PoolError> {
        self.close().await;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        DatabasePool::is_closed(self)
    }

    fn stats(&self) -> Option<PoolStats> {
        Some(DatabasePool::stats(self))
    }
}
