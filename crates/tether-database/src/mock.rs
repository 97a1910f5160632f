//! In-memory backend for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::backend::DatabaseBackend;
use crate::pool::PoolError;

/// Backend that records disconnects and can be told to fail.
#[derive(Debug, Default)]
pub struct MockBackend {
    disconnects: AtomicUsize,
    fail_disconnect: AtomicBool,
    unhealthy: AtomicBool,
    closed: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose every disconnect fails.
    pub fn failing_disconnect() -> Self {
        let backend = Self::default();
        backend.set_fail_disconnect(true);
        backend
    }

    pub fn set_fail_disconnect(&self, fail: bool) {
        self.fail_disconnect.store(fail, Ordering::SeqCst);
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    /// Number of disconnect calls so far, failed ones included.
    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn health_check(&self) -> Result<(), PoolError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(PoolError::HealthCheck("mock backend marked unhealthy".to_string()));
        }
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), PoolError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if self.fail_disconnect.load(Ordering::SeqCst) {
            return Err(PoolError::Disconnect("mock disconnect failure".to_string()));
        }
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
