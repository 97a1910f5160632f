//! The instrumented client handle.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tether_common_log::spans::{call_span, instrument_future};

use crate::backend::DatabaseBackend;
use crate::health::{check_health, DbHealth};
use crate::hook::{CallHook, CallRecord, Failure, LoggingHook};
use crate::options::ClientOptions;
use crate::pool::{DatabasePool, PoolConfig, PoolError};
use crate::shape::{ResultShape, Shape};

/// Long-lived handle around a base client.
///
/// Every call made through [`Client::run`] or [`ModelHandle::run`] is timed
/// and reported to the hooks fixed at construction. The call's value or
/// error is handed back exactly as the underlying operation produced it.
pub struct Client<B> {
    backend: Arc<B>,
    options: ClientOptions,
    hooks: Vec<Arc<dyn CallHook>>,
}

impl<B: DatabaseBackend> Client<B> {
    /// Wrap `backend` with the logging hook for `options`.
    pub fn new(backend: B, options: ClientOptions) -> Self {
        let logging = LoggingHook::new(&options);
        Self {
            backend: Arc::new(backend),
            options,
            hooks: vec![Arc::new(logging)],
        }
    }

    /// Add another observer. Hooks run in the order they were added, after
    /// the logging hook.
    #[must_use]
    pub fn with_hook(mut self, hook: impl CallHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Operations on one data model.
    pub fn model<'a>(&'a self, name: &'a str) -> ModelHandle<'a, B> {
        ModelHandle { client: self, name }
    }

    /// Run `next` against the base client as `model.operation`.
    ///
    /// No timeout, retry or cancellation is applied here.
    pub async fn run<T, E, F, Fut>(&self, model: &str, operation: &str, next: F) -> Result<T, E>
    where
        F: FnOnce(Arc<B>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: ResultShape,
        E: Failure,
    {
        let start = Instant::now();
        let outcome = instrument_future(next(Arc::clone(&self.backend)), call_span(model, operation)).await;
        let elapsed = start.elapsed();

        match &outcome {
            Ok(value) => {
                let record = CallRecord {
                    model,
                    operation,
                    elapsed,
                    shape: value.shape(),
                };
                for hook in &self.hooks {
                    hook.on_success(&record);
                }
            }
            Err(error) => {
                let record = CallRecord {
                    model,
                    operation,
                    elapsed,
                    shape: Shape::Empty,
                };
                for hook in &self.hooks {
                    hook.on_failure(&record, error);
                }
            }
        }

        outcome
    }

    /// Disconnect the base client.
    pub async fn disconnect(&self) -> Result<(), PoolError> {
        self.backend.disconnect().await
    }

    pub fn is_closed(&self) -> bool {
        self.backend.is_closed()
    }

    pub async fn health(&self, timeout: Duration) -> DbHealth {
        check_health(self.backend.as_ref(), timeout).await
    }
}

impl<B: DatabaseBackend> fmt::Debug for Client<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("backend", &self.backend.name())
            .field("options", &self.options)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

/// A client scoped to one model name.
pub struct ModelHandle<'a, B> {
    client: &'a Client<B>,
    name: &'a str,
}

impl<'a, B: DatabaseBackend> ModelHandle<'a, B> {
    pub fn name(&self) -> &str {
        self.name
    }

    pub async fn run<T, E, F, Fut>(&self, operation: &str, next: F) -> Result<T, E>
    where
        F: FnOnce(Arc<B>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        T: ResultShape,
        E: Failure,
    {
        self.client.run(self.name, operation, next).await
    }
}

/// Open a SQLite pool and wrap it.
pub async fn connect_sqlite(
    config: PoolConfig,
    options: ClientOptions,
) -> Result<Client<DatabasePool>, PoolError> {
    let pool = DatabasePool::connect(config, &options).await?;
    Ok(Client::new(pool, options))
}
