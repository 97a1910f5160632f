//! Instrumented, shutdown-aware database client handle.
//!
//! A [`Client`] wraps a base client ([`DatabaseBackend`], normally the SQLite
//! [`DatabasePool`]). Every call routed through it is timed and reported to a
//! fixed set of [`CallHook`]s; the caller always gets back exactly what the
//! underlying operation produced.
//!
//! - [`ClientOptions`] picks the log level set and error rendering for the
//!   runtime mode.
//! - [`ClientRegistry`] keeps one handle per process in development.
//! - [`shutdown`] disconnects the handle on SIGINT, SIGTERM, or when the
//!   application's main future completes.
//!
//! ```ignore
//! let mode = RuntimeMode::from_env();
//! let options = ClientOptions::for_mode(mode);
//! let registry = ClientRegistry::new();
//! let client = registry
//!     .get_or_init(options, |o| connect_sqlite(PoolConfig::default(), o))
//!     .await?;
//!
//! let notes: Vec<Note> = client
//!     .model("note")
//!     .run("find_many", |db| async move {
//!         sqlx::query_as("SELECT id, title FROM note").fetch_all(db.pool()).await
//!     })
//!     .await?;
//!
//! let handler = ShutdownHandler::new(client);
//! run_until_exit(&handler, serve()).await;
//! ```

pub mod backend;
pub mod client;
pub mod health;
pub mod hook;
pub mod options;
pub mod pool;
pub mod registry;
pub mod shape;
pub mod shutdown;

#[cfg(any(test, feature = "mocks"))]
pub mod mock;

pub use backend::DatabaseBackend;
pub use client::{connect_sqlite, Client, ModelHandle};
pub use health::{check_health, DbHealth};
pub use hook::{CallHook, CallRecord, Failure, LoggingHook};
pub use options::{CallLevel, ClientOptions, ErrorFormat, LogLevelSet};
pub use pool::{DatabasePool, PoolConfig, PoolConfigBuilder, PoolError, PoolStats};
pub use registry::ClientRegistry;
pub use shape::{ResultShape, Shape};
pub use shutdown::{
    install, run_until, run_until_exit, wait_for_signal, ExitReason, ShutdownHandler,
    ShutdownOutcome, ShutdownTrigger,
};
