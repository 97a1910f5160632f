//! Construct-once slot for the client handle.
//!
//! The application owns one registry and passes it (or the handle it yields)
//! to whoever needs the database. In development every initialization after
//! the first returns the stored handle, so re-running startup code inside one
//! process does not open fresh connections each time. Production builds a new
//! handle on every call and stores nothing.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::backend::DatabaseBackend;
use crate::client::Client;
use crate::options::ClientOptions;

pub struct ClientRegistry<B> {
    slot: Mutex<Option<Arc<Client<B>>>>,
}

impl<B: DatabaseBackend> ClientRegistry<B> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the stored handle or build one with `factory`.
    ///
    /// Concurrent first calls build exactly once; a failed build leaves the
    /// slot empty.
    pub async fn get_or_init<F, Fut, E>(&self, options: ClientOptions, factory: F) -> Result<Arc<Client<B>>, E>
    where
        F: FnOnce(ClientOptions) -> Fut,
        Fut: Future<Output = Result<Client<B>, E>>,
    {
        if options.mode.is_production() {
            let client = Arc::new(factory(options).await?);
            info!(backend = client.backend().name(), "Database client created");
            return Ok(client);
        }

        let mut slot = self.slot.lock().await;
        if let Some(existing) = slot.as_ref() {
            debug!("Reusing existing database client");
            return Ok(Arc::clone(existing));
        }

        let mode = options.mode;
        let client = Arc::new(factory(options).await?);
        info!(
            backend = client.backend().name(),
            %mode,
            "Database client created and stored for reuse"
        );
        *slot = Some(Arc::clone(&client));
        Ok(client)
    }

    /// The stored handle, if any.
    pub async fn current(&self) -> Option<Arc<Client<B>>> {
        self.slot.lock().await.clone()
    }

    /// Empty the slot, returning what it held.
    pub async fn take(&self) -> Option<Arc<Client<B>>> {
        self.slot.lock().await.take()
    }
}

impl<B: DatabaseBackend> Default for ClientRegistry<B> {
    fn default() -> Self {
        Self::new()
    }
}
