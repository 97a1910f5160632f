//! Shutdown routine.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tether_common_log::spans::{instrument_future, shutdown_span};
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info};

use crate::backend::DatabaseBackend;
use crate::client::Client;

/// What asked the process to shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShutdownTrigger {
    /// SIGINT / Ctrl+C.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// The application's main work finished and the process is about to exit.
    BeforeExit,
}

impl ShutdownTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interrupt => "interrupt",
            Self::Terminate => "terminate",
            Self::BeforeExit => "before_exit",
        }
    }
}

impl fmt::Display for ShutdownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one [`ShutdownHandler::shutdown`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    Disconnected,
    /// Disconnect failed; the failure was logged and dropped.
    DisconnectFailed,
    /// Another trigger already started the shutdown; nothing was done.
    AlreadyInProgress,
}

/// Disconnects a client handle once, whichever trigger arrives first.
pub struct ShutdownHandler<B> {
    client: Arc<Client<B>>,
    initiated: AtomicBool,
    sender: broadcast::Sender<ShutdownTrigger>,
    complete_tx: watch::Sender<bool>,
    complete_rx: watch::Receiver<bool>,
}

impl<B: DatabaseBackend> ShutdownHandler<B> {
    pub fn new(client: Arc<Client<B>>) -> Self {
        let (sender, _) = broadcast::channel(1);
        let (complete_tx, complete_rx) = watch::channel(false);

        Self {
            client,
            initiated: AtomicBool::new(false),
            sender,
            complete_tx,
            complete_rx,
        }
    }

    pub fn client(&self) -> &Arc<Client<B>> {
        &self.client
    }

    /// Notified with the trigger when shutdown begins.
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownTrigger> {
        self.sender.subscribe()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.initiated.load(Ordering::SeqCst)
    }

    pub fn is_complete(&self) -> bool {
        *self.complete_rx.borrow()
    }

    /// Disconnect the client. Never fails: a disconnect error is logged and
    /// dropped so the process can keep exiting. Calls after the first are
    /// no-ops. In-flight operations are not awaited.
    pub async fn shutdown(&self, trigger: ShutdownTrigger) -> ShutdownOutcome {
        if self.initiated.swap(true, Ordering::SeqCst) {
            debug!(%trigger, "Shutdown already in progress, ignoring");
            return ShutdownOutcome::AlreadyInProgress;
        }

        info!(%trigger, "Disconnecting database client");
        let _ = self.sender.send(trigger);

        let outcome = match instrument_future(self.client.disconnect(), shutdown_span(trigger.as_str())).await {
            Ok(()) => {
                info!(%trigger, "Database client disconnected");
                ShutdownOutcome::Disconnected
            }
            Err(e) => {
                error!(%trigger, error = %e, "Failed to disconnect database client");
                ShutdownOutcome::DisconnectFailed
            }
        };

        self.complete_tx.send_replace(true);
        outcome
    }

    /// Wait until a shutdown run has finished.
    pub async fn wait_for_completion(&self) {
        let mut rx = self.complete_rx.clone();
        let _ = rx.wait_for(|&complete| complete).await;
    }
}
