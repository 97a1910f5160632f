//! Signal wiring and the before-exit hook.

use std::future::Future;
use std::io;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::handler::{ShutdownHandler, ShutdownTrigger};
use crate::backend::DatabaseBackend;

/// How [`run_until_exit`] ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason<T> {
    /// The application future finished; the before-exit shutdown ran.
    Completed(T),
    /// A signal arrived first; the application future was dropped.
    Signalled(ShutdownTrigger),
}

/// Resolve with the first of SIGINT or SIGTERM.
///
/// Each listener is installed on its own. If only one can be installed the
/// other still works; an error is returned only when neither can.
#[cfg(unix)]
pub async fn wait_for_signal() -> io::Result<ShutdownTrigger> {
    use tokio::signal::unix::{signal, SignalKind};

    let interrupt = signal(SignalKind::interrupt()).map(|mut s| async move {
        s.recv().await;
    });
    let terminate = signal(SignalKind::terminate()).map(|mut s| async move {
        s.recv().await;
    });

    first_signal(interrupt, terminate).await
}

/// Resolve on Ctrl+C.
#[cfg(not(unix))]
pub async fn wait_for_signal() -> io::Result<ShutdownTrigger> {
    tokio::signal::ctrl_c().await?;
    Ok(ShutdownTrigger::Interrupt)
}

/// Wait on whichever listeners were installed.
#[cfg_attr(not(unix), allow(dead_code))]
async fn first_signal<I, T>(interrupt: io::Result<I>, terminate: io::Result<T>) -> io::Result<ShutdownTrigger>
where
    I: Future<Output = ()>,
    T: Future<Output = ()>,
{
    match (interrupt, terminate) {
        (Ok(interrupt), Ok(terminate)) => {
            tokio::select! {
                _ = interrupt => Ok(ShutdownTrigger::Interrupt),
                _ = terminate => Ok(ShutdownTrigger::Terminate),
            }
        }
        (Ok(interrupt), Err(e)) => {
            warn!(error = %e, "Failed to install SIGTERM handler, listening for SIGINT only");
            interrupt.await;
            Ok(ShutdownTrigger::Interrupt)
        }
        (Err(e), Ok(terminate)) => {
            warn!(error = %e, "Failed to install SIGINT handler, listening for SIGTERM only");
            terminate.await;
            Ok(ShutdownTrigger::Terminate)
        }
        (Err(interrupt_err), Err(terminate_err)) => {
            warn!(error = %terminate_err, "Failed to install SIGTERM handler");
            Err(interrupt_err)
        }
    }
}

/// Spawn a task that runs the shutdown routine when a termination signal
/// arrives.
pub fn install<B: DatabaseBackend>(handler: Arc<ShutdownHandler<B>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(trigger) => {
                info!(%trigger, "Received shutdown signal");
                handler.shutdown(trigger).await;
            }
            Err(e) => error!(error = %e, "Failed to install signal handlers"),
        }
    })
}

/// Drive `app` until it finishes or a termination signal arrives, then run
/// the shutdown routine for whichever came first.
pub async fn run_until_exit<B, F>(handler: &ShutdownHandler<B>, app: F) -> ExitReason<F::Output>
where
    B: DatabaseBackend,
    F: Future,
{
    run_until(handler, app, wait_for_signal()).await
}

/// [`run_until_exit`] with the signal source supplied by the caller.
///
/// If the signal source fails, `app` keeps running and the before-exit
/// shutdown still happens when it finishes.
pub async fn run_until<B, F, S>(handler: &ShutdownHandler<B>, app: F, signal: S) -> ExitReason<F::Output>
where
    B: DatabaseBackend,
    F: Future,
    S: Future<Output = io::Result<ShutdownTrigger>>,
{
    tokio::pin!(app);
    tokio::pin!(signal);

    let signalled = tokio::select! {
        output = &mut app => {
            handler.shutdown(ShutdownTrigger::BeforeExit).await;
            return ExitReason::Completed(output);
        }
        signalled = &mut signal => signalled,
    };

    match signalled {
        Ok(trigger) => {
            info!(%trigger, "Received shutdown signal");
            handler.shutdown(trigger).await;
            ExitReason::Signalled(trigger)
        }
        Err(e) => {
            error!(error = %e, "Failed to install signal handlers, waiting for normal exit");
            let output = app.await;
            handler.shutdown(ShutdownTrigger::BeforeExit).await;
            ExitReason::Completed(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::Client;
    use crate::mock::MockBackend;
    use crate::options::ClientOptions;
    use crate::ShutdownOutcome;
    use std::time::Duration;

    fn handler() -> ShutdownHandler<MockBackend> {
        ShutdownHandler::new(Arc::new(Client::new(MockBackend::new(), ClientOptions::default())))
    }

    #[tokio::test]
    async fn test_app_completion_runs_before_exit() {
        let handler = handler();
        let mut rx = handler.subscribe();

        let reason = run_until(&handler, async { 42 }, std::future::pending()).await;

        assert_eq!(reason, ExitReason::Completed(42));
        assert_eq!(rx.recv().await.unwrap(), ShutdownTrigger::BeforeExit);
        assert_eq!(handler.client().backend().disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_signal_first_runs_shutdown_for_signal() {
        let handler = handler();

        let reason = run_until(
            &handler,
            std::future::pending::<()>(),
            async { Ok(ShutdownTrigger::Terminate) },
        )
        .await;

        assert_eq!(reason, ExitReason::Signalled(ShutdownTrigger::Terminate));
        assert_eq!(handler.client().backend().disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_signal_failure_falls_back_to_before_exit() {
        let handler = handler();

        let reason = run_until(
            &handler,
            async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                "done"
            },
            async { Err(io::Error::new(io::ErrorKind::Other, "no signal driver")) },
        )
        .await;

        assert_eq!(reason, ExitReason::Completed("done"));
        assert_eq!(handler.client().backend().disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_signal_then_before_exit_disconnects_once() {
        let handler = handler();

        run_until(&handler, std::future::pending::<()>(), async { Ok(ShutdownTrigger::Interrupt) }).await;
        let late = handler.shutdown(ShutdownTrigger::BeforeExit).await;

        assert_eq!(late, ShutdownOutcome::AlreadyInProgress);
        assert_eq!(handler.client().backend().disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_installed_listener_waits_for_signal() {
        let handler = Arc::new(handler());
        let listener = install(Arc::clone(&handler));

        tokio::task::yield_now().await;
        assert!(!handler.is_shutting_down());
        assert_eq!(handler.client().backend().disconnect_count(), 0);

        listener.abort();
    }

    fn refused() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "signal driver unavailable")
    }

    #[tokio::test]
    async fn test_first_signal_picks_whichever_fires() {
        let trigger = first_signal(Ok(std::future::pending::<()>()), Ok(async {})).await;
        assert_eq!(trigger.unwrap(), ShutdownTrigger::Terminate);

        let trigger = first_signal(Ok(async {}), Ok(std::future::pending::<()>())).await;
        assert_eq!(trigger.unwrap(), ShutdownTrigger::Interrupt);
    }

    #[tokio::test]
    async fn test_interrupt_still_heard_when_terminate_fails() {
        let capture = tether_test_utils::LogCapture::new();
        let _guard = capture.set_default();

        let trigger = first_signal(Ok(async {}), Err::<std::future::Pending<()>, _>(refused())).await;

        assert_eq!(trigger.unwrap(), ShutdownTrigger::Interrupt);
        assert_eq!(capture.lines_containing("Failed to install SIGTERM handler").len(), 1);
    }

    #[tokio::test]
    async fn test_terminate_still_heard_when_interrupt_fails() {
        let trigger = first_signal(Err::<std::future::Pending<()>, _>(refused()), Ok(async {})).await;
        assert_eq!(trigger.unwrap(), ShutdownTrigger::Terminate);
    }

    #[tokio::test]
    async fn test_error_only_when_no_listener_installs() {
        let result = first_signal(
            Err::<std::future::Pending<()>, _>(refused()),
            Err::<std::future::Pending<()>, _>(refused()),
        )
        .await;
        assert!(result.is_err());
    }
}
