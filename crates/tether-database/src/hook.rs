//! Call observation.
//!
//! Hooks see a [`CallRecord`] after every intercepted call, plus the error
//! on failure. They only ever get shared references, so they cannot change
//! what the caller receives.

use std::fmt;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::options::{CallLevel, ClientOptions, ErrorFormat, LogLevelSet};
use crate::shape::Shape;

/// Anything an operation may fail with.
pub trait Failure: fmt::Display + fmt::Debug {}

impl<T: fmt::Display + fmt::Debug + ?Sized> Failure for T {}

/// One completed call. Lives only as long as the hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallRecord<'a> {
    pub model: &'a str,
    pub operation: &'a str,
    pub elapsed: Duration,
    pub shape: Shape,
}

impl CallRecord<'_> {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }
}

impl fmt::Display for CallRecord<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{} took {}ms", self.model, self.operation, self.elapsed_ms())?;
        if let Some(hint) = self.shape.hint() {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

/// Observer attached to a client at construction time.
pub trait CallHook: Send + Sync {
    fn on_success(&self, _record: &CallRecord<'_>) {}

    fn on_failure(&self, _record: &CallRecord<'_>, _error: &dyn Failure) {}
}

/// Writes one log line per call, filtered by the client's level set.
#[derive(Debug, Clone)]
pub struct LoggingHook {
    levels: LogLevelSet,
    error_format: ErrorFormat,
    slow_call_threshold: Duration,
}

impl LoggingHook {
    pub fn new(options: &ClientOptions) -> Self {
        Self {
            levels: options.levels,
            error_format: options.error_format,
            slow_call_threshold: options.slow_call_threshold,
        }
    }
}

impl CallHook for LoggingHook {
    fn on_success(&self, record: &CallRecord<'_>) {
        if record.elapsed > self.slow_call_threshold && self.levels.contains(CallLevel::Warn) {
            warn!(
                model = %record.model,
                operation = %record.operation,
                elapsed_ms = record.elapsed_ms() as u64,
                threshold_ms = self.slow_call_threshold.as_millis() as u64,
                "slow database call: {record}"
            );
        }

        if self.levels.contains(CallLevel::Info) {
            info!(
                model = %record.model,
                operation = %record.operation,
                elapsed_ms = record.elapsed_ms() as u64,
                "{record}"
            );
        }
    }

    fn on_failure(&self, record: &CallRecord<'_>, error: &dyn Failure) {
        if !self.levels.contains(CallLevel::Error) {
            return;
        }

        error!(
            model = %record.model,
            operation = %record.operation,
            elapsed_ms = record.elapsed_ms() as u64,
            error = %self.error_format.render(error),
            "{}.{} failed after {}ms",
            record.model,
            record.operation,
            record.elapsed_ms()
        );
    }
}
