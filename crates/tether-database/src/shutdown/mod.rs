//! Clean disconnect on process termination.

pub mod handler;
pub mod signal;

pub use handler::{ShutdownHandler, ShutdownOutcome, ShutdownTrigger};
pub use signal::{install, run_until, run_until_exit, wait_for_signal, ExitReason};
