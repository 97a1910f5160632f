//! Span helpers.

use std::future::Future;
use tracing::{info_span, Instrument, Span};

/// Span covering one intercepted database call.
pub fn call_span(model: &str, operation: &str) -> Span {
    info_span!("db_call", model = %model, operation = %operation)
}

/// Span covering a shutdown run, tagged with what triggered it.
pub fn shutdown_span(trigger: &str) -> Span {
    info_span!("shutdown", trigger = %trigger)
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}
