//! Span helpers.

use tracing::{field, info_span, Span};

/// Create the span that wraps one inbound HTTP request.
///
/// `status` and `granted` start empty and are recorded as the request moves
/// through the middleware chain.
pub fn request_span(request_id: &str, method: &str, path: &str) -> Span {
    info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        granted = field::Empty,
        status = field::Empty,
    )
}

/// Create a span for a single tool invocation.
///
/// `outcome` is recorded once the call returns; `error` only on failure.
pub fn tool_span(tool: &str) -> Span {
    info_span!(
        "tool",
        name = %tool,
        outcome = field::Empty,
        error = field::Empty,
    )
}

/// Create a span for an outbound provider call.
pub fn provider_span(provider: &str, operation: &str) -> Span {
    info_span!("provider", name = %provider, op = %operation)
}

/// Record an error on the current span. Only spans that declare an `error`
/// field keep it.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", field::display(error));
}

/// Wall-clock timer for log fields.
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    /// Start a new timer.
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since the timer started.
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
