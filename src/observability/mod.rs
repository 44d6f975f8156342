//! Logging, diagnostics events and counters.
//!
//! Provider failures are never surfaced as errors to callers, so each
//! degradation is reported three ways: a `tracing` warning, a `metrics`
//! counter and an [`AiEvent`] on the global [`EventBus`].

mod event_bus;
mod logging;

pub use event_bus::{EventBus, FilteredReceiver, global_event_bus};
pub use logging::{LogFormat, LoggingConfig, init as init_logging};

use crate::Error;
use crate::models::{AiEvent, AiOperation, EventMeta};

/// Records a provider call that degraded to its default value.
pub fn report_degraded(provider: &'static str, operation: AiOperation, error: &Error) {
    tracing::warn!(
        provider = provider,
        operation = operation.as_str(),
        error_kind = error.kind(),
        error = %error,
        "AI call degraded to default value"
    );
    metrics::counter!(
        "ai_fallback_total",
        "provider" => provider,
        "operation" => operation.as_str()
    )
    .increment(1);
    global_event_bus().publish(AiEvent::Degraded {
        meta: EventMeta::new(),
        provider,
        operation,
        error_kind: error.kind(),
        message: error.to_string(),
    });
}

/// Records the outcome of a connectivity check.
pub fn report_connection(provider: &'static str, connected: bool) {
    tracing::debug!(provider = provider, connected = connected, "Connection checked");
    metrics::counter!(
        "ai_connection_checks_total",
        "provider" => provider,
        "connected" => if connected { "true" } else { "false" }
    )
    .increment(1);
    global_event_bus().publish(AiEvent::ConnectionChecked {
        meta: EventMeta::new(),
        provider,
        connected,
    });
}
