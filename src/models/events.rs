//! AI event types for diagnostics.

use crate::current_timestamp_millis;
use uuid::Uuid;

/// Provider operations that can degrade to a default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AiOperation {
    /// Note classification.
    Analyze,
    /// Question answering.
    Ask,
    /// Model listing.
    ListModels,
    /// Connectivity check.
    TestConnection,
}

impl AiOperation {
    /// Returns the operation as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Analyze => "analyze",
            Self::Ask => "ask",
            Self::ListModels => "list_models",
            Self::TestConnection => "test_connection",
        }
    }
}

/// Shared event metadata.
#[derive(Debug, Clone)]
pub struct EventMeta {
    /// Unique identifier for this event.
    pub event_id: String,
    /// Timestamp (Unix epoch milliseconds).
    pub timestamp: u64,
}

impl EventMeta {
    /// Creates new event metadata using the current time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timestamp(current_timestamp_millis())
    }

    /// Creates new event metadata with a specified timestamp.
    #[must_use]
    pub fn with_timestamp(timestamp: u64) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            timestamp,
        }
    }
}

impl Default for EventMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// Events emitted by the AI layer.
#[derive(Debug, Clone)]
pub enum AiEvent {
    /// A provider call failed and a default value was returned instead.
    Degraded {
        /// Event metadata.
        meta: EventMeta,
        /// Provider name.
        provider: &'static str,
        /// The operation that degraded.
        operation: AiOperation,
        /// Error category (see [`crate::Error::kind`]).
        error_kind: &'static str,
        /// Error message.
        message: String,
    },
    /// A connectivity check completed.
    ConnectionChecked {
        /// Event metadata.
        meta: EventMeta,
        /// Provider name.
        provider: &'static str,
        /// Check outcome.
        connected: bool,
    },
}

impl AiEvent {
    /// Returns the event type as a string.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Degraded { .. } => "degraded",
            Self::ConnectionChecked { .. } => "connection_checked",
        }
    }

    /// Returns the provider the event concerns.
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        match self {
            Self::Degraded { provider, .. } | Self::ConnectionChecked { provider, .. } => *provider,
        }
    }
}
