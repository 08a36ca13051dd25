use std::time::Duration;
use thiserror::Error;

/// Local failures of the tracking engine. Nothing here is fatal; validation
/// failures reject the input with no state change, and store failures are
/// logged while the in-memory state stays authoritative.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Store operation failed: {operation}")]
    Store {
        operation: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Remote practice-stats failures, one user-facing class each. Rate limits
/// go through the backoff policy before they ever surface.
#[derive(Error, Debug)]
pub enum StatsError {
    #[error("User '{username}' not found")]
    UserNotFound { username: String },

    #[error("Rate limited by the stats service")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed stats payload: {0}")]
    MalformedPayload(String),
}

impl StatsError {
    /// Retrying only helps for transient classes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StatsError::RateLimited { .. } | StatsError::Network(_))
    }
}
