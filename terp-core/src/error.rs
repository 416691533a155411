//! Error types for terp.
//!
//! One error enum for every library crate in the workspace, built with
//! `thiserror`. The binary wraps these in `anyhow` with context.

use thiserror::Error;

/// Result type alias using `TerpError`.
pub type Result<T> = std::result::Result<T, TerpError>;

/// Main error type for all terp operations.
#[derive(Debug, Error)]
pub enum TerpError {
    // ═══════════════════════════════════════════════════════════════════════════
    // DOMAIN ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Semester number or name could not be parsed.
    #[error("Invalid semester '{input}': {reason}")]
    InvalidSemester { input: String, reason: String },

    /// Unknown season name or code.
    #[error("Unknown season: {0}")]
    UnknownSeason(String),

    /// Unknown admin action code.
    #[error("Unknown admin action: {0}")]
    UnknownAdminAction(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // MODERATION QUEUE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The moderation queue backend failed to answer.
    #[error("Moderation queue error: {0}")]
    QueueError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Webhook endpoint answered with a non-success status.
    #[error("Webhook rejected the message with status {status}: {body}")]
    WebhookRejected { status: u16, body: String },

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl TerpError {
    /// Shorthand for an [`TerpError::InvalidSemester`] error.
    pub fn invalid_semester(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSemester {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error came from the network or the remote endpoint.
    pub fn is_network_error(&self) -> bool {
        matches!(self, Self::HttpError(_) | Self::WebhookRejected { .. })
    }
}
