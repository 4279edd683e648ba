//! Error types for the Veo provider client

use thiserror::Error;

/// Main error type for provider-client operations
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable credential; surfaced before any network call
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed caller input; never retried
    #[error("Validation error: {0}")]
    Validation(String),

    /// Non-2xx reply from the provider, with upstream status and body
    #[error("Upstream error ({status}): {body}")]
    Upstream {
        /// HTTP status code observed upstream
        status: u16,
        /// Upstream response body, verbatim
        body: String,
    },

    /// Transport-level failure talking to the provider
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider marked the job terminal with a failure payload
    /// (e.g. a content-policy rejection); distinct from transport failure
    #[error("Operation failed: {0}")]
    Operation(String),

    /// The operation completed but no video file reference could be
    /// extracted from any known response shape
    #[error("Operation completed but no video file URI found")]
    MissingResult {
        /// Last raw operation resource, for diagnosis
        raw: serde_json::Value,
    },

    /// The blocking wait's deadline elapsed without a terminal state
    #[error("Timed out waiting for video")]
    Timeout {
        /// Last raw status observed before the deadline, if any
        last: Option<serde_json::Value>,
    },
}

/// Convenient Result type using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
