//! Error types shared across the Faultline crates.
//!
//! One `SdkError` enum covers every failure the SDK can produce. Hosts
//! only ever see the configuration variants: everything else is caught at
//! the capture boundary and reduced to an absent event id.

use thiserror::Error;

/// Result alias used throughout the SDK.
pub type SdkResult<T> = Result<T, SdkError>;

/// Every failure category the SDK can produce.
#[derive(Error, Debug)]
pub enum SdkError {
    // Configuration
    /// An option value failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A required option was left empty.
    #[error("missing required option: {0}")]
    MissingConfig(String),

    // Delivery
    /// The HTTP layer failed before a response arrived.
    #[error("http transport error: {0}")]
    Http(String),

    /// A send exceeded its deadline.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The ingestion endpoint rejected the event.
    #[error("ingestion rejected (status {status}): {message}")]
    ServerError {
        /// HTTP status code of the rejection.
        status: u16,
        /// Message from the rejection body.
        message: String,
    },

    // Persistence
    /// The queue's storage backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// Underlying filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An event could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    // Interop
    /// A fault with no more specific category.
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_error_display() {
        let err = SdkError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "invalid configuration: bad value");
        let err = SdkError::MissingConfig("dsn".to_string());
        assert_eq!(err.to_string(), "missing required option: dsn");
    }

    #[test]
    fn test_server_error_display() {
        let err = SdkError::ServerError {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "ingestion rejected (status 503): unavailable");
    }

    #[test]
    fn test_serde_json_conversion() {
        let bad = serde_json::from_str::<serde_json::Value>("{not json");
        let err: SdkError = bad.unwrap_err().into();
        assert!(matches!(err, SdkError::Serialization(_)));
    }
}
