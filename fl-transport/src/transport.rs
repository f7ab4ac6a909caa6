//! Transport strategy interface.

use std::time::Duration;

use async_trait::async_trait;

use fl_models::ErrorEvent;

/// Result of one delivery attempt.
///
/// Transports never reject; every failure mode (network error, non-2xx
/// response, malformed body, timeout) resolves to `success: false` here.
#[derive(Debug, Clone, Default)]
pub struct SendOutcome {
    /// Whether the event was delivered (or, for the beacon transport,
    /// accepted for dispatch).
    pub success: bool,
    /// Event id assigned by the ingestion endpoint, when it returned one.
    pub id: Option<String>,
    /// HTTP status code, when a response was received.
    pub status_code: Option<u16>,
    /// Failure description, when delivery failed.
    pub error: Option<String>,
}

impl SendOutcome {
    /// Delivered: 2xx response, with whatever id the endpoint returned.
    pub fn delivered(id: Option<String>, status: u16) -> Self {
        Self {
            success: true,
            id,
            status_code: Some(status),
            error: None,
        }
    }

    /// Accepted for dispatch without delivery confirmation (beacon path).
    pub fn accepted() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    /// Rejected by the endpoint with a non-2xx status.
    pub fn rejected(status: u16, error: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            status_code: Some(status),
            error: Some(error.into()),
        }
    }

    /// Failed before any response arrived (network error, timeout).
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            status_code: None,
            error: Some(error.into()),
        }
    }
}

/// Strategy for delivering one event.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one event. Never errors; failures resolve into the outcome.
    async fn send(&self, event: &ErrorEvent) -> SendOutcome;

    /// Bound how long callers wait for in-flight sends before teardown.
    /// Default is an immediate no-op for transports with nothing in flight.
    async fn flush(&self, _timeout: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_constructors() {
        let ok = SendOutcome::delivered(Some("evt-1".into()), 200);
        assert!(ok.success);
        assert_eq!(ok.id.as_deref(), Some("evt-1"));
        assert_eq!(ok.status_code, Some(200));

        let accepted = SendOutcome::accepted();
        assert!(accepted.success);
        assert!(accepted.id.is_none());
        assert!(accepted.status_code.is_none());

        let rejected = SendOutcome::rejected(500, "oops");
        assert!(!rejected.success);
        assert_eq!(rejected.status_code, Some(500));

        let failed = SendOutcome::failed("connection refused");
        assert!(!failed.success);
        assert!(failed.status_code.is_none());
        assert_eq!(failed.error.as_deref(), Some("connection refused"));
    }
}
