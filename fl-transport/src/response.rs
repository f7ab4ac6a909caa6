//! Ingestion endpoint response types.
//!
//! A successful ingestion returns `{"success": true, "id": "..."}`; a
//! rejected one returns `{"error": "...", "details": [...]}`. Any other
//! HTTP status is a transport-level failure and is not parsed as either
//! shape.

use serde::{Deserialize, Serialize};

/// Response body returned by the ingestion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Whether ingestion succeeded.
    #[serde(default)]
    pub success: bool,
    /// Id assigned to the ingested event.
    #[serde(default)]
    pub id: Option<String>,
    /// Error message (present only on rejection).
    #[serde(default)]
    pub error: Option<String>,
    /// Per-field rejection details.
    #[serde(default)]
    pub details: Option<Vec<String>>,
}

impl IngestResponse {
    /// Whether the response indicates success.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get the error message if this is a rejection.
    pub fn error_message(&self) -> Option<String> {
        if self.success {
            None
        } else {
            self.error.clone()
        }
    }
}
