//! Canonical event types shipped to the ingestion endpoint.
//!
//! `ErrorEvent` is both the wire unit and the queue unit. Required fields
//! are always present on a built event; everything else is optional and
//! omitted from the payload when empty. Empty tag/metadata maps must never
//! appear on the wire, so the maps are modeled as `Option` and only set
//! when non-empty.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use fl_core::error::SdkError;

/// Severity of a captured event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Error,
    Warning,
    Critical,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// Deployment environment an event originates from.
///
/// Validated eagerly at configuration time; anything outside the three
/// recognized values is a configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Production,
    Staging,
    Development,
}

impl FromStr for Environment {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Production" => Ok(Self::Production),
            "Staging" => Ok(Self::Staging),
            "Development" => Ok(Self::Development),
            other => Err(SdkError::Config(format!(
                "invalid environment '{other}' (expected Production, Staging, or Development)"
            ))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "Production"),
            Self::Staging => write!(f, "Staging"),
            Self::Development => write!(f, "Development"),
        }
    }
}

/// Identity of the user a captured event is attributed to.
///
/// All well-known fields are optional; arbitrary extra fields round-trip
/// through the flattened map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Best-effort source location extracted from a stack trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceContext {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub line_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub column_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub function_name: Option<String>,
}

/// The canonical captured event, as queued and as shipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEvent {
    pub app_id: String,
    pub commit_hash: String,
    pub environment: Environment,
    pub level: Level,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub stack_trace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub source_context: Option<SourceContext>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub tags: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_agent: Option<String>,
    /// ISO-8601, stamped once when the event is built.
    pub timestamp: String,
}

impl ErrorEvent {
    /// Current timestamp in the wire format.
    pub fn now_timestamp() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
