//! Error normalization.
//!
//! Converts an arbitrary captured value into a canonical error with a
//! message and optional stack/name. Total over every JSON value shape and
//! over anything implementing `std::error::Error` - normalization never
//! fails and never panics.

use serde_json::Value;

/// Canonical representation of a captured error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalError {
    /// Human-readable message. Always present.
    pub message: String,
    /// Raw stack trace text, when the source carried one.
    pub stack: Option<String>,
    /// Error class/type name, when the source carried one.
    pub name: Option<String>,
}

impl CanonicalError {
    /// Create a canonical error from a bare message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
            name: None,
        }
    }

    /// Create a canonical error from a Rust error value.
    ///
    /// The message comes from `Display`; no stack is attached (callers that
    /// have one, such as the panic integration, use [`with_stack`]).
    ///
    /// [`with_stack`]: Self::with_stack
    pub fn from_error(err: &(dyn std::error::Error + '_)) -> Self {
        Self::new(err.to_string())
    }

    /// Attach a stack trace.
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Attach an error name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Normalize an arbitrary captured JSON value into a canonical error.
///
/// Policy, in order: strings become the message as-is; objects yield their
/// `message` field, else their `reason` field, else a compact rendering of
/// the whole object, carrying over string `stack` and `name` fields when
/// present; everything else string-converts to a message.
pub fn normalize(value: &Value) -> CanonicalError {
    match value {
        Value::String(s) => CanonicalError::new(s.clone()),
        Value::Object(map) => {
            let mut err = CanonicalError::new(extract_message(value));
            if let Some(stack) = map.get("stack").and_then(Value::as_str) {
                err.stack = Some(stack.to_string());
            }
            if let Some(name) = map.get("name").and_then(Value::as_str) {
                err.name = Some(name.to_string());
            }
            err
        }
        other => CanonicalError::new(stringify(other)),
    }
}

/// Extract a message from an arbitrary captured value without building a
/// full canonical error. Same selection policy as [`normalize`].
pub fn extract_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => map
            .get("message")
            .map(stringify)
            .or_else(|| map.get("reason").map(stringify))
            .unwrap_or_else(|| value.to_string()),
        other => stringify(other),
    }
}

/// Structural test for error-shaped values: an object carrying a string
/// `message` field.
pub fn is_error_like(value: &Value) -> bool {
    value
        .as_object()
        .and_then(|map| map.get("message"))
        .map(Value::is_string)
        .unwrap_or(false)
}

/// String-convert a JSON value the way a message should read: strings
/// unquoted, everything else in its JSON rendering.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
