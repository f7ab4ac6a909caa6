//! Wire payload construction.
//!
//! Shared by every transport so that the HTTP and beacon paths serialize
//! events identically. Identity fields are always present; the stack
//! trace, source context and user agent appear only when set; tags and
//! user are folded into the metadata object, and the metadata field is
//! omitted entirely when the merged result is empty.

use serde_json::{json, Map, Value};

use fl_models::ErrorEvent;

/// Build the JSON request body for one event.
pub fn build_payload(event: &ErrorEvent) -> Value {
    let mut body = Map::new();
    body.insert("appId".into(), json!(event.app_id));
    body.insert("commitHash".into(), json!(event.commit_hash));
    body.insert("environment".into(), json!(event.environment));
    body.insert("level".into(), json!(event.level));
    body.insert("message".into(), json!(event.message));
    body.insert("timestamp".into(), json!(event.timestamp));

    if let Some(stack) = &event.stack_trace {
        body.insert("stackTrace".into(), json!(stack));
    }

    let metadata = merged_metadata(event);
    if !metadata.is_empty() {
        body.insert("metadata".into(), Value::Object(metadata));
    }

    if let Some(ctx) = &event.source_context {
        body.insert("sourceContext".into(), json!(ctx));
    }
    if let Some(ua) = &event.user_agent {
        body.insert("userAgent".into(), json!(ua));
    }

    Value::Object(body)
}

/// Merge extras-derived metadata with tags and user into one object.
fn merged_metadata(event: &ErrorEvent) -> Map<String, Value> {
    let mut metadata = Map::new();
    if let Some(extras) = &event.metadata {
        for (key, value) in extras {
            metadata.insert(key.clone(), value.clone());
        }
    }
    if let Some(tags) = &event.tags {
        if !tags.is_empty() {
            metadata.insert("tags".into(), json!(tags));
        }
    }
    if let Some(user) = &event.user {
        metadata.insert("user".into(), json!(user));
    }
    metadata
}
