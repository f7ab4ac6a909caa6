//! End-to-end capture pipeline tests.
//!
//! Exercises the full flow a host application sees: configure, capture,
//! gate through before_send, and observe the wire payload the ingestion
//! endpoint would receive.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use fl_client::{Config, Hub, Level, MemoryStorage, User};
use fl_models::CanonicalError;

use common::RecordingTransport;

#[tokio::test]
async fn e2e_capture_message_delivers_expected_payload() {
    let transport = Arc::new(RecordingTransport::succeeding("evt-1"));
    let hub = common::test_hub(transport.clone());

    let id = hub.capture_message("hello", Level::Warning).await;
    assert_eq!(id.as_deref(), Some("evt-1"));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let payload = sent[0].as_object().unwrap();
    assert_eq!(payload["appId"], "a");
    assert_eq!(payload["commitHash"], "c1");
    assert_eq!(payload["environment"], "Production");
    assert_eq!(payload["level"], "Warning");
    assert_eq!(payload["message"], "hello");
    assert!(!payload.contains_key("tags"));
    assert!(!payload.contains_key("metadata"));
}

#[tokio::test]
async fn e2e_capture_exception_carries_stack_and_context() {
    let transport = Arc::new(RecordingTransport::succeeding("evt-2"));
    let hub = common::test_hub(transport.clone());

    let error = CanonicalError::new("x is not a function").with_stack(
        "TypeError: x is not a function\n    at Object.run (/var/task/src/worker.js:18:3)",
    );
    let id = hub.capture_exception(error, Level::Error).await;
    assert_eq!(id.as_deref(), Some("evt-2"));

    let payload = &transport.sent()[0];
    assert_eq!(payload["message"], "x is not a function");
    assert!(payload["stackTrace"].as_str().unwrap().contains("worker.js"));
    assert_eq!(payload["sourceContext"]["fileName"], "src/worker.js");
    assert_eq!(payload["sourceContext"]["lineNumber"], 18);
    assert_eq!(payload["sourceContext"]["functionName"], "run");
}

#[tokio::test]
async fn e2e_scope_state_flows_into_metadata() {
    let transport = Arc::new(RecordingTransport::succeeding("evt-3"));
    let hub = common::test_hub(transport.clone());

    hub.set_tag("region", "eu-west");
    hub.set_user(Some(User {
        id: Some("u-42".into()),
        email: Some("dev@example.com".into()),
        ..User::default()
    }));
    hub.set_extra("request", Some(serde_json::json!({"path": "/checkout"})));

    hub.capture_message("checkout failed", Level::Error).await;

    let payload = &transport.sent()[0];
    let metadata = payload["metadata"].as_object().unwrap();
    assert_eq!(metadata["tags"]["region"], "eu-west");
    assert_eq!(metadata["user"]["id"], "u-42");
    assert_eq!(metadata["request"]["path"], "/checkout");
}

#[tokio::test]
async fn e2e_before_send_gates_and_transforms() {
    // Drop path: hook returns None, nothing reaches the transport.
    let transport = Arc::new(RecordingTransport::succeeding("evt-4"));
    let mut options = common::test_options();
    options.before_send = Some(Arc::new(|event| {
        if event.message.contains("noise") {
            None
        } else {
            Some(event)
        }
    }));
    let config = Config::new(options).unwrap();
    let hub = Hub::new(config, transport.clone(), Arc::new(MemoryStorage::new()));

    let dropped = hub.capture_message("known noise", Level::Warning).await;
    assert!(dropped.is_none());
    assert!(transport.sent().is_empty());

    let kept = hub.capture_message("real problem", Level::Warning).await;
    assert_eq!(kept.as_deref(), Some("evt-4"));
    assert_eq!(transport.sent().len(), 1);
}

#[tokio::test]
async fn e2e_runtime_reconfiguration_swaps_hook() {
    let transport = Arc::new(RecordingTransport::succeeding("evt-5"));
    let hub = common::test_hub(transport.clone());

    hub.capture_message("first", Level::Warning).await;

    hub.config()
        .update(|o| {
            o.before_send = Some(Arc::new(|mut event| {
                event.message = "scrubbed".to_string();
                Some(event)
            }));
        })
        .unwrap();

    hub.capture_message("second", Level::Warning).await;

    let sent = transport.sent();
    assert_eq!(sent[0]["message"], "first");
    assert_eq!(sent[1]["message"], "scrubbed");
}

#[tokio::test]
async fn e2e_racing_captures_both_settle() {
    let transport = Arc::new(RecordingTransport::succeeding("evt-6"));
    let hub = Arc::new(common::test_hub(transport.clone()));

    let a = {
        let hub = hub.clone();
        tokio::spawn(async move { hub.capture_message("racer-a", Level::Warning).await })
    };
    let b = {
        let hub = hub.clone();
        tokio::spawn(async move { hub.capture_message("racer-b", Level::Warning).await })
    };

    assert!(a.await.unwrap().is_some());
    assert!(b.await.unwrap().is_some());

    // No ordering guarantee between the two, but both were delivered.
    let messages: Vec<String> = transport
        .sent()
        .iter()
        .map(|p| p["message"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(messages.len(), 2);
    assert!(messages.contains(&"racer-a".to_string()));
    assert!(messages.contains(&"racer-b".to_string()));
}

#[tokio::test]
async fn e2e_capture_never_disturbs_caller_on_failure() {
    let transport = Arc::new(RecordingTransport::failing());
    let hub = common::test_hub(transport.clone());

    // Every failure mode surfaces as an absent id, never an error.
    for i in 0..5 {
        let id = hub.capture_message(&format!("try {i}"), Level::Error).await;
        assert!(id.is_none());
    }
    assert_eq!(hub.queue().len(), 5);
}
