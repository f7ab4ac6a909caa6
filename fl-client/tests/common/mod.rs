//! Shared test utilities for integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use fl_client::{Config, Hub, MemoryStorage, Options};
use fl_models::ErrorEvent;
use fl_transport::{payload, SendOutcome, Transport};

/// Transport double standing in for the ingestion service. Records the
/// wire payload of every send and replays scripted outcomes.
pub struct RecordingTransport {
    script: Mutex<VecDeque<SendOutcome>>,
    fallback: SendOutcome,
    sent: Mutex<Vec<serde_json::Value>>,
}

impl RecordingTransport {
    /// Every send succeeds with the given id.
    pub fn succeeding(id: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: SendOutcome::delivered(Some(id.to_string()), 200),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Every send fails with a network-style error.
    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: SendOutcome::failed("stub transport failure"),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Replay the given outcomes in order, then succeed without an id.
    pub fn scripted(outcomes: Vec<SendOutcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            fallback: SendOutcome::delivered(None, 200),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Payloads received so far, in send order.
    pub fn sent(&self) -> Vec<serde_json::Value> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, event: &ErrorEvent) -> SendOutcome {
        self.sent.lock().unwrap().push(payload::build_payload(event));
        let scripted = self.script.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Valid option set for tests.
pub fn test_options() -> Options {
    Options {
        dsn: "https://x".into(),
        app_id: "a".into(),
        commit_hash: "c1".into(),
        environment: "Production".into(),
        ..Options::default()
    }
}

/// Hub over a recording transport and transient storage.
pub fn test_hub(transport: Arc<RecordingTransport>) -> Hub {
    let config = Config::new(test_options()).expect("valid test options");
    Hub::new(config, transport, Arc::new(MemoryStorage::new()))
}
