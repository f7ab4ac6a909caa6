//! Fire-and-forget beacon transport.
//!
//! Used during teardown, where there is no time budget to await delivery
//! confirmation. The send is spawned onto the runtime and the outcome only
//! reports that the request was accepted for dispatch. No custom headers
//! are attached, so the API key is never sent on this path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use fl_core::error::{SdkError, SdkResult};
use fl_models::ErrorEvent;

use crate::payload;
use crate::transport::{SendOutcome, Transport};

/// Poll interval while waiting for dispatched sends during flush.
const FLUSH_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Upper bound on how long a dispatched beacon request may run.
const BEACON_TIMEOUT: Duration = Duration::from_secs(10);

/// Best-effort transport for teardown paths.
#[derive(Clone)]
pub struct BeaconTransport {
    inner: Client,
    /// Full ingestion URL (dsn + ingest path).
    endpoint: String,
    /// Number of dispatched sends not yet settled.
    in_flight: Arc<AtomicUsize>,
}

impl BeaconTransport {
    /// Create a new BeaconTransport targeting the given DSN.
    pub fn new(dsn: &str) -> SdkResult<Self> {
        let inner = Client::builder()
            .build()
            .map_err(|e| SdkError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            endpoint: format!(
                "{}{}",
                dsn.trim_end_matches('/'),
                fl_core::constants::INGEST_PATH
            ),
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Get the full ingestion URL this transport posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Transport for BeaconTransport {
    async fn send(&self, event: &ErrorEvent) -> SendOutcome {
        let body = payload::build_payload(event);
        let client = self.inner.clone();
        let endpoint = self.endpoint.clone();
        let in_flight = self.in_flight.clone();

        in_flight.fetch_add(1, Ordering::SeqCst);
        tokio::spawn(async move {
            let result = client
                .post(&endpoint)
                .timeout(BEACON_TIMEOUT)
                .json(&body)
                .send()
                .await;
            if let Err(e) = result {
                debug!(target: "faultline", "beacon send failed: {e}");
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
        });

        SendOutcome::accepted()
    }

    async fn flush(&self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while self.in_flight.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
            tokio::time::sleep(FLUSH_POLL_INTERVAL).await;
        }
    }
}
