//! Standard request/response HTTP transport.
//!
//! Default outbound delivery path. Wraps reqwest with per-request timeout
//! handling, auth header injection, and error classification. All failure
//! modes resolve into a `SendOutcome`; this transport never returns an
//! error to its caller.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use fl_core::constants;
use fl_core::error::{SdkError, SdkResult};
use fl_models::ErrorEvent;

use crate::payload;
use crate::response::IngestResponse;
use crate::transport::{SendOutcome, Transport};

/// Poll interval while waiting for in-flight sends during flush.
const FLUSH_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// HTTP transport for the ingestion endpoint.
#[derive(Clone)]
pub struct HttpTransport {
    inner: Client,
    /// Full ingestion URL (dsn + ingest path).
    endpoint: String,
    /// Optional API key, sent as an auth header when present.
    api_key: Option<String>,
    /// Per-request timeout.
    timeout: Duration,
    /// Number of sends currently awaiting a response.
    in_flight: Arc<AtomicUsize>,
}

impl HttpTransport {
    /// Create a new HttpTransport targeting the given DSN.
    pub fn new(dsn: &str, api_key: Option<String>, timeout: Duration) -> SdkResult<Self> {
        let inner = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| SdkError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            inner,
            endpoint: ingest_url(dsn),
            api_key,
            timeout,
            in_flight: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Get the full ingestion URL this transport posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the POST for one payload: JSON content type always, the auth
    /// header only when an API key is configured.
    fn request(&self, body: &serde_json::Value) -> reqwest::RequestBuilder {
        let mut builder = self
            .inner
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(body);
        if let Some(key) = &self.api_key {
            builder = builder.header(constants::API_KEY_HEADER, key.as_str());
        }
        builder
    }

    async fn dispatch(&self, event: &ErrorEvent) -> SendOutcome {
        let body = payload::build_payload(event);
        let response = match self.request(&body).send().await {
            Ok(response) => response,
            Err(e) => return SendOutcome::failed(classify_error(e)),
        };

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<IngestResponse>()
                .await
                .ok()
                .and_then(|r| r.error_message())
                .unwrap_or_else(|| format!("endpoint returned {status}"));
            debug!(target: "faultline", "ingestion rejected ({status}): {message}");
            return SendOutcome::rejected(status.as_u16(), message);
        }

        // A 2xx with an unparseable body still counts as delivered; the
        // endpoint accepted the event, we just have no id for it.
        match response.json::<IngestResponse>().await {
            Ok(parsed) => SendOutcome::delivered(parsed.id, status.as_u16()),
            Err(_) => SendOutcome::delivered(None, status.as_u16()),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, event: &ErrorEvent) -> SendOutcome {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let outcome = self.dispatch(event).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    async fn flush(&self, timeout: Duration) {
        let deadline = Instant::now() + timeout;
        while self.in_flight.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
            tokio::time::sleep(FLUSH_POLL_INTERVAL).await;
        }
    }
}

/// Build the full ingestion URL from a DSN.
fn ingest_url(dsn: &str) -> String {
    format!("{}{}", dsn.trim_end_matches('/'), constants::INGEST_PATH)
}

/// Classify a reqwest error into a failure description.
fn classify_error(e: reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timeout: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        e.to_string()
    }
}
