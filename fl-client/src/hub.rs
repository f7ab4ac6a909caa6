//! Event hub: builds canonical events and pushes them through the pipeline.
//!
//! The hub owns the configuration, the scope, the transport, and the
//! offline queue. `build_event` is the single authoritative place where an
//! event is assembled from scope and configuration; enrichment only adds
//! runtime-specific fields afterwards, so tag/metadata/user snapshots
//! always reflect scope state at capture time.
//!
//! Public capture operations never propagate a failure into host code:
//! every internal fault is reduced to an absent event id.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{PoisonError, RwLock};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use fl_core::error::{SdkError, SdkResult};
use fl_core::runtime;
use fl_models::{stacktrace, CanonicalError, ErrorEvent, Level, User};
use fl_transport::Transport;

use crate::config::Config;
use crate::queue::OfflineQueue;
use crate::scope::Scope;
use crate::storage::EventStorage;

/// Runtime-specific event enrichment, applied after `build_event`.
pub trait Enricher: Send + Sync {
    fn enrich(&self, event: &mut ErrorEvent);
}

/// Default enrichment for native processes: attaches the host user agent
/// string and a source location parsed from the stack trace.
pub struct RuntimeEnricher {
    user_agent: String,
}

impl RuntimeEnricher {
    pub fn new() -> Self {
        Self {
            user_agent: runtime::user_agent(),
        }
    }
}

impl Default for RuntimeEnricher {
    fn default() -> Self {
        Self::new()
    }
}

impl Enricher for RuntimeEnricher {
    fn enrich(&self, event: &mut ErrorEvent) {
        if event.user_agent.is_none() {
            event.user_agent = Some(self.user_agent.clone());
        }
        if event.source_context.is_none() {
            event.source_context = stacktrace::parse(event.stack_trace.as_deref());
        }
    }
}

/// Orchestrates capture: normalize -> enrich -> gate -> deliver -> queue.
pub struct Hub {
    config: Config,
    scope: RwLock<Scope>,
    transport: Arc<dyn Transport>,
    beacon: Option<Arc<dyn Transport>>,
    queue: OfflineQueue,
    enricher: Box<dyn Enricher>,
}

impl Hub {
    /// Create a hub over an already-validated configuration.
    ///
    /// The scope is seeded from the configured initial tags and user.
    pub fn new(
        config: Config,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn EventStorage>,
    ) -> Self {
        let mut scope = Scope::new();
        scope.set_tags(config.initial_tags());
        scope.set_user(config.initial_user());
        Self {
            config,
            scope: RwLock::new(scope),
            transport,
            beacon: None,
            queue: OfflineQueue::new(storage),
            enricher: Box::new(RuntimeEnricher::new()),
        }
    }

    /// Attach a fire-and-forget transport for teardown flushes.
    pub fn with_beacon(mut self, beacon: Arc<dyn Transport>) -> Self {
        self.beacon = Some(beacon);
        self
    }

    /// Replace the enrichment strategy.
    pub fn with_enricher(mut self, enricher: Box<dyn Enricher>) -> Self {
        self.enricher = enricher;
        self
    }

    /// The hub's configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The hub's offline queue.
    pub fn queue(&self) -> &OfflineQueue {
        &self.queue
    }

    // --- Capture operations ---

    /// Capture a canonical error at the given level.
    ///
    /// Resolves to the ingestion id, or `None` when the event was dropped,
    /// queued for retry, or a capture-path fault was swallowed.
    pub async fn capture_exception(&self, error: CanonicalError, level: Level) -> Option<String> {
        let message = error.message.clone();
        let result = self.capture_inner(&message, level, Some(error)).await;
        self.swallowed("capture_exception", result)
    }

    /// Capture a Rust error value at level `Error`.
    pub async fn capture_error(&self, err: &(dyn std::error::Error + '_)) -> Option<String> {
        self.capture_exception(CanonicalError::from_error(err), Level::Error)
            .await
    }

    /// Capture a bare message at the given level.
    pub async fn capture_message(&self, message: &str, level: Level) -> Option<String> {
        let result = self.capture_inner(message, level, None).await;
        self.swallowed("capture_message", result)
    }

    async fn capture_inner(
        &self,
        message: &str,
        level: Level,
        error: Option<CanonicalError>,
    ) -> SdkResult<Option<String>> {
        // Build + enrich + gate are synchronous; a panic anywhere in them
        // is a capture-path fault and must not escape into host code.
        let gated = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let mut event = self.build_event(message, level, error.as_ref());
            self.enricher.enrich(&mut event);
            self.apply_before_send(event)
        }))
        .map_err(|_| SdkError::Internal("capture pipeline panicked".into()))?;

        let Some(event) = gated else {
            self.config.debug_log("event dropped by before_send hook");
            return Ok(None);
        };

        let outcome = self.transport.send(&event).await;
        if outcome.success {
            return Ok(outcome.id);
        }

        self.config.debug_log(&format!(
            "delivery failed ({}), queueing event",
            outcome.error.as_deref().unwrap_or("unknown failure"),
        ));
        self.queue.enqueue(event);
        Ok(None)
    }

    // --- Scope mutations ---

    /// Replace the scope user. `None` clears it.
    pub fn set_user(&self, user: Option<User>) {
        self.write_scope().set_user(user);
    }

    /// Set a single scope tag.
    pub fn set_tag(&self, key: impl Into<String>, value: impl Into<String>) {
        self.write_scope().set_tag(key, value);
    }

    /// Merge a map of tags into the scope.
    pub fn set_tags(&self, tags: HashMap<String, String>) {
        self.write_scope().set_tags(tags);
    }

    /// Set a single extra value; `None` deletes the key.
    pub fn set_extra(&self, key: impl Into<String>, value: Option<Value>) {
        self.write_scope().set_extra(key, value);
    }

    /// Merge a map of extras, `None` values deleting their keys.
    pub fn set_extras(&self, extras: HashMap<String, Option<Value>>) {
        self.write_scope().set_extras(extras);
    }

    // --- Event assembly ---

    /// Assemble a canonical event from the configuration and the current
    /// scope. Pure construction: always succeeds, takes a scope snapshot,
    /// and stamps the timestamp exactly once.
    pub fn build_event(
        &self,
        message: &str,
        level: Level,
        error: Option<&CanonicalError>,
    ) -> ErrorEvent {
        let scope = self
            .scope
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();

        let tags = scope.tags().clone();
        let extras = scope.extras().clone();

        ErrorEvent {
            app_id: self.config.app_id(),
            commit_hash: self.config.commit_hash(),
            environment: self.config.environment(),
            level,
            message: message.to_string(),
            stack_trace: error.and_then(|e| e.stack.clone()),
            source_context: None,
            metadata: if extras.is_empty() { None } else { Some(extras) },
            tags: if tags.is_empty() { None } else { Some(tags) },
            user: scope.user().cloned(),
            user_agent: None,
            timestamp: ErrorEvent::now_timestamp(),
        }
    }

    /// Run the configured before-send hook over a built event.
    ///
    /// No hook passes the event through; a hook returning `None` drops it;
    /// a panicking hook is swallowed and the original event is used
    /// unmodified, because hook failure must never suppress an event.
    pub fn apply_before_send(&self, event: ErrorEvent) -> Option<ErrorEvent> {
        let Some(hook) = self.config.before_send() else {
            return Some(event);
        };
        let original = event.clone();
        match std::panic::catch_unwind(AssertUnwindSafe(|| hook(event))) {
            Ok(result) => result,
            Err(_) => {
                self.config
                    .debug_log("before_send hook panicked, sending original event");
                Some(original)
            }
        }
    }

    // --- Queue and teardown ---

    /// Drain the offline queue through the primary transport.
    pub async fn drain_queue(&self) -> usize {
        self.queue.drain(self.transport.as_ref()).await
    }

    /// Drain the queue, then wait (bounded) for in-flight sends.
    pub async fn flush(&self, timeout: Duration) {
        self.drain_queue().await;
        self.transport.flush(timeout).await;
    }

    /// Best-effort teardown flush through the beacon transport, when one is
    /// attached. Clears the queue without awaiting delivery confirmation.
    pub async fn teardown_flush(&self) {
        if let Some(beacon) = &self.beacon {
            self.queue.flush_all_best_effort(beacon.as_ref()).await;
        }
    }

    fn write_scope(&self) -> std::sync::RwLockWriteGuard<'_, Scope> {
        self.scope.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reduce an internal result to the optional id callers see, logging
    /// the failure through the debug channel. Applied uniformly at every
    /// public capture entry point.
    fn swallowed<T>(&self, context: &str, result: SdkResult<Option<T>>) -> Option<T> {
        match result {
            Ok(value) => value,
            Err(e) => {
                self.config.debug_log(&format!("{context} failed: {e}"));
                None
            }
        }
    }
}
