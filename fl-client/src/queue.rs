//! Offline queue for undelivered events.
//!
//! Bounded buffer over an injected persistence backend. Events land here
//! when delivery fails and are drained opportunistically: one at a time,
//! in insertion order, stopping at the first failure so a persistently
//! unreachable endpoint does not cycle through the whole backlog on every
//! retry.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use fl_core::constants;
use fl_models::ErrorEvent;
use fl_transport::Transport;

use crate::storage::EventStorage;

/// A persisted event awaiting delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedEvent {
    /// Local queue entry id.
    pub id: String,
    /// The event to deliver.
    pub event: ErrorEvent,
    /// Number of failed delivery attempts so far.
    #[serde(default)]
    pub attempts: u32,
}

impl QueuedEvent {
    /// Wrap an event as a fresh queue entry.
    pub fn new(event: ErrorEvent) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event,
            attempts: 0,
        }
    }
}

/// Bounded, drain-on-recovery buffer of undelivered events.
pub struct OfflineQueue {
    storage: Arc<dyn EventStorage>,
    capacity: usize,
    draining: AtomicBool,
}

impl OfflineQueue {
    /// Create a queue with the default capacity.
    pub fn new(storage: Arc<dyn EventStorage>) -> Self {
        Self::with_capacity(storage, constants::MAX_QUEUE_SIZE)
    }

    /// Create a queue with an explicit capacity.
    pub fn with_capacity(storage: Arc<dyn EventStorage>, capacity: usize) -> Self {
        Self {
            storage,
            capacity,
            draining: AtomicBool::new(false),
        }
    }

    /// Append an event, evicting the oldest entries first when at capacity.
    ///
    /// Never fails: persistence faults are swallowed, and in the worst case
    /// the event is simply not durably queued.
    pub fn enqueue(&self, event: ErrorEvent) {
        let mut entries = self.storage.load().unwrap_or_default();
        while !entries.is_empty() && entries.len() >= self.capacity {
            let dropped = entries.remove(0);
            debug!(target: "faultline", "queue full, evicting oldest entry {}", dropped.id);
        }
        entries.push(QueuedEvent::new(event));
        if let Err(e) = self.storage.store(&entries) {
            debug!(target: "faultline", "failed to persist queue: {e}");
        }
    }

    /// Deliver queued events one at a time, stopping at the first failure.
    ///
    /// The failed entry and every untried entry are written back as the new
    /// queue contents; a clean run writes back an empty queue. Reentrant
    /// calls while a drain is running are skipped, not queued. Returns the
    /// number of events delivered.
    pub async fn drain(&self, transport: &dyn Transport) -> usize {
        if self
            .draining
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!(target: "faultline", "drain already in progress, skipping");
            return 0;
        }

        let entries = self.storage.load().unwrap_or_default();
        let mut delivered = 0;
        let mut remainder: Vec<QueuedEvent> = Vec::new();
        let mut pending = entries.into_iter();

        while let Some(mut entry) = pending.next() {
            let outcome = transport.send(&entry.event).await;
            if outcome.success {
                delivered += 1;
                continue;
            }
            debug!(
                target: "faultline",
                "drain stopped at entry {} ({})",
                entry.id,
                outcome.error.as_deref().unwrap_or("unknown failure"),
            );
            entry.attempts += 1;
            remainder.push(entry);
            remainder.extend(pending);
            break;
        }

        let result = if remainder.is_empty() {
            self.storage.clear()
        } else {
            self.storage.store(&remainder)
        };
        if let Err(e) = result {
            debug!(target: "faultline", "failed to write back queue after drain: {e}");
        }

        self.draining.store(false, Ordering::SeqCst);
        delivered
    }

    /// Fire every queued event through a fire-and-forget transport without
    /// waiting for results, then clear the queue unconditionally. Teardown
    /// only; some sends may silently fail.
    pub async fn flush_all_best_effort(&self, transport: &dyn Transport) {
        let entries = self.storage.load().unwrap_or_default();
        for entry in &entries {
            let _ = transport.send(&entry.event).await;
        }
        if let Err(e) = self.storage.clear() {
            debug!(target: "faultline", "failed to clear queue at teardown: {e}");
        }
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.storage.load().map(|e| e.len()).unwrap_or(0)
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Queue statistics for diagnostics.
    pub fn stats(&self) -> QueueStats {
        let entries = self.storage.load().unwrap_or_default();
        let retried = entries.iter().filter(|e| e.attempts > 0).count();
        QueueStats {
            pending: entries.len(),
            retried,
            capacity: self.capacity,
        }
    }
}

/// Queue statistics for monitoring.
#[derive(Debug, Clone)]
pub struct QueueStats {
    /// Events waiting in the queue.
    pub pending: usize,
    /// Events that have already failed at least one delivery attempt.
    pub retried: usize,
    /// Maximum queue size.
    pub capacity: usize,
}

impl std::fmt::Display for QueueStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pending={}, retried={}, capacity={}",
            self.pending, self.retried, self.capacity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::storage::MemoryStorage;
    use crate::testutil::StubTransport;
    use fl_models::{Environment, Level};

    fn event(message: &str) -> ErrorEvent {
        ErrorEvent {
            app_id: "a".into(),
            commit_hash: "c".into(),
            environment: Environment::Development,
            level: Level::Error,
            message: message.into(),
            stack_trace: None,
            source_context: None,
            metadata: None,
            tags: None,
            user: None,
            user_agent: None,
            timestamp: ErrorEvent::now_timestamp(),
        }
    }

    fn memory_queue() -> OfflineQueue {
        OfflineQueue::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_enqueue_and_len() {
        let queue = memory_queue();
        assert!(queue.is_empty());
        queue.enqueue(event("one"));
        queue.enqueue(event("two"));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let storage = Arc::new(MemoryStorage::new());
        let queue = OfflineQueue::with_capacity(storage.clone(), 100);
        for i in 0..101 {
            queue.enqueue(event(&format!("evt-{i}")));
        }
        let entries = storage.load().unwrap();
        assert_eq!(entries.len(), 100);
        assert_eq!(entries[0].event.message, "evt-1");
        assert_eq!(entries[99].event.message, "evt-100");
    }

    #[tokio::test]
    async fn test_drain_delivers_in_order_and_clears() {
        let queue = memory_queue();
        queue.enqueue(event("one"));
        queue.enqueue(event("two"));

        let transport = StubTransport::succeeding("evt-1");
        let delivered = queue.drain(&transport).await;
        assert_eq!(delivered, 2);
        assert!(queue.is_empty());

        let sent = transport.sent();
        assert_eq!(sent[0]["message"], "one");
        assert_eq!(sent[1]["message"], "two");
    }

    #[tokio::test]
    async fn test_drain_stops_at_first_failure() {
        let storage = Arc::new(MemoryStorage::new());
        let queue = OfflineQueue::new(storage.clone());
        queue.enqueue(event("one"));
        queue.enqueue(event("two"));
        queue.enqueue(event("three"));

        // First send succeeds, second fails; the third is never tried.
        let transport = StubTransport::scripted(vec![
            fl_transport::SendOutcome::delivered(None, 200),
            fl_transport::SendOutcome::failed("connection refused"),
        ]);
        let delivered = queue.drain(&transport).await;
        assert_eq!(delivered, 1);
        assert_eq!(transport.sent().len(), 2);

        let entries = storage.load().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.message, "two");
        assert_eq!(entries[1].event.message, "three");
        assert_eq!(entries[0].attempts, 1);
        assert_eq!(entries[1].attempts, 0);
    }

    #[tokio::test]
    async fn test_drain_empty_queue_is_noop() {
        let queue = memory_queue();
        let transport = StubTransport::succeeding("evt-1");
        assert_eq!(queue.drain(&transport).await, 0);
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_flush_all_best_effort_clears_even_on_failure() {
        let queue = memory_queue();
        queue.enqueue(event("one"));
        queue.enqueue(event("two"));

        let transport = StubTransport::failing();
        queue.flush_all_best_effort(&transport).await;
        assert_eq!(transport.sent().len(), 2);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_stats_display() {
        let queue = memory_queue();
        queue.enqueue(event("one"));
        let stats = queue.stats();
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.capacity, 100);
        assert!(stats.to_string().contains("pending=1"));
    }
}
