//! Persistence backends for the offline queue.
//!
//! The queue only needs a load-all / store-all / clear capability. The
//! memory backend is transient (lost on crash); the file backend survives
//! process restarts by keeping the queue as a JSON file under the platform
//! data directory.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use fl_core::constants;
use fl_core::error::{SdkError, SdkResult};
use fl_core::runtime::Runtime;

use crate::queue::QueuedEvent;

/// Key-value persistence capability backing the offline queue.
pub trait EventStorage: Send + Sync {
    /// Read all queued entries in insertion order.
    fn load(&self) -> SdkResult<Vec<QueuedEvent>>;

    /// Replace the queue contents.
    fn store(&self, entries: &[QueuedEvent]) -> SdkResult<()>;

    /// Remove all queued entries.
    fn clear(&self) -> SdkResult<()>;
}

/// Transient in-memory backend. Queue contents are lost on crash.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<Vec<QueuedEvent>>,
}

impl MemoryStorage {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStorage for MemoryStorage {
    fn load(&self) -> SdkResult<Vec<QueuedEvent>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.clone())
    }

    fn store(&self, entries: &[QueuedEvent]) -> SdkResult<()> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = entries.to_vec();
        Ok(())
    }

    fn clear(&self) -> SdkResult<()> {
        let mut guard = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clear();
        Ok(())
    }
}

/// Durable backend keeping the queue as a JSON file.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Create a file backend at the given path. The file and its parent
    /// directories are created lazily on the first store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default queue file location under the platform data directory.
    pub fn default_path() -> SdkResult<PathBuf> {
        Ok(Runtime::data_dir()?.join(constants::QUEUE_FILE_NAME))
    }

    /// The file this backend reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventStorage for FileStorage {
    fn load(&self) -> SdkResult<Vec<QueuedEvent>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // A corrupt queue file is abandoned rather than poisoning
                // every subsequent drain.
                warn!(target: "faultline", "discarding corrupt queue file: {e}");
                Ok(Vec::new())
            }
        }
    }

    fn store(&self, entries: &[QueuedEvent]) -> SdkResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string(entries)
            .map_err(|e| SdkError::Storage(format!("failed to serialize queue: {e}")))?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }

    fn clear(&self) -> SdkResult<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
