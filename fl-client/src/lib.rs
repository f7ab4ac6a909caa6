//! Faultline Client - capture orchestration and process-wide lifecycle.
//!
//! This crate ties the pipeline together: the validated configuration,
//! the mutable scope, the event hub that builds and gates events, the
//! offline queue that tolerates delivery failure, and the global registry
//! with its hook integrations.
//!
//! # Quickstart
//!
//! ```no_run
//! use fl_client::{Options, Level};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! fl_client::init(Options {
//!     dsn: "https://errors.example.com".into(),
//!     app_id: "checkout".into(),
//!     commit_hash: "abc123".into(),
//!     environment: "Production".into(),
//!     ..Options::default()
//! })?;
//!
//! fl_client::capture_message("payment provider degraded", Level::Warning).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod hub;
pub mod integrations;
pub mod queue;
pub mod registry;
pub mod scope;
pub mod storage;

// Re-export key types
pub use config::{BeforeSend, Config, Options};
pub use hub::{Enricher, Hub, RuntimeEnricher};
pub use integrations::{PanicGuard, PanicIntegration};
pub use queue::{OfflineQueue, QueueStats, QueuedEvent};
pub use registry::{close, flush, init, try_global};
pub use scope::Scope;
pub use storage::{EventStorage, FileStorage, MemoryStorage};

// Model types hosts interact with directly
pub use fl_models::{CanonicalError, Environment, ErrorEvent, Level, SourceContext, User};

use std::collections::HashMap;

use serde_json::Value;

/// Capture a bare message through the global client.
///
/// Inert (resolves to `None`) when no client is active.
pub async fn capture_message(message: &str, level: Level) -> Option<String> {
    match try_global() {
        Some(hub) => hub.capture_message(message, level).await,
        None => None,
    }
}

/// Capture a canonical error through the global client.
pub async fn capture_exception(error: CanonicalError, level: Level) -> Option<String> {
    match try_global() {
        Some(hub) => hub.capture_exception(error, level).await,
        None => None,
    }
}

/// Capture a Rust error value through the global client at level `Error`.
pub async fn capture_error(err: &(dyn std::error::Error + '_)) -> Option<String> {
    match try_global() {
        Some(hub) => hub.capture_error(err).await,
        None => None,
    }
}

/// Replace the global scope user. `None` clears it.
pub fn set_user(user: Option<User>) {
    if let Some(hub) = try_global() {
        hub.set_user(user);
    }
}

/// Set a single tag on the global scope.
pub fn set_tag(key: impl Into<String>, value: impl Into<String>) {
    if let Some(hub) = try_global() {
        hub.set_tag(key, value);
    }
}

/// Merge a map of tags into the global scope.
pub fn set_tags(tags: HashMap<String, String>) {
    if let Some(hub) = try_global() {
        hub.set_tags(tags);
    }
}

/// Set a single extra on the global scope; `None` deletes the key.
pub fn set_extra(key: impl Into<String>, value: Option<Value>) {
    if let Some(hub) = try_global() {
        hub.set_extra(key, value);
    }
}

/// Merge a map of extras into the global scope.
pub fn set_extras(extras: HashMap<String, Option<Value>>) {
    if let Some(hub) = try_global() {
        hub.set_extras(extras);
    }
}
