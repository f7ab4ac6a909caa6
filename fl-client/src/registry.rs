//! Global client registry.
//!
//! At most one active client coordinates global hook installation per
//! process. The registry owns that instance with an explicit lifecycle:
//! `init` installs it (a second call is a warned no-op, the first instance
//! stays authoritative), `try_global` hands out a reference, `close`
//! detaches hooks and clears it. No other module holds ambient state.

use std::sync::{PoisonError, RwLock};
use std::sync::Arc;
use std::time::Duration;

use lazy_static::lazy_static;
use tracing::warn;

use fl_core::error::SdkResult;
use fl_transport::{BeaconTransport, HttpTransport};

use crate::config::{Config, Options};
use crate::hub::Hub;
use crate::integrations::{PanicGuard, PanicIntegration};
use crate::storage::{EventStorage, FileStorage, MemoryStorage};

lazy_static! {
    static ref GLOBAL: RwLock<Option<ActiveClient>> = RwLock::new(None);
}

/// The installed client plus the disposal handles it owns.
struct ActiveClient {
    hub: Arc<Hub>,
    panic_guard: Option<PanicGuard>,
}

/// Initialize the global client from the given options.
///
/// Fails only on configuration errors. When a client is already active
/// this is a no-op with a diagnostic warning. Installs the panic hook
/// integration when `auto_capture` is set, and spawns an initial queue
/// drain when called inside a tokio runtime.
pub fn init(options: Options) -> SdkResult<()> {
    let mut guard = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if guard.is_some() {
        warn!(target: "faultline", "already initialized, ignoring second init");
        return Ok(());
    }

    let config = Config::new(options)?;
    let dsn = config.dsn();
    let transport = HttpTransport::new(&dsn, config.api_key(), config.timeout())?;
    let beacon = BeaconTransport::new(&dsn)?;

    // A durable queue when the platform data dir is available, a
    // transient one otherwise.
    let storage: Arc<dyn EventStorage> = match FileStorage::default_path() {
        Ok(path) => Arc::new(FileStorage::new(path)),
        Err(_) => Arc::new(MemoryStorage::new()),
    };

    let hub = Arc::new(
        Hub::new(config, Arc::new(transport), storage).with_beacon(Arc::new(beacon)),
    );

    let panic_guard = if hub.config().auto_capture() {
        Some(PanicIntegration::install(hub.clone()))
    } else {
        None
    };

    if let Ok(handle) = tokio::runtime::Handle::try_current() {
        let drain_hub = hub.clone();
        handle.spawn(async move {
            drain_hub.drain_queue().await;
        });
    }

    *guard = Some(ActiveClient { hub, panic_guard });
    Ok(())
}

/// Get the active hub, if one is installed.
pub fn try_global() -> Option<Arc<Hub>> {
    let guard = GLOBAL.read().unwrap_or_else(PoisonError::into_inner);
    guard.as_ref().map(|client| client.hub.clone())
}

/// Tear down the global client.
///
/// Synchronously detaches installed hooks and clears the registry. Does
/// not wait for in-flight sends; callers wanting delivery guarantees call
/// [`flush`] first.
pub fn close() {
    let mut guard = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(client) = guard.take() {
        drop(client.panic_guard);
    }
}

/// Drain the queue and wait (bounded) for in-flight sends.
pub async fn flush(timeout: Duration) {
    if let Some(hub) = try_global() {
        hub.flush(timeout).await;
    }
}
