//! Global hook integrations.
//!
//! Installs the process-wide panic hook that feeds captures into the hub.
//! Installation wraps whatever hook was already present and chains to it,
//! and returns a disposal handle that restores the previous hook. Handles
//! compose: each disposal undoes only its own layer (LIFO teardown).

use std::backtrace::Backtrace;
use std::panic::PanicHookInfo;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::debug;

use fl_models::{CanonicalError, Level};

use crate::hub::Hub;

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

/// Panic hook integration: one captured event per observed panic.
pub struct PanicIntegration;

impl PanicIntegration {
    /// Install the capture hook, chaining to the previously installed one.
    ///
    /// Captures are dispatched onto the tokio runtime that is current at
    /// install time; without one, panics are chained through but not
    /// captured.
    pub fn install(hub: Arc<Hub>) -> PanicGuard {
        let prev: Arc<PanicHook> = Arc::new(std::panic::take_hook());
        let armed = Arc::new(AtomicBool::new(true));
        let runtime = Handle::try_current().ok();

        {
            let prev = prev.clone();
            let armed = armed.clone();
            std::panic::set_hook(Box::new(move |info| {
                if armed.load(Ordering::SeqCst) {
                    capture_panic(&hub, runtime.as_ref(), info);
                }
                prev(info);
            }));
        }

        PanicGuard {
            prev,
            armed,
            restored: false,
        }
    }
}

/// The hook itself must never panic, so everything here is best-effort.
fn capture_panic(hub: &Arc<Hub>, runtime: Option<&Handle>, info: &PanicHookInfo<'_>) {
    let Some(handle) = runtime else {
        debug!(target: "faultline", "panic observed but no runtime to capture on");
        return;
    };

    let message = panic_message(info);
    let stack = Backtrace::force_capture().to_string();
    let error = CanonicalError::new(message)
        .with_name("panic")
        .with_stack(stack);

    let hub = hub.clone();
    handle.spawn(async move {
        hub.capture_exception(error, Level::Critical).await;
    });
}

/// Extract the message from a panic payload.
fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Disposal handle for an installed panic hook layer.
///
/// Dropping it (or calling [`uninstall`]) disarms this layer's capture and
/// restores the hook that was installed before it.
///
/// [`uninstall`]: Self::uninstall
pub struct PanicGuard {
    prev: Arc<PanicHook>,
    armed: Arc<AtomicBool>,
    restored: bool,
}

impl PanicGuard {
    /// Explicitly restore the previous hook.
    pub fn uninstall(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        self.armed.store(false, Ordering::SeqCst);
        let prev = self.prev.clone();
        std::panic::set_hook(Box::new(move |info| prev(info)));
    }
}

impl Drop for PanicGuard {
    fn drop(&mut self) {
        self.restore();
    }
}
