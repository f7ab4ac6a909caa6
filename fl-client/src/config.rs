//! SDK configuration.
//!
//! Holds the validated option set the hub consumes. Required identity
//! fields (dsn, app id, commit hash, environment) are validated eagerly;
//! a bad value fails construction before any client exists. Optional
//! values can be merged/updated afterwards, which re-runs validation.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use fl_core::constants;
use fl_core::error::{SdkError, SdkResult};
use fl_models::{Environment, ErrorEvent, User};

/// Per-event transform/filter hook. Returning `None` drops the event.
pub type BeforeSend = Arc<dyn Fn(ErrorEvent) -> Option<ErrorEvent> + Send + Sync>;

/// Caller-supplied option set, merged over defaults.
#[derive(Clone)]
pub struct Options {
    /// Base URL of the ingestion service. Required; trailing slash stripped.
    pub dsn: String,
    /// Application identifier attached to every event. Required.
    pub app_id: String,
    /// Commit hash of the running build. Required.
    pub commit_hash: String,
    /// Deployment environment name. Must parse as one of the three
    /// recognized values.
    pub environment: String,
    /// Optional API key, sent as an auth header when present.
    pub api_key: Option<String>,
    /// Whether to install global hook integrations at init.
    pub auto_capture: bool,
    /// Whether SDK diagnostics are written to the tracing channel.
    pub debug: bool,
    /// Per-request transport timeout in milliseconds.
    pub timeout_ms: u64,
    /// Initial tags, seeded into the scope at construction.
    pub tags: HashMap<String, String>,
    /// Initial user, seeded into the scope at construction.
    pub user: Option<User>,
    /// Per-event transform/filter hook.
    pub before_send: Option<BeforeSend>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            dsn: String::new(),
            app_id: String::new(),
            commit_hash: String::new(),
            environment: "Development".to_string(),
            api_key: None,
            auto_capture: true,
            debug: false,
            timeout_ms: constants::DEFAULT_TIMEOUT_MS,
            tags: HashMap::new(),
            user: None,
            before_send: None,
        }
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("dsn", &self.dsn)
            .field("app_id", &self.app_id)
            .field("commit_hash", &self.commit_hash)
            .field("environment", &self.environment)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("auto_capture", &self.auto_capture)
            .field("debug", &self.debug)
            .field("timeout_ms", &self.timeout_ms)
            .field("tags", &self.tags)
            .field("user", &self.user)
            .field("before_send", &self.before_send.as_ref().map(|_| "<hook>"))
            .finish()
    }
}

struct Inner {
    options: Options,
    environment: Environment,
}

/// Validated configuration holder.
pub struct Config {
    inner: RwLock<Inner>,
}

impl Config {
    /// Validate and store the given options. Fails fast when any required
    /// field is missing or the environment is not recognized.
    pub fn new(options: Options) -> SdkResult<Self> {
        let mut options = options;
        let environment = validate(&mut options)?;
        Ok(Self {
            inner: RwLock::new(Inner {
                options,
                environment,
            }),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ingestion base URL, trailing slash already stripped.
    pub fn dsn(&self) -> String {
        self.read().options.dsn.clone()
    }

    /// Application identifier.
    pub fn app_id(&self) -> String {
        self.read().options.app_id.clone()
    }

    /// Commit hash of the running build.
    pub fn commit_hash(&self) -> String {
        self.read().options.commit_hash.clone()
    }

    /// Parsed deployment environment.
    pub fn environment(&self) -> Environment {
        self.read().environment
    }

    /// Optional API key.
    pub fn api_key(&self) -> Option<String> {
        self.read().options.api_key.clone()
    }

    /// Whether global hook integrations are installed at init.
    pub fn auto_capture(&self) -> bool {
        self.read().options.auto_capture
    }

    /// Whether SDK diagnostics are enabled.
    pub fn debug(&self) -> bool {
        self.read().options.debug
    }

    /// Per-request transport timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.read().options.timeout_ms)
    }

    /// Current before-send hook, if configured.
    pub fn before_send(&self) -> Option<BeforeSend> {
        self.read().options.before_send.clone()
    }

    /// Tags the scope is seeded with at construction.
    pub fn initial_tags(&self) -> HashMap<String, String> {
        self.read().options.tags.clone()
    }

    /// User the scope is seeded with at construction.
    pub fn initial_user(&self) -> Option<User> {
        self.read().options.user.clone()
    }

    /// Snapshot of the full option set.
    pub fn options(&self) -> Options {
        self.read().options.clone()
    }

    /// Merge updated values over the current options and re-validate.
    ///
    /// The closure receives a copy of the current options and overwrites
    /// whichever fields it wants changed (runtime reconfiguration, e.g.
    /// swapping `before_send`). When re-validation fails the update is
    /// discarded and the previous options stay in effect.
    pub fn update<F: FnOnce(&mut Options)>(&self, apply: F) -> SdkResult<()> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.options.clone();
        apply(&mut next);
        let environment = validate(&mut next)?;
        guard.options = next;
        guard.environment = environment;
        Ok(())
    }

    /// Write a diagnostic line, but only when debug is enabled.
    ///
    /// Must never panic or affect control flow; callers use it from paths
    /// where every fault is swallowed.
    pub fn debug_log(&self, message: &str) {
        if self.debug() {
            debug!(target: "faultline", "{message}");
        }
    }
}

/// Check required fields and parse the environment. Normalizes the dsn
/// (trimmed, trailing slash stripped) in place.
fn validate(options: &mut Options) -> SdkResult<Environment> {
    let dsn = options.dsn.trim();
    if dsn.is_empty() {
        return Err(SdkError::MissingConfig("dsn".into()));
    }
    if options.app_id.trim().is_empty() {
        return Err(SdkError::MissingConfig("appId".into()));
    }
    if options.commit_hash.trim().is_empty() {
        return Err(SdkError::MissingConfig("commitHash".into()));
    }
    let environment = options.environment.parse::<Environment>()?;
    options.dsn = dsn.trim_end_matches('/').to_string();
    Ok(environment)
}
