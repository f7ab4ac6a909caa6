//! Runtime detection and host environment utilities.
//!
//! Supplies the runtime-specific fields attached to events after they are
//! built: the user agent string describing the host process, and the
//! platform data directory used for durable queue storage.

use std::path::PathBuf;

use crate::constants;
use crate::error::{SdkError, SdkResult};

/// Detected operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    Windows,
    MacOs,
    Linux,
}

impl Runtime {
    /// Detect the current runtime at compile time.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Runtime::Windows
        } else if cfg!(target_os = "macos") {
            Runtime::MacOs
        } else {
            Runtime::Linux
        }
    }

    /// Get a human-readable runtime name.
    pub fn name(&self) -> &'static str {
        match self {
            Runtime::Windows => "Windows",
            Runtime::MacOs => "macOS",
            Runtime::Linux => "Linux",
        }
    }

    /// Get the platform-specific SDK data directory.
    ///
    /// - Windows: `%APPDATA%/faultline`
    /// - macOS: `~/Library/Application Support/faultline`
    /// - Linux: `~/.local/share/faultline`
    pub fn data_dir() -> SdkResult<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| SdkError::Config("could not determine data directory".into()))?;
        Ok(base.join(constants::SDK_NAME))
    }

    /// Get the system hostname.
    pub fn hostname() -> String {
        hostname::get()
            .ok()
            .and_then(|h| h.into_string().ok())
            .unwrap_or_else(|| "unknown-host".to_string())
    }
}

impl std::fmt::Display for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Build the user agent string reported on captured events.
///
/// Format: `faultline/<version> (<os>; <arch>; <hostname>)`.
pub fn user_agent() -> String {
    format!(
        "{}/{} ({}; {}; {})",
        constants::SDK_NAME,
        constants::SDK_VERSION,
        std::env::consts::OS,
        std::env::consts::ARCH,
        Runtime::hostname(),
    )
}
