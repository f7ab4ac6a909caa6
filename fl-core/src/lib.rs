//! Faultline Core - Foundation types, error handling, and diagnostics.
//!
//! This crate provides the shared foundation used by all other Faultline crates:
//! - Global error types covering all error categories
//! - Diagnostic logging setup with tracing
//! - Runtime/platform detection for event enrichment
//! - Common constants

pub mod constants;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-export commonly used items at the crate root
pub use error::{SdkError, SdkResult};
pub use logging::init_console_logging;
pub use runtime::Runtime;
