//! Faultline Models - Event wire format, error normalization, stack parsing.
//!
//! This crate defines the canonical event representation shipped to the
//! ingestion endpoint and the two enrichment primitives that feed it:
//! the normalizer that turns arbitrary captured values into a canonical
//! error, and the stack parser that extracts a best-effort source location
//! from raw stack trace text.

pub mod event;
pub mod normalize;
pub mod stacktrace;

// Re-export key types
pub use event::{Environment, ErrorEvent, Level, SourceContext, User};
pub use normalize::CanonicalError;
