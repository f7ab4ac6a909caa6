//! Faultline Transport - delivery of captured events to the ingestion endpoint.
//!
//! Defines the `Transport` strategy interface plus the two concrete
//! strategies: a standard request/response HTTP transport used for normal
//! outbound delivery, and a fire-and-forget beacon transport for teardown
//! paths where waiting for confirmation is impossible.

pub mod beacon;
pub mod http;
pub mod payload;
pub mod response;
pub mod transport;

// Re-export key types
pub use beacon::BeaconTransport;
pub use http::HttpTransport;
pub use response::IngestResponse;
pub use transport::{SendOutcome, Transport};
