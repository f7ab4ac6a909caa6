//! SDK-wide constants.

/// SDK name, reported in the user agent string.
pub const SDK_NAME: &str = "faultline";

/// SDK version.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ingestion endpoint path, appended to the configured DSN.
pub const INGEST_PATH: &str = "/api/ingest-error";

/// Header carrying the optional API key.
pub const API_KEY_HEADER: &str = "x-functions-key";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Maximum number of events held in the offline queue.
pub const MAX_QUEUE_SIZE: usize = 100;

/// File name for the durable offline queue.
pub const QUEUE_FILE_NAME: &str = "queue.json";
