//! Constants for the download module (timeouts).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default whole-request deadline (5 minutes for large books).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Maximum redirects followed for landing pages and assets.
pub const MAX_REDIRECTS: usize = 10;
