//! Token Provider Port
//!
//! The capability every data source implements: produce zero or more raw
//! token-like records, given whatever credentials it was configured with.

use async_trait::async_trait;

use crate::domain::token::RawToken;

/// A market data provider feeding the scan pipeline.
///
/// Implementations never let a transport failure escape a scan cycle: errors
/// degrade to an empty batch plus a log line. Missing credentials are a
/// graceful skip, not an error.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Stable provider name, used as the connection-status map key.
    fn name(&self) -> &'static str;

    /// Probe the provider endpoint, surfaced as a boolean.
    async fn test_connection(&self) -> bool;

    /// Fetch the provider's current batch of raw records.
    async fn fetch_raw(&self) -> Vec<RawToken>;
}
