//! Canonical Token Records
//!
//! The `TokenRecord` is the unit that flows through the scan pipeline.
//! Providers return loosely-shaped JSON (`RawToken`) which the normalization
//! layer coerces into this canonical form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data provider identity, used to pick the normalization rules for a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// DexScreener trending pairs (unauthenticated)
    DexScreener,
    /// Birdeye token list sorted by 24h volume (API key required)
    Birdeye,
    /// Helius JSON-RPC token accounts (API key required)
    Helius,
}

impl Provider {
    /// Stable lowercase name, used as the key in the connection-status map.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::DexScreener => "dexscreener",
            Provider::Birdeye => "birdeye",
            Provider::Helius => "helius",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A provider response item before normalization.
///
/// The payload keeps the provider's own field names; the provider tag decides
/// which fallback lists apply when converting to a [`TokenRecord`].
#[derive(Debug, Clone)]
pub struct RawToken {
    pub provider: Provider,
    pub value: Value,
}

impl RawToken {
    pub fn new(provider: Provider, value: Value) -> Self {
        Self { provider, value }
    }
}

/// Canonical token record produced by one scan cycle.
///
/// All monetary fields are USD. Numeric fields default to 0.0 when the source
/// omits them or returns a non-numeric value; only `price_change_24h` may be
/// negative. `address` uniquely identifies a record within one scan cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub symbol: String,
    pub name: String,
    /// Chain-specific token identifier; dedup/join key across providers.
    pub address: String,
    pub price: f64,
    pub price_change_24h: f64,
    pub volume_24h: f64,
    pub liquidity: f64,
    pub market_cap: f64,
    /// LLM pump-potential score in 0..=100; 0 means unscored.
    #[serde(default)]
    pub score: u8,
}

impl TokenRecord {
    /// Volume to market-cap ratio, the momentum/anomaly signal used by the
    /// filter stage. Zero market cap yields 0.0 (and fails the ratio filter).
    pub fn volume_mcap_ratio(&self) -> f64 {
        if self.market_cap > 0.0 {
            self.volume_24h / self.market_cap
        } else {
            0.0
        }
    }
}

/// Ordered result of one scan cycle. Transient: each cycle replaces the
/// previous result wholesale.
pub type ScanResult = Vec<TokenRecord>;
