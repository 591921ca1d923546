//! DexScreener Adapter
//!
//! Unauthenticated trending-pairs feed. A response that lacks the
//! `schemaVersion` marker is treated as empty rather than as an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::token::{Provider, RawToken};
use crate::ports::provider::TokenProvider;

use super::fetch::{FetchClient, RequestOptions};

pub const DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com/latest";

/// DexScreener trending-tokens provider.
pub struct DexScreenerProvider {
    base_url: String,
    fetch: Arc<FetchClient>,
    max_retries: u32,
    cache_ttl: Duration,
}

impl DexScreenerProvider {
    pub fn new(
        base_url: impl Into<String>,
        fetch: Arc<FetchClient>,
        max_retries: u32,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            fetch,
            max_retries,
            cache_ttl,
        }
    }
}

#[async_trait]
impl TokenProvider for DexScreenerProvider {
    fn name(&self) -> &'static str {
        Provider::DexScreener.name()
    }

    async fn test_connection(&self) -> bool {
        let url = format!("{}/dex/search?q=SOL", self.base_url);
        self.fetch.probe(&url, &RequestOptions::get()).await
    }

    async fn fetch_raw(&self) -> Vec<RawToken> {
        let url = format!("{}/dex/tokens/trending", self.base_url);
        let value = match self
            .fetch
            .fetch_json(&url, &RequestOptions::get(), self.max_retries, self.cache_ttl)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "dexscreener scan failed");
                return Vec::new();
            }
        };

        if value.get("schemaVersion").is_none() {
            debug!("dexscreener response missing schemaVersion marker, treating as empty");
            return Vec::new();
        }

        value
            .get("pairs")
            .and_then(|pairs| pairs.as_array())
            .map(|pairs| {
                pairs
                    .iter()
                    .map(|pair| RawToken::new(Provider::DexScreener, pair.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}
