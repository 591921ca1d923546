//! Birdeye Adapter
//!
//! Keyed token-list feed, sorted by 24h volume server-side. Without an API
//! key the provider skips quietly instead of burning retries on 401s.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::token::{Provider, RawToken};
use crate::ports::provider::TokenProvider;

use super::fetch::{FetchClient, FetchError, RequestOptions};

pub const BIRDEYE_BASE_URL: &str = "https://public-api.birdeye.so";

/// Query suffix matching the upstream default view: top 50 by 24h USD volume.
const TOKENLIST_QUERY: &str = "sort_by=v24hUSD&sort_type=desc&offset=0&limit=50";

/// Birdeye token-list provider.
pub struct BirdeyeProvider {
    base_url: String,
    api_key: Option<String>,
    fetch: Arc<FetchClient>,
    max_retries: u32,
    cache_ttl: Duration,
}

impl BirdeyeProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        fetch: Arc<FetchClient>,
        max_retries: u32,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
            fetch,
            max_retries,
            cache_ttl,
        }
    }

    fn keyed_options(&self, key: &str) -> RequestOptions {
        RequestOptions::get().with_header("X-API-KEY", key)
    }

    /// Single-token detail lookup, used by the analyze command.
    pub async fn token_overview(&self, address: &str) -> Result<Value, FetchError> {
        let key = self.api_key.as_deref().ok_or_else(|| FetchError::UpstreamError {
            provider: Provider::Birdeye.name().to_string(),
            message: "no API key configured".to_string(),
        })?;
        let url = format!("{}/public/token_overview?address={address}", self.base_url);
        self.fetch
            .fetch_json(&url, &self.keyed_options(key), self.max_retries, self.cache_ttl)
            .await
    }
}

#[async_trait]
impl TokenProvider for BirdeyeProvider {
    fn name(&self) -> &'static str {
        Provider::Birdeye.name()
    }

    async fn test_connection(&self) -> bool {
        let Some(key) = self.api_key.as_deref() else {
            return false;
        };
        let url = format!("{}/public/tokenlist?{TOKENLIST_QUERY}", self.base_url);
        self.fetch.probe(&url, &self.keyed_options(key)).await
    }

    async fn fetch_raw(&self) -> Vec<RawToken> {
        let Some(key) = self.api_key.as_deref() else {
            debug!("birdeye skipped, no API key configured");
            return Vec::new();
        };

        let url = format!("{}/public/tokenlist?{TOKENLIST_QUERY}", self.base_url);
        let value = match self
            .fetch
            .fetch_json(&url, &self.keyed_options(key), self.max_retries, self.cache_ttl)
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "birdeye scan failed");
                return Vec::new();
            }
        };

        value
            .pointer("/data/tokens")
            .and_then(|tokens| tokens.as_array())
            .map(|tokens| {
                tokens
                    .iter()
                    .map(|token| RawToken::new(Provider::Birdeye, token.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fetch::{HttpTransport, TransportResponse};
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the last request so header and URL shape can be asserted.
    struct CapturingTransport {
        body: Value,
        seen: Mutex<Vec<(String, RequestOptions)>>,
    }

    impl CapturingTransport {
        fn new(body: Value) -> Arc<Self> {
            Arc::new(Self {
                body,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpTransport for CapturingTransport {
        async fn send(
            &self,
            url: &str,
            options: &RequestOptions,
        ) -> Result<TransportResponse, String> {
            self.seen
                .lock()
                .unwrap()
                .push((url.to_string(), options.clone()));
            Ok(TransportResponse {
                status: 200,
                body: self.body.clone(),
            })
        }
    }

    fn provider(api_key: Option<&str>, transport: Arc<CapturingTransport>) -> BirdeyeProvider {
        BirdeyeProvider::new(
            BIRDEYE_BASE_URL,
            api_key.map(String::from),
            Arc::new(FetchClient::with_transport(transport)),
            2,
            Duration::ZERO,
        )
    }

    #[tokio::test]
    async fn test_fetch_raw_unwraps_data_tokens() {
        let transport = CapturingTransport::new(json!({
            "data": {"tokens": [{"address": "A", "v24hUSD": 100.0}]}
        }));
        let batch = provider(Some("key"), Arc::clone(&transport)).fetch_raw().await;

        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].provider, Provider::Birdeye);

        let seen = transport.seen.lock().unwrap();
        let (url, options) = &seen[0];
        assert!(url.contains("sort_by=v24hUSD"));
        assert!(url.contains("limit=50"));
        assert_eq!(
            options.headers,
            vec![("X-API-KEY".to_string(), "key".to_string())]
        );
    }

    #[tokio::test]
    async fn test_no_api_key_skips_without_network_call() {
        let transport = CapturingTransport::new(json!({"data": {"tokens": []}}));
        let batch = provider(None, Arc::clone(&transport)).fetch_raw().await;

        assert!(batch.is_empty());
        assert!(transport.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_api_key_fails_connection_probe() {
        let transport = CapturingTransport::new(json!({}));
        assert!(!provider(None, transport).test_connection().await);
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_empty() {
        let transport = CapturingTransport::new(json!({"data": {}}));
        assert!(provider(Some("key"), transport).fetch_raw().await.is_empty());
    }

    #[tokio::test]
    async fn test_token_overview_requires_key() {
        let transport = CapturingTransport::new(json!({"data": {"price": 1.0}}));
        let err = provider(None, Arc::clone(&transport))
            .token_overview("A")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::UpstreamError { .. }));

        let value = provider(Some("key"), transport)
            .token_overview("A")
            .await
            .unwrap();
        assert_eq!(value, json!({"data": {"price": 1.0}}));
    }
}
