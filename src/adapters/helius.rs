//! Helius Adapter
//!
//! Solana JSON-RPC source. Unlike the REST providers the credential rides in
//! the URL query string, and an error can arrive as a well-formed 200 response
//! carrying an `error` payload.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::token::{Provider, RawToken};
use crate::ports::provider::TokenProvider;

use super::fetch::{FetchClient, RequestOptions};

pub const HELIUS_BASE_URL: &str = "https://mainnet.helius-rpc.com";

/// SPL token program, the account filter for the owner scan.
const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Reference wallet whose SPL holdings seed the chain-side token sample.
const SCAN_OWNER: &str = "vines1vzrYbzLMRdu58ou5XTby4qAqVRLmqo36NKPTg";

/// Helius JSON-RPC provider.
pub struct HeliusProvider {
    base_url: String,
    api_key: Option<String>,
    fetch: Arc<FetchClient>,
    max_retries: u32,
    cache_ttl: Duration,
}

impl HeliusProvider {
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

    fn rpc_url(&self, key: &str) -> String {
        format!("{}/?api-key={key}", self.base_url)
    }

    fn rpc_body(method: &str, params: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        })
    }
}

#[async_trait]
impl TokenProvider for HeliusProvider {
    fn name(&self) -> &'static str {
        Provider::Helius.name()
    }

    async fn test_connection(&self) -> bool {
        let Some(key) = self.api_key.as_deref() else {
            return false;
        };
        let options = RequestOptions::post_json(Self::rpc_body("getHealth", json!([])));
        self.fetch.probe(&self.rpc_url(key), &options).await
    }

    async fn fetch_raw(&self) -> Vec<RawToken> {
        let Some(key) = self.api_key.as_deref() else {
            debug!("helius skipped, no API key configured");
            return Vec::new();
        };

        let body = Self::rpc_body(
            "getTokenAccountsByOwner",
            json!([
                SCAN_OWNER,
                {"programId": TOKEN_PROGRAM_ID},
                {"encoding": "jsonParsed"},
            ]),
        );
        let value = match self
            .fetch
            .fetch_json(
                &self.rpc_url(key),
                &RequestOptions::post_json(body),
                self.max_retries,
                self.cache_ttl,
            )
            .await
        {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "helius scan failed");
                return Vec::new();
            }
        };

        if let Some(error) = value.get("error") {
            warn!(%error, "helius RPC error payload");
            return Vec::new();
        }

        value
            .pointer("/result/value")
            .and_then(|accounts| accounts.as_array())
            .map(|accounts| {
                accounts
                    .iter()
                    .filter_map(|account| {
                        let info = account.pointer("/account/data/parsed/info")?;
                        let mint = info.get("mint")?.as_str()?;
                        let balance = info
                            .pointer("/tokenAmount/uiAmount")
                            .and_then(Value::as_f64)
                            .unwrap_or(0.0);
                        Some(RawToken::new(
                            Provider::Helius,
                            json!({"address": mint, "balance": balance}),
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
