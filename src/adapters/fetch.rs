//! HTTP Fetch Client
//!
//! Shared outbound HTTP layer for every provider adapter: per-attempt timeout,
//! bounded retries and a URL-keyed response cache with lazy TTL expiry.
//! The transport is a trait so retry and cache behavior are testable without
//! a network.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

/// Fixed per-attempt timeout. There is no cycle-level budget above this.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetch layer errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// All retry attempts exhausted for one call.
    #[error("request failed after {attempts} attempts: {url}: {last_error}")]
    RequestFailed {
        url: String,
        attempts: u32,
        last_error: String,
    },
    /// A well-formed response carrying a provider-level error payload.
    #[error("upstream error from {provider}: {message}")]
    UpstreamError { provider: String, message: String },
}

/// HTTP method for a fetch call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

/// Per-call request options. The URL alone is the cache key, so options that
/// change semantics (API keys, query parameters) must be part of the URL or
/// callers must accept shared cache entries.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post_json(body: Value) -> Self {
        Self {
            method: Method::Post,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Raw transport response: HTTP status plus the parsed JSON body (Null when
/// the body was not parsed, e.g. on a non-success status).
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One network attempt. Implementations apply [`REQUEST_TIMEOUT`] themselves.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<TransportResponse, String>;
}

/// Production transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, String> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<TransportResponse, String> {
        let mut request = match options.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
        };
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status().as_u16();

        if !(200..300).contains(&status) {
            return Ok(TransportResponse {
                status,
                body: Value::Null,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| format!("invalid JSON body: {e}"))?;
        Ok(TransportResponse { status, body })
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: Instant,
}

/// Retrying, caching JSON fetcher shared by all adapters.
///
/// The cache is an owned instance, not a global: whoever builds the scanner
/// owns the client and hands out clones of the `Arc`.
pub struct FetchClient {
    transport: Arc<dyn HttpTransport>,
    cache: Mutex<HashMap<String, CacheEntry>>,
}

impl FetchClient {
    /// Build a client over the production reqwest transport.
    pub fn new() -> Result<Self, String> {
        Ok(Self::with_transport(Arc::new(ReqwestTransport::new()?)))
    }

    /// Build a client over a custom transport (used by tests).
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a JSON document.
    ///
    /// Cache lookup first: a stored entry younger than `cache_ttl` is returned
    /// without touching the network. On a miss the request is attempted up to
    /// `max_retries + 1` times; a non-success status or transport failure is
    /// retried immediately, the first success is cached (superseding any prior
    /// entry for the URL) and returned. Exhausting every attempt yields
    /// [`FetchError::RequestFailed`]; there is no stale-cache fallback.
    pub async fn fetch_json(
        &self,
        url: &str,
        options: &RequestOptions,
        max_retries: u32,
        cache_ttl: Duration,
    ) -> Result<Value, FetchError> {
        {
            let cache = self.cache.lock().await;
            if let Some(entry) = cache.get(url) {
                if entry.stored_at.elapsed() < cache_ttl {
                    debug!(url, "cache hit");
                    return Ok(entry.value.clone());
                }
            }
        }

        let attempts = max_retries + 1;
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.transport.send(url, options).await {
                Ok(response) if response.is_success() => {
                    let mut cache = self.cache.lock().await;
                    cache.insert(
                        url.to_string(),
                        CacheEntry {
                            value: response.body.clone(),
                            stored_at: Instant::now(),
                        },
                    );
                    return Ok(response.body);
                }
                Ok(response) => {
                    last_error = format!("HTTP status {}", response.status);
                    warn!(url, attempt, attempts, status = response.status, "attempt failed");
                }
                Err(e) => {
                    last_error = e;
                    warn!(url, attempt, attempts, error = %last_error, "attempt failed");
                }
            }
        }

        error!(url, attempts, error = %last_error, "all attempts exhausted");
        Err(FetchError::RequestFailed {
            url: url.to_string(),
            attempts,
            last_error,
        })
    }

    /// Connection probe: one fetch with no retries and no caching, surfaced as
    /// a boolean.
    pub async fn probe(&self, url: &str, options: &RequestOptions) -> bool {
        self.fetch_json(url, options, 0, Duration::ZERO).await.is_ok()
    }
}
