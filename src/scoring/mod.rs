//! LLM Token Scoring
//!
//! Optional scoring layer over an OpenAI-compatible chat endpoint. Scoring is
//! strictly best-effort: with no key configured every record keeps its default
//! score, and a failed or unparseable completion scores zero rather than
//! failing the scan cycle.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapters::fetch::{FetchClient, FetchError, RequestOptions};
use crate::domain::token::TokenRecord;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

const SCORE_MAX_TOKENS: u32 = 10;
const SCORE_TEMPERATURE: f64 = 0.1;
const ANALYSIS_MAX_TOKENS: u32 = 500;
const ANALYSIS_TEMPERATURE: f64 = 0.3;

/// Scoring calls retry once and never cache: a completion is not a
/// cacheable document.
const SCORE_MAX_RETRIES: u32 = 1;

/// Chat completion request body.
#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// Best-effort LLM scorer for scan results.
pub struct TokenScorer {
    api_key: Option<String>,
    model: String,
    base_url: String,
    fetch: Arc<FetchClient>,
}

impl TokenScorer {
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        fetch: Arc<FetchClient>,
    ) -> Self {
        Self {
            api_key,
            model: model.into(),
            base_url: base_url.into(),
            fetch,
        }
    }

    /// Whether scoring will do anything at all this run.
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(
        &self,
        key: &str,
        prompt: String,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, FetchError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
            max_tokens,
            temperature,
        };
        let body = serde_json::to_value(&request).map_err(|e| FetchError::UpstreamError {
            provider: "openai".to_string(),
            message: format!("failed to encode request: {e}"),
        })?;
        let url = format!("{}/chat/completions", self.base_url);
        let options = RequestOptions::post_json(body)
            .with_header("Authorization", &format!("Bearer {key}"));

        let value = self
            .fetch
            .fetch_json(&url, &options, SCORE_MAX_RETRIES, Duration::ZERO)
            .await?;

        let response: ChatResponse =
            serde_json::from_value(value).map_err(|e| FetchError::UpstreamError {
                provider: "openai".to_string(),
                message: format!("malformed completion: {e}"),
            })?;
        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| FetchError::UpstreamError {
                provider: "openai".to_string(),
                message: "completion had no choices".to_string(),
            })
    }

    /// Score one record on a 0-100 pump-potential scale.
    ///
    /// Returns `None` when no key is configured (caller keeps the default
    /// score) and `Some(0)` when the call or parse fails.
    pub async fn score(&self, record: &TokenRecord) -> Option<u8> {
        let key = self.api_key.as_deref()?;
        let prompt = format!(
            "Analyze this cryptocurrency token for pump potential on a scale of 1-100. \
             Token: {} ({}), Price: ${}, 24h Change: {}%, Volume: ${}, Liquidity: ${}, \
             Market Cap: ${}. Respond with only a number 1-100.",
            record.symbol,
            record.name,
            record.price,
            record.price_change_24h,
            record.volume_24h,
            record.liquidity,
            record.market_cap,
        );

        match self
            .complete(key, prompt, SCORE_MAX_TOKENS, SCORE_TEMPERATURE)
            .await
        {
            Ok(content) => Some(parse_score(&content)),
            Err(e) => {
                warn!(symbol = %record.symbol, error = %e, "scoring failed");
                Some(0)
            }
        }
    }

    /// Free-text deep analysis of a single token, used by the analyze command.
    pub async fn analyze(&self, record: &TokenRecord) -> Result<String, FetchError> {
        let key = self.api_key.as_deref().ok_or_else(|| FetchError::UpstreamError {
            provider: "openai".to_string(),
            message: "no API key configured".to_string(),
        })?;
        let prompt = format!(
            "Provide a detailed analysis of this cryptocurrency token. \
             Token: {} ({}), Address: {}, Price: ${}, 24h Change: {}%, Volume: ${}, \
             Liquidity: ${}, Market Cap: ${}. Cover momentum, liquidity health and risk.",
            record.symbol,
            record.name,
            record.address,
            record.price,
            record.price_change_24h,
            record.volume_24h,
            record.liquidity,
            record.market_cap,
        );
        self.complete(key, prompt, ANALYSIS_MAX_TOKENS, ANALYSIS_TEMPERATURE)
            .await
    }

    /// Score every record in place, sequentially. No-op without a key.
    pub async fn score_all(&self, records: &mut [TokenRecord]) {
        if !self.is_available() {
            debug!("scoring skipped, no API key configured");
            return;
        }
        for record in records.iter_mut() {
            if let Some(score) = self.score(record).await {
                record.score = score;
            }
        }
    }
}

/// Parse a completion into a clamped 0-100 score. Anything unparseable is 0.
fn parse_score(content: &str) -> u8 {
    content
        .trim()
        .parse::<i64>()
        .map(|n| n.clamp(0, 100) as u8)
        .unwrap_or(0)
}
