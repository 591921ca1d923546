//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching config.toml
//! structure. Every section and field has a default, so an empty file is a
//! valid config; API keys come from the file or from environment variables.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::adapters::birdeye::BIRDEYE_BASE_URL;
use crate::adapters::dexscreener::DEXSCREENER_BASE_URL;
use crate::adapters::helius::HELIUS_BASE_URL;
use crate::scoring::{DEFAULT_MODEL, OPENAI_BASE_URL};

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scanner: ScannerSection,
    #[serde(default)]
    pub providers: ProvidersSection,
    #[serde(default)]
    pub scoring: ScoringSection,
    #[serde(default)]
    pub paper: PaperSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Scanner configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ScannerSection {
    /// Minimum liquidity in USD for a token to pass the filter
    #[serde(default = "default_min_liquidity")]
    pub min_liquidity: f64,
    /// Minimum 24h-volume / market-cap ratio
    #[serde(default = "default_volume_mcap_ratio")]
    pub volume_mcap_ratio: f64,
    /// Scan cycle interval in milliseconds
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,
    /// Retries after the first failed attempt, per call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Response cache TTL in milliseconds
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
}

/// Provider endpoints and credentials
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersSection {
    #[serde(default = "default_dexscreener_url")]
    pub dexscreener_url: String,
    #[serde(default = "default_birdeye_url")]
    pub birdeye_url: String,
    /// Birdeye API key (or BIRDEYE_API_KEY env var)
    #[serde(default)]
    pub birdeye_api_key: Option<String>,
    #[serde(default = "default_helius_url")]
    pub helius_url: String,
    /// Helius API key (or HELIUS_API_KEY env var)
    #[serde(default)]
    pub helius_api_key: Option<String>,
}

/// LLM scoring configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSection {
    #[serde(default = "default_openai_url")]
    pub openai_url: String,
    /// OpenAI API key (or OPENAI_API_KEY env var); scoring is skipped without one
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
}

/// Paper trading configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct PaperSection {
    #[serde(default = "default_paper_enabled")]
    pub enabled: bool,
    #[serde(default = "default_starting_balance")]
    pub starting_balance_usd: f64,
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_min_liquidity() -> f64 {
    50_000.0
}

fn default_volume_mcap_ratio() -> f64 {
    0.5
}

fn default_check_interval_ms() -> u64 {
    5_000
}

fn default_max_retries() -> u32 {
    2
}

fn default_cache_ttl_ms() -> u64 {
    60_000
}

fn default_dexscreener_url() -> String {
    DEXSCREENER_BASE_URL.to_string()
}

fn default_birdeye_url() -> String {
    BIRDEYE_BASE_URL.to_string()
}

fn default_helius_url() -> String {
    HELIUS_BASE_URL.to_string()
}

fn default_openai_url() -> String {
    OPENAI_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_paper_enabled() -> bool {
    true
}

fn default_starting_balance() -> f64 {
    1_000.0
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ScannerSection {
    fn default() -> Self {
        Self {
            min_liquidity: default_min_liquidity(),
            volume_mcap_ratio: default_volume_mcap_ratio(),
            check_interval_ms: default_check_interval_ms(),
            max_retries: default_max_retries(),
            cache_ttl_ms: default_cache_ttl_ms(),
        }
    }
}

impl Default for ProvidersSection {
    fn default() -> Self {
        Self {
            dexscreener_url: default_dexscreener_url(),
            birdeye_url: default_birdeye_url(),
            birdeye_api_key: None,
            helius_url: default_helius_url(),
            helius_api_key: None,
        }
    }
}

impl Default for ScoringSection {
    fn default() -> Self {
        Self {
            openai_url: default_openai_url(),
            openai_api_key: None,
            model: default_model(),
        }
    }
}

impl Default for PaperSection {
    fn default() -> Self {
        Self {
            enabled: default_paper_enabled(),
            starting_balance_usd: default_starting_balance(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Load configuration from a TOML file. A missing file is an error; use
/// [`Config::default`] when no file is expected.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scanner.min_liquidity < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "min_liquidity must be >= 0, got {}",
                self.scanner.min_liquidity
            )));
        }

        if self.scanner.volume_mcap_ratio < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "volume_mcap_ratio must be >= 0, got {}",
                self.scanner.volume_mcap_ratio
            )));
        }

        if self.scanner.check_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "check_interval_ms must be > 0".to_string(),
            ));
        }

        if self.providers.dexscreener_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "dexscreener_url cannot be empty".to_string(),
            ));
        }

        if self.providers.birdeye_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "birdeye_url cannot be empty".to_string(),
            ));
        }

        if self.providers.helius_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "helius_url cannot be empty".to_string(),
            ));
        }

        if self.scoring.openai_url.is_empty() {
            return Err(ConfigError::ValidationError(
                "openai_url cannot be empty".to_string(),
            ));
        }

        if self.paper.starting_balance_usd <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "starting_balance_usd must be > 0, got {}",
                self.paper.starting_balance_usd
            )));
        }

        Ok(())
    }
}

impl ProvidersSection {
    /// Birdeye key from config, falling back to BIRDEYE_API_KEY
    pub fn get_birdeye_api_key(&self) -> Option<String> {
        key_or_env(&self.birdeye_api_key, "BIRDEYE_API_KEY")
    }

    /// Helius key from config, falling back to HELIUS_API_KEY
    pub fn get_helius_api_key(&self) -> Option<String> {
        key_or_env(&self.helius_api_key, "HELIUS_API_KEY")
    }
}

impl ScoringSection {
    /// OpenAI key from config, falling back to OPENAI_API_KEY
    pub fn get_openai_api_key(&self) -> Option<String> {
        key_or_env(&self.openai_api_key, "OPENAI_API_KEY")
    }
}

fn key_or_env(configured: &Option<String>, var: &str) -> Option<String> {
    if let Some(key) = configured {
        if !key.is_empty() {
            return Some(key.clone());
        }
    }
    std::env::var(var).ok().filter(|key| !key.is_empty())
}
