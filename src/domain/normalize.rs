//! Raw Record Normalization
//!
//! One pure function per provider converts its JSON shape into the canonical
//! [`TokenRecord`]. Each field is resolved through an explicit, ordered list
//! of fallback paths so the precedence between alternative field names stays
//! auditable. Missing or non-numeric values coerce to 0.0.

use serde_json::Value;

use super::token::{Provider, RawToken, TokenRecord};

// DexScreener pair shape: nested `baseToken`, `liquidity.usd`, `volume.h24`.
const DEX_SYMBOL: &[&str] = &["symbol", "baseToken.symbol"];
const DEX_NAME: &[&str] = &["name", "baseToken.name"];
const DEX_ADDRESS: &[&str] = &["address", "baseToken.address"];
const DEX_PRICE: &[&str] = &["priceUsd", "price"];
const DEX_CHANGE: &[&str] = &["priceChange.h24", "price24hChange"];
const DEX_VOLUME: &[&str] = &["volume.h24", "v24hUSD"];
const DEX_LIQUIDITY: &[&str] = &["liquidity.usd", "liquidityUSD"];
const DEX_MCAP: &[&str] = &["marketCap", "mc"];

// Birdeye tokenlist shape: flat fields, `v24hUSD`, `mc`.
const BIRDEYE_SYMBOL: &[&str] = &["symbol"];
const BIRDEYE_NAME: &[&str] = &["name", "symbol"];
const BIRDEYE_ADDRESS: &[&str] = &["address"];
const BIRDEYE_PRICE: &[&str] = &["price", "priceUsd"];
const BIRDEYE_CHANGE: &[&str] = &["v24hChangePercent", "price24hChange"];
const BIRDEYE_VOLUME: &[&str] = &["v24hUSD", "volume.h24"];
const BIRDEYE_LIQUIDITY: &[&str] = &["liquidity", "liquidityUSD"];
const BIRDEYE_MCAP: &[&str] = &["mc", "marketCap"];

// Helius records are pre-shaped by the adapter: `{address, balance}`.
const HELIUS_ADDRESS: &[&str] = &["address"];

/// Normalize one raw provider record into the canonical shape.
pub fn normalize(raw: &RawToken) -> TokenRecord {
    match raw.provider {
        Provider::DexScreener => normalize_dexscreener(&raw.value),
        Provider::Birdeye => normalize_birdeye(&raw.value),
        Provider::Helius => normalize_helius(&raw.value),
    }
}

/// Normalize a DexScreener trending pair.
pub fn normalize_dexscreener(value: &Value) -> TokenRecord {
    TokenRecord {
        symbol: first_string(value, DEX_SYMBOL),
        name: first_string(value, DEX_NAME),
        address: first_string(value, DEX_ADDRESS),
        price: first_f64(value, DEX_PRICE),
        price_change_24h: first_f64(value, DEX_CHANGE),
        volume_24h: first_f64(value, DEX_VOLUME),
        liquidity: first_f64(value, DEX_LIQUIDITY),
        market_cap: first_f64(value, DEX_MCAP),
        score: 0,
    }
}

/// Normalize a Birdeye token-list entry.
pub fn normalize_birdeye(value: &Value) -> TokenRecord {
    TokenRecord {
        symbol: first_string(value, BIRDEYE_SYMBOL),
        name: first_string(value, BIRDEYE_NAME),
        address: first_string(value, BIRDEYE_ADDRESS),
        price: first_f64(value, BIRDEYE_PRICE),
        price_change_24h: first_f64(value, BIRDEYE_CHANGE),
        volume_24h: first_f64(value, BIRDEYE_VOLUME),
        liquidity: first_f64(value, BIRDEYE_LIQUIDITY),
        market_cap: first_f64(value, BIRDEYE_MCAP),
        score: 0,
    }
}

/// Normalize a Helius token-account record. Only the mint address and a wallet
/// balance are known; market fields stay at their 0 defaults and such records
/// only survive filtering when thresholds are relaxed.
pub fn normalize_helius(value: &Value) -> TokenRecord {
    TokenRecord {
        symbol: "UNKNOWN".to_string(),
        name: "Unknown".to_string(),
        address: first_string(value, HELIUS_ADDRESS),
        price: 0.0,
        price_change_24h: 0.0,
        volume_24h: 0.0,
        liquidity: 0.0,
        market_cap: 0.0,
        score: 0,
    }
}

/// Resolve a dot-separated path (`"liquidity.usd"`) inside a JSON object.
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// First numeric value found along the fallback paths; numeric strings count
/// (DexScreener serves `priceUsd` as a string). Defaults to 0.0.
fn first_f64(value: &Value, paths: &[&str]) -> f64 {
    for path in paths {
        match lookup(value, path) {
            Some(Value::Number(n)) => {
                if let Some(f) = n.as_f64() {
                    return f;
                }
            }
            Some(Value::String(s)) => {
                if let Ok(f) = s.trim().parse::<f64>() {
                    return f;
                }
            }
            _ => {}
        }
    }
    0.0
}

/// First non-empty string found along the fallback paths; defaults to "".
fn first_string(value: &Value, paths: &[&str]) -> String {
    for path in paths {
        if let Some(Value::String(s)) = lookup(value, path) {
            if !s.is_empty() {
                return s.clone();
            }
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dexscreener_nested_pair() {
        let pair = json!({
            "baseToken": {"symbol": "WIF", "name": "Dogwifhat", "address": "Mint111"},
            "priceUsd": "0.00042",
            "priceChange": {"h24": -7.5},
            "volume": {"h24": 40000.0},
            "liquidity": {"usd": 60000.0},
            "marketCap": 500000.0
        });

        let record = normalize_dexscreener(&pair);
        assert_eq!(record.symbol, "WIF");
        assert_eq!(record.name, "Dogwifhat");
        assert_eq!(record.address, "Mint111");
        assert_eq!(record.price, 0.00042);
        assert_eq!(record.price_change_24h, -7.5);
        assert_eq!(record.volume_24h, 40_000.0);
        assert_eq!(record.liquidity, 60_000.0);
        assert_eq!(record.market_cap, 500_000.0);
        assert_eq!(record.score, 0);
    }

    #[test]
    fn test_dexscreener_flat_fallbacks() {
        let token = json!({
            "symbol": "BONK",
            "address": "Mint222",
            "price": 0.001,
            "v24hUSD": 1000.0,
            "liquidityUSD": 75000.0,
            "mc": 900000.0
        });

        let record = normalize_dexscreener(&token);
        assert_eq!(record.symbol, "BONK");
        assert_eq!(record.price, 0.001);
        assert_eq!(record.volume_24h, 1_000.0);
        assert_eq!(record.liquidity, 75_000.0);
        assert_eq!(record.market_cap, 900_000.0);
    }

    #[test]
    fn test_missing_liquidity_defaults_to_zero() {
        let record = normalize_dexscreener(&json!({"address": "Mint333"}));
        assert_eq!(record.liquidity, 0.0);
        assert_eq!(record.volume_24h, 0.0);
        assert_eq!(record.market_cap, 0.0);
        assert_eq!(record.price, 0.0);
        assert_eq!(record.symbol, "");
    }

    #[test]
    fn test_non_numeric_values_coerce_to_zero() {
        let token = json!({
            "address": "Mint444",
            "liquidity": {"usd": "not a number"},
            "volume": {"h24": null},
            "marketCap": {"nested": true}
        });
        let record = normalize_dexscreener(&token);
        assert_eq!(record.liquidity, 0.0);
        assert_eq!(record.volume_24h, 0.0);
        assert_eq!(record.market_cap, 0.0);
    }

    #[test]
    fn test_birdeye_flat_shape() {
        let token = json!({
            "address": "Mint555",
            "symbol": "PEPE",
            "name": "Pepe",
            "price": 0.002,
            "v24hUSD": 600000.0,
            "v24hChangePercent": 42.0,
            "liquidity": 100000.0,
            "mc": 200000.0
        });

        let record = normalize_birdeye(&token);
        assert_eq!(record.symbol, "PEPE");
        assert_eq!(record.address, "Mint555");
        assert_eq!(record.volume_24h, 600_000.0);
        assert_eq!(record.price_change_24h, 42.0);
        assert_eq!(record.liquidity, 100_000.0);
        assert_eq!(record.market_cap, 200_000.0);
    }

    #[test]
    fn test_birdeye_name_falls_back_to_symbol() {
        let record = normalize_birdeye(&json!({"address": "Mint666", "symbol": "CAT"}));
        assert_eq!(record.name, "CAT");
    }

    #[test]
    fn test_helius_minimal_record() {
        let record = normalize_helius(&json!({"address": "Mint777", "balance": 1234.5}));
        assert_eq!(record.address, "Mint777");
        assert_eq!(record.symbol, "UNKNOWN");
        assert_eq!(record.liquidity, 0.0);
        assert_eq!(record.market_cap, 0.0);
    }

    #[test]
    fn test_normalize_dispatches_on_provider() {
        let raw = RawToken::new(
            Provider::Birdeye,
            json!({"address": "Mint888", "symbol": "DOG", "v24hUSD": 10.0}),
        );
        let record = normalize(&raw);
        assert_eq!(record.symbol, "DOG");
        assert_eq!(record.volume_24h, 10.0);
    }
}
