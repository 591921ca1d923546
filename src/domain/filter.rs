//! Aggregation & Filter Engine
//!
//! Merges raw records from all providers into one deduplicated, filtered
//! [`ScanResult`]. The filter targets low-cap tokens with abnormal volume
//! relative to size: a momentum heuristic, not a valuation model.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use super::normalize::normalize;
use super::token::{RawToken, ScanResult, TokenRecord};

/// Hard market-cap ceiling in USD. Anything above this is out of the
/// small/micro-cap universe the scanner targets.
pub const MAX_MARKET_CAP_USD: f64 = 1_000_000.0;

/// Tunable filter thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct FilterSettings {
    /// Minimum available liquidity in USD.
    pub min_liquidity: f64,
    /// Minimum 24h-volume to market-cap ratio.
    pub volume_mcap_ratio: f64,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_liquidity: 50_000.0,
            volume_mcap_ratio: 0.5,
        }
    }
}

/// Filter predicate, applied in order with short-circuit on the first failing
/// condition. All four conditions are independent and AND-combined.
pub fn passes_filters(record: &TokenRecord, settings: &FilterSettings) -> bool {
    if record.liquidity < settings.min_liquidity {
        return false;
    }
    if record.market_cap > MAX_MARKET_CAP_USD {
        return false;
    }
    if record.volume_24h == 0.0 {
        return false;
    }
    // Zero market cap yields ratio 0.0, so such records always fail here.
    if record.volume_mcap_ratio() < settings.volume_mcap_ratio {
        return false;
    }
    true
}

/// Deduplicate (first occurrence per address wins, later duplicates dropped
/// entirely) and filter canonical records, preserving input order. Records
/// with an empty address never survive.
///
/// Idempotent: applying it to its own output yields the same sequence.
pub fn filter_records(records: Vec<TokenRecord>, settings: &FilterSettings) -> ScanResult {
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::new();

    for record in records {
        if record.address.is_empty() {
            debug!(symbol = %record.symbol, "dropping record without address");
            continue;
        }
        if !seen.insert(record.address.clone()) {
            debug!(address = %record.address, "dropping duplicate address");
            continue;
        }
        if passes_filters(&record, settings) {
            result.push(record);
        }
    }

    result
}

/// Full aggregation stage: normalize every raw record in adapter order, then
/// dedup and filter.
pub fn aggregate(raw: &[RawToken], settings: &FilterSettings) -> ScanResult {
    let records = raw.iter().map(normalize).collect();
    filter_records(records, settings)
}
