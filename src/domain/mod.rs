//! Domain Layer - Core scan pipeline logic
//!
//! Pure types and functions with no network dependencies:
//! - `token`: canonical `TokenRecord` and raw provider payloads
//! - `normalize`: per-provider field-fallback normalization
//! - `filter`: aggregation, first-wins dedup and threshold filtering
//! - `paper`: simulated position tracker over scan output

pub mod filter;
pub mod normalize;
pub mod paper;
pub mod token;

pub use filter::{aggregate, filter_records, passes_filters, FilterSettings, MAX_MARKET_CAP_USD};
pub use normalize::normalize;
pub use paper::{ClosedTrade, PaperBook, PaperError, PaperPosition, PerformanceSummary};
pub use token::{Provider, RawToken, ScanResult, TokenRecord};
