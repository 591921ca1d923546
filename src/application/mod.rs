pub mod scanner;

pub use scanner::{MarketScanner, ScannerError, REQUIRED_PROVIDERS};
