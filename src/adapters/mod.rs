//! Adapters Layer - External System Implementations
//!
//! This module contains the concrete data-source clients behind the ports:
//! - Fetch: shared retrying, caching HTTP layer
//! - DexScreener: trending-pairs feed
//! - Birdeye: volume-sorted token list
//! - Helius: Solana JSON-RPC token accounts
//! - CLI: command-line interface definition

pub mod birdeye;
pub mod cli;
pub mod dexscreener;
pub mod fetch;
pub mod helius;

pub use birdeye::BirdeyeProvider;
pub use cli::CliApp;
pub use dexscreener::DexScreenerProvider;
pub use fetch::{FetchClient, FetchError};
pub use helius::HeliusProvider;
