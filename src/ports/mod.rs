//! Ports Layer - Trait definitions for external dependencies
//!
//! Following hexagonal architecture, these traits abstract the data sources
//! feeding the scan pipeline so the aggregation and scheduling logic never
//! touches a concrete HTTP client.

pub mod mocks;
pub mod provider;

pub use provider::TokenProvider;
