//! Memescan - Multi-Source Meme Token Market Scanner Library
//!
//! Aggregates trending tokens from several market data providers, filters
//! them by liquidity and volume quality, and optionally scores candidates
//! with an LLM.
//!
//! # Modules
//!
//! - `domain`: Core business logic (normalization, filtering, paper trading)
//! - `ports`: Trait abstractions (TokenProvider)
//! - `adapters`: External implementations (fetch layer, providers, CLI)
//! - `scoring`: LLM-based token scoring
//! - `config`: Configuration loading and validation
//! - `application`: Scan loop coordination

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod scoring;
