//! Memescan - Multi-Source Meme Token Market Scanner
//!
//! Aggregates trending tokens from DexScreener, Birdeye and Helius, filters
//! them by liquidity and volume quality, and optionally scores candidates
//! with an LLM.

mod adapters;
mod application;
mod config;
mod domain;
mod ports;
mod scoring;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use crate::adapters::birdeye::BirdeyeProvider;
use crate::adapters::cli::{AnalyzeCmd, CheckCmd, CliApp, Command, RunCmd, ScanCmd};
use crate::adapters::dexscreener::DexScreenerProvider;
use crate::adapters::fetch::FetchClient;
use crate::adapters::helius::HeliusProvider;
use crate::application::MarketScanner;
use crate::config::{load_config, Config};
use crate::domain::filter::FilterSettings;
use crate::domain::normalize::normalize;
use crate::domain::paper::PaperBook;
use crate::domain::token::{Provider, RawToken, TokenRecord};
use crate::ports::TokenProvider;
use crate::scoring::TokenScorer;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (secrets go here, not in config.toml)
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    init_logging(app.verbose, app.debug)?;

    match app.command {
        Command::Run(cmd) => run_command(cmd).await,
        Command::Scan(cmd) => scan_command(cmd).await,
        Command::Check(cmd) => check_command(cmd).await,
        Command::Analyze(cmd) => analyze_command(cmd).await,
    }
}

fn init_logging(verbose: bool, debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };

    fmt().with_env_filter(filter).init();
    Ok(())
}

/// Shared wiring: build the fetch client, providers and scanner from config.
struct Wiring {
    scanner: MarketScanner,
    birdeye: Arc<BirdeyeProvider>,
    scorer: TokenScorer,
}

fn build_wiring(config: Config) -> Result<Wiring> {
    let fetch = Arc::new(
        FetchClient::new()
            .map_err(anyhow::Error::msg)
            .context("Failed to create HTTP client")?,
    );

    let max_retries = config.scanner.max_retries;
    let cache_ttl = Duration::from_millis(config.scanner.cache_ttl_ms);

    let dexscreener = Arc::new(DexScreenerProvider::new(
        config.providers.dexscreener_url.clone(),
        Arc::clone(&fetch),
        max_retries,
        cache_ttl,
    ));
    let birdeye = Arc::new(BirdeyeProvider::new(
        config.providers.birdeye_url.clone(),
        config.providers.get_birdeye_api_key(),
        Arc::clone(&fetch),
        max_retries,
        cache_ttl,
    ));
    let helius = Arc::new(HeliusProvider::new(
        config.providers.helius_url.clone(),
        config.providers.get_helius_api_key(),
        Arc::clone(&fetch),
        max_retries,
        cache_ttl,
    ));

    let scorer = TokenScorer::new(
        config.scoring.get_openai_api_key(),
        config.scoring.model.clone(),
        config.scoring.openai_url.clone(),
        Arc::clone(&fetch),
    );
    // A second scorer handle for the analyze path; the scanner owns the first.
    let analyzer = TokenScorer::new(
        config.scoring.get_openai_api_key(),
        config.scoring.model.clone(),
        config.scoring.openai_url.clone(),
        Arc::clone(&fetch),
    );

    let settings = FilterSettings {
        min_liquidity: config.scanner.min_liquidity,
        volume_mcap_ratio: config.scanner.volume_mcap_ratio,
    };
    let providers: Vec<Arc<dyn TokenProvider>> = vec![
        dexscreener,
        Arc::clone(&birdeye) as Arc<dyn TokenProvider>,
        helius,
    ];
    let scanner = MarketScanner::new(
        providers,
        scorer,
        settings,
        Duration::from_millis(config.scanner.check_interval_ms),
    );

    Ok(Wiring {
        scanner,
        birdeye,
        scorer: analyzer,
    })
}

async fn run_command(cmd: RunCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let interval = Duration::from_millis(config.scanner.check_interval_ms);
    let paper_enabled = config.paper.enabled;
    let starting_balance = config.paper.starting_balance_usd;

    let wiring = build_wiring(config)?;
    let scanner = wiring.scanner;

    scanner.test_connections().await;
    scanner
        .start()
        .await
        .context("Failed to start scanner")?;
    tracing::info!("Scanner running, press Ctrl+C to stop");

    let mut paper = paper_enabled.then(|| PaperBook::new(starting_balance));

    // Setup Ctrl+C handler
    let handle = scanner.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Shutdown signal received");
        handle.stop().await;
    });

    let mut ticker = tokio::time::interval(interval);
    while scanner.is_running().await {
        ticker.tick().await;
        let results = scanner.latest_results().await;
        if results.is_empty() {
            continue;
        }

        print_table(&results);

        if let Some(book) = paper.as_mut() {
            let prices = results
                .iter()
                .map(|r| (r.address.clone(), r.price))
                .collect();
            book.mark(&prices);
            tracing::info!(
                balance = book.balance_usd(),
                equity = book.equity_usd(),
                "paper book marked"
            );
        }
    }

    tracing::info!("Memescan stopped");
    Ok(())
}

async fn scan_command(cmd: ScanCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let wiring = build_wiring(config)?;

    let results = wiring.scanner.run_once().await;

    match cmd.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&results)?),
        _ => print_table(&results),
    }
    Ok(())
}

async fn check_command(cmd: CheckCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let wiring = build_wiring(config)?;

    let statuses = wiring.scanner.test_connections().await;
    let mut names: Vec<&String> = statuses.keys().collect();
    names.sort();

    for name in names {
        let mark = if statuses[name] { "✓" } else { "✗" };
        println!("{mark} {name}");
    }
    if wiring.scorer.is_available() {
        println!("✓ scoring (LLM key configured)");
    } else {
        println!("- scoring (no LLM key, scores default to 0)");
    }
    Ok(())
}

async fn analyze_command(cmd: AnalyzeCmd) -> Result<()> {
    let config = load_config(&cmd.config).context("Failed to load configuration")?;
    let wiring = build_wiring(config)?;

    let overview = wiring
        .birdeye
        .token_overview(&cmd.address)
        .await
        .context("Failed to fetch token overview")?;
    let data = overview
        .get("data")
        .cloned()
        .unwrap_or(serde_json::Value::Null);

    let mut record = normalize(&RawToken::new(Provider::Birdeye, data));
    if record.address.is_empty() {
        record.address = cmd.address.clone();
    }

    println!("Token: {} ({})", record.symbol, record.name);
    println!("  Address:    {}", record.address);
    println!("  Price:      ${}", format_number(record.price));
    println!("  24h Change: {:.2}%", record.price_change_24h);
    println!("  Volume 24h: ${}", format_number(record.volume_24h));
    println!("  Liquidity:  ${}", format_number(record.liquidity));
    println!("  Market Cap: ${}", format_number(record.market_cap));

    if wiring.scorer.is_available() {
        let analysis = wiring
            .scorer
            .analyze(&record)
            .await
            .context("Failed to fetch analysis")?;
        println!("\n{analysis}");
    } else {
        println!("\n(no LLM key configured, skipping detailed analysis)");
    }
    Ok(())
}

fn print_table(results: &[TokenRecord]) {
    println!(
        "{:<10} {:<14} {:>12} {:>9} {:>14} {:>14} {:>6}",
        "SYMBOL", "ADDRESS", "PRICE", "24H%", "VOLUME", "LIQUIDITY", "SCORE"
    );
    for record in results {
        let address = short_address(&record.address);
        println!(
            "{:<10} {:<14} {:>12} {:>8.1}% {:>14} {:>14} {:>6}",
            record.symbol,
            address,
            format_number(record.price),
            record.price_change_24h,
            format_number(record.volume_24h),
            format_number(record.liquidity),
            record.score,
        );
    }
}

/// Shorten long addresses for the table. Truncates on character boundaries;
/// provider JSON is untrusted and need not be ASCII.
fn short_address(address: &str) -> String {
    if address.chars().count() > 12 {
        let head: String = address.chars().take(10).collect();
        format!("{head}..")
    } else {
        address.to_string()
    }
}

/// Compact human formatting: 1.25M, 330.5K, 0.004512
fn format_number(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else if magnitude >= 1.0 {
        format!("{value:.2}")
    } else {
        format!("{value:.6}")
    }
}
