//! End-to-end pipeline tests: mock providers feeding the scanner through
//! normalization, filtering and result storage.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use memescan::adapters::fetch::FetchClient;
use memescan::application::{MarketScanner, ScannerError};
use memescan::domain::filter::FilterSettings;
use memescan::domain::paper::PaperBook;
use memescan::domain::token::{Provider, RawToken};
use memescan::ports::mocks::MockProvider;
use memescan::ports::TokenProvider;
use memescan::scoring::{TokenScorer, DEFAULT_MODEL, OPENAI_BASE_URL};

struct NoNetwork;

#[async_trait::async_trait]
impl memescan::adapters::fetch::HttpTransport for NoNetwork {
    async fn send(
        &self,
        _url: &str,
        _options: &memescan::adapters::fetch::RequestOptions,
    ) -> Result<memescan::adapters::fetch::TransportResponse, String> {
        Err("no network in tests".to_string())
    }
}

fn keyless_scorer() -> TokenScorer {
    TokenScorer::new(
        None,
        DEFAULT_MODEL,
        OPENAI_BASE_URL,
        Arc::new(FetchClient::with_transport(Arc::new(NoNetwork))),
    )
}

fn scanner(providers: Vec<Arc<dyn TokenProvider>>) -> MarketScanner {
    MarketScanner::new(
        providers,
        keyless_scorer(),
        FilterSettings::default(),
        Duration::from_millis(10),
    )
}

fn dex_pair(address: &str, liquidity: f64, volume: f64, mcap: f64) -> RawToken {
    RawToken::new(
        Provider::DexScreener,
        json!({
            "baseToken": {"symbol": "TOK", "address": address},
            "priceUsd": "0.25",
            "priceChange": {"h24": 12.0},
            "volume": {"h24": volume},
            "liquidity": {"usd": liquidity},
            "marketCap": mcap
        }),
    )
}

fn birdeye_token(address: &str, liquidity: f64, volume: f64, mcap: f64) -> RawToken {
    RawToken::new(
        Provider::Birdeye,
        json!({
            "symbol": "BIRD",
            "address": address,
            "price": 1.5,
            "v24hChangePercent": -3.0,
            "v24hUSD": volume,
            "liquidity": liquidity,
            "mc": mcap
        }),
    )
}

#[tokio::test]
async fn full_cycle_merges_and_filters_across_providers() {
    let dex = MockProvider::new("dexscreener").with_batch(vec![
        dex_pair("KEEP1", 100_000.0, 600_000.0, 900_000.0),
        // Fails the liquidity floor.
        dex_pair("DROP1", 10_000.0, 600_000.0, 900_000.0),
    ]);
    let bird = MockProvider::new("birdeye").with_batch(vec![
        birdeye_token("KEEP2", 80_000.0, 400_000.0, 500_000.0),
        // Fails the market cap ceiling.
        birdeye_token("DROP2", 80_000.0, 4_000_000.0, 5_000_000.0),
    ]);

    let scanner = scanner(vec![Arc::new(dex), Arc::new(bird)]);
    let results = scanner.run_once().await;

    let addresses: Vec<&str> = results.iter().map(|r| r.address.as_str()).collect();
    assert_eq!(addresses, vec!["KEEP1", "KEEP2"]);

    // Dex pair normalized through its fallback chain.
    assert_eq!(results[0].symbol, "TOK");
    assert_eq!(results[0].price, 0.25);
    assert_eq!(results[0].price_change_24h, 12.0);

    // Birdeye record normalized through its flat schema.
    assert_eq!(results[1].symbol, "BIRD");
    assert_eq!(results[1].liquidity, 80_000.0);
    assert_eq!(results[1].market_cap, 500_000.0);

    // Without an LLM key every record keeps the default score.
    assert!(results.iter().all(|r| r.score == 0));
    assert_eq!(scanner.latest_results().await, results);
}

#[tokio::test]
async fn duplicate_addresses_keep_first_provider_record() {
    let dex = MockProvider::new("dexscreener")
        .with_batch(vec![dex_pair("SHARED", 100_000.0, 600_000.0, 900_000.0)]);
    let bird = MockProvider::new("birdeye")
        .with_batch(vec![birdeye_token("SHARED", 80_000.0, 400_000.0, 500_000.0)]);

    let results = scanner(vec![Arc::new(dex), Arc::new(bird)]).run_once().await;

    assert_eq!(results.len(), 1);
    // First provider in registration order wins.
    assert_eq!(results[0].symbol, "TOK");
}

#[tokio::test]
async fn helius_records_lack_market_fields_and_are_filtered_out() {
    let helius = MockProvider::new("helius").with_batch(vec![RawToken::new(
        Provider::Helius,
        json!({"address": "MintA", "balance": 10.0}),
    )]);
    let dex = MockProvider::new("dexscreener")
        .with_batch(vec![dex_pair("KEEP", 100_000.0, 600_000.0, 900_000.0)]);

    let results = scanner(vec![Arc::new(dex), Arc::new(helius)]).run_once().await;

    // Zero liquidity and volume never pass the default thresholds.
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].address, "KEEP");
}

#[tokio::test]
async fn start_refuses_until_required_providers_connect() {
    let s = scanner(vec![
        Arc::new(MockProvider::new("dexscreener").with_connected(false)),
        Arc::new(MockProvider::new("birdeye")),
    ]);
    s.test_connections().await;

    match s.start().await {
        Err(ScannerError::PreconditionUnmet(missing)) => {
            assert_eq!(missing, "dexscreener");
        }
        Ok(_) => panic!("start should fail with a disconnected required provider"),
    }

    // run_once stays available as a manual escape hatch.
    let results = s.run_once().await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn scan_loop_populates_results_until_stopped() {
    let dex = MockProvider::new("dexscreener")
        .with_batch(vec![dex_pair("A", 100_000.0, 600_000.0, 900_000.0)]);
    let counter = dex.fetch_call_counter();

    let s = scanner(vec![Arc::new(dex), Arc::new(MockProvider::new("birdeye"))]);
    s.test_connections().await;
    s.start().await.unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;
    s.stop().await;

    assert!(*counter.lock().unwrap() >= 2, "loop should have cycled");
    assert_eq!(s.latest_results().await.len(), 1);
}

#[tokio::test]
async fn paper_book_tracks_scanned_token_prices() {
    let dex = MockProvider::new("dexscreener")
        .with_batch(vec![dex_pair("A", 100_000.0, 600_000.0, 900_000.0)]);
    let s = scanner(vec![Arc::new(dex)]);

    let results = s.run_once().await;
    let record = &results[0];

    let mut book = PaperBook::new(1_000.0);
    book.open(&record.address, &record.symbol, 100.0, record.price)
        .unwrap();
    assert_eq!(book.balance_usd(), 900.0);

    // Price doubles on the next cycle.
    let mut prices = HashMap::new();
    prices.insert(record.address.clone(), record.price * 2.0);
    book.mark(&prices);
    assert_eq!(book.equity_usd(), 1_100.0);

    let position_id = book.open_positions()[0].id;
    book.close(position_id, record.price * 2.0).unwrap();
    assert_eq!(book.balance_usd(), 1_100.0);

    let summary = book.summary();
    assert_eq!(summary.total_trades, 1);
    assert_eq!(summary.win_rate, 100.0);
}
