//! Market Scanner
//!
//! Coordinates the provider adapters with the aggregation pipeline and the
//! optional scorer. Owns the periodic scan loop and the connection-status map
//! the control surface reads.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::domain::filter::{aggregate, FilterSettings};
use crate::domain::token::{RawToken, ScanResult};
use crate::ports::provider::TokenProvider;
use crate::scoring::TokenScorer;

/// Providers that must be reachable before the scan loop may start.
pub const REQUIRED_PROVIDERS: &[&str] = &["dexscreener", "birdeye"];

#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("required providers not connected: {0}")]
    PreconditionUnmet(String),
}

/// Periodic multi-provider market scanner.
pub struct MarketScanner {
    providers: Vec<Arc<dyn TokenProvider>>,
    scorer: Arc<TokenScorer>,
    settings: FilterSettings,
    check_interval: Duration,
    connections: Arc<RwLock<HashMap<String, bool>>>,
    latest: Arc<RwLock<ScanResult>>,
    is_running: Arc<RwLock<bool>>,
    // Serializes cycles so a manual run_once cannot interleave with the loop.
    cycle: Arc<Mutex<()>>,
}

impl MarketScanner {
    pub fn new(
        providers: Vec<Arc<dyn TokenProvider>>,
        scorer: TokenScorer,
        settings: FilterSettings,
        check_interval: Duration,
    ) -> Self {
        Self {
            providers,
            scorer: Arc::new(scorer),
            settings,
            check_interval,
            connections: Arc::new(RwLock::new(HashMap::new())),
            latest: Arc::new(RwLock::new(Vec::new())),
            is_running: Arc::new(RwLock::new(false)),
            cycle: Arc::new(Mutex::new(())),
        }
    }

    /// Probe every provider and refresh the connection-status map.
    pub async fn test_connections(&self) -> HashMap<String, bool> {
        let mut statuses = HashMap::new();
        for provider in &self.providers {
            let connected = provider.test_connection().await;
            info!(provider = provider.name(), connected, "connection probe");
            statuses.insert(provider.name().to_string(), connected);
        }
        *self.connections.write().await = statuses.clone();
        statuses
    }

    /// Start the periodic scan loop.
    ///
    /// No-op if already running. Fails with [`ScannerError::PreconditionUnmet`]
    /// when any required provider is not connected; optional providers may be
    /// down. The first cycle runs immediately, later cycles every
    /// `check_interval`; cycles are awaited in the loop so they never overlap.
    pub async fn start(&self) -> Result<(), ScannerError> {
        // Check-and-set under one write guard so concurrent starts cannot
        // both pass the check and spawn duplicate tick loops.
        {
            let mut running = self.is_running.write().await;
            if *running {
                warn!("scanner already running, start ignored");
                return Ok(());
            }

            let connections = self.connections.read().await;
            let missing: Vec<&str> = REQUIRED_PROVIDERS
                .iter()
                .copied()
                .filter(|name| !connections.get(*name).copied().unwrap_or(false))
                .collect();
            if !missing.is_empty() {
                return Err(ScannerError::PreconditionUnmet(missing.join(", ")));
            }

            *running = true;
        }
        info!(interval = ?self.check_interval, "scanner started");

        let scanner = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(scanner.check_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if !*scanner.is_running.read().await {
                    break;
                }
                // A manual run_once may hold the cycle guard; skip the tick
                // rather than queue behind it.
                if scanner.cycle.try_lock().is_err() {
                    warn!("previous scan cycle still in flight, skipping tick");
                    continue;
                }
                scanner.run_once().await;
            }
            info!("scanner stopped");
        });

        Ok(())
    }

    /// Stop the scan loop. Idempotent; an in-flight cycle finishes first.
    pub async fn stop(&self) {
        *self.is_running.write().await = false;
    }

    /// Execute one full scan cycle and return its result.
    ///
    /// Providers are polled sequentially and a failed provider contributes an
    /// empty batch, so one bad upstream never sinks the cycle.
    pub async fn run_once(&self) -> ScanResult {
        let _cycle = self.cycle.lock().await;

        let mut raw: Vec<RawToken> = Vec::new();
        for provider in &self.providers {
            let batch = provider.fetch_raw().await;
            info!(provider = provider.name(), records = batch.len(), "provider batch");
            raw.extend(batch);
        }

        let mut records = aggregate(&raw, &self.settings);
        self.scorer.score_all(&mut records).await;

        info!(
            raw = raw.len(),
            kept = records.len(),
            "scan cycle complete"
        );

        *self.latest.write().await = records.clone();
        records
    }

    /// Most recent completed cycle's records.
    pub async fn latest_results(&self) -> ScanResult {
        self.latest.read().await.clone()
    }

    /// Connection-status map from the last probe run.
    pub async fn connection_status(&self) -> HashMap<String, bool> {
        self.connections.read().await.clone()
    }

    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }
}

// Clones share all state so a cloned handle can stop the loop.
impl Clone for MarketScanner {
    fn clone(&self) -> Self {
        Self {
            providers: self.providers.clone(),
            scorer: Arc::clone(&self.scorer),
            settings: self.settings.clone(),
            check_interval: self.check_interval,
            connections: Arc::clone(&self.connections),
            latest: Arc::clone(&self.latest),
            is_running: Arc::clone(&self.is_running),
            cycle: Arc::clone(&self.cycle),
        }
    }
}
