use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::token::RawToken;

use super::provider::TokenProvider;

/// Mock provider that records calls and serves a preset batch
#[derive(Debug, Default)]
pub struct MockProvider {
    name: &'static str,
    connected: bool,
    batch: Vec<RawToken>,
    fetch_calls: Arc<Mutex<u32>>,
}

impl MockProvider {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            connected: true,
            batch: Vec::new(),
            fetch_calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Builder method to set the batch served by fetch_raw
    pub fn with_batch(mut self, batch: Vec<RawToken>) -> Self {
        self.batch = batch;
        self
    }

    /// Builder method to set the connection probe result
    pub fn with_connected(mut self, connected: bool) -> Self {
        self.connected = connected;
        self
    }

    /// Number of fetch_raw calls observed
    pub fn fetch_calls(&self) -> u32 {
        *self.fetch_calls.lock().unwrap()
    }

    /// Shared handle to the call counter, for asserting after a move
    pub fn fetch_call_counter(&self) -> Arc<Mutex<u32>> {
        Arc::clone(&self.fetch_calls)
    }
}

#[async_trait]
impl TokenProvider for MockProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn test_connection(&self) -> bool {
        self.connected
    }

    async fn fetch_raw(&self) -> Vec<RawToken> {
        *self.fetch_calls.lock().unwrap() += 1;
        self.batch.clone()
    }
}
