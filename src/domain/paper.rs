//! Paper Trading Position Tracker
//!
//! Simulated positions over scanner output. No real orders are placed and no
//! transactions are signed; this exists so strategies can be evaluated against
//! live scan data without money at risk.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Paper trading errors
#[derive(Debug, Error)]
pub enum PaperError {
    #[error("insufficient balance: need ${needed:.2}, have ${available:.2}")]
    InsufficientBalance { needed: f64, available: f64 },
    #[error("unknown position id {0}")]
    UnknownPosition(u64),
    #[error("invalid order: {0}")]
    InvalidOrder(String),
}

/// An open simulated position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperPosition {
    pub id: u64,
    pub address: String,
    pub symbol: String,
    /// USD committed at entry.
    pub usd_amount: f64,
    /// Token quantity bought at entry price.
    pub quantity: f64,
    pub entry_price: f64,
    /// Last marked price; starts at the entry price.
    pub current_price: f64,
    pub opened_at: DateTime<Utc>,
}

impl PaperPosition {
    /// Unrealized PnL in USD at the last marked price.
    pub fn unrealized_pnl(&self) -> f64 {
        (self.current_price - self.entry_price) * self.quantity
    }
}

/// A closed simulated trade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClosedTrade {
    pub id: u64,
    pub address: String,
    pub symbol: String,
    pub usd_amount: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub pnl: f64,
    pub pnl_pct: f64,
    pub opened_at: DateTime<Utc>,
    pub closed_at: DateTime<Utc>,
}

/// Aggregate performance over closed trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub total_pnl: f64,
    /// Percentage of closed trades with positive PnL, 0-100.
    pub win_rate: f64,
    pub total_trades: u32,
    /// Mean PnL percentage per closed trade.
    pub avg_return: f64,
}

/// Simulated balance, open positions and trade history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperBook {
    balance_usd: f64,
    starting_balance_usd: f64,
    positions: Vec<PaperPosition>,
    history: Vec<ClosedTrade>,
    next_id: u64,
}

impl PaperBook {
    pub fn new(starting_balance_usd: f64) -> Self {
        Self {
            balance_usd: starting_balance_usd,
            starting_balance_usd,
            positions: Vec::new(),
            history: Vec::new(),
            next_id: 1,
        }
    }

    /// Open a position, debiting the simulated balance.
    pub fn open(
        &mut self,
        address: &str,
        symbol: &str,
        usd_amount: f64,
        price: f64,
    ) -> Result<u64, PaperError> {
        if address.is_empty() {
            return Err(PaperError::InvalidOrder("token address is empty".into()));
        }
        if usd_amount <= 0.0 {
            return Err(PaperError::InvalidOrder(format!(
                "usd_amount must be > 0, got {usd_amount}"
            )));
        }
        if price <= 0.0 {
            return Err(PaperError::InvalidOrder(format!(
                "price must be > 0, got {price}"
            )));
        }
        if usd_amount > self.balance_usd {
            return Err(PaperError::InsufficientBalance {
                needed: usd_amount,
                available: self.balance_usd,
            });
        }

        let id = self.next_id;
        self.next_id += 1;
        self.balance_usd -= usd_amount;
        self.positions.push(PaperPosition {
            id,
            address: address.to_string(),
            symbol: symbol.to_string(),
            usd_amount,
            quantity: usd_amount / price,
            entry_price: price,
            current_price: price,
            opened_at: Utc::now(),
        });

        info!(symbol, usd_amount, price, "paper buy filled");
        Ok(id)
    }

    /// Close a position at the given price, realizing its PnL.
    pub fn close(&mut self, id: u64, price: f64) -> Result<ClosedTrade, PaperError> {
        let index = self
            .positions
            .iter()
            .position(|p| p.id == id)
            .ok_or(PaperError::UnknownPosition(id))?;

        let position = self.positions.remove(index);
        let proceeds = position.quantity * price;
        let pnl = proceeds - position.usd_amount;
        let pnl_pct = pnl / position.usd_amount * 100.0;
        self.balance_usd += proceeds;

        let trade = ClosedTrade {
            id: position.id,
            address: position.address,
            symbol: position.symbol.clone(),
            usd_amount: position.usd_amount,
            entry_price: position.entry_price,
            exit_price: price,
            pnl,
            pnl_pct,
            opened_at: position.opened_at,
            closed_at: Utc::now(),
        };
        self.history.push(trade.clone());

        info!(symbol = %trade.symbol, pnl, pnl_pct, "paper sell filled");
        Ok(trade)
    }

    /// Revalue open positions from the latest scan prices (address -> price).
    /// Addresses absent from the map keep their previous mark.
    pub fn mark(&mut self, prices: &HashMap<String, f64>) {
        for position in &mut self.positions {
            if let Some(price) = prices.get(&position.address) {
                if *price > 0.0 {
                    position.current_price = *price;
                }
            }
        }
    }

    pub fn balance_usd(&self) -> f64 {
        self.balance_usd
    }

    /// Balance plus the marked value of open positions.
    pub fn equity_usd(&self) -> f64 {
        let open_value: f64 = self
            .positions
            .iter()
            .map(|p| p.quantity * p.current_price)
            .sum();
        self.balance_usd + open_value
    }

    pub fn open_positions(&self) -> &[PaperPosition] {
        &self.positions
    }

    pub fn history(&self) -> &[ClosedTrade] {
        &self.history
    }

    /// Performance metrics over closed trades.
    pub fn summary(&self) -> PerformanceSummary {
        let total_trades = self.history.len() as u32;
        if total_trades == 0 {
            return PerformanceSummary::default();
        }

        let total_pnl: f64 = self.history.iter().map(|t| t.pnl).sum();
        let winning = self.history.iter().filter(|t| t.pnl > 0.0).count() as f64;
        let avg_return =
            self.history.iter().map(|t| t.pnl_pct).sum::<f64>() / total_trades as f64;

        PerformanceSummary {
            total_pnl,
            win_rate: winning / total_trades as f64 * 100.0,
            total_trades,
            avg_return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_open_debits_balance() {
        let mut book = PaperBook::new(1000.0);
        let id = book.open("Mint111", "WIF", 100.0, 0.001).unwrap();

        assert_eq!(id, 1);
        assert_relative_eq!(book.balance_usd(), 900.0);
        assert_eq!(book.open_positions().len(), 1);
        assert_relative_eq!(book.open_positions()[0].quantity, 100_000.0);
    }

    #[test]
    fn test_open_rejects_overdraft() {
        let mut book = PaperBook::new(50.0);
        let err = book.open("Mint111", "WIF", 100.0, 0.001).unwrap_err();
        assert!(matches!(err, PaperError::InsufficientBalance { .. }));
        assert_eq!(book.open_positions().len(), 0);
    }

    #[test]
    fn test_open_rejects_bad_orders() {
        let mut book = PaperBook::new(1000.0);
        assert!(book.open("", "WIF", 100.0, 0.001).is_err());
        assert!(book.open("Mint111", "WIF", 0.0, 0.001).is_err());
        assert!(book.open("Mint111", "WIF", 100.0, 0.0).is_err());
    }

    #[test]
    fn test_close_realizes_pnl() {
        let mut book = PaperBook::new(1000.0);
        let id = book.open("Mint111", "WIF", 100.0, 0.001).unwrap();

        // Price doubles: 100k tokens * 0.002 = $200 proceeds, $100 profit
        let trade = book.close(id, 0.002).unwrap();
        assert_relative_eq!(trade.pnl, 100.0);
        assert_relative_eq!(trade.pnl_pct, 100.0);
        assert_relative_eq!(book.balance_usd(), 1100.0);
        assert!(book.open_positions().is_empty());
    }

    #[test]
    fn test_close_unknown_position() {
        let mut book = PaperBook::new(1000.0);
        assert!(matches!(
            book.close(99, 1.0).unwrap_err(),
            PaperError::UnknownPosition(99)
        ));
    }

    #[test]
    fn test_mark_updates_unrealized_pnl() {
        let mut book = PaperBook::new(1000.0);
        book.open("Mint111", "WIF", 100.0, 0.001).unwrap();

        let mut prices = HashMap::new();
        prices.insert("Mint111".to_string(), 0.0015);
        book.mark(&prices);

        assert_relative_eq!(book.open_positions()[0].current_price, 0.0015);
        assert_relative_eq!(book.open_positions()[0].unrealized_pnl(), 50.0);
        assert_relative_eq!(book.equity_usd(), 1050.0);
    }

    #[test]
    fn test_mark_ignores_unknown_and_zero_prices() {
        let mut book = PaperBook::new(1000.0);
        book.open("Mint111", "WIF", 100.0, 0.001).unwrap();

        let mut prices = HashMap::new();
        prices.insert("Other".to_string(), 5.0);
        prices.insert("Mint111".to_string(), 0.0);
        book.mark(&prices);

        assert_relative_eq!(book.open_positions()[0].current_price, 0.001);
    }

    #[test]
    fn test_summary_over_closed_trades() {
        let mut book = PaperBook::new(1000.0);
        let a = book.open("MintA", "AAA", 100.0, 0.001).unwrap();
        let b = book.open("MintB", "BBB", 100.0, 0.002).unwrap();

        book.close(a, 0.002).unwrap(); // +100%, +$100
        book.close(b, 0.001).unwrap(); // -50%, -$50

        let summary = book.summary();
        assert_eq!(summary.total_trades, 2);
        assert_relative_eq!(summary.total_pnl, 50.0);
        assert_relative_eq!(summary.win_rate, 50.0);
        assert_relative_eq!(summary.avg_return, 25.0);
    }

    #[test]
    fn test_summary_empty() {
        let book = PaperBook::new(1000.0);
        assert_eq!(book.summary(), PerformanceSummary::default());
    }
}
