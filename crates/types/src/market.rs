//! Supply/demand state, cross-effect links, and order book snapshots.

use serde::{Deserialize, Serialize};

use crate::{Price, Symbol, Volume};

/// Physical supply/demand state of a commodity.
///
/// `production` and `consumption` mean-revert toward per-commodity bases;
/// `inventory` accumulates the production-minus-consumption flow. Imports and
/// exports are carried for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplyDemand {
    pub production: f64,
    pub consumption: f64,
    pub imports: f64,
    pub exports: f64,
    pub inventory: f64,
}

impl SupplyDemand {
    /// Normalised demand-minus-supply imbalance, symmetric around zero.
    ///
    /// `(consumption - production) / midpoint`, where the midpoint is the
    /// average of production and consumption. Returns 0 when the midpoint is
    /// non-positive. Inventory is intentionally excluded so it does not bias
    /// the trading signal.
    pub fn imbalance(&self) -> f64 {
        let midpoint = (self.production + self.consumption) / 2.0;
        if midpoint <= 0.0 {
            return 0.0;
        }
        (self.consumption - self.production) / midpoint
    }
}

/// Expected return in `target_symbol` per 1% move in the source commodity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossEffect {
    pub target_symbol: Symbol,
    pub coefficient: f64,
}

/// A single aggregated price level in an order book snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookLevel {
    pub price: Price,
    pub total_quantity: Volume,
    pub order_count: usize,
}

/// Snapshot of one order book: aggregated depth plus best-price summary.
///
/// Empty-book conventions: `best_bid = 0`, `best_ask = +inf`, `spread = 0`,
/// `mid_price = 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSnapshot {
    pub symbol: Symbol,
    /// Bid levels, highest price first.
    pub bids: Vec<BookLevel>,
    /// Ask levels, lowest price first.
    pub asks: Vec<BookLevel>,
    pub best_bid: Price,
    pub best_ask: Price,
    pub spread: Price,
    pub mid_price: Price,
}
