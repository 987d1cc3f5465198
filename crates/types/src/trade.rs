//! Trade and per-agent-type statistics types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AgentId, OrderId, Price, Symbol, Timestamp, Volume};

/// A completed trade between two orders.
///
/// `buyer_type` / `seller_type` carry the human-readable strategy tags used
/// in the trade log and per-type statistics ("MarketMaker", "Noise", or
/// "User" for externally injected orders).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub buyer_id: AgentId,
    pub seller_id: AgentId,
    #[serde(default)]
    pub buyer_type: String,
    #[serde(default)]
    pub seller_type: String,
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Volume,
    pub timestamp: Timestamp,
}

impl Trade {
    /// Total cash value of the trade.
    pub fn value(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} x {} ({} -> {})",
            self.symbol, self.price, self.quantity, self.buyer_type, self.seller_type
        )
    }
}

/// Order and fill counters aggregated per strategy tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentTypeStats {
    pub orders_placed: u64,
    pub buy_orders: u64,
    pub sell_orders: u64,
    pub fills: u64,
    pub volume_traded: f64,
    pub cash_spent: f64,
    pub cash_received: f64,
}
