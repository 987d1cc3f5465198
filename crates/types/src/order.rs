//! Order types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{AgentId, OrderId, Price, Symbol, Timestamp, Volume};

/// Which side of the market the order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(self) -> Self {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Type of order determining execution rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Execute against whatever the opposite side offers; carries price 0.
    Market,
    /// Execute at the stated price or better.
    Limit,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
        }
    }
}

/// A trading order submitted by an agent.
///
/// The book assigns `id` (when unassigned) and stamps `timestamp` with the
/// simulated clock on acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub agent_id: AgentId,
    pub symbol: Symbol,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Limit price; 0 for market orders.
    pub price: Price,
    pub quantity: Volume,
    /// Simulated milliseconds; set by the book on `add`.
    pub timestamp: Timestamp,
}

impl Order {
    /// Create a new limit order with an unassigned id.
    pub fn limit(
        agent_id: AgentId,
        symbol: impl Into<Symbol>,
        side: OrderSide,
        price: Price,
        quantity: Volume,
    ) -> Self {
        Self {
            id: OrderId::UNASSIGNED,
            agent_id,
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            price,
            quantity,
            timestamp: 0,
        }
    }

    /// Create a new market order with an unassigned id.
    pub fn market(
        agent_id: AgentId,
        symbol: impl Into<Symbol>,
        side: OrderSide,
        quantity: Volume,
    ) -> Self {
        Self {
            id: OrderId::UNASSIGNED,
            agent_id,
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            price: 0.0,
            quantity,
            timestamp: 0,
        }
    }

    /// Check if the order is a buy order.
    pub fn is_buy(&self) -> bool {
        self.side == OrderSide::Buy
    }

    /// Check if the order is a market order.
    pub fn is_market(&self) -> bool {
        self.order_type == OrderType::Market
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
    }

    #[test]
    fn limit_order_creation() {
        let order = Order::limit(AgentId(1), "OIL", OrderSide::Buy, 75.0, 10);
        assert_eq!(order.id, OrderId::UNASSIGNED);
        assert_eq!(order.symbol, "OIL");
        assert_eq!(order.price, 75.0);
        assert_eq!(order.quantity, 10);
        assert!(order.is_buy());
        assert!(!order.is_market());
    }

    #[test]
    fn market_order_has_zero_price() {
        let order = Order::market(AgentId(2), "GRAIN", OrderSide::Sell, 5);
        assert_eq!(order.price, 0.0);
        assert!(order.is_market());
    }
}
