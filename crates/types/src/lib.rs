//! Core types for the commodity market simulator.
//!
//! This crate provides all shared data types used across the simulation:
//! identifiers, order and trade types, supply/demand state, and order book
//! snapshots.

use derive_more::{From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;

mod market;
mod order;
mod trade;

pub use market::{BookLevel, BookSnapshot, CrossEffect, SupplyDemand};
pub use order::{Order, OrderSide, OrderType};
pub use trade::{AgentTypeStats, Trade};

// =============================================================================
// Core ID Types (Newtypes for type safety)
// =============================================================================

/// Unique identifier for orders. Strictly increasing per process; id 0 is the
/// "unassigned" placeholder replaced when the order enters a book.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    From,
    Into,
)]
pub struct OrderId(pub u64);

impl OrderId {
    /// Placeholder id for orders not yet accepted by a book.
    pub const UNASSIGNED: OrderId = OrderId(0);

    /// Check whether the id still carries the placeholder value.
    #[inline]
    pub fn is_unassigned(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order({})", self.0)
    }
}

/// Unique identifier for agents. Id 0 is reserved for externally injected
/// user orders.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    From,
    Into,
)]
pub struct AgentId(pub u64);

impl AgentId {
    /// Sentinel id for orders submitted over the HTTP surface.
    pub const USER: AgentId = AgentId(0);
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Agent({})", self.0)
    }
}

// =============================================================================
// Scalar Aliases
// =============================================================================

/// Commodity ticker symbol (e.g. "OIL", "GRAIN").
pub type Symbol = String;

/// Simulated time in milliseconds since epoch.
pub type Timestamp = u64;

/// Simulation tick number (discrete time step).
pub type Tick = u64;

/// Price in currency units. All prices, sentiments, and magnitudes are f64.
pub type Price = f64;

/// Number of units. Positive = long, negative = short where signed positions
/// are allowed.
pub type Volume = i64;

// =============================================================================
// Agent Parameters & Portfolio
// =============================================================================

/// Behavioural parameters sampled per agent from configured distributions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Higher values shrink order sizes and raise decision thresholds.
    pub risk_aversion: f64,
    /// Per-tick reaction probability factor (see reaction gating).
    pub reaction_speed: f64,
    /// Multiplier on news magnitude when updating beliefs.
    pub news_weight: f64,
    /// Baseline confidence used by some sizing decisions.
    pub confidence_level: f64,
    /// Holding-period preference in ticks.
    pub time_horizon: i64,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            risk_aversion: 1.0,
            reaction_speed: 1.0,
            news_weight: 1.0,
            confidence_level: 0.5,
            time_horizon: 20,
        }
    }
}

/// A single holding in an agent's portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    pub quantity: Volume,
    /// Weighted average acquisition cost, maintained on buy fills.
    pub avg_cost: Price,
}

impl Position {
    pub fn new(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            quantity: 0,
            avg_cost: 0.0,
        }
    }
}
