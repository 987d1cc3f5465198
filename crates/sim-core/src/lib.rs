//! Sim-core: market mechanics for the commodity simulator.
//!
//! This crate provides the pieces the engine ticks over:
//! - Order book with price-time priority, lazy cancellation, and age expiry
//! - Simulated clock mapping ticks onto calendar time with tick-rate scaling
//! - Commodity price state: trade impact, circuit breaker, supply/demand
//!   dynamics

mod clock;
mod commodity;
mod error;
mod order_book;

pub use clock::{ClockHandle, SimClock};
pub use commodity::Commodity;
pub use error::{Result, SimCoreError};
pub use order_book::OrderBook;
