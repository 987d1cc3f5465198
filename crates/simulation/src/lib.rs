//! Simulation: the market engine and its concurrency-safe controller.
//!
//! [`MarketEngine`] owns the whole market aggregate and drives the per-tick
//! pipeline; [`Simulation`] wraps it in a reader/writer lifecycle with a
//! tick thread, populate fast-forward, runtime configuration, and a JSON
//! query surface.

mod catalog;
mod config;
mod controller;
mod engine;

pub use catalog::{CommodityCatalog, CommoditySpec};
pub use config::{CommodityParams, OrderBookParams, RuntimeConfig, SimulationParams};
pub use controller::{SimResult, Simulation, SimulationError};
pub use engine::{MarketEngine, NewsCallback, SimulationMetrics, TradeCallback};
