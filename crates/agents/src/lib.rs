//! Trader agents for the commodity market simulator.
//!
//! An [`Agent`] pairs a shared [`AgentCore`] (cash, portfolio, sentiment,
//! sampled parameters) with one [`Strategy`] variant. The engine calls
//! `decide` once per tick with a read-only [`MarketState`] snapshot, delivers
//! fills through `on_fill`, and routes news through `update_beliefs`.

mod agent;
mod config;
mod core;
mod factory;
mod market_state;
pub mod strategies;
#[cfg(test)]
pub(crate) mod testing;

pub use crate::agent::{Agent, Strategy};
pub use crate::config::{
    AgentCashConfig, AgentCountsConfig, AgentGenConfig, AgentGlobalConfig, AgentTuning,
    CrossEffectsConfig, EventConfig, InventoryConfig, MarketMakerConfig, MeanReversionConfig,
    MomentumConfig, NoiseConfig, SupplyDemandConfig,
};
pub use crate::core::AgentCore;
pub use crate::factory::AgentFactory;
pub use crate::market_state::MarketState;
