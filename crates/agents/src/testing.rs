//! Shared fixtures for strategy unit tests.

use rand::SeedableRng;
use rand::rngs::StdRng;

use types::{AgentId, AgentParams, SupplyDemand};

use crate::core::AgentCore;
use crate::market_state::MarketState;

/// An agent core with a deterministic rng and maximal reaction speed so
/// gating passes often enough for bounded retry loops.
pub fn test_core(seed: u64, cash: f64) -> AgentCore {
    let params = AgentParams {
        risk_aversion: 1.0,
        reaction_speed: 5.0,
        news_weight: 1.0,
        confidence_level: 0.8,
        time_horizon: 20,
    };
    AgentCore::new(AgentId(seed), cash, params, 200, StdRng::seed_from_u64(seed))
}

/// A one-price market with balanced supply/demand for every symbol.
pub fn test_state(symbols: &[&str], price: f64) -> MarketState {
    test_state_with_history(symbols, vec![price])
}

/// A market whose every symbol carries the given price history; the current
/// price is the last entry.
pub fn test_state_with_history(symbols: &[&str], history: Vec<f64>) -> MarketState {
    let mut state = MarketState {
        tick_scale: 1.0,
        ..Default::default()
    };
    let price = *history.last().expect("history must be non-empty");

    for &symbol in symbols {
        state.prices.insert(symbol.to_string(), price);
        state.supply_demand.insert(
            symbol.to_string(),
            SupplyDemand {
                production: 100.0,
                consumption: 100.0,
                imports: 0.0,
                exports: 0.0,
                inventory: 50.0,
            },
        );
        state.price_history.insert(symbol.to_string(), history.clone());
        state.volumes.insert(symbol.to_string(), 0);
        state
            .categories
            .insert(symbol.to_string(), "Energy".to_string());
    }
    state
}
