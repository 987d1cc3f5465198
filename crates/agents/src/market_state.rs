//! Read-only per-tick market snapshot passed to `decide`.

use std::collections::BTreeMap;

use news::NewsEvent;
use types::{CrossEffect, Price, SupplyDemand, Symbol, Timestamp, Volume};

/// Everything an agent may look at when deciding.
///
/// Built by the engine once per tick and borrowed by every agent; ordered
/// maps keep symbol sampling deterministic under a fixed seed.
#[derive(Debug, Clone, Default)]
pub struct MarketState {
    pub prices: BTreeMap<Symbol, Price>,
    pub supply_demand: BTreeMap<Symbol, SupplyDemand>,
    pub price_history: BTreeMap<Symbol, Vec<Price>>,
    pub volumes: BTreeMap<Symbol, Volume>,
    pub categories: BTreeMap<Symbol, String>,
    /// Source symbol -> expected spillovers onto other commodities.
    pub cross_effects: BTreeMap<Symbol, Vec<CrossEffect>>,
    pub recent_news: Vec<NewsEvent>,
    pub global_sentiment: f64,
    pub tick_scale: f64,
    pub current_time: Timestamp,
}

impl MarketState {
    pub fn price(&self, symbol: &str) -> Option<Price> {
        self.prices.get(symbol).copied()
    }

    /// Symbol at a stable index, for uniform random sampling.
    pub fn symbol_at(&self, index: usize) -> Option<&Symbol> {
        self.prices.keys().nth(index)
    }

    pub fn symbol_count(&self) -> usize {
        self.prices.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_sampling_is_ordered() {
        let mut state = MarketState::default();
        state.prices.insert("WOOD".into(), 45.0);
        state.prices.insert("GRAIN".into(), 8.0);
        state.prices.insert("OIL".into(), 75.0);

        assert_eq!(state.symbol_count(), 3);
        assert_eq!(state.symbol_at(0).unwrap(), "GRAIN");
        assert_eq!(state.symbol_at(1).unwrap(), "OIL");
        assert_eq!(state.symbol_at(2).unwrap(), "WOOD");
        assert!(state.symbol_at(3).is_none());
    }
}
