//! Agent = shared core + one strategy variant.
//!
//! Strategies are a sum type dispatched by match; there is no runtime class
//! hierarchy. The engine talks to agents exclusively through this type.

use news::NewsEvent;
use types::{AgentId, Order, Trade};

use crate::config::AgentTuning;
use crate::core::AgentCore;
use crate::market_state::MarketState;
use crate::strategies::{
    CrossEffectsTrader, EventTrader, InventoryTrader, MarketMaker, MeanReversionTrader,
    MomentumTrader, NoiseTrader, SupplyDemandTrader,
};

/// The eight trading strategies.
#[derive(Debug, Clone)]
pub enum Strategy {
    SupplyDemand(SupplyDemandTrader),
    Momentum(MomentumTrader),
    MeanReversion(MeanReversionTrader),
    Noise(NoiseTrader),
    MarketMaker(MarketMaker),
    CrossEffects(CrossEffectsTrader),
    Inventory(InventoryTrader),
    Event(EventTrader),
}

impl Strategy {
    /// Stable tag used in trade labels and per-type statistics.
    pub fn type_tag(&self) -> &'static str {
        match self {
            Strategy::SupplyDemand(_) => "SupplyDemand",
            Strategy::Momentum(_) => "Momentum",
            Strategy::MeanReversion(_) => "MeanReversion",
            Strategy::Noise(_) => "Noise",
            Strategy::MarketMaker(_) => "MarketMaker",
            Strategy::CrossEffects(_) => "CrossEffects",
            Strategy::Inventory(_) => "Inventory",
            Strategy::Event(_) => "Event",
        }
    }
}

/// A single trader: shared state plus one strategy.
#[derive(Debug)]
pub struct Agent {
    core: AgentCore,
    strategy: Strategy,
}

impl Agent {
    pub fn new(core: AgentCore, strategy: Strategy) -> Self {
        Self { core, strategy }
    }

    pub fn id(&self) -> AgentId {
        self.core.id()
    }

    pub fn type_tag(&self) -> &'static str {
        self.strategy.type_tag()
    }

    pub fn core(&self) -> &AgentCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut AgentCore {
        &mut self.core
    }

    pub fn is_market_maker(&self) -> bool {
        matches!(self.strategy, Strategy::MarketMaker(_))
    }

    /// One decision per tick; `None` means sit out.
    pub fn decide(&mut self, state: &MarketState, tuning: &AgentTuning) -> Option<Order> {
        match &mut self.strategy {
            Strategy::SupplyDemand(s) => s.decide(&mut self.core, state, tuning),
            Strategy::Momentum(s) => s.decide(&mut self.core, state, tuning),
            Strategy::MeanReversion(s) => s.decide(&mut self.core, state, tuning),
            Strategy::Noise(s) => s.decide(&mut self.core, state, tuning),
            Strategy::MarketMaker(s) => s.decide(&mut self.core, state, tuning),
            Strategy::CrossEffects(s) => s.decide(&mut self.core, state, tuning),
            Strategy::Inventory(s) => s.decide(&mut self.core, state, tuning),
            Strategy::Event(s) => s.decide(&mut self.core, state, tuning),
        }
    }

    /// Apply a fill in which this agent was buyer or seller (or both, when
    /// its own orders crossed).
    pub fn on_fill(&mut self, trade: &Trade) {
        if trade.buyer_id == self.core.id() {
            self.core
                .on_fill(true, &trade.symbol, trade.price, trade.quantity);
        }
        if trade.seller_id == self.core.id() {
            self.core
                .on_fill(false, &trade.symbol, trade.price, trade.quantity);
        }
    }

    /// Route news into the agent's belief state.
    pub fn update_beliefs(&mut self, news: &NewsEvent, tuning: &AgentTuning) {
        match &self.strategy {
            Strategy::Noise(noise) => {
                noise.update_beliefs(&mut self.core, news, &tuning.noise);
            }
            _ => self.core.update_beliefs(news),
        }
    }

    /// Per-tick multiplicative sentiment decay, exponent `tick_scale`.
    pub fn decay_sentiment(&mut self, tick_scale: f64, tuning: &AgentTuning) {
        match &self.strategy {
            Strategy::Noise(noise) => {
                noise.decay_sentiment(&mut self.core, tick_scale, &tuning.noise);
            }
            _ => self.core.decay_sentiment(tick_scale, &tuning.global),
        }
    }
}
