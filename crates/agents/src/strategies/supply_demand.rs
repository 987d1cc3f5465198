//! Supply/demand fundamentalist.
//!
//! Reads the physical imbalance of a randomly sampled commodity, perturbs it
//! with estimation noise and sentiment, and trades when the estimate clears
//! a risk-scaled threshold.

use types::{Order, OrderSide};

use crate::config::AgentTuning;
use crate::core::AgentCore;
use crate::market_state::MarketState;

#[derive(Debug, Clone)]
pub struct SupplyDemandTrader {
    /// Risk-scaled signal threshold sampled at construction.
    threshold: f64,
    /// Estimation-noise standard deviation sampled at construction.
    noise_std: f64,
}

impl SupplyDemandTrader {
    pub fn new(threshold: f64, noise_std: f64) -> Self {
        Self {
            threshold,
            noise_std,
        }
    }

    pub fn decide(
        &mut self,
        core: &mut AgentCore,
        state: &MarketState,
        tuning: &AgentTuning,
    ) -> Option<Order> {
        let cfg = &tuning.supply_demand;

        if core.gated(cfg.reaction_mult, state.tick_scale) {
            return None;
        }
        if state.prices.is_empty() || state.supply_demand.is_empty() {
            return None;
        }

        let symbol = state
            .symbol_at(core.sample_index(state.symbol_count()))?
            .clone();
        let current_price = state.price(&symbol)?;
        let imbalance = state.supply_demand.get(&symbol)?.imbalance();

        let mut estimate = imbalance + core.sample_normal(0.0, self.noise_std);
        estimate += core.combined_sentiment(&symbol) * cfg.sentiment_impact;

        if estimate > self.threshold {
            let confidence = (estimate.abs() / 0.15).min(1.0);
            let size = core.order_size(current_price, confidence, &tuning.global);

            if size > 0 && core.can_buy(size, current_price, &tuning.global) {
                let limit_price =
                    current_price * (1.0 + core.sample_uniform(0.0, cfg.limit_price_spread_max));
                return Some(core.limit_order(&symbol, OrderSide::Buy, limit_price, size));
            }
        } else if estimate < -self.threshold {
            let max_sellable = core.max_sellable(&symbol);
            if max_sellable > 0 {
                let confidence = (estimate.abs() / 0.15).min(1.0);
                let size =
                    max_sellable.min(core.order_size(current_price, confidence, &tuning.global));

                if size > 0 {
                    let limit_price = current_price
                        * (1.0 - core.sample_uniform(0.0, cfg.limit_price_spread_max));
                    return Some(core.limit_order(&symbol, OrderSide::Sell, limit_price, size));
                }
            }
        }

        None
    }
}
