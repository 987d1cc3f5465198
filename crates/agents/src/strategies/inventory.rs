//! Portfolio rebalancer.
//!
//! Targets an equal-weighted share of total wealth per commodity and trades
//! the single worst-deviated symbol once its deviation clears the threshold.

use types::{Order, OrderSide};

use crate::config::AgentTuning;
use crate::core::AgentCore;
use crate::market_state::MarketState;

#[derive(Debug, Clone)]
pub struct InventoryTrader {
    target_ratio: f64,
    rebalance_threshold: f64,
}

impl InventoryTrader {
    pub fn new(target_ratio: f64, rebalance_threshold: f64) -> Self {
        Self {
            target_ratio,
            rebalance_threshold,
        }
    }

    pub fn decide(
        &mut self,
        core: &mut AgentCore,
        state: &MarketState,
        tuning: &AgentTuning,
    ) -> Option<Order> {
        let cfg = &tuning.inventory;

        if core.gated(cfg.reaction_mult, state.tick_scale) {
            return None;
        }
        if state.prices.is_empty() {
            return None;
        }

        let total_value = core.total_value(&state.prices);
        let target_inventory_value = total_value * self.target_ratio;
        let per_symbol_target = target_inventory_value / state.prices.len() as f64;
        let denom = if total_value > 0.0 { total_value } else { 1.0 };

        let mut best_symbol: Option<&str> = None;
        let mut best_deviation = 0.0f64;
        for (symbol, &price) in &state.prices {
            let position_value = core.position(symbol) as f64 * price;
            let deviation = (position_value - per_symbol_target) / denom;
            if deviation.abs() > best_deviation.abs() {
                best_deviation = deviation;
                best_symbol = Some(symbol);
            }
        }

        if best_deviation.abs() < self.rebalance_threshold {
            return None;
        }
        let symbol = best_symbol?.to_string();
        let price = state.price(&symbol)?;
        let confidence = (best_deviation.abs() / 0.1).min(1.0);
        let size = core.order_size(price, confidence, &tuning.global);

        if best_deviation < 0.0 {
            if size > 0 && core.can_buy(size, price, &tuning.global) {
                let limit = price * (1.0 + core.sample_uniform(0.0, 0.002));
                return Some(core.limit_order(&symbol, OrderSide::Buy, limit, size));
            }
        } else {
            let size = size.min(core.max_sellable(&symbol));
            if size > 0 {
                let limit = price * (1.0 - core.sample_uniform(0.0, 0.002));
                return Some(core.limit_order(&symbol, OrderSide::Sell, limit, size));
            }
        }

        None
    }
}
