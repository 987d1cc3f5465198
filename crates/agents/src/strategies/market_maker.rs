//! Two-sided liquidity provider.
//!
//! Quotes a bid and an ask around every commodity's current price. The
//! spread widens with realised volatility, with the maker's own sentiment
//! agitation, and with the physical supply/demand imbalance; quotes are
//! skewed away from accumulated inventory, with the shift clamped to a
//! quarter of the half-spread so the quoted mid never inverts.

use types::{Order, OrderSide, Volume};

use crate::config::AgentTuning;
use crate::core::AgentCore;
use crate::market_state::MarketState;

/// Periods of price history used for the realised-volatility estimate.
const VOL_PERIODS: usize = 20;

/// Inventory skew shift is bounded to this fraction of the half-spread.
const MAX_SKEW_FRACTION: f64 = 0.25;

#[derive(Debug, Clone)]
pub struct MarketMaker {
    base_spread: f64,
    inventory_skew: f64,
    max_inventory: Volume,
}

impl MarketMaker {
    pub fn new(base_spread: f64, inventory_skew: f64, max_inventory: Volume) -> Self {
        Self {
            base_spread,
            inventory_skew,
            max_inventory,
        }
    }

    pub fn max_inventory(&self) -> Volume {
        self.max_inventory
    }

    /// One random quote from the full two-sided set reaches the book per
    /// tick; over many ticks both sides get refreshed.
    pub fn decide(
        &mut self,
        core: &mut AgentCore,
        state: &MarketState,
        tuning: &AgentTuning,
    ) -> Option<Order> {
        let mut quotes = self.quote_market(core, state, tuning);
        if quotes.is_empty() {
            return None;
        }
        let index = core.sample_index(quotes.len());
        Some(quotes.swap_remove(index))
    }

    /// Build the full quote set: up to one bid and one ask per commodity.
    pub fn quote_market(
        &self,
        core: &mut AgentCore,
        state: &MarketState,
        tuning: &AgentTuning,
    ) -> Vec<Order> {
        let cfg = &tuning.market_maker;
        let mut orders = Vec::new();

        for (symbol, &price) in &state.prices {
            if price <= 0.0 {
                continue;
            }

            // Realised volatility over the last 20 returns, defaulting to 2%
            // with thin history.
            let mut volatility = 0.02;
            if let Some(history) = state.price_history.get(symbol)
                && history.len() > VOL_PERIODS
            {
                let mut sum_sq = 0.0;
                for i in history.len() - VOL_PERIODS..history.len() - 1 {
                    if history[i] > 0.0 {
                        let ret = (history[i + 1] - history[i]) / history[i];
                        sum_sq += ret * ret;
                    }
                }
                volatility = (sum_sq / VOL_PERIODS as f64).sqrt();
            }

            let mut spread = self.base_spread * (1.0 + volatility * cfg.volatility_spread_mult);
            spread *= 1.0 + core.sentiment_bias().abs() * cfg.sentiment_spread_mult;

            // A lopsided physical market is riskier to quote into.
            let imbalance = state
                .supply_demand
                .get(symbol)
                .map(|sd| sd.imbalance())
                .unwrap_or(0.0);
            spread *= 1.0 + 2.0 * imbalance.abs();

            let inventory = core.position(symbol);
            let half_spread = spread * price / 2.0;
            let skew_shift = (inventory as f64 * self.inventory_skew * price)
                .clamp(-MAX_SKEW_FRACTION * half_spread, MAX_SKEW_FRACTION * half_spread);

            let mut bid_price = price - half_spread - skew_shift;
            let mut ask_price = price + half_spread - skew_shift;
            bid_price = bid_price.max(0.01);
            ask_price = ask_price.max(bid_price + 0.01);

            let base_size = ((core.cash() * cfg.quote_capital_frac) / price) as Volume;
            let base_size = base_size.max(1);

            if inventory < self.max_inventory
                && core.can_buy(base_size, bid_price, &tuning.global)
            {
                orders.push(core.limit_order(symbol, OrderSide::Buy, bid_price, base_size));
            }
            // Symmetric liquidity provision: the ask may take the maker short
            // down to -max_inventory.
            if inventory > -self.max_inventory {
                orders.push(core.limit_order(symbol, OrderSide::Sell, ask_price, base_size));
            }
        }

        orders
    }
}
