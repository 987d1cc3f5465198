//! Moving-average crossover trader.
//!
//! Compares a short and a long SMA on a sampled commodity, tilts the signal
//! with sentiment, and trades when it clears a risk-scaled threshold. The
//! sell branch may open shorts up to the agent's short allowance.

use types::{Order, OrderSide};

use crate::config::AgentTuning;
use crate::core::AgentCore;
use crate::market_state::MarketState;
use crate::strategies::sma;

#[derive(Debug, Clone)]
pub struct MomentumTrader {
    short_period: usize,
    long_period: usize,
}

impl MomentumTrader {
    pub fn new(short_period: usize, long_period: usize) -> Self {
        Self {
            short_period,
            long_period,
        }
    }

    pub fn decide(
        &mut self,
        core: &mut AgentCore,
        state: &MarketState,
        tuning: &AgentTuning,
    ) -> Option<Order> {
        let cfg = &tuning.momentum;

        if core.gated(cfg.reaction_mult, state.tick_scale) {
            return None;
        }
        if state.price_history.is_empty() {
            return None;
        }

        let index = core.sample_index(state.price_history.len());
        let (symbol, history) = state.price_history.iter().nth(index)?;
        if history.len() < self.long_period {
            return None;
        }
        let current_price = state.price(symbol)?;

        let short_ma = sma(history, self.short_period);
        let long_ma = sma(history, self.long_period);
        if short_ma <= 0.0 || long_ma <= 0.0 {
            return None;
        }

        let mut signal = (short_ma - long_ma) / long_ma;
        signal += core.combined_sentiment(symbol) * cfg.commodity_sent_weight
            + core.sentiment_bias() * cfg.global_sent_weight;

        let threshold = cfg.signal_threshold_risk_scale * core.params().risk_aversion;

        if signal > threshold {
            let confidence = (signal.abs() / 0.02).min(1.0);
            let size = core.order_size(current_price, confidence, &tuning.global);

            if size > 0 && core.can_buy(size, current_price, &tuning.global) {
                let offset = core.sample_uniform(cfg.limit_offset_min, cfg.limit_offset_max);
                let symbol = symbol.clone();
                return Some(core.limit_order(
                    &symbol,
                    OrderSide::Buy,
                    current_price * (1.0 + offset),
                    size,
                ));
            }
        } else if signal < -threshold {
            let max_sellable = core.max_sellable(symbol);
            if max_sellable > 0 {
                let confidence = (signal.abs() / 0.02).min(1.0);
                let size =
                    max_sellable.min(core.order_size(current_price, confidence, &tuning.global));

                if size > 0 {
                    let offset = core.sample_uniform(cfg.limit_offset_min, cfg.limit_offset_max);
                    let symbol = symbol.clone();
                    return Some(core.limit_order(
                        &symbol,
                        OrderSide::Sell,
                        current_price * (1.0 - offset),
                        size,
                    ));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_core, test_state_with_history};

    #[test]
    fn uptrend_produces_a_buy() {
        let mut core = test_core(1, 100_000.0);
        let tuning = AgentTuning::default();
        // Rising prices: short MA well above long MA.
        let history: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let state = test_state_with_history(&["OIL"], history);

        let mut trader = MomentumTrader::new(5, 20);
        let order = (0..200).find_map(|_| trader.decide(&mut core, &state, &tuning));
        let order = order.expect("uptrend should produce a buy");
        assert_eq!(order.side, OrderSide::Buy);
    }

    #[test]
    fn downtrend_can_open_a_short() {
        let mut core = test_core(2, 100_000.0);
        let tuning = AgentTuning::default();
        let history: Vec<f64> = (0..40).map(|i| 140.0 - i as f64).collect();
        let state = test_state_with_history(&["OIL"], history);

        let mut trader = MomentumTrader::new(5, 20);
        let order = (0..200).find_map(|_| trader.decide(&mut core, &state, &tuning));
        let order = order.expect("downtrend should produce a sell");
        assert_eq!(order.side, OrderSide::Sell);
        // No position held, so this sell is a short opening.
        assert!(order.quantity <= core.max_short_position());
    }

    #[test]
    fn short_history_is_skipped() {
        let mut core = test_core(3, 100_000.0);
        let tuning = AgentTuning::default();
        let state = test_state_with_history(&["OIL"], vec![100.0; 10]);

        let mut trader = MomentumTrader::new(5, 20);
        assert!(
            (0..100)
                .find_map(|_| trader.decide(&mut core, &state, &tuning))
                .is_none()
        );
    }
}
