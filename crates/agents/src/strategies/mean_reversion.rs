//! Z-score mean reverter.
//!
//! Measures how far the current price sits from its rolling mean in units of
//! rolling standard deviation, tilts by sentiment, and fades the move: sells
//! stretched prices (long positions only) and buys depressed ones.

use types::{Order, OrderSide};

use crate::config::AgentTuning;
use crate::core::AgentCore;
use crate::market_state::MarketState;
use crate::strategies::{rolling_std, sma};

#[derive(Debug, Clone)]
pub struct MeanReversionTrader {
    lookback: usize,
    z_threshold: f64,
}

impl MeanReversionTrader {
    pub fn new(lookback: usize, z_threshold: f64) -> Self {
        Self {
            lookback,
            z_threshold,
        }
    }

    pub fn decide(
        &mut self,
        core: &mut AgentCore,
        state: &MarketState,
        tuning: &AgentTuning,
    ) -> Option<Order> {
        let cfg = &tuning.mean_reversion;

        if core.gated(cfg.reaction_mult, state.tick_scale) {
            return None;
        }
        if state.price_history.is_empty() {
            return None;
        }

        let index = core.sample_index(state.price_history.len());
        let (symbol, history) = state.price_history.iter().nth(index)?;
        if history.len() < self.lookback {
            return None;
        }
        let current_price = state.price(symbol)?;

        let mean = sma(history, self.lookback);
        let std = rolling_std(history, self.lookback, mean);
        if std <= 0.0 {
            return None;
        }

        let mut z_score = (current_price - mean) / std;
        let symbol_sentiment = core.commodity_sentiment().get(symbol).copied().unwrap_or(0.0);
        z_score += symbol_sentiment * cfg.sent_symbol_weight
            + core.sentiment_bias() * cfg.sent_global_weight;

        if z_score > self.z_threshold {
            // Stretched above the mean: unload an existing long.
            let position = core.position(symbol);
            if position > 0 {
                let confidence = ((z_score.abs() - self.z_threshold) / 2.0).min(1.0);
                let size = position.min(core.order_size(current_price, confidence, &tuning.global));

                if size > 0 {
                    let offset = core.sample_uniform(0.0, cfg.limit_price_spread_max);
                    let symbol = symbol.clone();
                    return Some(core.limit_order(
                        &symbol,
                        OrderSide::Sell,
                        current_price * (1.0 - offset),
                        size,
                    ));
                }
            }
        } else if z_score < -self.z_threshold {
            let confidence = ((z_score.abs() - self.z_threshold) / 2.0).min(1.0);
            let size = core.order_size(current_price, confidence, &tuning.global);

            if size > 0 && core.can_buy(size, current_price, &tuning.global) {
                let offset = core.sample_uniform(0.0, cfg.limit_price_spread_max);
                let symbol = symbol.clone();
                return Some(core.limit_order(
                    &symbol,
                    OrderSide::Buy,
                    current_price * (1.0 + offset),
                    size,
                ));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_core, test_state_with_history};

    fn depressed_history() -> Vec<f64> {
        // Stable around 100 with a collapse at the end.
        let mut history = vec![100.0; 30];
        history.extend([99.0, 101.0, 100.0, 99.5, 100.5]);
        history.push(90.0);
        history
    }

    #[test]
    fn depressed_price_triggers_a_buy() {
        let mut core = test_core(1, 100_000.0);
        let tuning = AgentTuning::default();
        let state = test_state_with_history(&["OIL"], depressed_history());

        let mut trader = MeanReversionTrader::new(20, 1.5);
        let order = (0..200).find_map(|_| trader.decide(&mut core, &state, &tuning));
        let order = order.expect("depressed price should produce a buy");
        assert_eq!(order.side, OrderSide::Buy);
    }

    #[test]
    fn stretched_price_sells_only_with_a_long() {
        let tuning = AgentTuning::default();
        let mut history = vec![100.0; 35];
        history.push(112.0);
        let state = test_state_with_history(&["OIL"], history);

        // Flat book: no sell even though z is large.
        let mut core = test_core(2, 100_000.0);
        let mut trader = MeanReversionTrader::new(20, 1.5);
        assert!(
            (0..100)
                .find_map(|_| trader.decide(&mut core, &state, &tuning))
                .is_none()
        );

        // Holding a long: the stretch is sold.
        let mut core = test_core(3, 100_000.0);
        core.on_fill(true, "OIL", 100.0, 50);
        let order = (0..200).find_map(|_| trader.decide(&mut core, &state, &tuning));
        let order = order.expect("long position should be unloaded");
        assert_eq!(order.side, OrderSide::Sell);
        assert!(order.quantity <= 50);
    }

    #[test]
    fn flat_series_has_no_signal() {
        let mut core = test_core(4, 100_000.0);
        let tuning = AgentTuning::default();
        let state = test_state_with_history(&["OIL"], vec![100.0; 40]);

        let mut trader = MeanReversionTrader::new(20, 1.5);
        assert!(
            (0..100)
                .find_map(|_| trader.decide(&mut core, &state, &tuning))
                .is_none()
        );
    }
}
