//! Cross-commodity spillover trader.
//!
//! Watches configured source commodities for price moves against its own
//! cached last prices; when a move clears the threshold it projects the
//! expected spillover onto the linked targets and trades the target if the
//! projection exceeds one percent.

use std::collections::BTreeMap;

use types::{Order, OrderSide, Price, Symbol};

use crate::config::AgentTuning;
use crate::core::AgentCore;
use crate::market_state::MarketState;

#[derive(Debug, Clone)]
pub struct CrossEffectsTrader {
    threshold: f64,
    /// Prices observed on the previous reactive tick, per symbol.
    last_prices: BTreeMap<Symbol, Price>,
}

impl CrossEffectsTrader {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last_prices: BTreeMap::new(),
        }
    }

    fn price_change(&self, symbol: &str, current_price: Price) -> f64 {
        match self.last_prices.get(symbol) {
            Some(&last) if last > 0.0 => (current_price - last) / last,
            _ => 0.0,
        }
    }

    pub fn decide(
        &mut self,
        core: &mut AgentCore,
        state: &MarketState,
        tuning: &AgentTuning,
    ) -> Option<Order> {
        let cfg = &tuning.cross_effects;

        if core.gated(cfg.reaction_mult, state.tick_scale) {
            return None;
        }
        if state.prices.is_empty() || state.cross_effects.is_empty() {
            return None;
        }

        // Detect against the cache from the previous reactive tick, then
        // refresh it.
        let mut decision = None;
        'sources: for (source_symbol, effects) in &state.cross_effects {
            let Some(&source_price) = state.prices.get(source_symbol) else {
                continue;
            };
            let source_change = self.price_change(source_symbol, source_price);
            if source_change.abs() <= self.threshold {
                continue;
            }

            for effect in effects {
                let Some(&target_price) = state.prices.get(&effect.target_symbol) else {
                    continue;
                };
                let expected = source_change * effect.coefficient * cfg.cross_effect_weight;

                if expected > 0.01 {
                    let confidence = (expected / 0.05).min(1.0);
                    let size = core.order_size(target_price, confidence, &tuning.global);
                    if size > 0 && core.can_buy(size, target_price, &tuning.global) {
                        let limit = target_price * (1.0 + core.sample_uniform(0.0, 0.003));
                        decision = Some(core.limit_order(
                            &effect.target_symbol,
                            OrderSide::Buy,
                            limit,
                            size,
                        ));
                        break 'sources;
                    }
                } else if expected < -0.01 {
                    let max_sellable = core.max_sellable(&effect.target_symbol);
                    if max_sellable > 0 {
                        let confidence = (expected.abs() / 0.05).min(1.0);
                        let size = max_sellable
                            .min(core.order_size(target_price, confidence, &tuning.global));
                        if size > 0 {
                            let limit = target_price * (1.0 - core.sample_uniform(0.0, 0.003));
                            decision = Some(core.limit_order(
                                &effect.target_symbol,
                                OrderSide::Sell,
                                limit,
                                size,
                            ));
                            break 'sources;
                        }
                    }
                }
            }
        }

        for (symbol, &price) in &state.prices {
            self.last_prices.insert(symbol.clone(), price);
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_core, test_state};
    use types::CrossEffect;

    fn linked_state(oil_price: f64) -> MarketState {
        let mut state = test_state(&["OIL", "STEEL"], 100.0);
        state.prices.insert("OIL".into(), oil_price);
        state.cross_effects.insert(
            "OIL".into(),
            vec![CrossEffect {
                target_symbol: "STEEL".into(),
                coefficient: 0.5,
            }],
        );
        state
    }

    #[test]
    fn source_jump_buys_the_target() {
        let mut core = test_core(1, 100_000.0);
        let tuning = AgentTuning::default();
        let mut trader = CrossEffectsTrader::new(0.02);

        // Prime the cache at 100, then jump the source 30%.
        let flat = linked_state(100.0);
        for _ in 0..100 {
            assert!(trader.decide(&mut core, &flat, &tuning).is_none());
            if !trader.last_prices.is_empty() {
                break;
            }
        }
        assert!(!trader.last_prices.is_empty(), "cache never primed");

        let jumped = linked_state(130.0);
        let order = (0..200).find_map(|_| {
            // Keep the cache pinned at the pre-jump price for retries: the
            // first reactive tick refreshes it.
            trader.last_prices.insert("OIL".into(), 100.0);
            trader.decide(&mut core, &jumped, &tuning)
        });
        let order = order.expect("30% source move should trade the target");
        assert_eq!(order.symbol, "STEEL");
        assert_eq!(order.side, OrderSide::Buy);
    }

    #[test]
    fn source_crash_sells_the_target() {
        let mut core = test_core(2, 100_000.0);
        let tuning = AgentTuning::default();
        let mut trader = CrossEffectsTrader::new(0.02);

        let crashed = linked_state(70.0);
        let order = (0..200).find_map(|_| {
            trader.last_prices.insert("OIL".into(), 100.0);
            trader.decide(&mut core, &crashed, &tuning)
        });
        let order = order.expect("30% source crash should trade the target");
        assert_eq!(order.symbol, "STEEL");
        assert_eq!(order.side, OrderSide::Sell);
    }

    #[test]
    fn small_moves_are_ignored() {
        let mut core = test_core(3, 100_000.0);
        let tuning = AgentTuning::default();
        let mut trader = CrossEffectsTrader::new(0.02);

        let nudged = linked_state(100.5);
        let order = (0..100).find_map(|_| {
            trader.last_prices.insert("OIL".into(), 100.0);
            trader.decide(&mut core, &nudged, &tuning)
        });
        assert!(order.is_none());
    }
}
