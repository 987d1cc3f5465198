//! Noise trader.
//!
//! Trades at random with a sentiment-tilted direction. Provides baseline
//! liquidity and price discovery. Noise traders overreact: their belief
//! updates carry an extra sensitivity multiplier and they decay sentiment at
//! their own, slower rates.

use news::{NewsEvent, NewsSentiment};
use types::{Order, OrderSide};

use crate::config::{AgentTuning, NoiseConfig};
use crate::core::AgentCore;
use crate::market_state::MarketState;

#[derive(Debug, Clone)]
pub struct NoiseTrader {
    trade_probability: f64,
    sentiment_sensitivity: f64,
}

impl NoiseTrader {
    pub fn new(trade_probability: f64, sentiment_sensitivity: f64) -> Self {
        Self {
            trade_probability,
            sentiment_sensitivity,
        }
    }

    /// Overreacting belief update: every category hits the global bias,
    /// amplified by this trader's sensitivity.
    pub fn update_beliefs(&self, core: &mut AgentCore, news: &NewsEvent, cfg: &NoiseConfig) {
        let impact = news.magnitude
            * core.params().news_weight
            * self.sentiment_sensitivity
            * cfg.overreaction_mult;

        match news.sentiment {
            NewsSentiment::Positive => core.add_sentiment_bias(impact),
            NewsSentiment::Negative => core.add_sentiment_bias(-impact),
            NewsSentiment::Neutral => {}
        }
    }

    /// Noise traders cool off slower than the population default.
    pub fn decay_sentiment(&self, core: &mut AgentCore, tick_scale: f64, cfg: &NoiseConfig) {
        core.decay_sentiment_with(cfg.sentiment_decay, cfg.symbol_sent_decay, tick_scale);
    }

    pub fn decide(
        &mut self,
        core: &mut AgentCore,
        state: &MarketState,
        tuning: &AgentTuning,
    ) -> Option<Order> {
        let cfg = &tuning.noise;

        // Probability gating in place of reaction gating: agitated sentiment
        // raises activity, tick scale keeps arrivals rate-invariant.
        let effective_prob =
            self.trade_probability * (1.0 + core.sentiment_bias().abs()) * state.tick_scale;
        if !core.sample_bool(effective_prob) {
            return None;
        }
        if state.prices.is_empty() {
            return None;
        }

        let symbol = state
            .symbol_at(core.sample_index(state.symbol_count()))?
            .clone();
        let current_price = state.price(&symbol)?;

        let buy_prob = 0.5
            + core.sentiment_bias() * cfg.buy_bias_sent_weight
            + core.sample_normal(0.0, cfg.buy_bias_noise_std);

        if core.sample_bool(buy_prob) {
            let confidence = core.sample_uniform(cfg.confidence_min, cfg.confidence_max);
            let size = core.order_size(current_price, confidence, &tuning.global);

            if size > 0 && core.can_buy(size, current_price, &tuning.global) {
                if core.sample_bool(cfg.market_order_prob) {
                    return Some(core.market_order(&symbol, OrderSide::Buy, size));
                }
                let offset = core.sample_uniform(cfg.limit_offset_min, cfg.limit_offset_max);
                return Some(core.limit_order(
                    &symbol,
                    OrderSide::Buy,
                    current_price * (1.0 + offset),
                    size,
                ));
            }
        } else {
            let position = core.position(&symbol);
            if position > 0 {
                let confidence = core.sample_uniform(cfg.confidence_min, cfg.confidence_max);
                let size = position.min(core.order_size(current_price, confidence, &tuning.global));

                if size > 0 {
                    if core.sample_bool(cfg.market_order_prob) {
                        return Some(core.market_order(&symbol, OrderSide::Sell, size));
                    }
                    let offset = core.sample_uniform(cfg.limit_offset_min, cfg.limit_offset_max);
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
    use crate::testing::{test_core, test_state};
    use news::NewsCategory;
    use types::OrderType;

    fn supply_news(sentiment: NewsSentiment, magnitude: f64) -> NewsEvent {
        NewsEvent {
            id: 1,
            category: NewsCategory::Supply,
            sentiment,
            magnitude,
            symbol: "OIL".into(),
            commodity_name: String::new(),
            subcategory: String::new(),
            headline: String::new(),
            timestamp: 0,
        }
    }

    #[test]
    fn eventually_trades_and_mixes_order_types() {
        let mut core = test_core(1, 100_000.0);
        let tuning = AgentTuning::default();
        let state = test_state(&["OIL"], 100.0);

        let mut trader = NoiseTrader::new(0.5, 0.5);
        let mut orders = Vec::new();
        for _ in 0..500 {
            if let Some(order) = trader.decide(&mut core, &state, &tuning) {
                orders.push(order);
            }
        }
        assert!(!orders.is_empty());
        // Flat book means every order is a buy.
        assert!(orders.iter().all(|o| o.side == OrderSide::Buy));
        // With 500 draws at 10% market-order probability both types appear.
        assert!(orders.iter().any(|o| o.order_type == OrderType::Limit));
        assert!(orders.iter().any(|o| o.order_type == OrderType::Market));
    }

    #[test]
    fn overreaction_scales_with_sensitivity() {
        let mut calm = test_core(2, 100_000.0);
        let mut jumpy = test_core(3, 100_000.0);
        let cfg = NoiseConfig::default();

        let news = supply_news(NewsSentiment::Positive, 0.2);
        NoiseTrader::new(0.1, 0.3).update_beliefs(&mut calm, &news, &cfg);
        NoiseTrader::new(0.1, 0.8).update_beliefs(&mut jumpy, &news, &cfg);

        assert!(jumpy.sentiment_bias() > calm.sentiment_bias());
        assert!(calm.sentiment_bias() > 0.0);
    }

    #[test]
    fn neutral_news_is_ignored() {
        let mut core = test_core(4, 100_000.0);
        let cfg = NoiseConfig::default();
        NoiseTrader::new(0.1, 0.5).update_beliefs(
            &mut core,
            &supply_news(NewsSentiment::Neutral, 0.9),
            &cfg,
        );
        assert_eq!(core.sentiment_bias(), 0.0);
    }

    #[test]
    fn custom_decay_rates_apply() {
        let mut core = test_core(5, 100_000.0);
        core.add_sentiment_bias(1.0);
        let cfg = NoiseConfig::default();

        NoiseTrader::new(0.1, 0.5).decay_sentiment(&mut core, 1.0, &cfg);
        assert!((core.sentiment_bias() - 0.98).abs() < 1e-12);
    }
}
