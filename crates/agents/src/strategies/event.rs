//! Headline chaser.
//!
//! Scans the recent news it has not yet processed and fires a market order
//! at anything with a magnitude over its threshold, then cools down.
//! Deduplication is by stable event id; the processed window holds the last
//! 20 ids, so an event older than that could in principle be acted on twice.

use std::collections::VecDeque;

use news::{NewsCategory, NewsSentiment};
use types::{Order, OrderSide};

use crate::config::AgentTuning;
use crate::core::AgentCore;
use crate::market_state::MarketState;

/// Size of the processed-event id window.
const PROCESSED_WINDOW: usize = 20;

#[derive(Debug, Clone)]
pub struct EventTrader {
    reaction_threshold: f64,
    cooldown_ticks: u32,
    ticks_since_last_trade: u32,
    processed: VecDeque<u64>,
}

impl EventTrader {
    pub fn new(reaction_threshold: f64, cooldown_ticks: u32) -> Self {
        Self {
            reaction_threshold,
            cooldown_ticks,
            // Ready to fire immediately.
            ticks_since_last_trade: cooldown_ticks,
            processed: VecDeque::new(),
        }
    }

    pub fn decide(
        &mut self,
        core: &mut AgentCore,
        state: &MarketState,
        tuning: &AgentTuning,
    ) -> Option<Order> {
        let cfg = &tuning.event;

        self.ticks_since_last_trade = self.ticks_since_last_trade.saturating_add(1);

        if core.gated(cfg.reaction_mult, state.tick_scale) {
            return None;
        }
        if self.ticks_since_last_trade < self.cooldown_ticks {
            return None;
        }
        if state.recent_news.is_empty() || state.prices.is_empty() {
            return None;
        }

        for event in &state.recent_news {
            if self.processed.contains(&event.id) {
                continue;
            }
            self.processed.push_back(event.id);
            while self.processed.len() > PROCESSED_WINDOW {
                self.processed.pop_front();
            }

            if event.magnitude < self.reaction_threshold {
                continue;
            }

            let target_symbol = if event.symbol.is_empty() {
                if event.category == NewsCategory::Global {
                    state
                        .symbol_at(core.sample_index(state.symbol_count()))?
                        .clone()
                } else {
                    continue;
                }
            } else {
                event.symbol.clone()
            };
            let Some(price) = state.price(&target_symbol) else {
                continue;
            };

            let confidence = (event.magnitude / 0.1).min(1.0);

            // Demand up or supply down both mean upward pressure.
            let bullish = event.sentiment == NewsSentiment::Positive
                || (event.category == NewsCategory::Demand
                    && event.sentiment != NewsSentiment::Negative)
                || (event.category == NewsCategory::Supply
                    && event.sentiment == NewsSentiment::Negative);

            if bullish {
                let size = core.order_size(price, confidence, &tuning.global);
                if size > 0 && core.can_buy(size, price, &tuning.global) {
                    self.ticks_since_last_trade = 0;
                    return Some(core.market_order(&target_symbol, OrderSide::Buy, size));
                }
            } else {
                let size = core
                    .max_sellable(&target_symbol)
                    .min(core.order_size(price, confidence, &tuning.global));
                if size > 0 {
                    self.ticks_since_last_trade = 0;
                    return Some(core.market_order(&target_symbol, OrderSide::Sell, size));
                }
            }
        }

        None
    }
}
