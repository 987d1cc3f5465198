//! Shared agent state: cash, portfolio, sentiment, and the risk/sizing
//! helpers every strategy goes through.

use rand::Rng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::collections::BTreeMap;

use news::{NewsCategory, NewsEvent};
use types::{AgentId, AgentParams, Order, OrderSide, Position, Price, Symbol, Volume};

use crate::config::AgentGlobalConfig;

/// Fraction of per-commodity sentiment contributed by the global bias.
const GLOBAL_SENTIMENT_BLEND: f64 = 0.3;

/// Spillover from commodity news onto the global bias.
const COMMODITY_NEWS_SPILLOVER: f64 = 0.2;

/// Cash, portfolio, belief state, and sampled parameters shared by every
/// strategy variant.
#[derive(Debug)]
pub struct AgentCore {
    id: AgentId,
    cash: f64,
    initial_cash: f64,
    portfolio: BTreeMap<Symbol, Position>,
    params: AgentParams,
    /// Global/political sentiment carried by this agent.
    sentiment_bias: f64,
    /// Per-commodity sentiment from supply/demand news.
    commodity_sentiment: BTreeMap<Symbol, f64>,
    max_short_position: Volume,
    rng: StdRng,
}

impl AgentCore {
    pub fn new(
        id: AgentId,
        initial_cash: f64,
        params: AgentParams,
        max_short_position: Volume,
        rng: StdRng,
    ) -> Self {
        Self {
            id,
            cash: initial_cash,
            initial_cash,
            portfolio: BTreeMap::new(),
            params,
            sentiment_bias: 0.0,
            commodity_sentiment: BTreeMap::new(),
            max_short_position,
            rng,
        }
    }

    // -- Accessors ----------------------------------------------------------

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn portfolio(&self) -> &BTreeMap<Symbol, Position> {
        &self.portfolio
    }

    pub fn sentiment_bias(&self) -> f64 {
        self.sentiment_bias
    }

    pub fn commodity_sentiment(&self) -> &BTreeMap<Symbol, f64> {
        &self.commodity_sentiment
    }

    pub fn max_short_position(&self) -> Volume {
        self.max_short_position
    }

    /// Signed position in one commodity; zero when absent.
    pub fn position(&self, symbol: &str) -> Volume {
        self.portfolio.get(symbol).map_or(0, |p| p.quantity)
    }

    /// Mark-to-market value of all holdings at the given prices.
    pub fn portfolio_value(&self, prices: &BTreeMap<Symbol, Price>) -> f64 {
        self.portfolio
            .iter()
            .filter_map(|(symbol, pos)| prices.get(symbol).map(|p| pos.quantity as f64 * p))
            .sum()
    }

    /// Cash plus mark-to-market holdings.
    pub fn total_value(&self, prices: &BTreeMap<Symbol, Price>) -> f64 {
        self.cash + self.portfolio_value(prices)
    }

    // -- Risk helpers -------------------------------------------------------

    /// A buy must not push cash below `initial_cash * cash_reserve`.
    pub fn can_buy(&self, quantity: Volume, price: Price, global: &AgentGlobalConfig) -> bool {
        let cost = price * quantity as f64;
        let reserve = self.initial_cash * global.cash_reserve;
        self.cash >= cost + reserve
    }

    /// Units sellable right now: current position plus the allowed short.
    pub fn max_sellable(&self, symbol: &str) -> Volume {
        (self.position(symbol) + self.max_short_position).max(0)
    }

    /// Shared sizing rule:
    /// `clamp(1, max_order_size, floor(cash * min(capital_fraction /
    /// risk_aversion * confidence, 0.05) / price))`. Returns 0 when price or
    /// cash are non-positive, which callers treat as "no order".
    pub fn order_size(&self, price: Price, confidence: f64, global: &AgentGlobalConfig) -> Volume {
        if price <= 0.0 || self.cash <= 0.0 {
            return 0;
        }

        let capital_fraction = global.capital_fraction / self.params.risk_aversion;
        let size_factor = capital_fraction * confidence;
        let max_spend = self.cash * size_factor.min(0.05);
        let size = (max_spend / price) as Volume;

        size.min(global.max_order_size).max(1)
    }

    /// Reaction gating: true when this tick should be skipped. Scaling the
    /// pass probability by `tick_scale` keeps order arrival rates invariant
    /// to the tick rate.
    pub fn gated(&mut self, strategy_mult: f64, tick_scale: f64) -> bool {
        let u: f64 = self.rng.random_range(0.0..1.0);
        u > self.params.reaction_speed * strategy_mult * tick_scale
    }

    // -- Sentiment ----------------------------------------------------------

    /// Default belief update: global and political news shift the global
    /// bias; supply and demand news shift the target commodity's sentiment
    /// with a partial spillover onto the global bias.
    pub fn update_beliefs(&mut self, news: &NewsEvent) {
        let signed = news.signed_magnitude() * self.params.news_weight;

        match news.category {
            NewsCategory::Global | NewsCategory::Political => {
                self.sentiment_bias += signed;
            }
            NewsCategory::Supply | NewsCategory::Demand => {
                if !news.symbol.is_empty() {
                    *self
                        .commodity_sentiment
                        .entry(news.symbol.clone())
                        .or_insert(0.0) += signed;
                }
                self.sentiment_bias += signed * COMMODITY_NEWS_SPILLOVER;
            }
        }
    }

    /// Multiplicative decay of every sentiment level, exponent `tick_scale`.
    pub fn decay_sentiment(&mut self, tick_scale: f64, global: &AgentGlobalConfig) {
        self.decay_sentiment_with(
            global.sentiment_decay_global,
            global.sentiment_decay_symbol,
            tick_scale,
        );
    }

    /// Decay with explicit rates; noise traders use their own.
    pub fn decay_sentiment_with(&mut self, global_rate: f64, symbol_rate: f64, tick_scale: f64) {
        self.sentiment_bias *= global_rate.powf(tick_scale);
        let factor = symbol_rate.powf(tick_scale);
        for value in self.commodity_sentiment.values_mut() {
            *value *= factor;
        }
    }

    /// Sentiment toward one commodity: its own sentiment plus a fraction of
    /// the global bias.
    pub fn combined_sentiment(&self, symbol: &str) -> f64 {
        self.commodity_sentiment.get(symbol).copied().unwrap_or(0.0)
            + self.sentiment_bias * GLOBAL_SENTIMENT_BLEND
    }

    pub fn add_sentiment_bias(&mut self, delta: f64) {
        self.sentiment_bias += delta;
    }

    // -- Fills & bootstrap --------------------------------------------------

    /// Apply a fill: buyers pay cash and blend average cost; sellers receive
    /// cash. Zero-quantity positions are erased; negative positions (shorts)
    /// are kept.
    pub fn on_fill(&mut self, is_buyer: bool, symbol: &str, price: Price, quantity: Volume) {
        let cost = price * quantity as f64;

        if is_buyer {
            self.cash -= cost;
            let pos = self
                .portfolio
                .entry(symbol.to_string())
                .or_insert_with(|| Position::new(symbol));
            let total_cost = pos.avg_cost * pos.quantity as f64 + cost;
            pos.quantity += quantity;
            pos.avg_cost = if pos.quantity > 0 {
                total_cost / pos.quantity as f64
            } else {
                0.0
            };
        } else {
            self.cash += cost;
            let remaining = {
                let pos = self
                    .portfolio
                    .entry(symbol.to_string())
                    .or_insert_with(|| Position::new(symbol));
                pos.quantity -= quantity;
                pos.quantity
            };
            if remaining == 0 {
                self.portfolio.remove(symbol);
            }
        }
    }

    /// Seed inventory at init time without a cash debit (market-maker
    /// bootstrap only).
    pub fn seed_inventory(&mut self, symbol: &str, quantity: Volume, price: Price) {
        let pos = self
            .portfolio
            .entry(symbol.to_string())
            .or_insert_with(|| Position::new(symbol));
        pos.quantity += quantity;
        pos.avg_cost = price;
    }

    // -- Order construction & sampling --------------------------------------

    pub fn limit_order(
        &self,
        symbol: &str,
        side: OrderSide,
        price: Price,
        quantity: Volume,
    ) -> Order {
        Order::limit(self.id, symbol, side, price, quantity)
    }

    pub fn market_order(&self, symbol: &str, side: OrderSide, quantity: Volume) -> Order {
        Order::market(self.id, symbol, side, quantity)
    }

    pub fn sample_uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..high)
    }

    pub fn sample_index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }

    pub fn sample_normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return mean;
        }
        Normal::new(mean, std_dev)
            .map(|n| n.sample(&mut self.rng))
            .unwrap_or(mean)
    }

    pub fn sample_bool(&mut self, probability: f64) -> bool {
        let u: f64 = self.rng.random_range(0.0..1.0);
        u < probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use news::NewsSentiment;
    use rand::SeedableRng;

    fn core(cash: f64) -> AgentCore {
        AgentCore::new(
            AgentId(1),
            cash,
            AgentParams::default(),
            200,
            StdRng::seed_from_u64(1),
        )
    }

    fn news(category: NewsCategory, sentiment: NewsSentiment, magnitude: f64) -> NewsEvent {
        NewsEvent {
            id: 1,
            category,
            sentiment,
            magnitude,
            symbol: if matches!(category, NewsCategory::Supply | NewsCategory::Demand) {
                "OIL".into()
            } else {
                String::new()
            },
            commodity_name: String::new(),
            subcategory: String::new(),
            headline: String::new(),
            timestamp: 0,
        }
    }

    #[test]
    fn buy_fill_blends_average_cost() {
        let mut core = core(10_000.0);
        core.on_fill(true, "OIL", 100.0, 10);
        core.on_fill(true, "OIL", 110.0, 10);

        assert_eq!(core.position("OIL"), 20);
        assert!((core.cash() - (10_000.0 - 2_100.0)).abs() < 1e-9);
        assert!((core.portfolio()["OIL"].avg_cost - 105.0).abs() < 1e-9);
    }

    #[test]
    fn sell_fill_erases_flat_positions() {
        let mut core = core(10_000.0);
        core.on_fill(true, "OIL", 100.0, 10);
        core.on_fill(false, "OIL", 105.0, 10);

        assert_eq!(core.position("OIL"), 0);
        assert!(core.portfolio().is_empty());
        assert!((core.cash() - 10_050.0).abs() < 1e-9);
    }

    #[test]
    fn shorts_are_kept_as_negative_positions() {
        let mut core = core(10_000.0);
        core.on_fill(false, "OIL", 100.0, 5);
        assert_eq!(core.position("OIL"), -5);
        assert!((core.cash() - 10_500.0).abs() < 1e-9);
    }

    #[test]
    fn cash_reserve_blocks_deep_buys() {
        let core = core(1_000.0);
        let global = AgentGlobalConfig::default();
        // Reserve is 100; a 950 cost order must be rejected.
        assert!(!core.can_buy(95, 10.0, &global));
        assert!(core.can_buy(80, 10.0, &global));
    }

    #[test]
    fn max_sellable_includes_short_allowance() {
        let mut core = core(10_000.0);
        assert_eq!(core.max_sellable("OIL"), 200);
        core.on_fill(true, "OIL", 100.0, 50);
        assert_eq!(core.max_sellable("OIL"), 250);
    }

    #[test]
    fn order_size_is_clamped() {
        let core = core(100_000.0);
        let global = AgentGlobalConfig::default();

        // min(0.05/1.0 * 1.0, 0.05) * 100k / 10 = 500
        assert_eq!(core.order_size(10.0, 1.0, &global), 500);
        // Tiny confidence still yields at least one unit.
        assert_eq!(core.order_size(10.0, 1e-9, &global), 1);
        // Invalid inputs give zero.
        assert_eq!(core.order_size(0.0, 1.0, &global), 0);
    }

    #[test]
    fn commodity_news_spills_over_to_global() {
        let mut core = core(10_000.0);
        core.update_beliefs(&news(NewsCategory::Supply, NewsSentiment::Negative, 0.2));

        assert!((core.commodity_sentiment()["OIL"] + 0.2).abs() < 1e-9);
        assert!((core.sentiment_bias() + 0.04).abs() < 1e-9);
    }

    #[test]
    fn global_news_moves_bias_only() {
        let mut core = core(10_000.0);
        core.update_beliefs(&news(NewsCategory::Global, NewsSentiment::Positive, 0.1));

        assert!((core.sentiment_bias() - 0.1).abs() < 1e-9);
        assert!(core.commodity_sentiment().is_empty());
    }

    #[test]
    fn neutral_news_has_no_belief_impact() {
        let mut core = core(10_000.0);
        core.update_beliefs(&news(NewsCategory::Global, NewsSentiment::Neutral, 0.5));
        assert_eq!(core.sentiment_bias(), 0.0);
    }

    #[test]
    fn decay_is_raised_to_tick_scale() {
        let mut core = core(10_000.0);
        core.update_beliefs(&news(NewsCategory::Global, NewsSentiment::Positive, 1.0));
        let global = AgentGlobalConfig::default();

        let before = core.sentiment_bias();
        core.decay_sentiment(2.0, &global);
        assert!((core.sentiment_bias() - before * 0.95f64.powf(2.0)).abs() < 1e-12);
    }

    #[test]
    fn combined_sentiment_blends_global() {
        let mut core = core(10_000.0);
        core.update_beliefs(&news(NewsCategory::Supply, NewsSentiment::Positive, 0.1));
        core.add_sentiment_bias(0.5);

        let expected = 0.1 + (0.02 + 0.5) * 0.3;
        assert!((core.combined_sentiment("OIL") - expected).abs() < 1e-9);
    }

    #[test]
    fn seeded_inventory_costs_no_cash() {
        let mut core = core(10_000.0);
        core.seed_inventory("OIL", 100, 75.0);
        assert_eq!(core.position("OIL"), 100);
        assert_eq!(core.cash(), 10_000.0);
        assert_eq!(core.portfolio()["OIL"].avg_cost, 75.0);
    }
}
