//! Poisson news stream with injection support.
//!
//! Each tick draws `k ~ Poisson(lambda * tick_scale)` events on top of any
//! externally injected ones. The category mix is 15% global, 10% political,
//! 35% supply, 40% demand; supply events lean negative, demand events lean
//! positive. Given a seed and identical inject timing, two runs produce
//! identical sequences.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use types::{Symbol, Timestamp};

use crate::events::{NewsCategory, NewsEvent, NewsSentiment};
use crate::headlines;

/// Streaming ring for SSE consumers.
const MAX_RECENT: usize = 20;
/// Retained history for replay and export.
const MAX_HISTORY: usize = 50_000;

/// Tunables for the news stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewsConfig {
    /// Poisson arrival rate per reference tick.
    pub lambda: f64,
    pub global_impact_std: f64,
    pub political_impact_std: f64,
    pub supply_impact_std: f64,
    pub demand_impact_std: f64,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            lambda: 0.12,
            global_impact_std: 0.02,
            political_impact_std: 0.04,
            supply_impact_std: 0.03,
            demand_impact_std: 0.03,
        }
    }
}

/// Produces the per-tick stream of news events.
pub struct NewsGenerator {
    config: NewsConfig,
    rng: StdRng,
    symbols: Vec<Symbol>,
    symbol_names: Vec<(Symbol, String)>,
    next_id: u64,
    injected: Vec<NewsEvent>,
    recent: VecDeque<NewsEvent>,
    history: VecDeque<NewsEvent>,
}

impl NewsGenerator {
    pub fn new(config: NewsConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            symbols: Vec::new(),
            symbol_names: Vec::new(),
            next_id: 1,
            injected: Vec::new(),
            recent: VecDeque::new(),
            history: VecDeque::new(),
        }
    }

    /// Register the commodities supply/demand events can target.
    pub fn set_commodities(&mut self, commodities: Vec<(Symbol, String)>) {
        self.symbols = commodities.iter().map(|(s, _)| s.clone()).collect();
        self.symbol_names = commodities;
    }

    pub fn config(&self) -> &NewsConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: NewsConfig) {
        self.config = config;
    }

    /// Generate this tick's events: injected ones first (stamped with `now`),
    /// then a Poisson-count batch of random events. Everything generated is
    /// appended to the bounded history.
    pub fn generate(&mut self, now: Timestamp, tick_scale: f64) -> Vec<NewsEvent> {
        let mut events = Vec::new();

        for mut event in std::mem::take(&mut self.injected) {
            event.timestamp = now;
            events.push(event);
        }

        let lambda = self.config.lambda * tick_scale;
        let count = if lambda > 0.0 {
            Poisson::new(lambda)
                .map(|p| p.sample(&mut self.rng) as usize)
                .unwrap_or(0)
        } else {
            0
        };

        for _ in 0..count {
            let r: f64 = self.rng.random_range(0.0..1.0);
            let event = if r < 0.15 {
                Some(self.generate_global(now))
            } else if r < 0.25 {
                Some(self.generate_political(now))
            } else if r < 0.60 {
                (!self.symbols.is_empty()).then(|| self.generate_supply(now))
            } else {
                (!self.symbols.is_empty()).then(|| self.generate_demand(now))
            };
            if let Some(event) = event {
                events.push(event);
            }
        }

        for event in &events {
            self.history.push_back(event.clone());
            while self.history.len() > MAX_HISTORY {
                self.history.pop_front();
            }
        }

        events
    }

    // -- Injection ----------------------------------------------------------

    /// Queue a fully-formed event; its timestamp is stamped on the next
    /// `generate` and a stable id is assigned if absent.
    pub fn inject(&mut self, mut event: NewsEvent) {
        if event.id == 0 {
            event.id = self.take_id();
        }
        if event.headline.is_empty() {
            let name = self.display_name(&event.symbol).to_string();
            event.headline =
                headlines::compose(&mut self.rng, event.category, event.sentiment, &name);
        }
        self.injected.push(event);
    }

    pub fn inject_global(&mut self, sentiment: NewsSentiment, magnitude: f64, headline: String) {
        self.inject_simple(NewsCategory::Global, String::new(), sentiment, magnitude, headline);
    }

    pub fn inject_political(&mut self, sentiment: NewsSentiment, magnitude: f64, headline: String) {
        self.inject_simple(
            NewsCategory::Political,
            String::new(),
            sentiment,
            magnitude,
            headline,
        );
    }

    pub fn inject_supply(
        &mut self,
        symbol: impl Into<Symbol>,
        sentiment: NewsSentiment,
        magnitude: f64,
        headline: String,
    ) {
        self.inject_simple(NewsCategory::Supply, symbol.into(), sentiment, magnitude, headline);
    }

    pub fn inject_demand(
        &mut self,
        symbol: impl Into<Symbol>,
        sentiment: NewsSentiment,
        magnitude: f64,
        headline: String,
    ) {
        self.inject_simple(NewsCategory::Demand, symbol.into(), sentiment, magnitude, headline);
    }

    fn inject_simple(
        &mut self,
        category: NewsCategory,
        symbol: Symbol,
        sentiment: NewsSentiment,
        magnitude: f64,
        headline: String,
    ) {
        let name = self.display_name(&symbol).to_string();
        let headline = if headline.is_empty() {
            headlines::compose(&mut self.rng, category, sentiment, &name)
        } else {
            headline
        };

        let event = NewsEvent {
            id: self.take_id(),
            category,
            sentiment,
            magnitude: magnitude.clamp(0.0, 1.0),
            symbol,
            commodity_name: name,
            subcategory: "injected".to_string(),
            headline,
            timestamp: 0,
        };
        self.injected.push(event);
    }

    // -- History ------------------------------------------------------------

    /// Up to the last `count` events seen by streaming consumers.
    pub fn recent_news(&self, count: usize) -> Vec<NewsEvent> {
        let start = self.recent.len().saturating_sub(count);
        self.recent.iter().skip(start).cloned().collect()
    }

    /// Feed the streaming ring; the engine calls this for every dispatched
    /// event so injected and generated news appear alike.
    pub fn add_to_recent(&mut self, event: NewsEvent) {
        self.recent.push_back(event);
        while self.recent.len() > MAX_RECENT {
            self.recent.pop_front();
        }
    }

    pub fn history(&self) -> &VecDeque<NewsEvent> {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.recent.clear();
    }

    // -- Random event builders ----------------------------------------------

    fn generate_global(&mut self, now: Timestamp) -> NewsEvent {
        let r: f64 = self.rng.random_range(0.0..1.0);
        let sentiment = if r < 0.40 {
            NewsSentiment::Positive
        } else if r < 0.70 {
            NewsSentiment::Negative
        } else {
            NewsSentiment::Neutral
        };
        let magnitude = self.abs_normal(self.config.global_impact_std);
        self.build(NewsCategory::Global, sentiment, magnitude, String::new(), "economic", now)
    }

    fn generate_political(&mut self, now: Timestamp) -> NewsEvent {
        let r: f64 = self.rng.random_range(0.0..1.0);
        let sentiment = if r < 0.35 {
            NewsSentiment::Positive
        } else if r < 0.65 {
            NewsSentiment::Negative
        } else {
            NewsSentiment::Neutral
        };
        let magnitude = self.abs_normal(self.config.political_impact_std);
        self.build(NewsCategory::Political, sentiment, magnitude, String::new(), "political", now)
    }

    fn generate_supply(&mut self, now: Timestamp) -> NewsEvent {
        let symbol = self.pick_symbol();
        let r: f64 = self.rng.random_range(0.0..1.0);
        // Supply news leans negative: disruptions outnumber windfalls.
        let sentiment = if r < 0.45 {
            NewsSentiment::Negative
        } else if r < 0.55 {
            NewsSentiment::Positive
        } else {
            NewsSentiment::Neutral
        };
        let magnitude = self.abs_normal(self.config.supply_impact_std);
        let subcategory = ["production", "logistics", "inventory", "weather"]
            [self.rng.random_range(0..4)];
        self.build(NewsCategory::Supply, sentiment, magnitude, symbol, subcategory, now)
    }

    fn generate_demand(&mut self, now: Timestamp) -> NewsEvent {
        let symbol = self.pick_symbol();
        let r: f64 = self.rng.random_range(0.0..1.0);
        // Demand news leans positive: growth stories dominate.
        let sentiment = if r < 0.45 {
            NewsSentiment::Positive
        } else if r < 0.55 {
            NewsSentiment::Negative
        } else {
            NewsSentiment::Neutral
        };
        let magnitude = self.abs_normal(self.config.demand_impact_std);
        let subcategory = ["consumption", "industrial", "seasonal", "export"]
            [self.rng.random_range(0..4)];
        self.build(NewsCategory::Demand, sentiment, magnitude, symbol, subcategory, now)
    }

    fn build(
        &mut self,
        category: NewsCategory,
        sentiment: NewsSentiment,
        magnitude: f64,
        symbol: Symbol,
        subcategory: &str,
        now: Timestamp,
    ) -> NewsEvent {
        let name = self.display_name(&symbol).to_string();
        let headline = headlines::compose(&mut self.rng, category, sentiment, &name);
        NewsEvent {
            id: self.take_id(),
            category,
            sentiment,
            magnitude,
            symbol,
            commodity_name: name,
            subcategory: subcategory.to_string(),
            headline,
            timestamp: now,
        }
    }

    fn pick_symbol(&mut self) -> Symbol {
        self.symbols[self.rng.random_range(0..self.symbols.len())].clone()
    }

    fn display_name<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.symbol_names
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, n)| n.as_str())
            .unwrap_or(symbol)
    }

    fn abs_normal(&mut self, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return 0.0;
        }
        Normal::new(0.0, std_dev)
            .map(|n| n.sample(&mut self.rng).abs())
            .unwrap_or(0.0)
    }

    fn take_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(seed: u64) -> NewsGenerator {
        let mut generator = NewsGenerator::new(NewsConfig::default(), seed);
        generator.set_commodities(vec![
            ("OIL".to_string(), "Crude Oil".to_string()),
            ("GRAIN".to_string(), "Grain".to_string()),
        ]);
        generator
    }

    #[test]
    fn deterministic_under_fixed_seed() {
        let mut a = generator(42);
        let mut b = generator(42);

        for tick in 0..500u64 {
            let ea = a.generate(tick * 1200, 1.0);
            let eb = b.generate(tick * 1200, 1.0);
            assert_eq!(ea, eb, "tick {} diverged", tick);
        }
    }

    #[test]
    fn arrival_count_scales_with_tick_scale() {
        // Same simulated duration at two tick rates should produce a similar
        // total event count: lambda scales by tick_scale.
        let mut coarse = generator(7);
        let mut coarse_count = 0usize;
        for tick in 0..10_000u64 {
            coarse_count += coarse.generate(tick, 1.0).len();
        }

        let mut fine = generator(9);
        let scale = 1.0 / 360.0;
        let mut fine_count = 0usize;
        for tick in 0..3_600_000u64 {
            fine_count += fine.generate(tick, scale).len();
        }

        let expected = 0.12 * 10_000.0;
        assert!(
            (coarse_count as f64 - expected).abs() < expected * 0.15,
            "coarse count {} too far from {}",
            coarse_count,
            expected
        );
        assert!(
            (fine_count as f64 - expected).abs() < expected * 0.15,
            "fine count {} too far from {}",
            fine_count,
            expected
        );
    }

    #[test]
    fn injected_events_come_out_first_with_timestamp() {
        let mut generator = generator(3);
        generator.inject_supply("OIL", NewsSentiment::Negative, 0.2, String::new());

        let events = generator.generate(5000, 1.0);
        assert!(!events.is_empty());
        let first = &events[0];
        assert_eq!(first.category, NewsCategory::Supply);
        assert_eq!(first.symbol, "OIL");
        assert_eq!(first.timestamp, 5000);
        assert!(first.id > 0);
        assert!(first.headline.contains("Crude Oil"));

        // Queue drained.
        let again = generator.generate(6000, 0.0);
        assert!(again.is_empty());
    }

    #[test]
    fn raw_injection_fills_id_and_headline() {
        let mut generator = generator(21);
        generator.inject(NewsEvent {
            id: 0,
            category: NewsCategory::Demand,
            sentiment: NewsSentiment::Positive,
            magnitude: 0.3,
            symbol: "GRAIN".into(),
            commodity_name: String::new(),
            subcategory: "harvest".into(),
            headline: String::new(),
            timestamp: 0,
        });

        let events = generator.generate(1000, 0.0);
        assert_eq!(events.len(), 1);
        assert!(events[0].id > 0);
        assert!(events[0].headline.contains("Grain"));
        assert_eq!(events[0].subcategory, "harvest");
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut generator = generator(11);
        let mut last_id = 0;
        for tick in 0..2000u64 {
            for event in generator.generate(tick, 1.0) {
                assert!(event.id > last_id);
                last_id = event.id;
            }
        }
    }

    #[test]
    fn recent_ring_is_bounded() {
        let mut generator = generator(5);
        for i in 0..50 {
            generator.add_to_recent(NewsEvent {
                id: i,
                category: NewsCategory::Global,
                sentiment: NewsSentiment::Neutral,
                magnitude: 0.1,
                symbol: String::new(),
                commodity_name: String::new(),
                subcategory: String::new(),
                headline: String::new(),
                timestamp: 0,
            });
        }
        assert_eq!(generator.recent_news(100).len(), 20);
        assert_eq!(generator.recent_news(5).len(), 5);
        // Oldest evicted first.
        assert_eq!(generator.recent_news(20)[0].id, 30);
    }

    #[test]
    fn commodity_events_pick_registered_symbols() {
        let mut generator = generator(13);
        for tick in 0..2000u64 {
            for event in generator.generate(tick, 1.0) {
                if event.is_commodity_news() {
                    assert!(event.symbol == "OIL" || event.symbol == "GRAIN");
                    assert!(event.magnitude >= 0.0);
                } else {
                    assert!(event.symbol.is_empty());
                }
            }
        }
    }
}
