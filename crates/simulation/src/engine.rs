//! The market engine: owns commodities, order books, agents, clock, news
//! generator, and the cross-effects table, and drives the per-tick pipeline.
//!
//! Pipeline per tick:
//! 1. advance the simulated clock;
//! 2. on a new simulated day, reset daily volume and circuit breakers and
//!    mark day-open prices;
//! 3. generate news (Poisson + injected);
//! 4. dispatch each event to every agent, to the target commodity's
//!    supply/demand state, or to the global sentiment;
//! 5. decay agent sentiment and the global sentiment;
//! 6. mean-revert supply/demand with scaled noise;
//! 7. collect one decision per agent and route orders into the books;
//! 8. match every book;
//! 9. per trade: log, tag agent types, update stats, deliver fills, apply
//!    dampened price impact.

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeMap, HashMap, VecDeque};
use tracing::{debug, info, trace};

use agents::{Agent, AgentTuning, MarketState};
use news::{NewsCategory, NewsEvent, NewsGenerator};
use sim_core::{Commodity, OrderBook, Result, SimClock, SimCoreError};
use storage::CandleAggregator;
use types::{
    AgentId, AgentTypeStats, CrossEffect, Order, OrderId, OrderSide, OrderType, Symbol, Trade,
    Volume,
};

/// Trade log ring size.
const MAX_RECENT_TRADES: usize = 1000;
/// Recent-news ring exposed to agents.
const MAX_RECENT_NEWS: usize = 20;
/// Per-tick multiplicative decay of the global sentiment, at reference rate.
const GLOBAL_SENTIMENT_DECAY: f64 = 0.95;
/// Additive weight of global/political news on the global sentiment.
const GLOBAL_NEWS_SENTIMENT_SCALE: f64 = 0.3;

pub type TradeCallback = Box<dyn Fn(&Trade) + Send + Sync>;
pub type NewsCallback = Box<dyn Fn(&NewsEvent) + Send + Sync>;

/// Aggregate run metrics.
#[derive(Debug, Clone, Default)]
pub struct SimulationMetrics {
    pub total_ticks: u64,
    pub total_trades: u64,
    pub total_orders: u64,
    pub avg_spread: f64,
    /// Last one-period return per symbol.
    pub returns: BTreeMap<Symbol, f64>,
}

pub struct MarketEngine {
    commodities: BTreeMap<Symbol, Commodity>,
    books: BTreeMap<Symbol, OrderBook>,
    agents: Vec<Agent>,
    agent_index: HashMap<AgentId, usize>,
    agent_types: HashMap<AgentId, String>,
    clock: SimClock,
    news: NewsGenerator,
    candles: CandleAggregator,
    cross_effects: BTreeMap<Symbol, Vec<CrossEffect>>,
    tuning: AgentTuning,
    order_expiry_ms: u64,

    global_sentiment: f64,
    recent_news: VecDeque<NewsEvent>,
    recent_trades: VecDeque<Trade>,
    agent_type_stats: BTreeMap<String, AgentTypeStats>,
    /// Traded volume per symbol on the current tick, for candle feeding.
    tick_volumes: BTreeMap<Symbol, Volume>,
    /// Traded volume per symbol on the most recently completed tick.
    last_tick_volumes: BTreeMap<Symbol, Volume>,

    total_ticks: u64,
    total_trades: u64,
    total_orders: u64,

    rng: StdRng,
    trade_callback: Option<TradeCallback>,
    news_callback: Option<NewsCallback>,
}

impl MarketEngine {
    pub fn new(seed: u64) -> Self {
        Self {
            commodities: BTreeMap::new(),
            books: BTreeMap::new(),
            agents: Vec::new(),
            agent_index: HashMap::new(),
            agent_types: HashMap::new(),
            clock: SimClock::new(),
            news: NewsGenerator::new(news::NewsConfig::default(), seed.wrapping_add(1)),
            candles: CandleAggregator::new(),
            cross_effects: BTreeMap::new(),
            tuning: AgentTuning::default(),
            order_expiry_ms: 172_800_000,
            global_sentiment: 0.0,
            recent_news: VecDeque::new(),
            recent_trades: VecDeque::new(),
            agent_type_stats: BTreeMap::new(),
            tick_volumes: BTreeMap::new(),
            last_tick_volumes: BTreeMap::new(),
            total_ticks: 0,
            total_trades: 0,
            total_orders: 0,
            rng: StdRng::seed_from_u64(seed),
            trade_callback: None,
            news_callback: None,
        }
    }

    // -- Configuration ------------------------------------------------------

    pub fn set_tuning(&mut self, tuning: AgentTuning) {
        self.tuning = tuning;
    }

    pub fn tuning(&self) -> &AgentTuning {
        &self.tuning
    }

    pub fn set_news_config(&mut self, config: news::NewsConfig) {
        self.news.set_config(config);
    }

    /// Applies to existing books and to books created later.
    pub fn set_order_expiry_ms(&mut self, ms: u64) {
        self.order_expiry_ms = ms;
        for book in self.books.values() {
            book.set_max_order_age_ms(ms);
        }
    }

    pub fn set_trade_callback(&mut self, callback: TradeCallback) {
        self.trade_callback = Some(callback);
    }

    pub fn set_news_callback(&mut self, callback: NewsCallback) {
        self.news_callback = Some(callback);
    }

    // -- Ownership ----------------------------------------------------------

    /// Register a commodity: creates its order book and candle track, and
    /// refreshes the news generator's target list.
    pub fn add_commodity(&mut self, commodity: Commodity) {
        let symbol = commodity.symbol().to_string();

        let book = OrderBook::new(symbol.clone(), self.clock.handle());
        book.set_max_order_age_ms(self.order_expiry_ms);
        self.books.insert(symbol.clone(), book);

        self.candles.add_symbol(symbol.clone());
        self.tick_volumes.insert(symbol.clone(), 0);

        info!(symbol = %symbol, category = commodity.category(), "added commodity");
        self.commodities.insert(symbol, commodity);

        let targets: Vec<(Symbol, String)> = self
            .commodities
            .values()
            .map(|c| (c.symbol().to_string(), c.name().to_string()))
            .collect();
        self.news.set_commodities(targets);
    }

    pub fn set_cross_effects(&mut self, source: impl Into<Symbol>, effects: Vec<CrossEffect>) {
        self.cross_effects.insert(source.into(), effects);
    }

    pub fn add_agents(&mut self, new_agents: Vec<Agent>) {
        for agent in new_agents {
            self.agent_types
                .insert(agent.id(), agent.type_tag().to_string());
            self.agent_index.insert(agent.id(), self.agents.len());
            self.agents.push(agent);
        }
        info!(total = self.agents.len(), "agent population updated");
    }

    // -- Accessors ----------------------------------------------------------

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut SimClock {
        &mut self.clock
    }

    pub fn news(&self) -> &NewsGenerator {
        &self.news
    }

    pub fn news_mut(&mut self) -> &mut NewsGenerator {
        &mut self.news
    }

    pub fn candles(&self) -> &CandleAggregator {
        &self.candles
    }

    pub fn commodities(&self) -> &BTreeMap<Symbol, Commodity> {
        &self.commodities
    }

    pub fn commodities_mut(&mut self) -> &mut BTreeMap<Symbol, Commodity> {
        &mut self.commodities
    }

    /// Traded volume of a symbol on the most recently completed tick.
    pub fn last_tick_volume(&self, symbol: &str) -> Volume {
        self.last_tick_volumes.get(symbol).copied().unwrap_or(0)
    }

    pub fn commodity(&self, symbol: &str) -> Option<&Commodity> {
        self.commodities.get(symbol)
    }

    pub fn order_book(&self, symbol: &str) -> Option<&OrderBook> {
        self.books.get(symbol)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn global_sentiment(&self) -> f64 {
        self.global_sentiment
    }

    pub fn recent_trades(&self) -> &VecDeque<Trade> {
        &self.recent_trades
    }

    pub fn recent_news(&self) -> &VecDeque<NewsEvent> {
        &self.recent_news
    }

    pub fn agent_type_stats(&self) -> &BTreeMap<String, AgentTypeStats> {
        &self.agent_type_stats
    }

    pub fn metrics(&self) -> SimulationMetrics {
        let mut sum_spread = 0.0;
        let mut spread_count = 0u32;
        for book in self.books.values() {
            let spread = book.spread();
            if spread > 0.0 {
                sum_spread += spread;
                spread_count += 1;
            }
        }

        SimulationMetrics {
            total_ticks: self.total_ticks,
            total_trades: self.total_trades,
            total_orders: self.total_orders,
            avg_spread: if spread_count > 0 {
                sum_spread / spread_count as f64
            } else {
                0.0
            },
            returns: self
                .commodities
                .iter()
                .map(|(symbol, c)| (symbol.clone(), c.get_return(1)))
                .collect(),
        }
    }

    // -- The tick pipeline --------------------------------------------------

    pub fn tick(&mut self) {
        self.total_ticks += 1;

        // 1. Advance simulated time.
        self.clock.tick();
        let now = self.clock.current_timestamp();
        let tick_scale = self.clock.tick_scale();

        // 2. Daily housekeeping.
        if self.clock.is_new_day() {
            for commodity in self.commodities.values_mut() {
                commodity.reset_daily_volume();
                commodity.reset_circuit_breaker();
                commodity.mark_day_open();
            }
        }

        // 3 + 4. Generate and dispatch news.
        let events = self.news.generate(now, tick_scale);
        for event in events {
            self.dispatch_news(event);
        }

        // 5. Sentiment decay.
        self.global_sentiment *= GLOBAL_SENTIMENT_DECAY.powf(tick_scale);
        let tuning = self.tuning;
        for agent in &mut self.agents {
            agent.decay_sentiment(tick_scale, &tuning);
        }

        // 6. Exogenous supply/demand dynamics.
        for commodity in self.commodities.values_mut() {
            commodity.update_supply_demand(tick_scale, &mut self.rng);
        }

        // 7. Agent decisions.
        let state = self.market_state();
        for agent in &mut self.agents {
            let Some(order) = agent.decide(&state, &tuning) else {
                continue;
            };
            // Boundary validation: a misbehaving strategy drops its order
            // for the tick, the tick continues.
            if order.quantity <= 0 || !order.price.is_finite() || order.price < 0.0 {
                debug!(agent = %order.agent_id, "dropped invalid order");
                continue;
            }
            let Some(book) = self.books.get(&order.symbol) else {
                debug!(symbol = %order.symbol, "dropped order for unknown symbol");
                continue;
            };

            let accepted = book.add(order);
            self.total_orders += 1;

            let stats = self
                .agent_type_stats
                .entry(self.agent_types[&accepted.agent_id].clone())
                .or_default();
            stats.orders_placed += 1;
            match accepted.side {
                OrderSide::Buy => stats.buy_orders += 1,
                OrderSide::Sell => stats.sell_orders += 1,
            }
            trace!(
                agent = %accepted.agent_id,
                side = %accepted.side,
                symbol = %accepted.symbol,
                price = accepted.price,
                quantity = accepted.quantity,
                "order placed"
            );
        }

        // 8. Match every book (symbol order; intra-book order preserved).
        let trades: Vec<Trade> = self
            .books
            .values()
            .flat_map(|book| book.match_orders())
            .collect();

        // 9. Apply each trade.
        for mut trade in trades {
            self.process_trade(&mut trade);
        }

        // Feed candles with this tick's close and traded volume.
        for (symbol, commodity) in &self.commodities {
            let volume = self.tick_volumes.get(symbol).copied().unwrap_or(0);
            self.candles
                .on_tick(symbol, commodity.price(), volume as f64, now);
        }
        self.last_tick_volumes = self.tick_volumes.clone();
        for volume in self.tick_volumes.values_mut() {
            *volume = 0;
        }

        if self.total_ticks % 1000 == 0 {
            info!(
                tick = self.total_ticks,
                date = %self.clock.current_date_string(),
                trades = self.total_trades,
                "tick checkpoint"
            );
        }
    }

    fn dispatch_news(&mut self, event: NewsEvent) {
        self.recent_news.push_back(event.clone());
        while self.recent_news.len() > MAX_RECENT_NEWS {
            self.recent_news.pop_front();
        }

        let tuning = self.tuning;
        for agent in &mut self.agents {
            agent.update_beliefs(&event, &tuning);
        }

        match event.category {
            NewsCategory::Supply => {
                if let Some(commodity) = self.commodities.get_mut(&event.symbol) {
                    commodity.apply_supply_shock(event.signed_impact());
                }
            }
            NewsCategory::Demand => {
                if let Some(commodity) = self.commodities.get_mut(&event.symbol) {
                    commodity.apply_demand_shock(event.signed_impact());
                }
            }
            NewsCategory::Global | NewsCategory::Political => {
                self.global_sentiment += event.signed_impact() * GLOBAL_NEWS_SENTIMENT_SCALE;
                self.global_sentiment = self.global_sentiment.clamp(-1.0, 1.0);
            }
        }

        debug!(
            category = %event.category,
            sentiment = %event.sentiment,
            magnitude = event.magnitude,
            headline = %event.headline,
            "news"
        );

        if let Some(callback) = &self.news_callback {
            callback(&event);
        }
        self.news.add_to_recent(event);
    }

    fn process_trade(&mut self, trade: &mut Trade) {
        trade.buyer_type = self
            .agent_types
            .get(&trade.buyer_id)
            .cloned()
            .unwrap_or_else(|| "User".to_string());
        trade.seller_type = self
            .agent_types
            .get(&trade.seller_id)
            .cloned()
            .unwrap_or_else(|| "User".to_string());

        self.recent_trades.push_back(trade.clone());
        while self.recent_trades.len() > MAX_RECENT_TRADES {
            self.recent_trades.pop_front();
        }

        let value = trade.value();
        {
            let buyer = self
                .agent_type_stats
                .entry(trade.buyer_type.clone())
                .or_default();
            buyer.fills += 1;
            buyer.volume_traded += trade.quantity as f64;
            buyer.cash_spent += value;
        }
        {
            let seller = self
                .agent_type_stats
                .entry(trade.seller_type.clone())
                .or_default();
            seller.fills += 1;
            seller.volume_traded += trade.quantity as f64;
            seller.cash_received += value;
        }

        // Fill notifications before the next tick's decide.
        if let Some(&index) = self.agent_index.get(&trade.buyer_id) {
            self.agents[index].on_fill(trade);
        }
        if trade.seller_id != trade.buyer_id
            && let Some(&index) = self.agent_index.get(&trade.seller_id)
        {
            self.agents[index].on_fill(trade);
        }

        if let Some(commodity) = self.commodities.get_mut(&trade.symbol) {
            commodity.apply_trade_price(trade.price, trade.quantity);
            commodity.add_volume(trade.quantity);
        }
        if let Some(volume) = self.tick_volumes.get_mut(&trade.symbol) {
            *volume += trade.quantity;
        }

        self.total_trades += 1;
        debug!(
            symbol = %trade.symbol,
            price = trade.price,
            quantity = trade.quantity,
            buyer = %trade.buyer_type,
            seller = %trade.seller_type,
            "trade"
        );

        if let Some(callback) = &self.trade_callback {
            callback(trade);
        }
    }

    // -- External orders ----------------------------------------------------

    /// Validate and submit an externally injected order (user orders carry
    /// agent id 0). A crossing limit order executes immediately with the
    /// usual dampened price impact; otherwise it rests.
    pub fn submit_order(&mut self, order: Order) -> Result<(OrderId, Vec<Trade>)> {
        let mut order = order;
        if order.quantity <= 0 {
            return Err(SimCoreError::InvalidQuantity(order.quantity));
        }
        match order.order_type {
            OrderType::Limit => {
                if !order.price.is_finite() || order.price <= 0.0 {
                    return Err(SimCoreError::InvalidPrice(order.price));
                }
            }
            OrderType::Market => order.price = 0.0,
        }

        let (accepted, trades) = {
            let book = self
                .books
                .get(&order.symbol)
                .ok_or_else(|| SimCoreError::UnknownSymbol(order.symbol.clone()))?;
            let accepted = book.add(order);
            (accepted, book.match_orders())
        };

        self.total_orders += 1;
        let tag = self
            .agent_types
            .get(&accepted.agent_id)
            .cloned()
            .unwrap_or_else(|| "User".to_string());
        let stats = self.agent_type_stats.entry(tag).or_default();
        stats.orders_placed += 1;
        match accepted.side {
            OrderSide::Buy => stats.buy_orders += 1,
            OrderSide::Sell => stats.sell_orders += 1,
        }

        let mut tagged = Vec::with_capacity(trades.len());
        for mut trade in trades {
            self.process_trade(&mut trade);
            tagged.push(trade);
        }
        Ok((accepted.id, tagged))
    }

    // -- Snapshots ----------------------------------------------------------

    /// Build the per-tick read-only view handed to agents.
    pub fn market_state(&self) -> MarketState {
        let mut state = MarketState {
            global_sentiment: self.global_sentiment,
            tick_scale: self.clock.tick_scale(),
            current_time: self.clock.current_timestamp(),
            recent_news: self.recent_news.iter().cloned().collect(),
            cross_effects: self.cross_effects.clone(),
            ..Default::default()
        };

        for (symbol, commodity) in &self.commodities {
            state.prices.insert(symbol.clone(), commodity.price());
            state
                .supply_demand
                .insert(symbol.clone(), commodity.supply_demand());
            state
                .price_history
                .insert(symbol.clone(), commodity.price_history().iter().copied().collect());
            state
                .volumes
                .insert(symbol.clone(), commodity.daily_volume());
            state
                .categories
                .insert(symbol.clone(), commodity.category().to_string());
        }

        state
    }

    /// Purge all owned state back to an empty configuration.
    pub fn reset(&mut self) {
        self.commodities.clear();
        self.books.clear();
        self.agents.clear();
        self.agent_index.clear();
        self.agent_types.clear();
        self.cross_effects.clear();
        self.candles.reset();
        self.news.clear_history();
        self.recent_news.clear();
        self.recent_trades.clear();
        self.agent_type_stats.clear();
        self.tick_volumes.clear();
        self.last_tick_volumes.clear();
        self.global_sentiment = 0.0;
        self.total_ticks = 0;
        self.total_trades = 0;
        self.total_orders = 0;
        info!("market engine reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Order;

    fn engine_with_oil() -> MarketEngine {
        let mut engine = MarketEngine::new(7);
        engine
            .clock_mut()
            .initialize("2025-01-01", 72_000)
            .unwrap();
        engine.add_commodity(Commodity::new("OIL", "Crude Oil", "Energy", 100.0));
        engine
    }

    #[test]
    fn user_limit_cross_executes_immediately() {
        let mut engine = engine_with_oil();

        let (bid_id, trades) = engine
            .submit_order(Order::limit(AgentId::USER, "OIL", OrderSide::Buy, 105.0, 10))
            .unwrap();
        assert!(!bid_id.is_unassigned());
        assert!(trades.is_empty());

        engine.clock_mut().tick();
        let (_, trades) = engine
            .submit_order(Order::limit(AgentId::USER, "OIL", OrderSide::Sell, 100.0, 10))
            .unwrap();

        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert_eq!(trade.price, 105.0);
        assert_eq!(trade.quantity, 10);
        assert_eq!(trade.buyer_type, "User");
        assert_eq!(trade.seller_type, "User");

        // Dampened impact moved the commodity price toward the fill.
        let alpha = 0.5f64 / 10f64.sqrt();
        let expected = 100.0 * (1.0 - alpha) + 105.0 * alpha;
        assert!((engine.commodity("OIL").unwrap().price() - expected).abs() < 1e-9);
        assert_eq!(engine.commodity("OIL").unwrap().daily_volume(), 10);
        assert_eq!(engine.recent_trades().len(), 1);
    }

    #[test]
    fn invalid_orders_are_rejected_at_the_boundary() {
        let mut engine = engine_with_oil();

        let zero_qty = engine.submit_order(Order::limit(AgentId::USER, "OIL", OrderSide::Buy, 10.0, 0));
        assert!(matches!(zero_qty, Err(SimCoreError::InvalidQuantity(0))));

        let bad_price =
            engine.submit_order(Order::limit(AgentId::USER, "OIL", OrderSide::Buy, -5.0, 10));
        assert!(matches!(bad_price, Err(SimCoreError::InvalidPrice(_))));

        let unknown =
            engine.submit_order(Order::limit(AgentId::USER, "GOLD", OrderSide::Buy, 10.0, 10));
        assert!(matches!(unknown, Err(SimCoreError::UnknownSymbol(_))));
    }

    #[test]
    fn supply_news_shocks_the_commodity() {
        let mut engine = engine_with_oil();
        engine.news_mut().inject_supply(
            "OIL",
            news::NewsSentiment::Negative,
            0.90,
            String::new(),
        );

        engine.tick();

        let sd = engine.commodity("OIL").unwrap().supply_demand();
        // The -90% shock lands before the same tick's mean reversion pulls
        // production back toward base; it remains clearly depressed.
        assert!(sd.production < 95.0);
        assert!(engine.commodity("OIL").unwrap().imbalance() > 0.02);
        assert_eq!(engine.recent_news().len(), 1);
    }

    #[test]
    fn global_news_moves_global_sentiment() {
        let mut engine = engine_with_oil();
        engine
            .news_mut()
            .inject_global(news::NewsSentiment::Positive, 0.5, String::new());

        engine.tick();

        // 0.5 * 0.3 = 0.15 before the same-tick decay.
        assert!(engine.global_sentiment() > 0.1);
        assert!(engine.global_sentiment() <= 0.15);
    }

    #[test]
    fn new_day_resets_daily_state() {
        let mut engine = MarketEngine::new(7);
        engine.clock_mut().initialize("2025-01-01", 4).unwrap();
        engine.add_commodity(Commodity::new("OIL", "Crude Oil", "Energy", 100.0));

        engine
            .submit_order(Order::limit(AgentId::USER, "OIL", OrderSide::Buy, 101.0, 5))
            .unwrap();
        engine
            .submit_order(Order::limit(AgentId::USER, "OIL", OrderSide::Sell, 100.0, 5))
            .unwrap();
        assert!(engine.commodity("OIL").unwrap().daily_volume() > 0);

        // Four ticks at 4 ticks/day roll the day over.
        for _ in 0..4 {
            engine.tick();
        }
        assert_eq!(engine.commodity("OIL").unwrap().daily_volume(), 0);
        assert!(!engine.commodity("OIL").unwrap().is_circuit_broken());
        assert!(engine.commodity("OIL").unwrap().day_open_price() > 0.0);
    }

    #[test]
    fn callbacks_fire_per_event() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let mut engine = engine_with_oil();
        let news_count = Arc::new(AtomicUsize::new(0));
        let trade_count = Arc::new(AtomicUsize::new(0));

        let n = Arc::clone(&news_count);
        engine.set_news_callback(Box::new(move |_| {
            n.fetch_add(1, Ordering::Relaxed);
        }));
        let t = Arc::clone(&trade_count);
        engine.set_trade_callback(Box::new(move |_| {
            t.fetch_add(1, Ordering::Relaxed);
        }));

        engine
            .news_mut()
            .inject_global(news::NewsSentiment::Positive, 0.2, String::new());
        engine.tick();
        assert!(news_count.load(Ordering::Relaxed) >= 1);

        engine
            .submit_order(Order::limit(AgentId::USER, "OIL", OrderSide::Buy, 101.0, 5))
            .unwrap();
        engine
            .submit_order(Order::limit(AgentId::USER, "OIL", OrderSide::Sell, 100.0, 5))
            .unwrap();
        assert_eq!(trade_count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn reset_purges_everything() {
        let mut engine = engine_with_oil();
        engine.tick();
        engine.reset();

        assert!(engine.commodities().is_empty());
        assert!(engine.agents().is_empty());
        assert!(engine.recent_trades().is_empty());
        assert_eq!(engine.metrics().total_ticks, 0);
    }
}
