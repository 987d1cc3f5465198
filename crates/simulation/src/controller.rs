//! Simulation controller: concurrency-safe lifecycle around the engine.
//!
//! One reader/writer lock guards the whole engine aggregate. Writers are the
//! tick thread, `step`, `populate`, `reinitialize`, and config patches that
//! touch engine state; readers are all JSON snapshot builders. Status flags
//! are atomics read without the lock so `/state` stays responsive during
//! population.

use parking_lot::{Mutex, RwLock};
use serde_json::{Value, json};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::info;

use agents::AgentFactory;
use news::{NewsCategory, NewsEvent, NewsSentiment};
use sim_core::{Commodity, SimCoreError};
use storage::{Candle, CandleInterval, NewsRow, TickBuffer};
use types::{Order, OrderId, Symbol, Timestamp, Trade};

use crate::catalog::CommodityCatalog;
use crate::config::RuntimeConfig;
use crate::engine::MarketEngine;

// =============================================================================
// Errors
// =============================================================================

/// Controller-level failures surfaced to callers.
#[derive(Debug)]
pub enum SimulationError {
    /// The requested operation is invalid in the current lifecycle state.
    Precondition(String),
    /// Malformed input or unknown symbol from the core.
    Core(SimCoreError),
    /// A config patch failed to apply; nothing was changed.
    Config(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::Precondition(msg) => write!(f, "{}", msg),
            SimulationError::Core(err) => write!(f, "{}", err),
            SimulationError::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for SimulationError {}

impl From<SimCoreError> for SimulationError {
    fn from(err: SimCoreError) -> Self {
        SimulationError::Core(err)
    }
}

pub type SimResult<T> = Result<T, SimulationError>;

// =============================================================================
// Shared state
// =============================================================================

struct Shared {
    engine: RwLock<MarketEngine>,
    config: RwLock<RuntimeConfig>,
    catalog: RwLock<CommodityCatalog>,
    tick_buffer: Arc<TickBuffer>,

    running: AtomicBool,
    paused: AtomicBool,
    populating: AtomicBool,
    current_tick: AtomicU64,
    populate_target_days: AtomicU32,
    populate_current_day: AtomicU32,
    tick_rate_ms: AtomicU64,
    max_ticks: AtomicU64,

    thread: Mutex<Option<JoinHandle<()>>>,
}

/// The simulation controller. Cheap to clone; all clones share state.
#[derive(Clone)]
pub struct Simulation {
    shared: Arc<Shared>,
}

impl Simulation {
    pub fn new(config: RuntimeConfig) -> Self {
        let seed = config.simulation.seed;
        let tick_rate = config.simulation.tick_rate_ms;
        let max_ticks = config.simulation.max_ticks;

        Self {
            shared: Arc::new(Shared {
                engine: RwLock::new(MarketEngine::new(seed)),
                config: RwLock::new(config),
                catalog: RwLock::new(CommodityCatalog::default()),
                tick_buffer: Arc::new(TickBuffer::new()),
                running: AtomicBool::new(false),
                paused: AtomicBool::new(false),
                populating: AtomicBool::new(false),
                current_tick: AtomicU64::new(0),
                populate_target_days: AtomicU32::new(0),
                populate_current_day: AtomicU32::new(0),
                tick_rate_ms: AtomicU64::new(tick_rate),
                max_ticks: AtomicU64::new(max_ticks),
                thread: Mutex::new(None),
            }),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(RuntimeConfig::default())
    }

    // -- Configuration ------------------------------------------------------

    /// Install a commodity catalog; takes effect on the next (re)initialize.
    pub fn set_catalog(&self, catalog: CommodityCatalog) {
        *self.shared.catalog.write() = catalog;
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        self.shared.config.read().clone()
    }

    pub fn config_json(&self) -> Value {
        self.shared.config.read().to_json()
    }

    /// Merge a JSON patch into the runtime config. Hot keys (tick rate,
    /// strategy tuning, news rates, order expiry, commodity mechanics) take
    /// effect immediately; cold keys (counts, catalog, clock layout) need a
    /// reinitialize. A malformed patch changes nothing.
    pub fn load_config(&self, patch: &Value) -> SimResult<()> {
        let merged = {
            let config = self.shared.config.read();
            config
                .merge_patch(patch)
                .map_err(|e| SimulationError::Config(e.to_string()))?
        };

        self.shared
            .tick_rate_ms
            .store(merged.simulation.tick_rate_ms, Ordering::Relaxed);
        self.shared
            .max_ticks
            .store(merged.simulation.max_ticks, Ordering::Relaxed);

        {
            let mut engine = self.shared.engine.write();
            engine.set_tuning(merged.tuning());
            engine.set_news_config(merged.news);
            engine.set_order_expiry_ms(merged.order_book.order_expiry_ms);
            apply_commodity_params(&mut engine, &merged);
        }

        *self.shared.config.write() = merged;
        info!("runtime config patched");
        Ok(())
    }

    pub fn set_tick_rate(&self, ms: u64) {
        self.shared.tick_rate_ms.store(ms, Ordering::Relaxed);
        self.shared.config.write().simulation.tick_rate_ms = ms;
    }

    pub fn tick_rate(&self) -> u64 {
        self.shared.tick_rate_ms.load(Ordering::Relaxed)
    }

    // -- Lifecycle ----------------------------------------------------------

    /// Create commodities and agents from the catalog and config, seed
    /// market-maker inventory, and set the clock to the start date at the
    /// normal tick rate.
    pub fn initialize(&self) -> SimResult<()> {
        let mut engine = self.shared.engine.write();
        self.initialize_locked(&mut engine)
    }

    fn initialize_locked(&self, engine: &mut MarketEngine) -> SimResult<()> {
        let config = self.shared.config.read().clone();
        let catalog = {
            let catalog = self.shared.catalog.read();
            if catalog.is_empty() {
                CommodityCatalog::default_catalog()
            } else {
                catalog.clone()
            }
        };

        engine.set_tuning(config.tuning());
        engine.set_news_config(config.news);
        engine.set_order_expiry_ms(config.order_book.order_expiry_ms);

        for spec in &catalog.commodities {
            let mut commodity = Commodity::with_bases(
                spec.symbol.clone(),
                spec.name.clone(),
                spec.category.clone(),
                spec.initial_price,
                spec.base_production,
                spec.base_consumption,
                spec.volatility,
                spec.initial_inventory,
            );
            commodity.set_impact_dampening(config.commodity.impact_dampening);
            commodity.set_price_floor(config.commodity.price_floor);
            commodity.set_max_daily_move(config.commodity.circuit_breaker_limit);
            commodity.set_supply_decay_rate(config.commodity.supply_decay_rate);
            commodity.set_demand_decay_rate(config.commodity.demand_decay_rate);

            if !spec.cross_effects.is_empty() {
                engine.set_cross_effects(spec.symbol.clone(), spec.cross_effect_list());
            }
            engine.add_commodity(commodity);
        }

        let mut factory = AgentFactory::new(config.simulation.seed.wrapping_add(2));
        let population = factory.create_population(
            &config.agent_counts,
            &config.agent_cash,
            &config.agent_gen,
            &config.tuning(),
        );
        engine.add_agents(population);

        // Bootstrap: market makers start with sellable inventory so both
        // sides of every book are quotable from tick one.
        let seeded: Vec<(Symbol, f64)> = engine
            .commodities()
            .iter()
            .map(|(symbol, c)| (symbol.clone(), c.price()))
            .collect();
        let per_commodity = config.market_maker.initial_inventory_per_commodity;
        for agent in engine.agents_mut() {
            if agent.is_market_maker() {
                for (symbol, price) in &seeded {
                    agent.core_mut().seed_inventory(symbol, per_commodity, *price);
                }
            }
        }

        engine
            .clock_mut()
            .initialize(&config.simulation.start_date, config.simulation.ticks_per_day)?;

        self.shared.tick_buffer.clear();
        for symbol in engine.commodities().keys() {
            self.shared.tick_buffer.add_symbol(symbol.clone());
        }
        let buffer = Arc::clone(&self.shared.tick_buffer);
        engine.set_news_callback(Box::new(move |event| {
            buffer.record_news(NewsRow {
                symbol: event.symbol.clone(),
                category: event.category.to_string(),
                sentiment: event.sentiment.to_string(),
                magnitude: event.magnitude,
                headline: event.headline.clone(),
            });
        }));

        info!(
            commodities = engine.commodities().len(),
            agents = engine.agents().len(),
            "simulation initialized"
        );
        Ok(())
    }

    /// Reset the engine and rebuild from the current config and catalog.
    /// Used for config hot-reload on cold parameters.
    pub fn reinitialize(&self) -> SimResult<()> {
        let mut engine = self.shared.engine.write();
        engine.reset();
        self.shared.current_tick.store(0, Ordering::Relaxed);
        self.initialize_locked(&mut engine)
    }

    /// Spawn the tick thread.
    pub fn start(&self) {
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.paused.store(false, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let handle = thread::spawn(move || run_loop(shared));
        *self.shared.thread.lock() = Some(handle);
        info!("simulation started");
    }

    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::SeqCst);
        info!("simulation paused");
    }

    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::SeqCst);
        info!("simulation resumed");
    }

    /// Stop the tick thread and join it; no tick in progress is interrupted.
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.shared.thread.lock().take() {
            let _ = handle.join();
        }
        info!("simulation stopped");
    }

    /// Stop and purge all engine state.
    pub fn reset(&self) {
        self.stop();
        self.shared.current_tick.store(0, Ordering::Relaxed);
        let mut engine = self.shared.engine.write();
        engine.reset();
        self.shared.tick_buffer.clear();
        info!("simulation reset");
    }

    /// Tick `n` times under the exclusive lock (or fewer at the tick cap).
    pub fn step(&self, count: u64) {
        let mut engine = self.shared.engine.write();
        self.step_locked(&mut engine, count);
    }

    fn step_locked(&self, engine: &mut MarketEngine, count: u64) {
        let max_ticks = self.shared.max_ticks.load(Ordering::Relaxed);
        for _ in 0..count {
            engine.tick();
            let tick = self.shared.current_tick.fetch_add(1, Ordering::Relaxed) + 1;
            record_tick(&self.shared.tick_buffer, engine);

            if max_ticks > 0 && tick >= max_ticks {
                break;
            }
        }
    }

    // -- Populate (fast-forward) --------------------------------------------

    /// Two-phase fast-forward: `days - fine_days` at the coarse populate
    /// rate, then `fine_days` at the fine rate. Both phases pin the
    /// reference rate so tick scale is 1; the normal rate is restored at the
    /// end.
    pub fn populate(&self, days: u32, start_date: &str) -> SimResult<()> {
        self.check_populate_preconditions()?;

        let config = self.shared.config.read().clone();
        let coarse_rate = config.simulation.populate_ticks_per_day;
        let fine_rate = config.simulation.populate_fine_ticks_per_day;
        let fine_days = config.simulation.populate_fine_days.min(days);
        let coarse_days = days - fine_days;

        self.shared.populating.store(true, Ordering::SeqCst);
        self.shared
            .populate_target_days
            .store(days, Ordering::Relaxed);
        self.shared.populate_current_day.store(0, Ordering::Relaxed);

        let result = (|| -> SimResult<()> {
            let mut engine = self.shared.engine.write();

            engine.clock_mut().initialize(start_date, coarse_rate)?;
            engine.clock_mut().set_reference_ticks_per_day(coarse_rate);

            if coarse_days > 0 {
                let total = coarse_days as u64 * coarse_rate as u64;
                for i in 0..total {
                    engine.tick();
                    self.shared.current_tick.fetch_add(1, Ordering::Relaxed);
                    record_tick(&self.shared.tick_buffer, &engine);

                    if i % coarse_rate as u64 == 0 {
                        self.shared
                            .populate_current_day
                            .store((i / coarse_rate as u64) as u32, Ordering::Relaxed);
                    }
                    if i % (coarse_rate as u64 * 10) == 0 {
                        info!(
                            day = i / coarse_rate as u64,
                            of = days,
                            date = %engine.clock().current_date_string(),
                            "populate progress"
                        );
                    }
                }
                info!(days = coarse_days, "populate coarse phase complete");
            }

            if fine_days > 0 {
                engine.clock_mut().set_ticks_per_day(fine_rate);
                engine.clock_mut().set_reference_ticks_per_day(fine_rate);

                let total = fine_days as u64 * fine_rate as u64;
                for i in 0..total {
                    engine.tick();
                    self.shared.current_tick.fetch_add(1, Ordering::Relaxed);
                    record_tick(&self.shared.tick_buffer, &engine);

                    if i % fine_rate as u64 == 0 {
                        self.shared.populate_current_day.store(
                            coarse_days + (i / fine_rate as u64) as u32,
                            Ordering::Relaxed,
                        );
                    }
                }
                info!(days = fine_days, "populate fine phase complete");
            }

            // Back to the normal rate, with the reference following so the
            // live run resumes at tick scale 1.
            engine
                .clock_mut()
                .set_ticks_per_day(config.simulation.ticks_per_day);
            engine
                .clock_mut()
                .set_reference_ticks_per_day(config.simulation.ticks_per_day);
            Ok(())
        })();

        self.shared
            .populate_current_day
            .store(days, Ordering::Relaxed);
        self.shared.populate_target_days.store(0, Ordering::Relaxed);
        self.shared.populating.store(false, Ordering::SeqCst);

        if result.is_ok() {
            info!(days, "populate complete");
        }
        result
    }

    /// Fast-forward exactly `n` ticks at the populate rate, starting a fresh
    /// tick buffer.
    pub fn populate_ticks(&self, target_ticks: u64, start_date: &str) -> SimResult<()> {
        self.check_populate_preconditions()?;

        let config = self.shared.config.read().clone();
        let rate = config.simulation.populate_ticks_per_day;

        self.shared.populating.store(true, Ordering::SeqCst);
        let result = (|| -> SimResult<()> {
            let mut engine = self.shared.engine.write();

            self.shared.tick_buffer.clear();
            for symbol in engine.commodities().keys() {
                self.shared.tick_buffer.add_symbol(symbol.clone());
            }

            engine.clock_mut().initialize(start_date, rate)?;
            engine.clock_mut().set_reference_ticks_per_day(rate);

            info!(ticks = target_ticks, "populating");
            let report_interval = (target_ticks / 20).max(10_000);
            for i in 0..target_ticks {
                engine.tick();
                self.shared.current_tick.store(i + 1, Ordering::Relaxed);
                record_tick(&self.shared.tick_buffer, &engine);

                if i % report_interval == 0 {
                    info!(done = i + 1, of = target_ticks, "populate progress");
                }
            }

            engine
                .clock_mut()
                .set_ticks_per_day(config.simulation.ticks_per_day);
            engine
                .clock_mut()
                .set_reference_ticks_per_day(config.simulation.ticks_per_day);
            Ok(())
        })();

        self.shared.populating.store(false, Ordering::SeqCst);
        result
    }

    fn check_populate_preconditions(&self) -> SimResult<()> {
        if self.shared.running.load(Ordering::SeqCst) {
            return Err(SimulationError::Precondition(
                "cannot populate while the simulation is running".into(),
            ));
        }
        if self.shared.populating.load(Ordering::SeqCst) {
            return Err(SimulationError::Precondition(
                "population already in progress".into(),
            ));
        }
        Ok(())
    }

    // -- Status flags -------------------------------------------------------

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::SeqCst)
    }

    pub fn is_populating(&self) -> bool {
        self.shared.populating.load(Ordering::SeqCst)
    }

    pub fn current_tick(&self) -> u64 {
        self.shared.current_tick.load(Ordering::Relaxed)
    }

    // -- External inputs ----------------------------------------------------

    /// Submit a user or admin order; crossing limit orders execute
    /// immediately.
    pub fn submit_order(&self, order: Order) -> SimResult<(OrderId, Vec<Trade>)> {
        let mut engine = self.shared.engine.write();
        Ok(engine.submit_order(order)?)
    }

    /// Queue a news event for the next tick. Supply and demand events
    /// require a known target symbol.
    pub fn inject_news(
        &self,
        category: NewsCategory,
        sentiment: NewsSentiment,
        magnitude: f64,
        target: Option<&str>,
        headline: Option<&str>,
    ) -> SimResult<()> {
        let mut engine = self.shared.engine.write();
        let headline = headline.unwrap_or_default().to_string();

        match category {
            NewsCategory::Global => {
                engine.news_mut().inject_global(sentiment, magnitude, headline);
            }
            NewsCategory::Political => {
                engine
                    .news_mut()
                    .inject_political(sentiment, magnitude, headline);
            }
            NewsCategory::Supply | NewsCategory::Demand => {
                let symbol = target.unwrap_or_default();
                if engine.commodity(symbol).is_none() {
                    return Err(SimCoreError::UnknownSymbol(symbol.to_string()).into());
                }
                if category == NewsCategory::Supply {
                    engine
                        .news_mut()
                        .inject_supply(symbol, sentiment, magnitude, headline);
                } else {
                    engine
                        .news_mut()
                        .inject_demand(symbol, sentiment, magnitude, headline);
                }
            }
        }
        Ok(())
    }

    // -- Export -------------------------------------------------------------

    pub fn export_csv(&self, dir: &std::path::Path, max_ticks: usize) -> SimResult<()> {
        self.check_export_preconditions()?;
        self.shared
            .tick_buffer
            .export_csv(dir, max_ticks)
            .map_err(|e| SimulationError::Precondition(format!("export failed: {}", e)))
    }

    pub fn export_json(&self, path: &std::path::Path, max_ticks: usize) -> SimResult<()> {
        self.check_export_preconditions()?;
        self.shared
            .tick_buffer
            .export_json(path, max_ticks)
            .map_err(|e| SimulationError::Precondition(format!("export failed: {}", e)))
    }

    fn check_export_preconditions(&self) -> SimResult<()> {
        if self.shared.populating.load(Ordering::SeqCst) {
            return Err(SimulationError::Precondition(
                "cannot export while populating".into(),
            ));
        }
        Ok(())
    }

    pub fn tick_buffer(&self) -> &TickBuffer {
        &self.shared.tick_buffer
    }

    // -- Read-oriented query surface ----------------------------------------

    /// Lifecycle status; served from atomics so it works mid-populate.
    pub fn state_json(&self) -> Value {
        let populating = self.is_populating();
        let sim_date = if populating {
            "populating...".to_string()
        } else {
            match self.shared.engine.try_read() {
                Some(engine) => engine.clock().current_date_string(),
                None => "unknown".to_string(),
            }
        };

        json!({
            "running": self.is_running(),
            "paused": self.is_paused(),
            "populating": populating,
            "currentTick": self.current_tick(),
            "simDate": sim_date,
            "populateProgress": {
                "target": self.shared.populate_target_days.load(Ordering::Relaxed),
                "current": self.shared.populate_current_day.load(Ordering::Relaxed),
            },
        })
    }

    pub fn commodities_json(&self) -> Value {
        let engine = self.shared.engine.read();
        let commodities: Vec<Value> = engine
            .commodities()
            .values()
            .map(commodity_json)
            .collect();
        Value::Array(commodities)
    }

    /// Counts and aggregate stats per strategy type.
    pub fn agents_json(&self) -> Value {
        let engine = self.shared.engine.read();

        let mut counts: std::collections::BTreeMap<&str, usize> = Default::default();
        for agent in engine.agents() {
            *counts.entry(agent.type_tag()).or_default() += 1;
        }

        let stats = engine.agent_type_stats();
        let rows: Vec<Value> = counts
            .into_iter()
            .map(|(tag, count)| {
                let type_stats = stats.get(tag).copied().unwrap_or_default();
                json!({
                    "type": tag,
                    "count": count,
                    "stats": type_stats,
                })
            })
            .collect();
        Value::Array(rows)
    }

    pub fn metrics_json(&self) -> Value {
        let engine = self.shared.engine.read();
        let metrics = engine.metrics();
        json!({
            "totalTicks": metrics.total_ticks,
            "totalTrades": metrics.total_trades,
            "totalOrders": metrics.total_orders,
            "avgSpread": metrics.avg_spread,
            "returns": metrics.returns,
            "globalSentiment": engine.global_sentiment(),
        })
    }

    pub fn orderbook_json(&self, symbol: &str, depth: usize) -> SimResult<Value> {
        let engine = self.shared.engine.read();
        let book = engine
            .order_book(symbol)
            .ok_or_else(|| SimCoreError::UnknownSymbol(symbol.to_string()))?;
        let snapshot = book.snapshot(depth);
        Ok(serde_json::to_value(snapshot).unwrap_or(Value::Null))
    }

    pub fn recent_trades(&self, limit: usize) -> Vec<Trade> {
        let engine = self.shared.engine.read();
        let trades = engine.recent_trades();
        let start = trades.len().saturating_sub(limit);
        trades.iter().skip(start).cloned().collect()
    }

    pub fn recent_news(&self, count: usize) -> Vec<NewsEvent> {
        self.shared.engine.read().news().recent_news(count)
    }

    pub fn news_history(&self) -> Vec<NewsEvent> {
        self.shared
            .engine
            .read()
            .news()
            .history()
            .iter()
            .cloned()
            .collect()
    }

    pub fn candles(
        &self,
        symbol: &str,
        interval: CandleInterval,
        since: Timestamp,
        limit: usize,
    ) -> SimResult<Vec<Candle>> {
        let engine = self.shared.engine.read();
        if engine.commodity(symbol).is_none() {
            return Err(SimCoreError::UnknownSymbol(symbol.to_string()).into());
        }
        Ok(engine.candles().candles(symbol, interval, since, limit))
    }

    pub fn candles_bulk(
        &self,
        interval: CandleInterval,
        since: Timestamp,
    ) -> std::collections::BTreeMap<Symbol, Vec<Candle>> {
        self.shared.engine.read().candles().all_candles(interval, since)
    }

    /// One SSE frame of per-commodity state.
    pub fn stream_update_json(&self) -> Value {
        let engine = self.shared.engine.read();
        json!({
            "type": "update",
            "tick": self.current_tick(),
            "simDate": engine.clock().current_date_string(),
            "commodities": engine
                .commodities()
                .values()
                .map(commodity_json)
                .collect::<Vec<_>>(),
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn run_loop(shared: Arc<Shared>) {
    while shared.running.load(Ordering::SeqCst) {
        if !shared.paused.load(Ordering::SeqCst) {
            {
                let mut engine = shared.engine.write();
                engine.tick();
                shared.current_tick.fetch_add(1, Ordering::Relaxed);
                record_tick(&shared.tick_buffer, &engine);
            }

            let max_ticks = shared.max_ticks.load(Ordering::Relaxed);
            if max_ticks > 0 && shared.current_tick.load(Ordering::Relaxed) >= max_ticks {
                shared.running.store(false, Ordering::SeqCst);
                info!(max_ticks, "tick cap reached, stopping");
                break;
            }
        }

        let rate = shared.tick_rate_ms.load(Ordering::Relaxed);
        thread::sleep(Duration::from_millis(rate));
    }
}

fn record_tick(buffer: &TickBuffer, engine: &MarketEngine) {
    for (symbol, commodity) in engine.commodities() {
        let price = commodity.price();
        let volume = engine.last_tick_volume(symbol) as f64;
        buffer.record_tick(symbol, price, price, price, price, volume);
    }
    buffer.advance_tick();
}

fn apply_commodity_params(engine: &mut MarketEngine, config: &RuntimeConfig) {
    for commodity in engine.commodities_mut().values_mut() {
        commodity.set_impact_dampening(config.commodity.impact_dampening);
        commodity.set_price_floor(config.commodity.price_floor);
        commodity.set_max_daily_move(config.commodity.circuit_breaker_limit);
        commodity.set_supply_decay_rate(config.commodity.supply_decay_rate);
        commodity.set_demand_decay_rate(config.commodity.demand_decay_rate);
    }
}

fn commodity_json(commodity: &Commodity) -> Value {
    let sd = commodity.supply_demand();
    json!({
        "symbol": commodity.symbol(),
        "name": commodity.name(),
        "category": commodity.category(),
        "price": commodity.price(),
        "dailyVolume": commodity.daily_volume(),
        "circuitBroken": commodity.is_circuit_broken(),
        "supplyDemand": {
            "production": sd.production,
            "consumption": sd.consumption,
            "imports": sd.imports,
            "exports": sd.exports,
            "inventory": sd.inventory,
            "imbalance": sd.imbalance(),
        },
    })
}
