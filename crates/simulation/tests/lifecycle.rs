//! Controller lifecycle, populate fast-forward, configuration, and export.

use serde_json::json;
use simulation::{RuntimeConfig, Simulation};
use types::{AgentId, Order, OrderSide};

fn quick_config() -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.simulation.ticks_per_day = 200;
    config.simulation.populate_ticks_per_day = 50;
    config.simulation.populate_fine_ticks_per_day = 100;
    config.simulation.populate_fine_days = 1;
    config.simulation.tick_rate_ms = 1;
    config.news.lambda = 0.0;
    config
}

#[test]
fn start_pause_resume_stop() {
    let sim = Simulation::new(quick_config());
    sim.initialize().unwrap();

    sim.start();
    assert!(sim.is_running());

    // The tick thread makes progress.
    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while sim.current_tick() == 0 && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert!(sim.current_tick() > 0, "tick thread never advanced");

    sim.pause();
    assert!(sim.is_paused());
    let paused_at = sim.current_tick();
    std::thread::sleep(std::time::Duration::from_millis(50));
    // At most one in-flight tick completes after the pause flag flips.
    assert!(sim.current_tick() <= paused_at + 1);

    sim.resume();
    assert!(!sim.is_paused());

    sim.stop();
    assert!(!sim.is_running());
}

#[test]
fn max_ticks_stops_the_thread() {
    let mut config = quick_config();
    config.simulation.max_ticks = 5;

    let sim = Simulation::new(config);
    sim.initialize().unwrap();
    sim.start();

    let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
    while sim.is_running() && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert!(!sim.is_running(), "tick cap should stop the run");
    assert_eq!(sim.current_tick(), 5);
}

#[test]
fn populate_two_phases_then_restore_rate() {
    let sim = Simulation::new(quick_config());
    sim.initialize().unwrap();

    sim.populate(3, "2025-01-01").unwrap();

    // 2 coarse days at 50 + 1 fine day at 100.
    assert_eq!(sim.current_tick(), 200);
    assert_eq!(sim.tick_buffer().tick_count(), 200);
    assert!(!sim.is_populating());

    // Normal stepping resumes at the configured day budget.
    sim.step(1);
    assert_eq!(sim.current_tick(), 201);

    let state = sim.state_json();
    assert_eq!(state["populateProgress"]["target"], 0);
    assert_eq!(state["populateProgress"]["current"], 3);
}

#[test]
fn populate_rejected_while_running() {
    let sim = Simulation::new(quick_config());
    sim.initialize().unwrap();
    sim.start();

    let result = sim.populate(2, "2025-01-01");
    assert!(result.is_err());

    sim.stop();
}

#[test]
fn populate_rejects_malformed_date() {
    let sim = Simulation::new(quick_config());
    sim.initialize().unwrap();
    assert!(sim.populate(2, "01/01/2025").is_err());
    assert!(!sim.is_populating());
}

#[test]
fn populate_ticks_exact_count() {
    let sim = Simulation::new(quick_config());
    sim.initialize().unwrap();

    sim.populate_ticks(75, "2025-01-01").unwrap();
    assert_eq!(sim.current_tick(), 75);
    assert_eq!(sim.tick_buffer().tick_count(), 75);
}

#[test]
fn config_patch_is_hot_and_atomic() {
    let sim = Simulation::new(quick_config());
    sim.initialize().unwrap();

    sim.load_config(&json!({
        "simulation": { "tickRateMs": 7 },
        "noise": { "marketOrderProb": 0.5 }
    }))
    .unwrap();

    assert_eq!(sim.tick_rate(), 7);
    let config = sim.runtime_config();
    assert_eq!(config.noise.market_order_prob, 0.5);
    // Untouched sections keep their values.
    assert_eq!(config.simulation.ticks_per_day, 200);

    // A malformed patch changes nothing.
    let before = sim.config_json();
    assert!(sim.load_config(&json!({ "simulation": { "maxTicks": "lots" } })).is_err());
    assert_eq!(sim.config_json(), before);
}

#[test]
fn reinitialize_applies_cold_keys() {
    let sim = Simulation::new(quick_config());
    sim.initialize().unwrap();
    sim.step(10);
    assert_eq!(sim.current_tick(), 10);

    sim.load_config(&json!({ "agentCounts": { "noise": 3, "supplyDemand": 1,
        "momentum": 0, "meanReversion": 0, "marketMaker": 0,
        "crossEffects": 0, "inventory": 0, "event": 0 } }))
        .unwrap();
    sim.reinitialize().unwrap();

    assert_eq!(sim.current_tick(), 0);
    let agents = sim.agents_json();
    let rows = agents.as_array().unwrap();
    let total: u64 = rows.iter().map(|r| r["count"].as_u64().unwrap()).sum();
    assert_eq!(total, 4);
}

#[test]
fn user_orders_flow_through_the_controller() {
    let sim = Simulation::new(quick_config());
    sim.initialize().unwrap();

    let (order_id, trades) = sim
        .submit_order(Order::limit(AgentId::USER, "OIL", OrderSide::Buy, 76.0, 5))
        .unwrap();
    assert!(!order_id.is_unassigned());
    assert!(trades.is_empty() || trades.iter().all(|t| t.buyer_id == AgentId::USER));

    let book = sim.orderbook_json("OIL", 5).unwrap();
    assert!(book["bids"].is_array());

    assert!(sim.orderbook_json("GOLD", 5).is_err());
    assert!(
        sim.submit_order(Order::limit(AgentId::USER, "OIL", OrderSide::Buy, 76.0, 0))
            .is_err()
    );
}

#[test]
fn injected_news_requires_known_target() {
    let sim = Simulation::new(quick_config());
    sim.initialize().unwrap();

    assert!(
        sim.inject_news(
            news::NewsCategory::Supply,
            news::NewsSentiment::Negative,
            0.2,
            Some("OIL"),
            None,
        )
        .is_ok()
    );
    assert!(
        sim.inject_news(
            news::NewsCategory::Supply,
            news::NewsSentiment::Negative,
            0.2,
            Some("GOLD"),
            None,
        )
        .is_err()
    );

    sim.step(1);
    let recent = sim.recent_news(10);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].symbol, "OIL");
    assert!(sim.news_history().len() == 1);
}

#[test]
fn export_writes_archive_formats() {
    let sim = Simulation::new(quick_config());
    sim.initialize().unwrap();
    sim.step(20);

    let dir = tempfile::TempDir::new().unwrap();
    sim.export_csv(dir.path(), 0).unwrap();
    assert!(dir.path().join("OIL.csv").exists());
    assert!(dir.path().join("metadata.json").exists());

    let json_path = dir.path().join("dump.json");
    sim.export_json(&json_path, 10).unwrap();
    let doc: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(doc["OIL"]["ticks"].as_array().unwrap().len(), 10);
}

#[test]
fn candle_queries_reject_unknown_symbols() {
    let sim = Simulation::new(quick_config());
    sim.initialize().unwrap();
    sim.step(30);

    assert!(sim.candles("OIL", storage::CandleInterval::M1, 0, 100).is_ok());
    assert!(sim.candles("GOLD", storage::CandleInterval::M1, 0, 100).is_err());

    let bulk = sim.candles_bulk(storage::CandleInterval::M1, 0);
    assert_eq!(bulk.len(), 5);
}
