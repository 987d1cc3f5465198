//! Central runtime configuration.
//!
//! Every tunable lives here, grouped into sections. All fields carry
//! defaults, so partial JSON acts as a merge patch: only the keys present in
//! a patch are updated, everything else keeps its current value. Patches are
//! applied onto a clone and swapped in atomically, so a malformed patch
//! never leaves the config half-updated.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use agents::{
    AgentCashConfig, AgentCountsConfig, AgentGenConfig, AgentGlobalConfig, AgentTuning,
    CrossEffectsConfig, EventConfig, InventoryConfig, MarketMakerConfig, MeanReversionConfig,
    MomentumConfig, NoiseConfig, SupplyDemandConfig,
};
use news::NewsConfig;

/// Simulation lifecycle parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationParams {
    /// Wall-clock pacing of the tick thread.
    pub tick_rate_ms: u64,
    /// 0 = unlimited.
    pub max_ticks: u64,
    /// Normal run rate: one simulated day per real hour at 50 ms ticks.
    pub ticks_per_day: u32,
    /// Coarse fast-forward rate (~2.5 simulated minutes per tick).
    pub populate_ticks_per_day: u32,
    /// Fine fast-forward rate for the most recent populated days.
    pub populate_fine_ticks_per_day: u32,
    /// How many trailing days of a populate run use the fine rate.
    pub populate_fine_days: u32,
    pub start_date: String,
    /// Master seed for every random stream.
    pub seed: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            tick_rate_ms: 50,
            max_ticks: 0,
            ticks_per_day: 72_000,
            populate_ticks_per_day: 576,
            populate_fine_ticks_per_day: 1440,
            populate_fine_days: 7,
            start_date: "2025-08-07".to_string(),
            seed: 42,
        }
    }
}

/// Per-commodity price mechanics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommodityParams {
    /// Max intraday move before the circuit breaker halts price updates.
    pub circuit_breaker_limit: f64,
    /// Blend factor of `apply_trade_price`.
    pub impact_dampening: f64,
    pub price_floor: f64,
    pub supply_decay_rate: f64,
    pub demand_decay_rate: f64,
}

impl Default for CommodityParams {
    fn default() -> Self {
        Self {
            circuit_breaker_limit: 0.15,
            impact_dampening: 0.5,
            price_floor: 0.01,
            supply_decay_rate: 0.1,
            demand_decay_rate: 0.1,
        }
    }
}

/// Order book parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderBookParams {
    /// Resting order age limit in simulated ms (default two simulated days).
    pub order_expiry_ms: u64,
}

impl Default for OrderBookParams {
    fn default() -> Self {
        Self {
            order_expiry_ms: 172_800_000,
        }
    }
}

/// The whole runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub simulation: SimulationParams,
    pub commodity: CommodityParams,
    pub order_book: OrderBookParams,
    pub agent_counts: AgentCountsConfig,
    pub agent_cash: AgentCashConfig,
    pub agent_global: AgentGlobalConfig,
    pub agent_gen: AgentGenConfig,
    pub market_maker: MarketMakerConfig,
    pub supply_demand: SupplyDemandConfig,
    pub momentum: MomentumConfig,
    pub mean_reversion: MeanReversionConfig,
    pub noise: NoiseConfig,
    pub cross_effects: CrossEffectsConfig,
    pub inventory: InventoryConfig,
    pub event: EventConfig,
    pub news: NewsConfig,
}

impl RuntimeConfig {
    /// Merge a JSON patch into this config. Only keys present in the patch
    /// change; a malformed patch returns an error and changes nothing.
    pub fn merge_patch(&self, patch: &Value) -> Result<RuntimeConfig, serde_json::Error> {
        let mut merged = serde_json::to_value(self)?;
        deep_merge(&mut merged, patch);
        serde_json::from_value(merged)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// The strategy tuning bundle handed to agents each tick.
    pub fn tuning(&self) -> AgentTuning {
        AgentTuning {
            global: self.agent_global,
            market_maker: self.market_maker,
            supply_demand: self.supply_demand,
            momentum: self.momentum,
            mean_reversion: self.mean_reversion,
            noise: self.noise,
            cross_effects: self.cross_effects,
            inventory: self.inventory,
            event: self.event,
        }
    }
}

fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                match target_map.get_mut(key) {
                    Some(target_value) => deep_merge(target_value, patch_value),
                    None => {
                        target_map.insert(key.clone(), patch_value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_are_sane() {
        let config = RuntimeConfig::default();
        assert_eq!(config.simulation.ticks_per_day, 72_000);
        assert_eq!(config.commodity.circuit_breaker_limit, 0.15);
        assert_eq!(config.order_book.order_expiry_ms, 172_800_000);
        assert_eq!(config.news.lambda, 0.12);
    }

    #[test]
    fn merge_patch_touches_only_named_keys() {
        let config = RuntimeConfig::default();
        let patched = config
            .merge_patch(&json!({
                "simulation": { "tickRateMs": 10 },
                "commodity": { "circuitBreakerLimit": 0.10 }
            }))
            .unwrap();

        assert_eq!(patched.simulation.tick_rate_ms, 10);
        assert_eq!(patched.commodity.circuit_breaker_limit, 0.10);
        // Untouched keys keep their values.
        assert_eq!(patched.simulation.ticks_per_day, 72_000);
        assert_eq!(patched.commodity.price_floor, 0.01);
        assert_eq!(patched.agent_counts, config.agent_counts);
    }

    #[test]
    fn malformed_patch_is_rejected() {
        let config = RuntimeConfig::default();
        let result = config.merge_patch(&json!({
            "simulation": { "tickRateMs": "fast" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn json_round_trip_preserves_config() {
        let mut config = RuntimeConfig::default();
        config.simulation.max_ticks = 5000;
        config.noise.market_order_prob = 0.25;

        let round_tripped: RuntimeConfig =
            serde_json::from_value(config.to_json()).unwrap();
        assert_eq!(round_tripped, config);
    }

    #[test]
    fn tuning_reflects_sections() {
        let mut config = RuntimeConfig::default();
        config.agent_global.max_order_size = 123;
        config.momentum.reaction_mult = 0.5;

        let tuning = config.tuning();
        assert_eq!(tuning.global.max_order_size, 123);
        assert_eq!(tuning.momentum.reaction_mult, 0.5);
    }
}
