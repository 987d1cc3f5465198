//! Agent tuning knobs.
//!
//! Every struct here is a config section with full defaults, so a partial
//! JSON patch only overrides the keys it names. The controller's runtime
//! config embeds these sections and hands the engine an [`AgentTuning`]
//! bundle each tick.

use serde::{Deserialize, Serialize};

/// How many agents of each strategy to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentCountsConfig {
    pub supply_demand: u32,
    pub momentum: u32,
    pub mean_reversion: u32,
    pub noise: u32,
    pub market_maker: u32,
    pub cross_effects: u32,
    pub inventory: u32,
    pub event: u32,
}

impl Default for AgentCountsConfig {
    fn default() -> Self {
        Self {
            supply_demand: 60,
            momentum: 40,
            mean_reversion: 20,
            noise: 25,
            market_maker: 25,
            cross_effects: 15,
            inventory: 10,
            event: 10,
        }
    }
}

impl AgentCountsConfig {
    pub fn total(&self) -> u32 {
        self.supply_demand
            + self.momentum
            + self.mean_reversion
            + self.noise
            + self.market_maker
            + self.cross_effects
            + self.inventory
            + self.event
    }
}

/// Initial cash distribution: `max(1000, N(mean, std))` per agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentCashConfig {
    pub mean_cash: f64,
    pub std_cash: f64,
}

impl Default for AgentCashConfig {
    fn default() -> Self {
        Self {
            mean_cash: 100_000.0,
            std_cash: 20_000.0,
        }
    }
}

/// Sizing, risk, and sentiment-decay knobs shared by all strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentGlobalConfig {
    /// Base fraction of cash available per order before risk scaling.
    pub capital_fraction: f64,
    /// Fraction of initial cash that buys may never dip below.
    pub cash_reserve: f64,
    pub max_order_size: i64,
    /// Units an agent may be short beyond a flat position.
    pub max_short_position: i64,
    /// Per-reference-tick multiplier on global sentiment.
    pub sentiment_decay_global: f64,
    /// Per-reference-tick multiplier on per-commodity sentiment.
    pub sentiment_decay_symbol: f64,
}

impl Default for AgentGlobalConfig {
    fn default() -> Self {
        Self {
            capital_fraction: 0.05,
            cash_reserve: 0.10,
            max_order_size: 500,
            max_short_position: 200,
            sentiment_decay_global: 0.95,
            sentiment_decay_symbol: 0.90,
        }
    }
}

/// Distributions the factory samples per-agent parameters from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentGenConfig {
    pub risk_aversion_mean: f64,
    pub risk_aversion_std: f64,
    pub risk_aversion_min: f64,
    /// Exponential-distribution lambda for reaction speed.
    pub reaction_speed_lambda: f64,
    pub news_weight_min: f64,
    pub news_weight_max: f64,
    pub confidence_min: f64,
    pub confidence_max: f64,
    /// Log-normal mu for time horizon (ticks).
    pub time_horizon_mu: f64,
    pub time_horizon_sigma: f64,
}

impl Default for AgentGenConfig {
    fn default() -> Self {
        Self {
            risk_aversion_mean: 1.0,
            risk_aversion_std: 0.3,
            risk_aversion_min: 0.1,
            reaction_speed_lambda: 1.0,
            news_weight_min: 0.5,
            news_weight_max: 1.5,
            confidence_min: 0.3,
            confidence_max: 1.0,
            time_horizon_mu: 3.0,
            time_horizon_sigma: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketMakerConfig {
    pub base_spread_min: f64,
    pub base_spread_max: f64,
    pub inventory_skew_min: f64,
    pub inventory_skew_max: f64,
    pub max_inventory_min: i64,
    pub max_inventory_max: i64,
    /// Units seeded per commodity at init (bootstrap, no cash debit).
    pub initial_inventory_per_commodity: i64,
    /// Fraction of cash quoted per side.
    pub quote_capital_frac: f64,
    pub sentiment_spread_mult: f64,
    pub volatility_spread_mult: f64,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            base_spread_min: 0.001,
            base_spread_max: 0.003,
            inventory_skew_min: 0.0005,
            inventory_skew_max: 0.0015,
            max_inventory_min: 500,
            max_inventory_max: 1500,
            initial_inventory_per_commodity: 100,
            quote_capital_frac: 0.02,
            sentiment_spread_mult: 0.5,
            volatility_spread_mult: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SupplyDemandConfig {
    pub threshold_base: f64,
    pub threshold_risk_scale: f64,
    pub noise_std_base: f64,
    pub noise_std_range: f64,
    pub sentiment_impact: f64,
    pub reaction_mult: f64,
    pub limit_price_spread_max: f64,
}

impl Default for SupplyDemandConfig {
    fn default() -> Self {
        Self {
            threshold_base: 0.02,
            threshold_risk_scale: 0.03,
            noise_std_base: 0.01,
            noise_std_range: 0.02,
            sentiment_impact: 0.2,
            reaction_mult: 0.3,
            limit_price_spread_max: 0.005,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MomentumConfig {
    pub short_period_min: usize,
    pub short_period_range: usize,
    pub long_period_offset_min: usize,
    pub long_period_offset_range: usize,
    pub reaction_mult: f64,
    pub limit_offset_min: f64,
    pub limit_offset_max: f64,
    pub signal_threshold_risk_scale: f64,
    pub commodity_sent_weight: f64,
    pub global_sent_weight: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            short_period_min: 3,
            short_period_range: 4,
            long_period_offset_min: 10,
            long_period_offset_range: 15,
            reaction_mult: 0.25,
            limit_offset_min: 0.0005,
            limit_offset_max: 0.005,
            signal_threshold_risk_scale: 0.001,
            commodity_sent_weight: 0.1,
            global_sent_weight: 0.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeanReversionConfig {
    pub lookback_min: usize,
    pub lookback_range: usize,
    pub z_threshold_min: f64,
    pub z_threshold_range: f64,
    pub reaction_mult: f64,
    pub limit_price_spread_max: f64,
    pub sent_symbol_weight: f64,
    pub sent_global_weight: f64,
}

impl Default for MeanReversionConfig {
    fn default() -> Self {
        Self {
            lookback_min: 20,
            lookback_range: 20,
            z_threshold_min: 1.5,
            z_threshold_range: 1.0,
            reaction_mult: 0.2,
            limit_price_spread_max: 0.005,
            sent_symbol_weight: 0.2,
            sent_global_weight: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoiseConfig {
    pub trade_prob_min: f64,
    pub trade_prob_range: f64,
    pub sent_sensitivity_min: f64,
    pub sent_sensitivity_max: f64,
    pub overreaction_mult: f64,
    pub market_order_prob: f64,
    /// Noise traders decay sentiment at their own rates.
    pub sentiment_decay: f64,
    pub symbol_sent_decay: f64,
    pub limit_offset_min: f64,
    pub limit_offset_max: f64,
    pub confidence_min: f64,
    pub confidence_max: f64,
    pub buy_bias_sent_weight: f64,
    pub buy_bias_noise_std: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            trade_prob_min: 0.05,
            trade_prob_range: 0.10,
            sent_sensitivity_min: 0.3,
            sent_sensitivity_max: 0.8,
            overreaction_mult: 1.0,
            market_order_prob: 0.1,
            sentiment_decay: 0.98,
            symbol_sent_decay: 0.95,
            limit_offset_min: 0.001,
            limit_offset_max: 0.01,
            confidence_min: 0.2,
            confidence_max: 0.5,
            buy_bias_sent_weight: 0.3,
            buy_bias_noise_std: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CrossEffectsConfig {
    pub lookback_min: usize,
    pub lookback_range: usize,
    pub threshold_base: f64,
    pub threshold_risk_scale: f64,
    pub reaction_mult: f64,
    pub cross_effect_weight: f64,
}

impl Default for CrossEffectsConfig {
    fn default() -> Self {
        Self {
            lookback_min: 5,
            lookback_range: 10,
            threshold_base: 0.02,
            threshold_risk_scale: 0.02,
            reaction_mult: 0.2,
            cross_effect_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InventoryConfig {
    pub target_ratio_base: f64,
    pub target_ratio_range: f64,
    pub rebalance_threshold_base: f64,
    pub rebalance_threshold_risk_scale: f64,
    pub reaction_mult: f64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            target_ratio_base: 0.1,
            target_ratio_range: 0.05,
            rebalance_threshold_base: 0.02,
            rebalance_threshold_risk_scale: 0.02,
            reaction_mult: 0.15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventConfig {
    pub reaction_threshold_base: f64,
    pub reaction_threshold_risk_scale: f64,
    pub cooldown_base: u32,
    pub cooldown_range: u32,
    pub reaction_mult: f64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            reaction_threshold_base: 0.03,
            reaction_threshold_risk_scale: 0.02,
            cooldown_base: 10,
            cooldown_range: 20,
            reaction_mult: 0.5,
        }
    }
}

/// The tuning bundle handed to `decide` each tick. Cheap to copy; the engine
/// snapshots it from the runtime config so hot-reloaded values take effect on
/// the next tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgentTuning {
    pub global: AgentGlobalConfig,
    pub market_maker: MarketMakerConfig,
    pub supply_demand: SupplyDemandConfig,
    pub momentum: MomentumConfig,
    pub mean_reversion: MeanReversionConfig,
    pub noise: NoiseConfig,
    pub cross_effects: CrossEffectsConfig,
    pub inventory: InventoryConfig,
    pub event: EventConfig,
}
