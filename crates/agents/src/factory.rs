//! Population builder.
//!
//! Samples per-agent parameters from configured distributions, assigns
//! monotone ids, and deposits initial cash. Deterministic under a fixed
//! seed: each agent gets its own rng seeded from the factory stream.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, LogNormal, Normal};
use tracing::info;

use types::{AgentId, AgentParams};

use crate::agent::{Agent, Strategy};
use crate::config::{AgentCashConfig, AgentCountsConfig, AgentGenConfig, AgentTuning};
use crate::core::AgentCore;
use crate::strategies::{
    CrossEffectsTrader, EventTrader, InventoryTrader, MarketMaker, MeanReversionTrader,
    MomentumTrader, NoiseTrader, SupplyDemandTrader,
};

pub struct AgentFactory {
    rng: StdRng,
    next_id: u64,
}

impl AgentFactory {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Build the whole population with counts per strategy.
    pub fn create_population(
        &mut self,
        counts: &AgentCountsConfig,
        cash: &AgentCashConfig,
        generation: &AgentGenConfig,
        tuning: &AgentTuning,
    ) -> Vec<Agent> {
        let mut agents = Vec::with_capacity(counts.total() as usize);

        for _ in 0..counts.supply_demand {
            agents.push(self.create_supply_demand(cash, generation, tuning));
        }
        for _ in 0..counts.momentum {
            agents.push(self.create_momentum(cash, generation, tuning));
        }
        for _ in 0..counts.mean_reversion {
            agents.push(self.create_mean_reversion(cash, generation, tuning));
        }
        for _ in 0..counts.noise {
            agents.push(self.create_noise(cash, generation, tuning));
        }
        for _ in 0..counts.market_maker {
            agents.push(self.create_market_maker(cash, generation, tuning));
        }
        for _ in 0..counts.cross_effects {
            agents.push(self.create_cross_effects(cash, generation, tuning));
        }
        for _ in 0..counts.inventory {
            agents.push(self.create_inventory(cash, generation, tuning));
        }
        for _ in 0..counts.event {
            agents.push(self.create_event(cash, generation, tuning));
        }

        info!(total = agents.len(), "created agent population");
        agents
    }

    pub fn create_supply_demand(
        &mut self,
        cash: &AgentCashConfig,
        generation: &AgentGenConfig,
        tuning: &AgentTuning,
    ) -> Agent {
        let params = self.generate_params(generation);
        let cfg = &tuning.supply_demand;
        let threshold = cfg.threshold_base + cfg.threshold_risk_scale * params.risk_aversion;
        let noise_std = cfg.noise_std_base + cfg.noise_std_range * self.uniform(0.0, 1.0);

        let core = self.build_core(cash, params, tuning);
        Agent::new(
            core,
            Strategy::SupplyDemand(SupplyDemandTrader::new(threshold, noise_std)),
        )
    }

    pub fn create_momentum(
        &mut self,
        cash: &AgentCashConfig,
        generation: &AgentGenConfig,
        tuning: &AgentTuning,
    ) -> Agent {
        let params = self.generate_params(generation);
        let cfg = &tuning.momentum;
        let short = cfg.short_period_min + self.uniform_index(cfg.short_period_range + 1);
        let long =
            short + cfg.long_period_offset_min + self.uniform_index(cfg.long_period_offset_range + 1);

        let core = self.build_core(cash, params, tuning);
        Agent::new(core, Strategy::Momentum(MomentumTrader::new(short, long)))
    }

    pub fn create_mean_reversion(
        &mut self,
        cash: &AgentCashConfig,
        generation: &AgentGenConfig,
        tuning: &AgentTuning,
    ) -> Agent {
        let params = self.generate_params(generation);
        let cfg = &tuning.mean_reversion;
        let lookback = cfg.lookback_min + self.uniform_index(cfg.lookback_range + 1);
        let z_threshold = cfg.z_threshold_min + self.uniform(0.0, cfg.z_threshold_range);

        let core = self.build_core(cash, params, tuning);
        Agent::new(
            core,
            Strategy::MeanReversion(MeanReversionTrader::new(lookback, z_threshold)),
        )
    }

    pub fn create_noise(
        &mut self,
        cash: &AgentCashConfig,
        generation: &AgentGenConfig,
        tuning: &AgentTuning,
    ) -> Agent {
        let params = self.generate_params(generation);
        let cfg = &tuning.noise;
        let trade_probability = cfg.trade_prob_min + self.uniform(0.0, cfg.trade_prob_range);
        let sensitivity = self.uniform(cfg.sent_sensitivity_min, cfg.sent_sensitivity_max);

        let core = self.build_core(cash, params, tuning);
        Agent::new(
            core,
            Strategy::Noise(NoiseTrader::new(trade_probability, sensitivity)),
        )
    }

    pub fn create_market_maker(
        &mut self,
        cash: &AgentCashConfig,
        generation: &AgentGenConfig,
        tuning: &AgentTuning,
    ) -> Agent {
        let params = self.generate_params(generation);
        let cfg = &tuning.market_maker;
        let base_spread = self.uniform(cfg.base_spread_min, cfg.base_spread_max);
        let inventory_skew = self.uniform(cfg.inventory_skew_min, cfg.inventory_skew_max);
        let span = (cfg.max_inventory_max - cfg.max_inventory_min).max(0) as usize;
        let max_inventory = cfg.max_inventory_min + self.uniform_index(span + 1) as i64;

        let core = self.build_core(cash, params, tuning);
        Agent::new(
            core,
            Strategy::MarketMaker(MarketMaker::new(base_spread, inventory_skew, max_inventory)),
        )
    }

    pub fn create_cross_effects(
        &mut self,
        cash: &AgentCashConfig,
        generation: &AgentGenConfig,
        tuning: &AgentTuning,
    ) -> Agent {
        let params = self.generate_params(generation);
        let cfg = &tuning.cross_effects;
        let threshold = cfg.threshold_base + cfg.threshold_risk_scale * params.risk_aversion;

        let core = self.build_core(cash, params, tuning);
        Agent::new(
            core,
            Strategy::CrossEffects(CrossEffectsTrader::new(threshold)),
        )
    }

    pub fn create_inventory(
        &mut self,
        cash: &AgentCashConfig,
        generation: &AgentGenConfig,
        tuning: &AgentTuning,
    ) -> Agent {
        let params = self.generate_params(generation);
        let cfg = &tuning.inventory;
        let target_ratio = cfg.target_ratio_base + self.uniform(0.0, cfg.target_ratio_range);
        let threshold =
            cfg.rebalance_threshold_base + cfg.rebalance_threshold_risk_scale * params.risk_aversion;

        let core = self.build_core(cash, params, tuning);
        Agent::new(
            core,
            Strategy::Inventory(InventoryTrader::new(target_ratio, threshold)),
        )
    }

    pub fn create_event(
        &mut self,
        cash: &AgentCashConfig,
        generation: &AgentGenConfig,
        tuning: &AgentTuning,
    ) -> Agent {
        let params = self.generate_params(generation);
        let cfg = &tuning.event;
        let threshold =
            cfg.reaction_threshold_base + cfg.reaction_threshold_risk_scale * params.risk_aversion;
        let cooldown = cfg.cooldown_base + self.uniform_index(cfg.cooldown_range as usize + 1) as u32;

        let core = self.build_core(cash, params, tuning);
        Agent::new(core, Strategy::Event(EventTrader::new(threshold, cooldown)))
    }

    // -- Sampling -----------------------------------------------------------

    fn build_core(
        &mut self,
        cash: &AgentCashConfig,
        params: AgentParams,
        tuning: &AgentTuning,
    ) -> AgentCore {
        let id = AgentId(self.next_id);
        self.next_id += 1;

        let deposit = self.normal(cash.mean_cash, cash.std_cash).max(1000.0);
        let agent_rng = StdRng::seed_from_u64(self.rng.random());

        AgentCore::new(
            id,
            deposit,
            params,
            tuning.global.max_short_position,
            agent_rng,
        )
    }

    fn generate_params(&mut self, generation: &AgentGenConfig) -> AgentParams {
        let risk_aversion = self
            .normal(generation.risk_aversion_mean, generation.risk_aversion_std)
            .max(generation.risk_aversion_min);
        let reaction_speed = Exp::new(generation.reaction_speed_lambda)
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or(1.0);
        let news_weight = self.uniform(generation.news_weight_min, generation.news_weight_max);
        let confidence_level = self.uniform(generation.confidence_min, generation.confidence_max);
        let time_horizon = LogNormal::new(generation.time_horizon_mu, generation.time_horizon_sigma)
            .map(|d| d.sample(&mut self.rng) as i64)
            .unwrap_or(20);

        AgentParams {
            risk_aversion,
            reaction_speed,
            news_weight,
            confidence_level,
            time_horizon,
        }
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..high)
    }

    fn uniform_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        if std_dev <= 0.0 {
            return mean;
        }
        Normal::new(mean, std_dev)
            .map(|n| n.sample(&mut self.rng))
            .unwrap_or(mean)
    }
}
