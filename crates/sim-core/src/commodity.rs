//! Tradable commodity: price state, trade impact, circuit breaker, and
//! supply/demand dynamics.
//!
//! Price is never set by the dynamics here; it emerges solely from matched
//! trades via `apply_trade_price`. The supply/demand state feeds the
//! imbalance signal agents trade on.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use std::collections::VecDeque;

use types::{Price, SupplyDemand, Symbol, Volume};

/// Bounded price history per commodity.
const MAX_HISTORY: usize = 1000;

/// A single tradable commodity owned by the engine.
#[derive(Debug, Clone)]
pub struct Commodity {
    symbol: Symbol,
    name: String,
    category: String,
    price: Price,
    volatility: f64,
    daily_volume: Volume,
    price_history: VecDeque<Price>,

    supply_demand: SupplyDemand,
    base_production: f64,
    base_consumption: f64,
    base_inventory: f64,

    max_daily_move: f64,
    day_open_price: Price,
    circuit_broken: bool,

    impact_dampening: f64,
    price_floor: f64,
    supply_decay_rate: f64,
    demand_decay_rate: f64,
}

impl Commodity {
    pub fn new(
        symbol: impl Into<Symbol>,
        name: impl Into<String>,
        category: impl Into<String>,
        initial_price: Price,
    ) -> Self {
        Self::with_bases(symbol, name, category, initial_price, 100.0, 100.0, 0.02, 50.0)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_bases(
        symbol: impl Into<Symbol>,
        name: impl Into<String>,
        category: impl Into<String>,
        initial_price: Price,
        base_production: f64,
        base_consumption: f64,
        volatility: f64,
        initial_inventory: f64,
    ) -> Self {
        let mut price_history = VecDeque::with_capacity(MAX_HISTORY);
        price_history.push_back(initial_price);

        Self {
            symbol: symbol.into(),
            name: name.into(),
            category: category.into(),
            price: initial_price,
            volatility,
            daily_volume: 0,
            price_history,
            supply_demand: SupplyDemand {
                production: base_production,
                consumption: base_consumption,
                imports: 0.0,
                exports: 0.0,
                inventory: initial_inventory,
            },
            base_production,
            base_consumption,
            base_inventory: initial_inventory,
            max_daily_move: 0.15,
            day_open_price: 0.0,
            circuit_broken: false,
            impact_dampening: 0.5,
            price_floor: 0.01,
            supply_decay_rate: 0.1,
            demand_decay_rate: 0.1,
        }
    }

    // -- Accessors ----------------------------------------------------------

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    pub fn daily_volume(&self) -> Volume {
        self.daily_volume
    }

    pub fn price_history(&self) -> &VecDeque<Price> {
        &self.price_history
    }

    pub fn supply_demand(&self) -> SupplyDemand {
        self.supply_demand
    }

    /// Normalised demand-minus-supply imbalance (see `SupplyDemand`).
    pub fn imbalance(&self) -> f64 {
        self.supply_demand.imbalance()
    }

    pub fn is_circuit_broken(&self) -> bool {
        self.circuit_broken
    }

    pub fn day_open_price(&self) -> Price {
        self.day_open_price
    }

    pub fn max_daily_move(&self) -> f64 {
        self.max_daily_move
    }

    // -- Tuning -------------------------------------------------------------

    pub fn set_max_daily_move(&mut self, frac: f64) {
        self.max_daily_move = frac;
    }

    pub fn set_impact_dampening(&mut self, dampening: f64) {
        self.impact_dampening = dampening;
    }

    pub fn set_price_floor(&mut self, floor: f64) {
        self.price_floor = floor;
    }

    pub fn set_supply_decay_rate(&mut self, rate: f64) {
        self.supply_decay_rate = rate;
    }

    pub fn set_demand_decay_rate(&mut self, rate: f64) {
        self.demand_decay_rate = rate;
    }

    // -- Price updates ------------------------------------------------------

    /// Set the displayed price: clamp to the floor, enforce the daily move
    /// limit against the day-open price (tripping the circuit breaker when
    /// the clamp fires), and append to the bounded history.
    pub fn set_price(&mut self, price: Price) {
        let mut price = if price <= 0.0 { self.price_floor } else { price };

        if self.day_open_price > 0.0 && self.max_daily_move > 0.0 {
            let move_from_open = (price - self.day_open_price) / self.day_open_price;
            if move_from_open.abs() > self.max_daily_move {
                self.circuit_broken = true;
                let sign = if move_from_open > 0.0 { 1.0 } else { -1.0 };
                price = self.day_open_price * (1.0 + sign * self.max_daily_move);
            }
        }

        self.price = price;
        self.price_history.push_back(price);
        while self.price_history.len() > MAX_HISTORY {
            self.price_history.pop_front();
        }
    }

    /// Blend the displayed price toward an execution price with square-root
    /// volume scaling: a single-unit trade gets the full dampening factor, a
    /// 100-unit trade a tenth of it, capped at 0.5 so one trade can never
    /// drag the price more than halfway to the fill.
    pub fn apply_trade_price(&mut self, trade_price: Price, trade_qty: Volume) {
        if trade_price <= 0.0 || !trade_price.is_finite() {
            return;
        }
        if self.circuit_broken {
            return;
        }

        let qty = trade_qty.max(1) as f64;
        let alpha = (self.impact_dampening / qty.sqrt().max(1.0)).min(0.5);
        let blended = self.price * (1.0 - alpha) + trade_price * alpha;
        self.set_price(blended);
    }

    pub fn add_volume(&mut self, volume: Volume) {
        self.daily_volume += volume;
    }

    // -- Daily lifecycle ----------------------------------------------------

    pub fn mark_day_open(&mut self) {
        self.day_open_price = self.price;
    }

    pub fn reset_circuit_breaker(&mut self) {
        self.circuit_broken = false;
    }

    pub fn reset_daily_volume(&mut self) {
        self.daily_volume = 0;
    }

    // -- Supply/demand dynamics ---------------------------------------------

    /// Additively perturb production by `magnitude · base_production`,
    /// floored at zero. A negative shock also destroys a proportional share
    /// of inventory.
    pub fn apply_supply_shock(&mut self, magnitude: f64) {
        let shock = magnitude * self.base_production;
        self.supply_demand.production = (self.supply_demand.production + shock).max(0.0);

        if magnitude < 0.0 {
            self.supply_demand.inventory =
                (self.supply_demand.inventory + magnitude * self.supply_demand.inventory).max(0.0);
        }
    }

    /// Additively perturb consumption by `magnitude · base_consumption`,
    /// floored at zero.
    pub fn apply_demand_shock(&mut self, magnitude: f64) {
        let shock = magnitude * self.base_consumption;
        self.supply_demand.consumption = (self.supply_demand.consumption + shock).max(0.0);
    }

    /// One tick of exogenous dynamics: production and consumption mean-revert
    /// toward base with geometric decay raised to `tick_scale`, Gaussian
    /// noise scaled by sqrt(tick_scale) keeps the diffusion invariant to the
    /// tick rate, and inventory integrates the production-minus-consumption
    /// flow before mean-reverting toward its base level.
    pub fn update_supply_demand<R: Rng + ?Sized>(&mut self, tick_scale: f64, rng: &mut R) {
        let decay_supply = self.supply_decay_rate.powf(tick_scale);
        let decay_demand = self.demand_decay_rate.powf(tick_scale);

        let sd = &mut self.supply_demand;
        sd.production = self.base_production * (1.0 - decay_supply) + sd.production * decay_supply;
        sd.consumption =
            self.base_consumption * (1.0 - decay_demand) + sd.consumption * decay_demand;

        let sqrt_ts = tick_scale.sqrt();
        let supply_noise = normal_sample(rng, 0.01 * self.base_production * sqrt_ts);
        let demand_noise = normal_sample(rng, 0.01 * self.base_consumption * sqrt_ts);
        sd.production = (sd.production + supply_noise).max(0.0);
        sd.consumption = (sd.consumption + demand_noise).max(0.0);

        let flow_delta = (sd.production - sd.consumption) * tick_scale;
        sd.inventory = (sd.inventory + flow_delta).max(0.0);
        let inv_decay = 0.05f64.powf(tick_scale);
        sd.inventory = self.base_inventory * (1.0 - inv_decay) + sd.inventory * inv_decay;
    }

    // -- Derived queries ----------------------------------------------------

    /// Arithmetic return over the last `periods` history entries; exactly 0
    /// with insufficient history.
    pub fn get_return(&self, periods: usize) -> f64 {
        if self.price_history.len() < periods + 1 {
            return 0.0;
        }
        let idx = self.price_history.len() - periods - 1;
        let old_price = self.price_history[idx];
        if old_price <= 0.0 {
            return 0.0;
        }
        (self.price - old_price) / old_price
    }

    /// Realised volatility of per-period returns over the last `periods`
    /// entries; falls back to the configured volatility with insufficient
    /// history.
    pub fn volatility_estimate(&self, periods: usize) -> f64 {
        if self.price_history.len() < periods + 1 {
            return self.volatility;
        }

        let start = self.price_history.len() - periods - 1;
        let mut returns = Vec::with_capacity(periods);
        for i in start..self.price_history.len() - 1 {
            let prev = self.price_history[i];
            if prev > 0.0 {
                returns.push((self.price_history[i + 1] - prev) / prev);
            }
        }
        if returns.is_empty() {
            return self.volatility;
        }

        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let sq_sum: f64 = returns.iter().map(|r| (r - mean) * (r - mean)).sum();
        (sq_sum / returns.len() as f64).sqrt()
    }
}

fn normal_sample<R: Rng + ?Sized>(rng: &mut R, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    Normal::new(0.0, std_dev)
        .map(|n| n.sample(rng))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn oil() -> Commodity {
        Commodity::new("OIL", "Crude Oil", "Energy", 100.0)
    }

    #[test]
    fn impact_is_dampened_by_sqrt_volume() {
        let mut c = oil();
        c.apply_trade_price(105.0, 10);

        // alpha = min(0.5, 0.5 / sqrt(10)) ~= 0.1581
        let alpha = 0.5f64 / 10f64.sqrt();
        let expected = 100.0 * (1.0 - alpha) + 105.0 * alpha;
        assert!((c.price() - expected).abs() < 1e-9);
        assert!((c.price() - 100.79).abs() < 0.01);
    }

    #[test]
    fn single_unit_trade_moves_halfway() {
        let mut c = oil();
        c.apply_trade_price(120.0, 1);
        assert!((c.price() - 110.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_exec_price_is_ignored() {
        let mut c = oil();
        c.apply_trade_price(0.0, 5);
        c.apply_trade_price(-3.0, 5);
        c.apply_trade_price(f64::NAN, 5);
        assert_eq!(c.price(), 100.0);
    }

    #[test]
    fn circuit_breaker_trips_and_clamps() {
        let mut c = oil();
        c.set_max_daily_move(0.10);
        c.mark_day_open();

        // Blended 110 is exactly the 10% bound: no trip.
        c.apply_trade_price(120.0, 1);
        assert!((c.price() - 110.0).abs() < 1e-9);
        assert!(!c.is_circuit_broken());

        // Blended 120 is 20% above open: clamped to 110 and tripped.
        c.apply_trade_price(130.0, 1);
        assert!((c.price() - 110.0).abs() < 1e-9);
        assert!(c.is_circuit_broken());

        // Broken: further trades are no-ops until the next day.
        c.apply_trade_price(150.0, 1);
        assert!((c.price() - 110.0).abs() < 1e-9);

        c.reset_circuit_breaker();
        c.mark_day_open();
        c.apply_trade_price(112.0, 1);
        assert!(c.price() > 110.0);
    }

    #[test]
    fn price_respects_floor() {
        let mut c = oil();
        c.set_price(-5.0);
        assert_eq!(c.price(), 0.01);
        c.set_price(0.0);
        assert_eq!(c.price(), 0.01);
    }

    #[test]
    fn daily_move_bound_holds_for_any_input() {
        let mut c = oil();
        c.set_max_daily_move(0.10);
        c.mark_day_open();
        let open = c.price();

        for target in [50.0, 95.0, 109.0, 111.0, 200.0, 0.5] {
            c.reset_circuit_breaker();
            c.set_price(target);
            let rel = (c.price() - open).abs() / open;
            assert!(rel <= 0.10 + 1e-12, "move {} out of bounds", rel);

            let would_violate = ((target.max(0.01) - open) / open).abs() > 0.10;
            assert_eq!(c.is_circuit_broken(), would_violate);
        }
    }

    #[test]
    fn supply_shock_hits_production_and_inventory() {
        let mut c = oil();
        c.apply_supply_shock(-0.20);

        let sd = c.supply_demand();
        assert!((sd.production - 80.0).abs() < 1e-9);
        // Negative shock destroys 20% of inventory too.
        assert!((sd.inventory - 40.0).abs() < 1e-9);
        assert!((c.imbalance() - 20.0 / 90.0).abs() < 1e-9);
    }

    #[test]
    fn demand_shock_hits_consumption() {
        let mut c = oil();
        c.apply_demand_shock(0.15);
        assert!((c.supply_demand().consumption - 115.0).abs() < 1e-9);
    }

    #[test]
    fn dynamics_mean_revert_toward_base() {
        let mut c = oil();
        c.apply_supply_shock(-0.5);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            c.update_supply_demand(1.0, &mut rng);
        }

        // Production pulled back near its base of 100.
        assert!((c.supply_demand().production - 100.0).abs() < 10.0);
    }

    #[test]
    fn dynamics_never_set_price() {
        let mut c = oil();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            c.update_supply_demand(1.0, &mut rng);
        }
        assert_eq!(c.price(), 100.0);
        assert_eq!(c.price_history().len(), 1);
    }

    #[test]
    fn return_is_zero_with_short_history() {
        let c = oil();
        assert_eq!(c.get_return(1), 0.0);
        assert_eq!(c.get_return(10), 0.0);
    }

    #[test]
    fn return_over_periods() {
        let mut c = oil();
        c.set_price(110.0);
        assert!((c.get_return(1) - 0.10).abs() < 1e-9);
    }

    #[test]
    fn history_is_bounded() {
        let mut c = oil();
        for i in 0..1500 {
            c.set_price(100.0 + (i % 7) as f64);
        }
        assert_eq!(c.price_history().len(), 1000);
    }
}
