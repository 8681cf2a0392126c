//! The global resource ledger and the per-tick update that drives it.
//!
//! One tick, in order:
//! 1. Lifespan decay: every agent loses `pollution / (rate * N) / 100`.
//! 2. Aggregate: average lifespan is the mean over all agents.
//! 3. Production: `food_production = N * rate`, fresh every tick.
//! 4. Stock: `total_food += max(0, food_production - pollution)`.
//!
//! Fuel effects, when a policy supplies them, are folded into steps 1 and 4
//! and then into pollution at the very end.

use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::params::Parameters;
use crate::population::Population;

// === CONSTANTS ===

pub const INITIAL_TOTAL_FOOD: f64 = 1_000_000.0;
/// Pollution starts at the production rate divided by this.
pub const INITIAL_POLLUTION_DIVISOR: f64 = 100.0;
/// Scales pollution-per-unit-output down to a per-tick lifespan loss.
pub const LIFESPAN_DECAY_DIVISOR: f64 = 100.0;

// === FUEL EFFECTS ===

/// Aggregate effects of the population's fuel choices for one tick.
///
/// The world applies these verbatim; deciding how fuel choices translate into
/// numbers is the job of whoever supplies them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelEffects {
    /// Added to pollution after the stock update.
    pub pollution: f64,
    /// Added to production before the non-negative clamp.
    pub food: f64,
    /// Added to every agent's lifespan delta.
    pub lifespan: f64,
}

impl FuelEffects {
    pub const NONE: FuelEffects = FuelEffects {
        pollution: 0.0,
        food: 0.0,
        lifespan: 0.0,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NONE
    }
}

// === DECAY ===

/// Per-agent lifespan delta caused by pollution.
///
/// Zero when there are no agents or no production to attribute the
/// pollution to.
pub fn lifespan_delta(pollution: f64, production_rate: f64, population: usize) -> f64 {
    let denominator = production_rate * population as f64;
    if denominator <= 0.0 {
        return 0.0;
    }
    -(pollution / denominator) / LIFESPAN_DECAY_DIVISOR
}

// === TICK REPORT ===

/// What a single tick did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub population: usize,
    pub lifespan_delta: f64,
    pub food_production: f64,
    pub food_added: f64,
    pub total_food: f64,
    pub pollution: f64,
    pub average_lifespan: Option<f64>,
}

// === WORLD STATE ===

#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    pub tick: u64,
    total_food: f64,
    pollution: f64,
    food_production: f64,
    average_lifespan: Option<f64>,
}

impl WorldState {
    /// Fresh ledger: a full food store and pollution at 1% of the production rate.
    pub fn new<A: Agent>(params: &Parameters, population: &Population<A>) -> Self {
        Self::with_ledger(
            INITIAL_TOTAL_FOOD,
            params.production_rate() / INITIAL_POLLUTION_DIVISOR,
            population,
        )
    }

    /// Ledger with an explicit food store and pollution level.
    pub fn with_ledger<A: Agent>(
        total_food: f64,
        pollution: f64,
        population: &Population<A>,
    ) -> Self {
        Self {
            tick: 0,
            total_food: total_food.max(0.0),
            pollution: pollution.max(0.0),
            food_production: 0.0,
            average_lifespan: population.mean_lifespan(),
        }
    }

    pub fn total_food(&self) -> f64 {
        self.total_food
    }

    pub fn pollution(&self) -> f64 {
        self.pollution
    }

    pub fn food_production(&self) -> f64 {
        self.food_production
    }

    /// Mean lifespan after the last tick; `None` for an empty population.
    pub fn average_lifespan(&self) -> Option<f64> {
        self.average_lifespan
    }

    /// Advance the ledger and every agent's lifespan by one tick.
    pub fn tick<A: Agent>(
        &mut self,
        population: &mut Population<A>,
        params: &Parameters,
        effects: FuelEffects,
    ) -> TickReport {
        self.tick += 1;
        let count = population.count();
        let production_rate = params.production_rate();

        // 1. Lifespan decay
        let decay = lifespan_delta(self.pollution, production_rate, count);
        #[cfg(feature = "instrument")]
        {
            if count == 0 || production_rate <= 0.0 {
                tracing::debug!(
                    target: "world_tick",
                    tick = self.tick,
                    population = count,
                    production_rate = production_rate,
                    "lifespan decay skipped"
                );
            }
        }
        let delta = decay + effects.lifespan;
        population.for_each_mut(|_, agent| agent.apply_lifespan_delta(delta));

        // 2. Aggregate
        self.average_lifespan = population.mean_lifespan();

        // 3. Production
        self.food_production = count as f64 * production_rate;

        // 4. Stock
        let food_added = (self.food_production + effects.food - self.pollution).max(0.0);
        self.total_food += food_added;

        if !effects.is_neutral() {
            self.pollution = (self.pollution + effects.pollution).max(0.0);

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "fuel_effects",
                tick = self.tick,
                pollution = effects.pollution,
                food = effects.food,
                lifespan = effects.lifespan,
            );
        }

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "world_tick",
            tick = self.tick,
            population = count as u64,
            production_rate = production_rate,
            lifespan_delta = delta,
            food_production = self.food_production,
            food_added = food_added,
            total_food = self.total_food,
            pollution = self.pollution,
            average_lifespan = self.average_lifespan.unwrap_or(f64::NAN),
        );

        TickReport {
            tick: self.tick,
            population: count,
            lifespan_delta: delta,
            food_production: self.food_production,
            food_added,
            total_food: self.total_food,
            pollution: self.pollution,
            average_lifespan: self.average_lifespan,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Citizen;
    use crate::types::EnergyStrategy;

    const EPS: f64 = 1e-9;

    fn citizens(n: usize) -> Population<Citizen> {
        Population::initialize(n, |i| Citizen::new(i, EnergyStrategy::Solar)).unwrap()
    }

    #[test]
    fn test_lifespan_delta_formula() {
        let delta = lifespan_delta(0.015, 1.5, 100);
        assert!((delta - (-0.000001)).abs() < 1e-15, "delta = {}", delta);
    }

    #[test]
    fn test_lifespan_delta_guards_division_by_zero() {
        assert_eq!(lifespan_delta(0.5, 0.0, 100), 0.0);
        assert_eq!(lifespan_delta(0.5, 1.5, 0), 0.0);
        assert_eq!(lifespan_delta(0.5, 0.0, 0), 0.0);
    }

    #[test]
    fn test_lifespan_delta_non_positive() {
        for &pollution in &[0.0, 0.001, 0.5, 10.0] {
            for &rate in &[0.1, 1.0, 2.0] {
                assert!(lifespan_delta(pollution, rate, 10) <= 0.0);
            }
        }
    }

    #[test]
    fn test_new_world_initial_ledger() {
        let params = Parameters::default();
        let pop = citizens(10);
        let world = WorldState::new(&params, &pop);
        assert_eq!(world.total_food(), 1_000_000.0);
        assert_eq!(world.pollution(), 1.5 / 100.0);
        assert_eq!(world.food_production(), 0.0);
        assert_eq!(world.average_lifespan(), Some(Citizen::DEFAULT_LIFESPAN));
        assert_eq!(world.tick, 0);
    }

    #[test]
    fn test_reference_tick() {
        let params = Parameters::default();
        let mut pop = citizens(100);
        let mut world = WorldState::new(&params, &pop);

        let report = world.tick(&mut pop, &params, FuelEffects::NONE);

        assert_eq!(report.tick, 1);
        assert_eq!(world.food_production(), 150.0);
        assert!(
            (world.total_food() - 1_000_149.985).abs() < 1e-6,
            "total_food = {}",
            world.total_food()
        );
        assert!((report.lifespan_delta - (-0.000001)).abs() < 1e-15);
        for (_, c) in pop.all() {
            assert!((c.lifespan() - (100.0 - 0.000001)).abs() < 1e-12);
        }
        let avg = world.average_lifespan().unwrap();
        assert!((avg - (100.0 - 0.000001)).abs() < 1e-12);
        assert!((world.pollution() - 0.015).abs() < EPS, "pollution is not updated");
    }

    #[test]
    fn test_production_not_cumulative() {
        let params = Parameters::default();
        let mut pop = citizens(20);
        let mut world = WorldState::new(&params, &pop);
        for _ in 0..5 {
            world.tick(&mut pop, &params, FuelEffects::NONE);
            assert_eq!(world.food_production(), 30.0);
        }
    }

    #[test]
    fn test_stock_stagnates_when_pollution_exceeds_production() {
        let params = Parameters::default();
        let mut pop = citizens(2);
        let mut world = WorldState::with_ledger(500.0, 1_000.0, &pop);
        let report = world.tick(&mut pop, &params, FuelEffects::NONE);
        assert_eq!(report.food_added, 0.0);
        assert_eq!(world.total_food(), 500.0);
    }

    #[test]
    fn test_zero_production_rate_is_neutral_for_lifespans() {
        let mut params = Parameters::default();
        params.set_production_rate(0.0);
        let mut pop = citizens(10);
        let mut world = WorldState::with_ledger(100.0, 3.0, &pop);

        let report = world.tick(&mut pop, &params, FuelEffects::NONE);

        assert_eq!(report.lifespan_delta, 0.0);
        assert_eq!(world.food_production(), 0.0);
        assert_eq!(world.total_food(), 100.0);
        assert_eq!(world.average_lifespan(), Some(Citizen::DEFAULT_LIFESPAN));
    }

    #[test]
    fn test_empty_population_tick_completes() {
        let params = Parameters::default();
        let mut pop: Population<Citizen> = Population::empty();
        let mut world = WorldState::new(&params, &pop);

        let report = world.tick(&mut pop, &params, FuelEffects::NONE);

        assert_eq!(report.lifespan_delta, 0.0);
        assert_eq!(world.average_lifespan(), None);
        assert_eq!(world.food_production(), 0.0);
        assert_eq!(world.total_food(), 1_000_000.0);
    }

    #[test]
    fn test_average_is_mean_of_uneven_lifespans() {
        let params = Parameters::default();
        let mut pop = Population::initialize(4, |i| {
            Citizen::new(i, EnergyStrategy::Solar).with_lifespan(10.0 * (i + 1) as f64)
        })
        .unwrap();
        let mut world = WorldState::with_ledger(0.0, 6.0, &pop);

        let report = world.tick(&mut pop, &params, FuelEffects::NONE);

        // delta = -(6 / (1.5 * 4)) / 100 = -0.01
        assert!((report.lifespan_delta + 0.01).abs() < 1e-12);
        let expected = (9.99 + 19.99 + 29.99 + 39.99) / 4.0;
        assert!((world.average_lifespan().unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_fuel_effects_are_applied() {
        let params = Parameters::default();
        let mut pop = citizens(10);
        let mut world = WorldState::with_ledger(0.0, 1.0, &pop);
        let effects = FuelEffects {
            pollution: 0.25,
            food: 2.0,
            lifespan: -0.5,
        };

        let report = world.tick(&mut pop, &params, effects);

        // decay reads pollution before the effect is added
        let decay = -(1.0 / 15.0) / 100.0;
        assert!((report.lifespan_delta - (decay - 0.5)).abs() < 1e-12);
        // 15 production + 2 food - 1 pollution
        assert!((world.total_food() - 16.0).abs() < 1e-12);
        assert!((world.pollution() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_pollution_never_negative_from_effects() {
        let params = Parameters::default();
        let mut pop = citizens(1);
        let mut world = WorldState::with_ledger(0.0, 0.1, &pop);
        let effects = FuelEffects {
            pollution: -5.0,
            ..FuelEffects::NONE
        };
        world.tick(&mut pop, &params, effects);
        assert_eq!(world.pollution(), 0.0);
    }
}
