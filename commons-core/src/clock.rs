//! Fixed-step driver for the world tick.
//!
//! The clock owns the world, the population and the parameters, and is the
//! only thing that mutates them. Hosts feed it wall-clock time through
//! [`SimulationClock::advance`]; the clock turns that into whole ticks at its
//! own fixed rate, however often the host happens to render. Presentation
//! reads go through [`SimulationClock::snapshot`], which can only run
//! between ticks.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::agent::{Agent, Citizen};
use crate::config::SimulationConfig;
use crate::error::SimError;
use crate::params::{ParameterKind, Parameters};
use crate::population::Population;
use crate::snapshot::WorldSnapshot;
use crate::world::{FuelEffects, INITIAL_POLLUTION_DIVISOR, TickReport, WorldState};

// === FUEL POLICY ===

/// Supplies the aggregate fuel effects for the coming tick.
pub trait FuelPolicy<A> {
    fn fuel_effects(&mut self, population: &Population<A>, params: &Parameters) -> FuelEffects;
}

/// Applies no fuel effects; the tick runs on pollution and production alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFuelEffects;

impl<A> FuelPolicy<A> for NoFuelEffects {
    fn fuel_effects(&mut self, _population: &Population<A>, _params: &Parameters) -> FuelEffects {
        FuelEffects::NONE
    }
}

impl<A, F> FuelPolicy<A> for F
where
    F: FnMut(&Population<A>, &Parameters) -> FuelEffects,
{
    fn fuel_effects(&mut self, population: &Population<A>, params: &Parameters) -> FuelEffects {
        self(population, params)
    }
}

// === CLOCK ===

pub struct SimulationClock<A = Citizen, P = NoFuelEffects> {
    world: WorldState,
    population: Population<A>,
    params: Parameters,
    policy: P,
    step: Duration,
    accumulator: Duration,
    max_catch_up_ticks: u32,
    paused: bool,
}

impl SimulationClock<Citizen, NoFuelEffects> {
    /// Build a world of seeded citizens from `config`.
    pub fn new(config: &SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        let step = config.step()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let population = Population::citizens(
            config.population_size,
            config.initial_lifespan,
            config.fossil_fuel_share,
            &mut rng,
        )?;
        let params = config.parameters.clone();
        let world = WorldState::with_ledger(
            config.initial_total_food,
            params.production_rate() / INITIAL_POLLUTION_DIVISOR,
            &population,
        );

        Ok(Self {
            world,
            population,
            params,
            policy: NoFuelEffects,
            step,
            accumulator: Duration::ZERO,
            max_catch_up_ticks: config.max_catch_up_ticks,
            paused: false,
        })
    }

    pub fn snapshot_with_strategies(&self) -> WorldSnapshot {
        let (solar, fossil) = self.population.strategy_counts();
        self.snapshot().with_strategies(solar, fossil)
    }
}

impl<A: Agent> SimulationClock<A, NoFuelEffects> {
    /// Clock over an existing population, ticking every `step`.
    pub fn from_parts(population: Population<A>, params: Parameters, step: Duration) -> Self {
        let world = WorldState::new(&params, &population);
        Self {
            world,
            population,
            params,
            policy: NoFuelEffects,
            step,
            accumulator: Duration::ZERO,
            max_catch_up_ticks: SimulationConfig::default().max_catch_up_ticks,
            paused: false,
        }
    }
}

impl<A: Agent, P: FuelPolicy<A>> SimulationClock<A, P> {
    /// Swap in a fuel policy, keeping all state.
    pub fn with_fuel_policy<Q: FuelPolicy<A>>(self, policy: Q) -> SimulationClock<A, Q> {
        SimulationClock {
            world: self.world,
            population: self.population,
            params: self.params,
            policy,
            step: self.step,
            accumulator: self.accumulator,
            max_catch_up_ticks: self.max_catch_up_ticks,
            paused: self.paused,
        }
    }

    /// Run exactly one tick, regardless of pause state or elapsed time.
    pub fn tick(&mut self) -> TickReport {
        let effects = self.policy.fuel_effects(&self.population, &self.params);
        self.world.tick(&mut self.population, &self.params, effects)
    }

    /// Feed elapsed wall-clock time; runs as many whole ticks as fit, up to
    /// the catch-up cap. Returns the number of ticks run.
    ///
    /// Time beyond the cap is dropped rather than queued, so a long stall
    /// does not turn into a burst of ticks later.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if self.paused || self.step.is_zero() {
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(elapsed);
        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_catch_up_ticks {
            self.tick();
            self.accumulator -= self.step;
            ticks += 1;
        }
        if self.accumulator >= self.step {
            self.accumulator = Duration::ZERO;
        }
        ticks
    }

    /// Fraction of the next step already accumulated, in `[0, 1)`.
    pub fn alpha(&self) -> f64 {
        if self.step.is_zero() {
            return 0.0;
        }
        (self.accumulator.as_secs_f64() / self.step.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.world, &self.population, &self.params)
            .with_paused(self.paused)
    }

    pub fn set_parameter(&mut self, kind: ParameterKind, value: f64) -> f64 {
        self.params.set(kind, value)
    }

    pub fn parameter(&self, kind: ParameterKind) -> f64 {
        self.params.get(kind)
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn population(&self) -> &Population<A> {
        &self.population
    }

    pub fn current_tick(&self) -> u64 {
        self.world.tick
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn set_step(&mut self, step: Duration) {
        self.step = step;
        self.accumulator = Duration::ZERO;
    }

    pub fn set_max_catch_up_ticks(&mut self, max: u32) {
        self.max_catch_up_ticks = max.max(1);
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Pausing also drops any partially accumulated step.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if paused {
            self.accumulator = Duration::ZERO;
        }
    }
}
