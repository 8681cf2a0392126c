//! Startup configuration for a simulation run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::Citizen;
use crate::error::SimError;
use crate::params::Parameters;
use crate::world::INITIAL_TOTAL_FOOD;

/// Everything needed to build a [`crate::clock::SimulationClock`].
///
/// Missing fields take their defaults, so a host can pass `{}` or a partial
/// object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub population_size: usize,
    pub initial_lifespan: f64,
    pub initial_total_food: f64,
    /// Fixed simulation rate, independent of how often anything renders.
    pub ticks_per_second: f64,
    /// Upper bound on ticks run by a single `advance` call.
    pub max_catch_up_ticks: u32,
    /// Probability that a new citizen relies on fossil fuel.
    pub fossil_fuel_share: f64,
    pub seed: u64,
    pub parameters: Parameters,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            initial_lifespan: Citizen::DEFAULT_LIFESPAN,
            initial_total_food: INITIAL_TOTAL_FOOD,
            ticks_per_second: 50.0,
            max_catch_up_ticks: 5,
            fossil_fuel_share: 0.5,
            seed: 42,
            parameters: Parameters::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if self.population_size == 0 {
            return Err(SimError::EmptyPopulation {
                requested: self.population_size,
            });
        }
        self.step()?;
        if self.max_catch_up_ticks == 0 {
            return Err(invalid("max_catch_up_ticks must be at least 1".to_owned()));
        }
        if !(0.0..=1.0).contains(&self.fossil_fuel_share) {
            return Err(invalid(format!(
                "fossil_fuel_share must be within [0, 1], got {}",
                self.fossil_fuel_share
            )));
        }
        if !(self.initial_lifespan.is_finite() && self.initial_lifespan >= 0.0) {
            return Err(invalid(format!(
                "initial_lifespan must be non-negative, got {}",
                self.initial_lifespan
            )));
        }
        if !(self.initial_total_food.is_finite() && self.initial_total_food >= 0.0) {
            return Err(invalid(format!(
                "initial_total_food must be non-negative, got {}",
                self.initial_total_food
            )));
        }
        Ok(())
    }

    /// Wall-clock length of one tick at `ticks_per_second`.
    ///
    /// Rates whose step does not fit a `Duration`, or rounds to zero
    /// nanoseconds, are rejected.
    pub fn step(&self) -> Result<Duration, SimError> {
        let rate = self.ticks_per_second;
        if !(rate.is_finite() && rate > 0.0) {
            return Err(invalid(format!(
                "ticks_per_second must be positive and finite, got {}",
                rate
            )));
        }
        match Duration::try_from_secs_f64(1.0 / rate) {
            Ok(step) if !step.is_zero() => Ok(step),
            _ => Err(invalid(format!(
                "ticks_per_second {} gives no usable tick length",
                rate
            ))),
        }
    }
}

fn invalid(reason: String) -> SimError {
    SimError::InvalidConfig { reason }
}
