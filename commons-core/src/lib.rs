use std::time::Duration;

use wasm_bindgen::prelude::*;

pub mod agent;
pub mod clock;
pub mod config;
pub mod error;
pub mod params;
pub mod population;
pub mod snapshot;
pub mod types;
pub mod world;

pub use agent::{Agent, Citizen};
pub use clock::{FuelPolicy, NoFuelEffects, SimulationClock};
pub use config::SimulationConfig;
pub use error::SimError;
pub use params::{ParameterKind, ParameterRange, Parameters};
pub use population::Population;
pub use snapshot::{ParameterSnapshot, StrategyCounts, WorldSnapshot};
pub use types::{AgentId, EnergyStrategy};
pub use world::{FuelEffects, TickReport, WorldState, lifespan_delta};

#[cfg(feature = "instrument")]
pub use instrument;

// ============================================================================
// WASM API - Simulation
// ============================================================================

#[wasm_bindgen]
pub struct Simulation {
    clock: SimulationClock,
}

#[wasm_bindgen]
impl Simulation {
    /// Default world: 100 citizens, default parameters, 50 ticks per second.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Simulation, JsError> {
        Ok(Self::from_config(&SimulationConfig::default())?)
    }

    /// Build from a (possibly partial) JSON `SimulationConfig`.
    #[wasm_bindgen]
    pub fn from_config_json(json: &str) -> Result<Simulation, JsError> {
        let config = SimulationConfig::from_json(json)?;
        Ok(Self::from_config(&config)?)
    }

    /// Run exactly one tick
    #[wasm_bindgen]
    pub fn advance_tick(&mut self) {
        self.clock.tick();
    }

    /// Feed elapsed frame time; returns how many fixed ticks ran
    #[wasm_bindgen]
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        if !(elapsed_ms.is_finite() && elapsed_ms > 0.0) {
            return 0;
        }
        // Stalls too long for a Duration saturate; the catch-up cap applies
        let elapsed = Duration::try_from_secs_f64(elapsed_ms / 1000.0).unwrap_or(Duration::MAX);
        self.clock.advance(elapsed)
    }

    /// Get the current tick
    #[wasm_bindgen]
    pub fn get_tick(&self) -> u64 {
        self.clock.current_tick()
    }

    /// Get a snapshot of the current state for rendering
    #[wasm_bindgen]
    pub fn get_state_snapshot(&self) -> WorldSnapshot {
        self.clock.snapshot_with_strategies()
    }

    /// Control panel lines, e.g. `Food Production Rate (1.50)`
    #[wasm_bindgen]
    pub fn get_display_lines(&self) -> Vec<String> {
        self.clock.snapshot().display_lines()
    }

    /// Set a parameter; returns the value actually stored after clamping
    #[wasm_bindgen]
    pub fn set_parameter(&mut self, kind: ParameterKind, value: f64) -> f64 {
        self.clock.set_parameter(kind, value)
    }

    #[wasm_bindgen]
    pub fn get_parameter(&self, kind: ParameterKind) -> f64 {
        self.clock.parameter(kind)
    }

    /// Set several parameters from `{ "production_rate": 1.2, ... }`
    #[wasm_bindgen]
    pub fn set_parameters_json(&mut self, json: &str) -> Result<u32, JsError> {
        let applied = self.clock.params_mut().apply_json(json)?;
        Ok(applied as u32)
    }

    #[wasm_bindgen]
    pub fn set_paused(&mut self, paused: bool) {
        self.clock.set_paused(paused);
    }

    #[wasm_bindgen]
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }
}

impl Simulation {
    pub fn from_config(config: &SimulationConfig) -> Result<Simulation, SimError> {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        Ok(Self {
            clock: SimulationClock::new(config)?,
        })
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }
}
