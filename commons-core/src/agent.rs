//! The agent contract the world tick depends on, plus the stock citizen.

use crate::types::EnergyStrategy;

/// What the world needs from an agent: a readable lifespan and a way to
/// nudge it. Energy-strategy behaviour lives entirely behind this seam.
pub trait Agent {
    fn lifespan(&self) -> f64;

    fn apply_lifespan_delta(&mut self, delta: f64);
}

/// A member of the commons, identified by name and energy strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct Citizen {
    pub name: String,
    pub strategy: EnergyStrategy,
    lifespan: f64,
}

impl Citizen {
    pub const DEFAULT_LIFESPAN: f64 = 100.0;

    pub fn new(index: usize, strategy: EnergyStrategy) -> Self {
        Self {
            name: format!("Agent{}", index),
            strategy,
            lifespan: Self::DEFAULT_LIFESPAN,
        }
    }

    pub fn with_lifespan(mut self, lifespan: f64) -> Self {
        self.lifespan = lifespan.max(0.0);
        self
    }
}

impl Agent for Citizen {
    fn lifespan(&self) -> f64 {
        self.lifespan
    }

    /// Lifespan never drops below zero.
    fn apply_lifespan_delta(&mut self, delta: f64) {
        self.lifespan = (self.lifespan + delta).max(0.0);
    }
}
