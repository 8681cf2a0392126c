//! Fixed-size, insertion-ordered collection of agents.
//!
//! Agents are created once, up front. Nothing adds or removes agents
//! afterwards, so iteration order is stable for the life of the simulation.

use rand::Rng;
use slotmap::SlotMap;

use crate::agent::{Agent, Citizen};
use crate::error::SimError;
use crate::types::{AgentId, EnergyStrategy};

#[derive(Debug, Clone)]
pub struct Population<A> {
    agents: SlotMap<AgentId, A>,
    order: Vec<AgentId>,
}

impl<A> Default for Population<A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<A> Population<A> {
    /// A population with no agents. Only useful for exercising the
    /// degenerate path of the world tick.
    pub fn empty() -> Self {
        Self {
            agents: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Create exactly `n` agents, built in index order by `make`.
    pub fn initialize(n: usize, mut make: impl FnMut(usize) -> A) -> Result<Self, SimError> {
        if n == 0 {
            return Err(SimError::EmptyPopulation { requested: n });
        }

        let mut agents = SlotMap::with_capacity_and_key(n);
        let mut order = Vec::with_capacity(n);
        for index in 0..n {
            order.push(agents.insert(make(index)));
        }
        Ok(Self { agents, order })
    }

    pub fn count(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All agents in creation order.
    pub fn all(&self) -> impl Iterator<Item = (AgentId, &A)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.agents.get(id).map(|agent| (id, agent)))
    }

    /// Visit every agent mutably, in creation order.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(AgentId, &mut A)) {
        for &id in &self.order {
            if let Some(agent) = self.agents.get_mut(id) {
                f(id, agent);
            }
        }
    }

    pub fn ids(&self) -> &[AgentId] {
        &self.order
    }

    pub fn get(&self, id: AgentId) -> Option<&A> {
        self.agents.get(id)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut A> {
        self.agents.get_mut(id)
    }
}

impl<A: Agent> Population<A> {
    pub fn total_lifespan(&self) -> f64 {
        self.all().map(|(_, agent)| agent.lifespan()).sum()
    }

    /// Arithmetic mean lifespan, or `None` when there is nobody to average.
    pub fn mean_lifespan(&self) -> Option<f64> {
        if self.is_empty() {
            None
        } else {
            Some(self.total_lifespan() / self.count() as f64)
        }
    }
}

impl Population<Citizen> {
    /// Citizens named `Agent0..AgentN`, each picking fossil fuel with
    /// probability `fossil_share` and starting at `lifespan`.
    pub fn citizens<R: Rng>(
        n: usize,
        lifespan: f64,
        fossil_share: f64,
        rng: &mut R,
    ) -> Result<Self, SimError> {
        let p_fossil = if fossil_share.is_nan() {
            0.0
        } else {
            fossil_share.clamp(0.0, 1.0)
        };
        Self::initialize(n, |index| {
            let strategy = if rng.random_bool(p_fossil) {
                EnergyStrategy::FossilFuel
            } else {
                EnergyStrategy::Solar
            };
            Citizen::new(index, strategy).with_lifespan(lifespan)
        })
    }

    /// Number of (solar, fossil fuel) citizens.
    pub fn strategy_counts(&self) -> (usize, usize) {
        self.all().fold((0, 0), |(solar, fossil), (_, c)| {
            if c.strategy.is_fossil() {
                (solar, fossil + 1)
            } else {
                (solar + 1, fossil)
            }
        })
    }
}
