use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::agent::Agent;
use crate::params::{ParameterKind, Parameters};
use crate::population::Population;
use crate::world::WorldState;

// ============================================================================
// Snapshots - Read-only views taken between ticks for presentation
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ParameterSnapshot {
    pub kind: ParameterKind,
    pub label: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
}

impl ParameterSnapshot {
    pub fn capture(kind: ParameterKind, params: &Parameters) -> Self {
        let range = kind.range();
        Self {
            kind,
            label: kind.label().to_string(),
            value: params.get(kind),
            min: range.min,
            max: range.max,
        }
    }

    pub fn display(&self) -> String {
        format!("{} ({:.2})", self.label, self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct StrategyCounts {
    pub solar: u32,
    pub fossil_fuel: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub population: u32,
    pub food_production: f64,
    pub total_food: f64,
    pub pollution: f64,
    /// None when there are no agents to average over.
    pub average_lifespan: Option<f64>,
    pub parameters: Vec<ParameterSnapshot>,
    pub strategies: Option<StrategyCounts>,
    pub paused: bool,
}

impl WorldSnapshot {
    pub fn capture<A: Agent>(
        world: &WorldState,
        population: &Population<A>,
        params: &Parameters,
    ) -> Self {
        Self {
            tick: world.tick,
            population: population.count() as u32,
            food_production: world.food_production(),
            total_food: world.total_food(),
            pollution: world.pollution(),
            average_lifespan: world.average_lifespan(),
            parameters: ParameterKind::ALL
                .into_iter()
                .map(|kind| ParameterSnapshot::capture(kind, params))
                .collect(),
            strategies: None,
            paused: false,
        }
    }

    pub fn with_strategies(mut self, solar: usize, fossil_fuel: usize) -> Self {
        self.strategies = Some(StrategyCounts {
            solar: solar as u32,
            fossil_fuel: fossil_fuel as u32,
        });
        self
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn parameter(&self, kind: ParameterKind) -> Option<&ParameterSnapshot> {
        self.parameters.iter().find(|p| p.kind == kind)
    }

    /// Label/value lines for a control panel, two decimals each.
    pub fn display_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.parameters.iter().map(|p| p.display()).collect();
        lines.push(format!("Food Production ({:.2})", self.food_production));
        lines.push(format!("Total Food ({:.2})", self.total_food));
        lines.push(format!("Pollution ({:.2})", self.pollution));
        lines.push(match self.average_lifespan {
            Some(avg) => format!("Average Lifespan ({:.2})", avg),
            None => "Average Lifespan (n/a)".to_string(),
        });
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Citizen;
    use crate::types::EnergyStrategy;
    use crate::world::FuelEffects;

    #[test]
    fn test_capture_reflects_ledger_and_parameters() {
        let mut params = Parameters::default();
        params.set(ParameterKind::SolarFoodValue, 0.75);
        let mut pop = Population::initialize(10, |i| Citizen::new(i, EnergyStrategy::Solar)).unwrap();
        let mut world = WorldState::new(&params, &pop);
        world.tick(&mut pop, &params, FuelEffects::NONE);

        let snap = WorldSnapshot::capture(&world, &pop, &params);
        assert_eq!(snap.tick, 1);
        assert_eq!(snap.population, 10);
        assert_eq!(snap.food_production, 15.0);
        assert_eq!(snap.total_food, world.total_food());
        assert_eq!(snap.parameters.len(), ParameterKind::ALL.len());
        assert_eq!(
            snap.parameter(ParameterKind::SolarFoodValue).map(|p| p.value),
            Some(0.75)
        );
        assert_eq!(snap.strategies, None);
    }

    #[test]
    fn test_display_lines_format() {
        let params = Parameters::default();
        let pop = Population::initialize(4, |i| Citizen::new(i, EnergyStrategy::Solar)).unwrap();
        let world = WorldState::new(&params, &pop);
        let lines = WorldSnapshot::capture(&world, &pop, &params).display_lines();

        assert_eq!(lines[0], "Food Production Rate (1.50)");
        assert_eq!(lines[1], "Solar Food Value (0.50)");
        assert_eq!(lines[2], "Fossil Fuel Food Bonus (0.05)");
        assert!(lines.contains(&"Total Food (1000000.00)".to_string()));
        assert_eq!(lines.last().unwrap(), "Average Lifespan (100.00)");
    }

    #[test]
    fn test_display_undefined_average() {
        let params = Parameters::default();
        let pop: Population<Citizen> = Population::empty();
        let world = WorldState::new(&params, &pop);
        let lines = WorldSnapshot::capture(&world, &pop, &params).display_lines();
        assert_eq!(lines.last().unwrap(), "Average Lifespan (n/a)");
    }

    #[test]
    fn test_snapshot_serializes_for_the_host() {
        let params = Parameters::default();
        let pop = Population::initialize(2, |i| Citizen::new(i, EnergyStrategy::Solar)).unwrap();
        let world = WorldState::new(&params, &pop);
        let snap = WorldSnapshot::capture(&world, &pop, &params).with_strategies(1, 1);

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["population"], 2);
        assert_eq!(json["strategies"]["fossil_fuel"], 1);
        assert_eq!(json["parameters"][0]["kind"], "ProductionRate");
    }
}
