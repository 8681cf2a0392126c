//! Tunable world parameters.
//!
//! Each knob has a fixed range and default. Writes outside the range are
//! clamped, never rejected, so the world always has a usable value. NaN writes
//! are dropped and the previous value is kept.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::error::SimError;

/// Closed interval and default for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl ParameterRange {
    pub const fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum ParameterKind {
    ProductionRate,
    SolarFoodValue,
    FossilFuelFoodBonus,
    FossilFuelAverageLifePenalty,
    FossilFuelPollutionPenalty,
    FossilFuelLifePenalty,
}

impl ParameterKind {
    pub const ALL: [ParameterKind; 6] = [
        ParameterKind::ProductionRate,
        ParameterKind::SolarFoodValue,
        ParameterKind::FossilFuelFoodBonus,
        ParameterKind::FossilFuelAverageLifePenalty,
        ParameterKind::FossilFuelPollutionPenalty,
        ParameterKind::FossilFuelLifePenalty,
    ];

    pub fn range(self) -> ParameterRange {
        match self {
            ParameterKind::ProductionRate => ParameterRange::new(0.0, 2.0, 1.5),
            ParameterKind::SolarFoodValue => ParameterRange::new(0.0, 1.0, 0.5),
            ParameterKind::FossilFuelFoodBonus => ParameterRange::new(0.0, 1.0, 0.05),
            ParameterKind::FossilFuelAverageLifePenalty => ParameterRange::new(0.0, 0.5, 0.001),
            ParameterKind::FossilFuelPollutionPenalty => ParameterRange::new(0.0, 0.5, 0.005),
            ParameterKind::FossilFuelLifePenalty => ParameterRange::new(0.0, 0.5, 0.001),
        }
    }

    /// Machine name used by JSON payloads from external controls.
    pub fn name(self) -> &'static str {
        match self {
            ParameterKind::ProductionRate => "production_rate",
            ParameterKind::SolarFoodValue => "solar_food_value",
            ParameterKind::FossilFuelFoodBonus => "fossil_fuel_food_bonus",
            ParameterKind::FossilFuelAverageLifePenalty => "fossil_fuel_average_life_penalty",
            ParameterKind::FossilFuelPollutionPenalty => "fossil_fuel_pollution_penalty",
            ParameterKind::FossilFuelLifePenalty => "fossil_fuel_life_penalty",
        }
    }

    /// Human-readable label shown next to the control.
    pub fn label(self) -> &'static str {
        match self {
            ParameterKind::ProductionRate => "Food Production Rate",
            ParameterKind::SolarFoodValue => "Solar Food Value",
            ParameterKind::FossilFuelFoodBonus => "Fossil Fuel Food Bonus",
            ParameterKind::FossilFuelAverageLifePenalty => "Fossil Fuel Average Life Penalty",
            ParameterKind::FossilFuelPollutionPenalty => "Fossil Fuel Pollution Penalty",
            ParameterKind::FossilFuelLifePenalty => "Fossil Fuel Life Penalty",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

/// Current value of every knob.
///
/// Fields are private so every write goes through the clamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ParameterValues")]
pub struct Parameters {
    production_rate: f64,
    solar_food_value: f64,
    fossil_fuel_food_bonus: f64,
    fossil_fuel_average_life_penalty: f64,
    fossil_fuel_pollution_penalty: f64,
    fossil_fuel_life_penalty: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            production_rate: ParameterKind::ProductionRate.range().default,
            solar_food_value: ParameterKind::SolarFoodValue.range().default,
            fossil_fuel_food_bonus: ParameterKind::FossilFuelFoodBonus.range().default,
            fossil_fuel_average_life_penalty: ParameterKind::FossilFuelAverageLifePenalty
                .range()
                .default,
            fossil_fuel_pollution_penalty: ParameterKind::FossilFuelPollutionPenalty
                .range()
                .default,
            fossil_fuel_life_penalty: ParameterKind::FossilFuelLifePenalty.range().default,
        }
    }
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: ParameterKind) -> f64 {
        match kind {
            ParameterKind::ProductionRate => self.production_rate,
            ParameterKind::SolarFoodValue => self.solar_food_value,
            ParameterKind::FossilFuelFoodBonus => self.fossil_fuel_food_bonus,
            ParameterKind::FossilFuelAverageLifePenalty => self.fossil_fuel_average_life_penalty,
            ParameterKind::FossilFuelPollutionPenalty => self.fossil_fuel_pollution_penalty,
            ParameterKind::FossilFuelLifePenalty => self.fossil_fuel_life_penalty,
        }
    }

    /// Store `value` clamped to the parameter's range and return what was stored.
    pub fn set(&mut self, kind: ParameterKind, value: f64) -> f64 {
        let stored = if value.is_nan() {
            self.get(kind)
        } else {
            kind.range().clamp(value)
        };

        let slot = match kind {
            ParameterKind::ProductionRate => &mut self.production_rate,
            ParameterKind::SolarFoodValue => &mut self.solar_food_value,
            ParameterKind::FossilFuelFoodBonus => &mut self.fossil_fuel_food_bonus,
            ParameterKind::FossilFuelAverageLifePenalty => {
                &mut self.fossil_fuel_average_life_penalty
            }
            ParameterKind::FossilFuelPollutionPenalty => &mut self.fossil_fuel_pollution_penalty,
            ParameterKind::FossilFuelLifePenalty => &mut self.fossil_fuel_life_penalty,
        };
        *slot = stored;

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "parameter_change",
            parameter = kind.name(),
            requested = value,
            stored = stored,
        );

        stored
    }

    /// Reset one knob to its default.
    pub fn reset(&mut self, kind: ParameterKind) -> f64 {
        self.set(kind, kind.range().default)
    }

    /// Apply a JSON object of `{ "parameter_name": value }` pairs.
    ///
    /// Every name is checked before anything is written, so an unknown name
    /// leaves the parameters untouched. Returns the number of values applied.
    pub fn apply_json(&mut self, json: &str) -> Result<usize, SimError> {
        let raw: HashMap<String, f64> = serde_json::from_str(json)?;

        let mut updates = Vec::with_capacity(raw.len());
        for (name, value) in raw {
            let kind =
                ParameterKind::from_name(&name).ok_or(SimError::UnknownParameter(name))?;
            updates.push((kind, value));
        }

        for &(kind, value) in &updates {
            self.set(kind, value);
        }
        Ok(updates.len())
    }

    pub fn production_rate(&self) -> f64 {
        self.production_rate
    }

    pub fn set_production_rate(&mut self, value: f64) -> f64 {
        self.set(ParameterKind::ProductionRate, value)
    }

    pub fn solar_food_value(&self) -> f64 {
        self.solar_food_value
    }

    pub fn set_solar_food_value(&mut self, value: f64) -> f64 {
        self.set(ParameterKind::SolarFoodValue, value)
    }

    pub fn fossil_fuel_food_bonus(&self) -> f64 {
        self.fossil_fuel_food_bonus
    }

    pub fn set_fossil_fuel_food_bonus(&mut self, value: f64) -> f64 {
        self.set(ParameterKind::FossilFuelFoodBonus, value)
    }

    pub fn fossil_fuel_average_life_penalty(&self) -> f64 {
        self.fossil_fuel_average_life_penalty
    }

    pub fn set_fossil_fuel_average_life_penalty(&mut self, value: f64) -> f64 {
        self.set(ParameterKind::FossilFuelAverageLifePenalty, value)
    }

    pub fn fossil_fuel_pollution_penalty(&self) -> f64 {
        self.fossil_fuel_pollution_penalty
    }

    pub fn set_fossil_fuel_pollution_penalty(&mut self, value: f64) -> f64 {
        self.set(ParameterKind::FossilFuelPollutionPenalty, value)
    }

    pub fn fossil_fuel_life_penalty(&self) -> f64 {
        self.fossil_fuel_life_penalty
    }

    pub fn set_fossil_fuel_life_penalty(&mut self, value: f64) -> f64 {
        self.set(ParameterKind::FossilFuelLifePenalty, value)
    }
}

/// Unvalidated form used when deserializing; missing knobs take their defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ParameterValues {
    production_rate: f64,
    solar_food_value: f64,
    fossil_fuel_food_bonus: f64,
    fossil_fuel_average_life_penalty: f64,
    fossil_fuel_pollution_penalty: f64,
    fossil_fuel_life_penalty: f64,
}

impl Default for ParameterValues {
    fn default() -> Self {
        let p = Parameters::default();
        Self {
            production_rate: p.production_rate,
            solar_food_value: p.solar_food_value,
            fossil_fuel_food_bonus: p.fossil_fuel_food_bonus,
            fossil_fuel_average_life_penalty: p.fossil_fuel_average_life_penalty,
            fossil_fuel_pollution_penalty: p.fossil_fuel_pollution_penalty,
            fossil_fuel_life_penalty: p.fossil_fuel_life_penalty,
        }
    }
}

impl From<ParameterValues> for Parameters {
    fn from(raw: ParameterValues) -> Self {
        let mut params = Parameters::default();
        params.set_production_rate(raw.production_rate);
        params.set_solar_food_value(raw.solar_food_value);
        params.set_fossil_fuel_food_bonus(raw.fossil_fuel_food_bonus);
        params.set_fossil_fuel_average_life_penalty(raw.fossil_fuel_average_life_penalty);
        params.set_fossil_fuel_pollution_penalty(raw.fossil_fuel_pollution_penalty);
        params.set_fossil_fuel_life_penalty(raw.fossil_fuel_life_penalty);
        params
    }
}
