//! Runs the simulation under the instrument subscriber and checks the
//! recorded `world_tick` table against the invariants.

#![cfg(feature = "instrument")]

use commons_core::instrument;
use commons_core::{FuelEffects, ParameterKind, Parameters, SimulationClock, SimulationConfig};
use polars::prelude::DataFrame;

fn run(ticks: usize, config: &SimulationConfig) -> instrument::Recorder {
    instrument::record(|| {
        let mut clock = SimulationClock::new(config).unwrap();
        for _ in 0..ticks {
            clock.tick();
        }
    })
}

#[test]
fn test_one_row_per_tick() {
    let recorder = run(25, &SimulationConfig::default());
    assert_eq!(recorder.rows("world_tick"), 25);

    let table = recorder.table("world_tick").unwrap();
    let ticks = table.u64_column("tick").unwrap();
    assert_eq!(ticks, (1..=25).collect::<Vec<u64>>().as_slice());
}

#[test]
fn test_recorded_food_is_monotonic() {
    let config = SimulationConfig {
        population_size: 40,
        ..Default::default()
    };
    let recorder = run(100, &config);
    let table = recorder.table("world_tick").unwrap();

    let food = table.f64_column("total_food").unwrap();
    assert!(
        food.windows(2).all(|w| w[1] >= w[0]),
        "total_food should never decrease"
    );

    let production = table.f64_column("food_production").unwrap();
    assert!(production.iter().all(|&p| p == 60.0), "40 agents * 1.5");

    let deltas = table.f64_column("lifespan_delta").unwrap();
    assert!(deltas.iter().all(|&d| d <= 0.0));
}

#[test]
fn test_empty_world_records_nan_average() {
    let recorder = instrument::record(|| {
        let params = Parameters::default();
        let mut pop: commons_core::Population<commons_core::Citizen> =
            commons_core::Population::empty();
        let mut world = commons_core::WorldState::new(&params, &pop);
        world.tick(&mut pop, &params, FuelEffects::NONE);
    });

    let table = recorder.table("world_tick").unwrap();
    assert_eq!(table.row_count, 1);
    assert!(table.f64_column("average_lifespan").unwrap()[0].is_nan());
    assert_eq!(table.u64_column("population"), Some(&[0][..]));
}

#[test]
fn test_parameter_changes_are_logged() {
    let recorder = instrument::record(|| {
        let mut params = Parameters::default();
        params.set(ParameterKind::ProductionRate, 5.0);
        params.set(ParameterKind::SolarFoodValue, 0.3);
    });

    let table = recorder.table("parameter_change").unwrap();
    assert_eq!(table.row_count, 2);
    let names = table.str_column("parameter").unwrap();
    assert_eq!(names[0], "production_rate");
    assert_eq!(table.f64_column("requested").unwrap()[0], 5.0);
    assert_eq!(table.f64_column("stored").unwrap()[0], 2.0);
}

#[test]
fn test_fuel_effects_table_only_when_active() {
    let quiet = run(5, &SimulationConfig::default());
    assert_eq!(quiet.rows("fuel_effects"), 0);

    let active = instrument::record(|| {
        let mut clock = SimulationClock::new(&SimulationConfig::default())
            .unwrap()
            .with_fuel_policy(|_: &commons_core::Population<commons_core::Citizen>, p: &Parameters| {
                FuelEffects {
                    pollution: p.fossil_fuel_pollution_penalty(),
                    ..FuelEffects::NONE
                }
            });
        for _ in 0..3 {
            clock.tick();
        }
    });
    assert_eq!(active.rows("fuel_effects"), 3);
}

#[test]
fn test_world_tick_as_dataframe() {
    let recorder = run(12, &SimulationConfig::default());
    let dfs = recorder.to_dataframes();
    let df: &DataFrame = &dfs["world_tick"];

    assert_eq!(df.height(), 12);
    for column in [
        "tick",
        "population",
        "production_rate",
        "lifespan_delta",
        "food_production",
        "food_added",
        "total_food",
        "pollution",
        "average_lifespan",
    ] {
        assert!(df.column(column).is_ok(), "missing column {}", column);
    }
}
