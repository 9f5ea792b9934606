//! Built-in vanilla definitions for trying the calculator without data files

use std::collections::HashMap;

use crate::models::{Belt, Definitions, Drill, Furnace, Recipe, Smeltable};

fn named<T>(entries: Vec<(&str, T)>) -> HashMap<String, T> {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Early-game Factorio ores, buildings and intermediate recipes.
///
/// Energy and fuel are in kW, pollution in units per minute.
pub fn definitions() -> Definitions {
    let ore = Smeltable {
        smelting_speed: 0.3125,
        mining_time: 1.0,
    };

    Definitions {
        smeltables: named(vec![("iron-ore", ore), ("copper-ore", ore), ("stone", ore)]),
        furnaces: named(vec![
            (
                "stone-furnace",
                Furnace {
                    base_smelting_speed: 1.0,
                    beacon_modifier: 0.0,
                    fuel_consumption: 90.0,
                    energy_consumption: 0.0,
                    pollution_production: 2.0,
                },
            ),
            (
                "steel-furnace",
                Furnace {
                    base_smelting_speed: 2.0,
                    beacon_modifier: 0.0,
                    fuel_consumption: 90.0,
                    energy_consumption: 0.0,
                    pollution_production: 4.0,
                },
            ),
            (
                "electric-furnace",
                Furnace {
                    base_smelting_speed: 2.0,
                    beacon_modifier: 0.0,
                    fuel_consumption: 0.0,
                    energy_consumption: 180.0,
                    pollution_production: 1.0,
                },
            ),
        ]),
        belts: named(vec![
            ("transport-belt", Belt { speed: 15.0 }),
            ("fast-transport-belt", Belt { speed: 30.0 }),
            ("express-transport-belt", Belt { speed: 45.0 }),
        ]),
        drills: named(vec![
            (
                "burner-mining-drill",
                Drill {
                    mining_speed: 0.25,
                    pollution: 12.0,
                },
            ),
            (
                "electric-mining-drill",
                Drill {
                    mining_speed: 0.5,
                    pollution: 10.0,
                },
            ),
        ]),
        recipes: named(vec![
            ("iron-ore", Recipe::raw()),
            ("copper-ore", Recipe::raw()),
            ("stone", Recipe::raw()),
            ("iron-plate", Recipe::new(1.0, 3.2).with_part("iron-ore", 1.0)),
            ("copper-plate", Recipe::new(1.0, 3.2).with_part("copper-ore", 1.0)),
            ("stone-brick", Recipe::new(1.0, 3.2).with_part("stone", 2.0)),
            ("steel-plate", Recipe::new(1.0, 16.0).with_part("iron-plate", 5.0)),
            ("iron-gear-wheel", Recipe::new(1.0, 0.5).with_part("iron-plate", 2.0)),
            ("copper-cable", Recipe::new(2.0, 0.5).with_part("copper-plate", 1.0)),
            (
                "electronic-circuit",
                Recipe::new(1.0, 0.5)
                    .with_part("iron-plate", 1.0)
                    .with_part("copper-cable", 3.0),
            ),
            (
                "inserter",
                Recipe::new(1.0, 0.5)
                    .with_part("electronic-circuit", 1.0)
                    .with_part("iron-gear-wheel", 1.0)
                    .with_part("iron-plate", 1.0),
            ),
            (
                "transport-belt",
                Recipe::new(2.0, 0.5)
                    .with_part("iron-gear-wheel", 1.0)
                    .with_part("iron-plate", 1.0),
            ),
            (
                "automation-science-pack",
                Recipe::new(1.0, 5.0)
                    .with_part("copper-plate", 1.0)
                    .with_part("iron-gear-wheel", 1.0),
            ),
            (
                "logistic-science-pack",
                Recipe::new(1.0, 6.0)
                    .with_part("inserter", 1.0)
                    .with_part("transport-belt", 1.0),
            ),
        ]),
    }
}
