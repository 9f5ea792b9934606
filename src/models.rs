//! Data models for Factorio definitions and calculation results
//!
//! Definition records deserialize straight from the JSON definition files,
//! which use camelCase keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An ore (or any smeltable material) and its intrinsic rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Smeltable {
    pub smelting_speed: f64,
    pub mining_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Furnace {
    pub base_smelting_speed: f64,
    #[serde(default)]
    pub beacon_modifier: f64,
    #[serde(default)]
    pub fuel_consumption: f64,
    #[serde(default)]
    pub energy_consumption: f64,
    #[serde(default)]
    pub pollution_production: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Belt {
    pub speed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drill {
    pub mining_speed: f64,
    #[serde(default)]
    pub pollution: f64,
}

/// One ingredient line of a recipe: `amount` of `name` consumed per batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub name: String,
    pub amount: f64,
}

impl Part {
    pub fn new(name: impl Into<String>, amount: f64) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// How one batch of an item is produced.
///
/// An empty `parts` list marks a raw item (mined, not crafted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parts: Vec<Part>,
    pub output_amount: f64,
    pub crafting_time: f64,
}

impl Recipe {
    pub fn new(output_amount: f64, crafting_time: f64) -> Self {
        Self {
            parts: Vec::new(),
            output_amount,
            crafting_time,
        }
    }

    /// A raw recipe: one unit per second, no ingredients.
    pub fn raw() -> Self {
        Self::new(1.0, 1.0)
    }

    pub fn with_part(mut self, name: impl Into<String>, amount: f64) -> Self {
        self.parts.push(Part::new(name, amount));
        self
    }

    pub fn is_raw(&self) -> bool {
        self.parts.is_empty()
    }
}

// The definition files write `"parts": null` for raw items.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Part>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Part>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Every definition category, keyed by item or building name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    pub smeltables: HashMap<String, Smeltable>,
    pub furnaces: HashMap<String, Furnace>,
    pub belts: HashMap<String, Belt>,
    pub drills: HashMap<String, Drill>,
    pub recipes: HashMap<String, Recipe>,
}

impl Definitions {
    pub fn len(&self) -> usize {
        self.smeltables.len()
            + self.furnaces.len()
            + self.belts.len()
            + self.drills.len()
            + self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Buildings and materials required to smelt an ore at some rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmeltingPlan {
    /// Smelted output per second
    pub output: f64,
    pub furnaces: f64,
    pub drills: f64,
    /// Ore mined per second
    pub ore: f64,
    pub belts: f64,
    pub energy: f64,
    pub fuel: f64,
    pub pollution: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_parses_camel_case_keys() {
        let json = r#"{
            "parts": [{"name": "iron-plate", "amount": 2}],
            "outputAmount": 1,
            "craftingTime": 0.5
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert_eq!(recipe.parts, vec![Part::new("iron-plate", 2.0)]);
        assert_eq!(recipe.output_amount, 1.0);
        assert_eq!(recipe.crafting_time, 0.5);
        assert!(!recipe.is_raw());
    }

    #[test]
    fn null_or_missing_parts_mean_raw() {
        let null: Recipe =
            serde_json::from_str(r#"{"parts": null, "outputAmount": 1, "craftingTime": 1}"#)
                .unwrap();
        let missing: Recipe =
            serde_json::from_str(r#"{"outputAmount": 1, "craftingTime": 1}"#).unwrap();
        assert!(null.is_raw());
        assert!(missing.is_raw());
    }

    #[test]
    fn furnace_optional_attributes_default_to_zero() {
        let furnace: Furnace = serde_json::from_str(r#"{"baseSmeltingSpeed": 2}"#).unwrap();
        assert_eq!(furnace.base_smelting_speed, 2.0);
        assert_eq!(furnace.energy_consumption, 0.0);
        assert_eq!(furnace.pollution_production, 0.0);
    }
}
