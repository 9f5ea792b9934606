//! Read-only recipe registry

use std::collections::{BTreeSet, HashMap};

use crate::error::{CalcError, CalcResult};
use crate::models::Recipe;

/// Immutable mapping from item name to recipe.
///
/// Recipes are validated once on construction and never mutated afterwards,
/// so a registry can be shared by any number of concurrent resolutions.
#[derive(Debug, Clone, Default)]
pub struct RecipeRegistry {
    recipes: HashMap<String, Recipe>,
}

impl RecipeRegistry {
    pub fn new(recipes: HashMap<String, Recipe>) -> CalcResult<Self> {
        for (item, recipe) in &recipes {
            validate_recipe(item, recipe)?;
        }
        Ok(Self { recipes })
    }

    pub fn lookup(&self, name: &str) -> CalcResult<&Recipe> {
        self.recipes
            .get(name)
            .ok_or_else(|| CalcError::NotFound(name.to_string()))
    }

    /// Like [`lookup`](Self::lookup), but also hands back the registry's own
    /// copy of the name.
    pub fn entry(&self, name: &str) -> CalcResult<(&str, &Recipe)> {
        self.recipes
            .get_key_value(name)
            .map(|(name, recipe)| (name.as_str(), recipe))
            .ok_or_else(|| CalcError::NotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Item names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.recipes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Ingredient names referenced by some recipe but missing from the
    /// registry, paired with the items that reference them.
    pub fn missing_references(&self) -> Vec<(String, String)> {
        let mut missing = BTreeSet::new();
        for (item, recipe) in &self.recipes {
            for part in &recipe.parts {
                if !self.recipes.contains_key(&part.name) {
                    missing.insert((item.clone(), part.name.clone()));
                }
            }
        }
        missing.into_iter().collect()
    }
}

fn validate_recipe(item: &str, recipe: &Recipe) -> CalcResult<()> {
    let invalid = |reason: String| CalcError::InvalidRecipe {
        item: item.to_string(),
        reason,
    };

    if !(recipe.output_amount > 0.0 && recipe.output_amount.is_finite()) {
        return Err(invalid(format!(
            "output amount must be positive, got {}",
            recipe.output_amount
        )));
    }
    if !(recipe.crafting_time > 0.0 && recipe.crafting_time.is_finite()) {
        return Err(invalid(format!(
            "crafting time must be positive, got {}",
            recipe.crafting_time
        )));
    }
    for part in &recipe.parts {
        if !(part.amount >= 0.0 && part.amount.is_finite()) {
            return Err(invalid(format!(
                "amount of '{}' must be non-negative, got {}",
                part.name, part.amount
            )));
        }
    }
    Ok(())
}
