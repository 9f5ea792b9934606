//! Shared helpers for unit tests

use crate::models::Recipe;
use crate::registry::RecipeRegistry;
use crate::sample;

/// Assert two floats agree to a relative tolerance.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

pub fn registry(entries: Vec<(&str, Recipe)>) -> RecipeRegistry {
    RecipeRegistry::new(
        entries
            .into_iter()
            .map(|(name, recipe)| (name.to_string(), recipe))
            .collect(),
    )
    .unwrap()
}

pub fn sample_registry() -> RecipeRegistry {
    RecipeRegistry::new(sample::definitions().recipes).unwrap()
}
