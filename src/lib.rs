//! Factorio production chain calculator
//!
//! Works out how many furnaces, drills and belts a smelting setup needs, and
//! expands recipes into the full set of ingredient rates a target requires.

pub mod db;
pub mod defs;
pub mod error;
pub mod graph;
pub mod models;
pub mod rates;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod sample;
pub mod settings;

#[cfg(test)]
mod test_utils;

pub use error::{CalcError, CalcResult};
pub use registry::RecipeRegistry;
pub use resolver::{Resolution, resolve, resolve_all};
