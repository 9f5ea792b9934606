//! User choice of drill, furnace and belt

use crate::error::{CalcError, CalcResult};
use crate::models::Definitions;
use crate::rates::SmeltingSetup;

pub const DEFAULT_DRILL: &str = "electric-mining-drill";
pub const DEFAULT_FURNACE: &str = "stone-furnace";
pub const DEFAULT_BELT: &str = "fast-transport-belt";

#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    pub drill_type: String,
    pub furnace_type: String,
    pub belt_type: String,
    /// Items stacked per belt slot
    pub stack_size: f64,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            drill_type: DEFAULT_DRILL.to_string(),
            furnace_type: DEFAULT_FURNACE.to_string(),
            belt_type: DEFAULT_BELT.to_string(),
            stack_size: 1.0,
        }
    }
}

impl UserSettings {
    /// Look up the chosen buildings, failing on the first unknown name.
    pub fn setup<'a>(&self, defs: &'a Definitions) -> CalcResult<SmeltingSetup<'a>> {
        if self.stack_size <= 0.0 {
            return Err(CalcError::DivisionByZero);
        }
        let not_found = |name: &str| CalcError::NotFound(name.to_string());

        Ok(SmeltingSetup {
            drill: defs
                .drills
                .get(&self.drill_type)
                .ok_or_else(|| not_found(&self.drill_type))?,
            furnace: defs
                .furnaces
                .get(&self.furnace_type)
                .ok_or_else(|| not_found(&self.furnace_type))?,
            belt: defs
                .belts
                .get(&self.belt_type)
                .ok_or_else(|| not_found(&self.belt_type))?,
            stack_size: self.stack_size,
        })
    }
}
