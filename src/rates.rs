//! Rate arithmetic
//!
//! Pure conversions between a desired output rate and the number of
//! buildings, drills or belts needed to sustain it. All rates are per second.

use crate::error::{CalcError, CalcResult};
use crate::models::{Belt, Drill, Furnace, Recipe, Smeltable, SmeltingPlan};

fn divisor(value: f64) -> CalcResult<f64> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(CalcError::DivisionByZero)
    }
}

/// Reject negative or non-finite rates and counts supplied by the caller.
pub fn check_rate(what: &'static str, value: f64) -> CalcResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(CalcError::InvalidRate { what, value })
    }
}

/// Buildings needed to process `desired` per second when each building
/// processes `material_rate * building_rate` per second.
pub fn required_building_count(
    material_rate: f64,
    building_rate: f64,
    desired: f64,
) -> CalcResult<f64> {
    let per_building = divisor(material_rate)? * divisor(building_rate)?;
    Ok(check_rate("desired rate", desired)? / per_building)
}

/// Extractors needed to mine `desired` per second of a material that takes
/// `mining_time` seconds per unit at unit speed.
pub fn required_extractor_count(
    mining_time: f64,
    extractor_rate: f64,
    desired: f64,
) -> CalcResult<f64> {
    let per_extractor = divisor(extractor_rate)? / divisor(mining_time)?;
    Ok(check_rate("desired rate", desired)? / per_extractor)
}

/// Raw material pulled out of the ground by the extractors feeding `desired`.
pub fn required_raw_material(
    mining_time: f64,
    extractor_rate: f64,
    desired: f64,
) -> CalcResult<f64> {
    Ok(required_extractor_count(mining_time, extractor_rate, desired)? * extractor_rate)
}

/// Belt lanes needed to carry `desired` items per second.
pub fn required_transport_units(belt_speed: f64, stack_height: f64, desired: f64) -> CalcResult<f64> {
    let per_belt = divisor(belt_speed)? * divisor(stack_height)?;
    Ok(check_rate("desired rate", desired)? / per_belt)
}

/// Crafting buildings needed to produce `item_rate` of a recipe's output.
pub fn required_crafters(recipe: &Recipe, crafting_speed: f64, item_rate: f64) -> CalcResult<f64> {
    let batches_per_second = divisor(recipe.output_amount)? / divisor(recipe.crafting_time)?;
    required_building_count(batches_per_second, crafting_speed, item_rate)
}

/// The buildings chosen to smelt an ore
#[derive(Debug, Clone, Copy)]
pub struct SmeltingSetup<'a> {
    pub drill: &'a Drill,
    pub furnace: &'a Furnace,
    pub belt: &'a Belt,
    pub stack_size: f64,
}

/// Plan the buildings needed to smelt `desired` plates per second from `ore`.
pub fn plan_from_desired(
    ore: &Smeltable,
    setup: &SmeltingSetup<'_>,
    desired: f64,
) -> CalcResult<SmeltingPlan> {
    let furnaces =
        required_building_count(ore.smelting_speed, setup.furnace.base_smelting_speed, desired)?;
    let drills = required_extractor_count(ore.mining_time, setup.drill.mining_speed, desired)?;
    let mined = required_raw_material(ore.mining_time, setup.drill.mining_speed, desired)?;
    let belts = required_transport_units(setup.belt.speed, setup.stack_size, desired)?;

    Ok(SmeltingPlan {
        output: desired,
        furnaces,
        drills,
        ore: mined,
        belts,
        energy: furnaces * setup.furnace.energy_consumption,
        fuel: furnaces * setup.furnace.fuel_consumption,
        pollution: furnaces * setup.furnace.pollution_production
            + drills * setup.drill.pollution,
    })
}

/// Plan around a fixed number of furnaces running flat out.
pub fn plan_from_building_count(
    ore: &Smeltable,
    setup: &SmeltingSetup<'_>,
    furnace_count: f64,
) -> CalcResult<SmeltingPlan> {
    let furnace_count = check_rate("furnace count", furnace_count)?;
    let desired = furnace_count * ore.smelting_speed * setup.furnace.base_smelting_speed;
    plan_from_desired(ore, setup, desired)
}
