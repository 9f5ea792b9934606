//! Human-readable reports
//!
//! Reports only read resolved rates; building counts come from the rate
//! arithmetic in [`crate::rates`].

use std::collections::HashSet;
use std::fmt;

use crate::error::CalcResult;
use crate::models::SmeltingPlan;
use crate::rates::required_crafters;
use crate::registry::RecipeRegistry;
use crate::resolver::Resolution;
use crate::settings::UserSettings;

/// Format a resolution as an indented recipe tree.
///
/// An item shared by several consumers is expanded under the first one only;
/// later occurrences point back to it.
pub fn format_tree(resolution: &Resolution) -> String {
    let mut output = String::new();
    let mut expanded = HashSet::new();
    for (root, _) in &resolution.roots {
        format_node(resolution, root, None, 0, &mut expanded, &mut output);
    }
    output
}

fn format_node<'a>(
    resolution: &'a Resolution,
    item: &'a str,
    edge_rate: Option<f64>,
    depth: usize,
    expanded: &mut HashSet<&'a str>,
    output: &mut String,
) {
    let prefix = "  ".repeat(depth);
    let total = resolution.rate(item).unwrap_or_default();
    let rate = edge_rate.unwrap_or(total);
    let share = if (rate - total).abs() > f64::EPSILON * total.abs().max(1.0) {
        format!(" of {:.3}/s total", total)
    } else {
        String::new()
    };

    let mut ingredients = resolution.ingredients_of(item).peekable();
    if ingredients.peek().is_none() {
        output.push_str(&format!("{}-> {} @ {:.3}/s{} (raw input)\n", prefix, item, rate, share));
        return;
    }
    if !expanded.insert(item) {
        output.push_str(&format!("{}{} @ {:.3}/s{} (expanded above)\n", prefix, item, rate, share));
        return;
    }

    output.push_str(&format!("{}{} @ {:.3}/s{}\n", prefix, item, rate, share));
    for edge in ingredients {
        format_node(
            resolution,
            &edge.ingredient,
            Some(edge.rate),
            depth + 1,
            expanded,
            output,
        );
    }
}

/// Summary of a production chain calculation
#[derive(Debug, Clone, PartialEq)]
pub struct DemandSummary {
    pub targets: Vec<(String, f64)>,
    pub crafting_speed: f64,
    /// (item, rate, crafting buildings needed)
    pub crafted: Vec<(String, f64, f64)>,
    pub raw_inputs: Vec<(String, f64)>,
}

/// Split a resolution into crafted items and raw inputs.
pub fn summarize(
    resolution: &Resolution,
    registry: &RecipeRegistry,
    crafting_speed: f64,
) -> CalcResult<DemandSummary> {
    let mut crafted = Vec::new();
    let mut raw_inputs = Vec::new();

    for (item, &rate) in &resolution.demands {
        let recipe = registry.lookup(item)?;
        if recipe.is_raw() {
            raw_inputs.push((item.clone(), rate));
        } else {
            let crafters = required_crafters(recipe, crafting_speed, rate)?;
            crafted.push((item.clone(), rate, crafters));
        }
    }

    Ok(DemandSummary {
        targets: resolution.roots.clone(),
        crafting_speed,
        crafted,
        raw_inputs,
    })
}

impl fmt::Display for DemandSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Production Summary ===")?;
        for (name, rate) in &self.targets {
            writeln!(f, "Target: {} @ {:.3}/s", name, rate)?;
        }
        writeln!(f)?;

        writeln!(f, "Crafted items (crafting speed {}):", self.crafting_speed)?;
        for (name, rate, crafters) in &self.crafted {
            writeln!(f, "  {:<30} {:>10.3}/s {:>8.2} crafters", name, rate, crafters)?;
        }
        writeln!(f)?;

        writeln!(f, "Raw inputs required:")?;
        for (name, rate) in &self.raw_inputs {
            writeln!(f, "  {:<30} {:>10.3}/s", name, rate)?;
        }

        Ok(())
    }
}

/// Format a smelting plan along with the buildings it was computed for.
pub fn format_smelting_plan(ore: &str, settings: &UserSettings, plan: &SmeltingPlan) -> String {
    let mut output = String::new();
    output.push_str(&format!("want {:.3}/s of '{}'\n", plan.output, ore));
    output.push_str(&format!("smelted in '{}'\n", settings.furnace_type));
    output.push_str(&format!("mined with '{}'\n", settings.drill_type));
    output.push_str(&format!(
        "transported on '{}' stacked {:.0} high\n\n",
        settings.belt_type, settings.stack_size
    ));
    output.push_str(&plan.to_string());
    output
}

impl fmt::Display for SmeltingPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Furnaces:  {:.4}", self.furnaces)?;
        writeln!(f, "Drills:    {:.4}", self.drills)?;
        writeln!(f, "Ore:       {:.4}/s", self.ore)?;
        writeln!(f, "Belts:     {:.4}", self.belts)?;
        writeln!(f, "Energy:    {:.1} kW", self.energy)?;
        writeln!(f, "Fuel:      {:.1} kW", self.fuel)?;
        write!(f, "Pollution: {:.2}/min", self.pollution)
    }
}
