//! Recipe resolution
//!
//! Expands one or more target items into the full set of transitive
//! ingredients with the production rate each must sustain. Demand for an
//! ingredient shared by several consumers is summed across all of them.
//!
//! Resolution runs in two passes over the immutable registry:
//!
//! 1. An iterative depth-first walk marks the items on the active path,
//!    failing with [`CalcError::CyclicRecipe`] when a recipe reaches back
//!    into that path and with [`CalcError::NotFound`] on a missing ingredient.
//!    Its reversed post-order lists every consumer before its ingredients.
//! 2. Rates are pushed down in that order. By the time an item is expanded
//!    every consumer has already contributed, so its rate is final and each
//!    item is expanded exactly once.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{CalcError, CalcResult};
use crate::rates::check_rate;
use crate::registry::RecipeRegistry;

/// Demand flowing along one recipe edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub consumer: String,
    pub ingredient: String,
    /// Units of `ingredient` per second consumed on behalf of `consumer`
    pub rate: f64,
}

/// The outcome of one resolution pass.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Targets with the rate requested for each
    pub roots: Vec<(String, f64)>,
    /// Aggregated required rate for every item touched
    pub demands: BTreeMap<String, f64>,
    /// Per-edge demand, consumers before their ingredients
    pub contributions: Vec<Contribution>,
}

impl Resolution {
    pub fn rate(&self, item: &str) -> Option<f64> {
        self.demands.get(item).copied()
    }

    /// Edges leaving `item`, in recipe order.
    pub fn ingredients_of<'a>(&'a self, item: &'a str) -> impl Iterator<Item = &'a Contribution> {
        self.contributions.iter().filter(move |c| c.consumer == item)
    }

    pub fn is_root(&self, item: &str) -> bool {
        self.roots.iter().any(|(name, _)| name == item)
    }
}

/// Resolve every ingredient needed to produce `rate` of `root` per second.
pub fn resolve(registry: &RecipeRegistry, root: &str, rate: f64) -> CalcResult<Resolution> {
    resolve_all(registry, &[(root, rate)])
}

/// Resolve several targets at once, summing the demand they share.
///
/// A target that is also an ingredient of another target needs its own
/// requested rate plus whatever the other target consumes.
pub fn resolve_all<S: AsRef<str>>(
    registry: &RecipeRegistry,
    targets: &[(S, f64)],
) -> CalcResult<Resolution> {
    let mut demands: HashMap<&str, f64> = HashMap::new();
    let mut root_names = Vec::with_capacity(targets.len());
    let mut roots = Vec::with_capacity(targets.len());
    for (name, rate) in targets {
        let rate = check_rate("desired rate", *rate)?;
        let (name, _) = registry.entry(name.as_ref())?;
        *demands.entry(name).or_default() += rate;
        root_names.push(name);
        roots.push((name.to_string(), rate));
    }

    let order = consumer_order(registry, &root_names)?;

    let mut contributions = Vec::new();

    for &item in &order {
        let recipe = registry.lookup(item)?;
        if recipe.is_raw() {
            continue;
        }

        let batches = demands.get(item).copied().unwrap_or_default() / recipe.output_amount;

        for part in &recipe.parts {
            let delta = batches * part.amount;
            *demands.entry(part.name.as_str()).or_default() += delta;

            contributions.push(Contribution {
                consumer: item.to_string(),
                ingredient: part.name.clone(),
                rate: delta,
            });
        }
    }

    Ok(Resolution {
        roots,
        demands: demands
            .into_iter()
            .map(|(name, rate)| (name.to_string(), rate))
            .collect(),
        contributions,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnPath,
    Done,
}

/// What to do when the walk hits a missing ingredient or a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walk {
    /// Fail on the first problem.
    Strict,
    /// Skip missing ingredients and record cycles.
    Survey,
}

/// Depth-first walk from `root`, appending finished items to `post_order`.
///
/// Items already marked by an earlier walk are not revisited, so one `marks`
/// map can be shared across several roots.
fn walk_from<'r>(
    registry: &'r RecipeRegistry,
    root: &'r str,
    mode: Walk,
    marks: &mut HashMap<&'r str, Mark>,
    post_order: &mut Vec<&'r str>,
    cycles: &mut BTreeSet<&'r str>,
) -> CalcResult<()> {
    if marks.contains_key(root) {
        return Ok(());
    }
    let recipe = registry.lookup(root)?;

    // (item, its parts, index of the next part to visit)
    let mut stack = vec![(root, &recipe.parts, 0usize)];
    marks.insert(root, Mark::OnPath);

    while let Some(frame) = stack.last_mut() {
        let (item, parts, next) = *frame;
        let Some(part) = parts.get(next) else {
            marks.insert(item, Mark::Done);
            post_order.push(item);
            stack.pop();
            continue;
        };
        frame.2 += 1;

        let (child, child_recipe) = match (registry.entry(&part.name), mode) {
            (Ok(entry), _) => entry,
            (Err(_), Walk::Survey) => continue,
            (Err(err), Walk::Strict) => return Err(err),
        };
        match marks.get(child) {
            Some(Mark::OnPath) => match mode {
                Walk::Strict => return Err(CalcError::CyclicRecipe(child.to_string())),
                Walk::Survey => {
                    cycles.insert(child);
                }
            },
            Some(Mark::Done) => {}
            None => {
                marks.insert(child, Mark::OnPath);
                stack.push((child, &child_recipe.parts, 0));
            }
        }
    }
    Ok(())
}

/// Every item reachable from `roots`, each listed before all of its
/// ingredients.
fn consumer_order<'r>(registry: &'r RecipeRegistry, roots: &[&'r str]) -> CalcResult<Vec<&'r str>> {
    let mut marks = HashMap::new();
    let mut post_order = Vec::new();
    let mut cycles = BTreeSet::new();

    for &root in roots {
        walk_from(registry, root, Walk::Strict, &mut marks, &mut post_order, &mut cycles)?;
    }

    post_order.reverse();
    Ok(post_order)
}

/// Items whose recipe is re-entered while still being expanded, across the
/// whole registry, sorted by name.
///
/// Unlike [`resolve`], missing ingredients are skipped rather than fatal, so
/// a cycle behind a missing ingredient is still found.
pub fn find_cycles(registry: &RecipeRegistry) -> Vec<String> {
    let mut marks = HashMap::new();
    let mut post_order = Vec::new();
    let mut cycles = BTreeSet::new();

    for root in registry.names() {
        // Survey mode never fails and every root comes from the registry.
        let _ = walk_from(registry, root, Walk::Survey, &mut marks, &mut post_order, &mut cycles);
    }

    cycles.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Recipe;
    use crate::test_utils::{assert_close, registry, sample_registry};
    use proptest::prelude::*;

    #[test]
    fn raw_item_resolves_to_itself() {
        let reg = sample_registry();
        let res = resolve(&reg, "iron-ore", 7.5).unwrap();
        assert_eq!(res.demands.len(), 1);
        assert_close(res.rate("iron-ore").unwrap(), 7.5);
        assert!(res.contributions.is_empty());
    }

    #[test]
    fn linear_chain_divides_by_output_amount() {
        let reg = sample_registry();
        // copper-cable yields 2 per batch from 1 copper-plate
        let res = resolve(&reg, "copper-cable", 10.0).unwrap();
        assert_close(res.rate("copper-cable").unwrap(), 10.0);
        assert_close(res.rate("copper-plate").unwrap(), 5.0);
        assert_close(res.rate("copper-ore").unwrap(), 5.0);
    }

    #[test]
    fn shared_ingredient_demand_is_summed() {
        let reg = sample_registry();
        // inserter: 1 circuit + 1 gear + 1 plate
        // circuit: 1 plate + 3 cable, gear: 2 plate
        let res = resolve(&reg, "inserter", 1.0).unwrap();
        assert_close(res.rate("electronic-circuit").unwrap(), 1.0);
        assert_close(res.rate("iron-gear-wheel").unwrap(), 1.0);
        assert_close(res.rate("iron-plate").unwrap(), 1.0 + 2.0 + 1.0);
        assert_close(res.rate("iron-ore").unwrap(), 4.0);
        assert_close(res.rate("copper-cable").unwrap(), 3.0);
        assert_close(res.rate("copper-plate").unwrap(), 1.5);
    }

    #[test]
    fn two_targets_share_demand() {
        let reg = registry(vec![
            ("iron", Recipe::raw()),
            ("gear", Recipe::new(1.0, 1.0).with_part("iron", 2.0)),
            ("plate", Recipe::new(1.0, 1.0).with_part("iron", 1.0)),
        ]);
        let res = resolve_all(&reg, &[("gear", 10.0), ("plate", 5.0)]).unwrap();
        assert_close(res.rate("iron").unwrap(), 25.0);

        let synthetic = registry(vec![
            ("iron", Recipe::raw()),
            ("gear", Recipe::new(1.0, 1.0).with_part("iron", 2.0)),
            ("plate", Recipe::new(1.0, 1.0).with_part("iron", 1.0)),
            ("kit", Recipe::new(1.0, 1.0).with_part("gear", 10.0).with_part("plate", 5.0)),
        ]);
        let res = resolve(&synthetic, "kit", 1.0).unwrap();
        assert_close(res.rate("iron").unwrap(), 25.0);
    }

    #[test]
    fn target_that_is_also_an_ingredient_adds_both_demands() {
        let reg = sample_registry();
        let res = resolve_all(&reg, &[("iron-gear-wheel", 1.0), ("iron-plate", 3.0)]).unwrap();
        assert_close(res.rate("iron-plate").unwrap(), 5.0);
        assert_close(res.rate("iron-ore").unwrap(), 5.0);
    }

    #[test]
    fn ingredient_reached_directly_and_indirectly_is_summed() {
        let reg = registry(vec![
            ("ore", Recipe::raw()),
            ("a", Recipe::new(1.0, 1.0).with_part("b", 1.0).with_part("ore", 1.0)),
            ("b", Recipe::new(1.0, 1.0).with_part("c", 2.0)),
            ("c", Recipe::new(1.0, 1.0).with_part("ore", 3.0)),
        ]);
        let res = resolve(&reg, "a", 2.0).unwrap();
        assert_close(res.rate("c").unwrap(), 4.0);
        assert_close(res.rate("ore").unwrap(), 2.0 + 12.0);
    }

    #[test]
    fn two_item_cycle_is_rejected() {
        let reg = registry(vec![
            ("A", Recipe::new(1.0, 1.0).with_part("B", 1.0)),
            ("B", Recipe::new(1.0, 1.0).with_part("A", 1.0)),
        ]);
        assert_eq!(
            resolve(&reg, "A", 1.0).unwrap_err(),
            CalcError::CyclicRecipe("A".to_string())
        );
    }

    #[test]
    fn cycle_below_the_target_names_the_reentered_item() {
        let reg = registry(vec![
            ("R", Recipe::new(1.0, 1.0).with_part("X", 1.0)),
            ("X", Recipe::new(1.0, 1.0).with_part("Y", 1.0)),
            ("Y", Recipe::new(1.0, 1.0).with_part("X", 2.0)),
        ]);
        assert_eq!(
            resolve(&reg, "R", 1.0).unwrap_err(),
            CalcError::CyclicRecipe("X".to_string())
        );
    }

    #[test]
    fn three_item_cycle_is_rejected() {
        let reg = registry(vec![
            ("ore", Recipe::raw()),
            ("A", Recipe::new(1.0, 1.0).with_part("ore", 1.0).with_part("B", 1.0)),
            ("B", Recipe::new(1.0, 1.0).with_part("C", 1.0)),
            ("C", Recipe::new(2.0, 1.0).with_part("A", 1.0)),
        ]);
        assert_eq!(
            resolve(&reg, "A", 1.0).unwrap_err(),
            CalcError::CyclicRecipe("A".to_string())
        );
        assert_eq!(
            resolve(&reg, "B", 1.0).unwrap_err(),
            CalcError::CyclicRecipe("B".to_string())
        );
    }

    #[test]
    fn find_cycles_looks_past_missing_ingredients() {
        let reg = registry(vec![
            ("A", Recipe::new(1.0, 1.0).with_part("ghost", 1.0).with_part("B", 1.0)),
            ("B", Recipe::new(1.0, 1.0).with_part("A", 1.0)),
        ]);
        assert_eq!(
            resolve(&reg, "A", 1.0).unwrap_err(),
            CalcError::NotFound("ghost".to_string())
        );
        assert_eq!(find_cycles(&reg), vec!["A".to_string()]);
    }

    #[test]
    fn find_cycles_reports_each_separate_loop() {
        let reg = registry(vec![
            ("ore", Recipe::raw()),
            ("P", Recipe::new(1.0, 1.0).with_part("Q", 1.0)),
            ("Q", Recipe::new(1.0, 1.0).with_part("P", 1.0)),
            ("S", Recipe::new(1.0, 1.0).with_part("S", 1.0)),
            ("T", Recipe::new(1.0, 1.0).with_part("ore", 1.0).with_part("P", 1.0)),
        ]);
        assert_eq!(find_cycles(&reg), vec!["P".to_string(), "S".to_string()]);
        assert!(find_cycles(&sample_registry()).is_empty());
    }

    #[test]
    fn self_reference_is_rejected() {
        let reg = registry(vec![("A", Recipe::new(1.0, 1.0).with_part("A", 0.0))]);
        assert!(matches!(
            resolve(&reg, "A", 1.0),
            Err(CalcError::CyclicRecipe(name)) if name == "A"
        ));
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let reg = registry(vec![
            ("ore", Recipe::raw()),
            ("left", Recipe::new(1.0, 1.0).with_part("ore", 1.0)),
            ("right", Recipe::new(1.0, 1.0).with_part("ore", 1.0)),
            ("top", Recipe::new(1.0, 1.0).with_part("left", 1.0).with_part("right", 1.0)),
        ]);
        let res = resolve(&reg, "top", 1.0).unwrap();
        assert_close(res.rate("ore").unwrap(), 2.0);
    }

    #[test]
    fn missing_ingredient_fails() {
        let reg = registry(vec![("gear", Recipe::new(1.0, 1.0).with_part("iron-plate", 2.0))]);
        assert_eq!(
            resolve(&reg, "gear", 1.0).unwrap_err(),
            CalcError::NotFound("iron-plate".to_string())
        );
        assert_eq!(
            resolve(&reg, "rocket", 1.0).unwrap_err(),
            CalcError::NotFound("rocket".to_string())
        );
    }

    #[test]
    fn zero_amount_still_creates_edge() {
        let reg = registry(vec![
            ("catalyst", Recipe::raw()),
            ("ore", Recipe::raw()),
            ("plate", Recipe::new(1.0, 1.0).with_part("ore", 1.0).with_part("catalyst", 0.0)),
        ]);
        let res = resolve(&reg, "plate", 4.0).unwrap();
        assert_eq!(res.rate("catalyst"), Some(0.0));
        assert_eq!(res.ingredients_of("plate").count(), 2);
    }

    #[test]
    fn negative_target_rate_is_rejected() {
        let reg = sample_registry();
        assert!(matches!(
            resolve(&reg, "iron-plate", -1.0),
            Err(CalcError::InvalidRate { .. })
        ));
    }

    #[test]
    fn contributions_reconcile_with_consumer_rate() {
        let reg = sample_registry();
        let res = resolve(&reg, "inserter", 2.0).unwrap();
        for (item, rate) in &res.demands {
            let recipe = reg.lookup(item).unwrap();
            let batches = rate / recipe.output_amount;
            for (part, edge) in recipe.parts.iter().zip(res.ingredients_of(item)) {
                assert_eq!(edge.ingredient, part.name);
                assert_close(edge.rate, batches * part.amount);
            }
        }
        for (item, rate) in &res.demands {
            if res.is_root(item) {
                continue;
            }
            let inbound: f64 = res
                .contributions
                .iter()
                .filter(|c| &c.ingredient == item)
                .map(|c| c.rate)
                .sum();
            assert_close(inbound, *rate);
        }
    }

    /// Random acyclic registries: item `i` may only use items with a larger index.
    fn arb_registry() -> impl Strategy<Value = RecipeRegistry> {
        (2usize..12).prop_flat_map(|n| {
            proptest::collection::vec(
                (
                    1u32..5,
                    proptest::collection::vec((0usize..64, 0u32..6), 0..4),
                ),
                n,
            )
            .prop_map(move |items| {
                let entries = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, (output, parts))| {
                        let mut recipe = Recipe::new(output as f64, 1.0);
                        let remaining = n - i - 1;
                        if remaining > 0 {
                            for (offset, amount) in parts {
                                let j = i + 1 + offset % remaining;
                                recipe = recipe.with_part(format!("item{j}"), amount as f64);
                            }
                        }
                        (format!("item{i}"), recipe)
                    })
                    .collect();
                RecipeRegistry::new(entries).unwrap()
            })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn doubling_target_doubles_every_rate(reg in arb_registry(), k in 0.1f64..100.0) {
            let single = resolve(&reg, "item0", k).unwrap();
            let double = resolve(&reg, "item0", 2.0 * k).unwrap();
            prop_assert_eq!(single.demands.len(), double.demands.len());
            for (item, rate) in &single.demands {
                let doubled = double.demands[item];
                prop_assert!((doubled - 2.0 * rate).abs() <= 1e-9 * doubled.abs().max(1.0));
            }
        }
    }
}
