//! # Measures Decomposer
//!
//! Works out which measuring spoons, cups and liquid vessels a recipe calls
//! for. The result is a recommendation of tools to have on the counter, not an
//! exact portioning of each amount.

use std::collections::HashSet;

use crate::recipe_model::IngredientLine;

/// The canonical measures, in display order
pub const MEASURE_ORDER: [&str; 17] = [
    "⅛ tsp", "¼ tsp", "½ tsp", "1 tsp", "½ tbsp", "1 tbsp", "1½ tbsp", "⅛ cup", "¼ cup", "⅓ cup",
    "½ cup", "⅔ cup", "¾ cup", "1 cup", "2 cup", "4 cup", "8 cup",
];

const EPSILON: f64 = 1e-6;

/// Dry cups within this distance of an amount count as an exact fit
const CUP_TOLERANCE: f64 = 0.01;

/// Largest amount measured with dry cups alone
const DRY_CUP_LIMIT: f64 = 1.25;

const TEASPOONS: [(&str, f64); 4] = [("1 tsp", 1.0), ("½ tsp", 0.5), ("¼ tsp", 0.25), ("⅛ tsp", 0.125)];

const TABLESPOONS: [(&str, f64); 2] = [("1 tbsp", 1.0), ("½ tbsp", 0.5)];

const DRY_CUPS: [(&str, f64); 7] = [
    ("⅛ cup", 0.125),
    ("¼ cup", 0.25),
    ("⅓ cup", 1.0 / 3.0),
    ("½ cup", 0.5),
    ("⅔ cup", 2.0 / 3.0),
    ("¾ cup", 0.75),
    ("1 cup", 1.0),
];

const VESSELS: [(&str, f64); 4] = [("1 cup", 1.0), ("2 cup", 2.0), ("4 cup", 4.0), ("8 cup", 8.0)];

const LIQUID_LOCATIONS: [&str; 2] = ["fridge", "above fridge"];

const LIQUID_WORDS: [&str; 6] = ["water", "broth", "sauce", "oil", "vinegar", "juice"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitFamily {
    Teaspoon,
    Tablespoon,
    Cup,
}

fn unit_family(unit: &str) -> Option<UnitFamily> {
    let unit = unit.to_lowercase();
    if unit.contains("tbsp") || unit.contains("tablespoon") {
        Some(UnitFamily::Tablespoon)
    } else if unit.contains("tsp") || unit.contains("teaspoon") {
        Some(UnitFamily::Teaspoon)
    } else if unit.contains("cup") {
        Some(UnitFamily::Cup)
    } else {
        None
    }
}

/// Liquid heuristic: stored cold, or a name that reads like a liquid
pub fn is_liquid(ingredient: &IngredientLine) -> bool {
    let name = ingredient.name.to_lowercase();
    LIQUID_LOCATIONS.contains(&ingredient.location.as_str())
        || LIQUID_WORDS.iter().any(|w| name.contains(w))
}

/// Compute the measures needed for a list of ingredients, in display order.
///
/// ```rust
/// use favorite_eats::measures::compute_measures;
/// use favorite_eats::recipe_model::{IngredientLine, Quantity};
///
/// let water = IngredientLine::new("water")
///     .with_quantity(Quantity::Amount(3.0))
///     .with_unit("cups");
/// assert_eq!(compute_measures(&[water]), vec!["4 cup"]);
/// ```
pub fn compute_measures<'a, I>(ingredients: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a IngredientLine>,
{
    let mut found: HashSet<&'static str> = HashSet::new();

    for ingredient in ingredients {
        let Some(qty) = ingredient.quantity.amount() else {
            continue;
        };
        if qty <= EPSILON {
            continue;
        }
        match unit_family(&ingredient.unit) {
            Some(UnitFamily::Teaspoon) => greedy(qty, &TEASPOONS, &mut found),
            Some(UnitFamily::Tablespoon) => {
                if (qty - 1.5).abs() < EPSILON {
                    found.insert("1½ tbsp");
                } else {
                    greedy(qty, &TABLESPOONS, &mut found);
                }
            }
            Some(UnitFamily::Cup) => cups(qty, is_liquid(ingredient), &mut found),
            None => {}
        }
    }

    MEASURE_ORDER
        .iter()
        .copied()
        .filter(|m| found.contains(m))
        .collect()
}

/// Take as many of each denomination as fit, largest first.
/// A remainder below the smallest denomination still needs that spoon.
fn greedy(qty: f64, table: &[(&'static str, f64)], found: &mut HashSet<&'static str>) {
    let mut remaining = qty;
    for (label, size) in table {
        let count = ((remaining + EPSILON) / size).floor();
        if count >= 1.0 {
            found.insert(*label);
            remaining = (remaining - count * size).max(0.0);
        }
    }
    if remaining > EPSILON {
        if let Some((smallest, _)) = table.last() {
            found.insert(*smallest);
        }
    }
}

/// Smallest dry cup that holds `qty`, if any
fn dry_cup_for(qty: f64) -> Option<&'static str> {
    DRY_CUPS
        .iter()
        .find(|(_, size)| *size + CUP_TOLERANCE >= qty)
        .map(|(label, _)| *label)
}

fn cups(qty: f64, liquid: bool, found: &mut HashSet<&'static str>) {
    let (largest_label, largest) = VESSELS[VESSELS.len() - 1];
    if qty <= largest + EPSILON {
        cups_within_vessel(qty, liquid, found);
        return;
    }

    // fill the largest vessel as often as needed, leaving a remainder in (0, 8]
    found.insert(largest_label);
    let refills = ((qty - largest) / largest).ceil();
    let remainder = (qty - refills * largest).clamp(0.0, largest);
    if remainder <= EPSILON {
        return;
    }
    if remainder < DRY_CUP_LIMIT {
        if let Some(top_up) = dry_cup_for(remainder) {
            found.insert(top_up);
        }
    } else {
        cups_within_vessel(remainder, liquid, found);
    }
}

/// Dry cups or the smallest covering vessel for an amount up to 8 cups
fn cups_within_vessel(qty: f64, liquid: bool, found: &mut HashSet<&'static str>) {
    // liquids over a cup go straight to a pouring vessel
    let dry_limit = if liquid { 1.0 } else { DRY_CUP_LIMIT };

    if qty <= dry_limit + EPSILON {
        match dry_cup_for(qty) {
            Some(label) => {
                found.insert(label);
            }
            None => {
                found.insert("1 cup");
                if let Some(label) = dry_cup_for(qty - 1.0) {
                    found.insert(label);
                }
            }
        }
        return;
    }

    if let Some((label, _)) = VESSELS.iter().find(|(_, size)| *size + EPSILON >= qty) {
        found.insert(*label);
    }
}
