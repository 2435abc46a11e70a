//! # Canonical Sort Engine
//!
//! Composite-key orderings for ingredient lines, plus the fixed kitchen
//! location sweep used to group the shopping list.

use std::cmp::Ordering;

use crate::recipe_model::IngredientLine;

/// Kitchen sweep order. The empty string is "no location".
pub const LOCATION_ORDER: [&str; 10] = [
    "fridge",
    "freezer",
    "above fridge",
    "pantry",
    "cereal cabinet",
    "spices",
    "fruit stand",
    "coffee bar",
    "",
    "measures",
];

/// Rank of a normalized location in the sweep.
///
/// Unlisted locations rank after every listed one.
pub fn location_rank(location: &str) -> usize {
    LOCATION_ORDER
        .iter()
        .position(|l| *l == location)
        .unwrap_or(LOCATION_ORDER.len())
}

/// Order two locations by sweep rank; unlisted ones fall back to name order
pub fn compare_locations(a: &str, b: &str) -> Ordering {
    location_rank(a)
        .cmp(&location_rank(b))
        .then_with(|| a.cmp(b))
}

fn compare_required_first(a: &IngredientLine, b: &IngredientLine) -> Ordering {
    a.is_optional.cmp(&b.is_optional)
}

fn compare_names(a: &IngredientLine, b: &IngredientLine) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| {
            let va = a.variant.as_deref().unwrap_or("").to_lowercase();
            let vb = b.variant.as_deref().unwrap_or("").to_lowercase();
            va.cmp(&vb)
        })
}

/// Ingredients block: required before optional, then name, then variant
pub fn compare_for_ingredients(a: &IngredientLine, b: &IngredientLine) -> Ordering {
    compare_required_first(a, b).then_with(|| compare_names(a, b))
}

/// "You will need" block: location sweep, required first, name, variant
pub fn compare_for_need(a: &IngredientLine, b: &IngredientLine) -> Ordering {
    compare_locations(&a.location, &b.location)
        .then_with(|| compare_required_first(a, b))
        .then_with(|| compare_names(a, b))
}

/// Stable sort for the Ingredients block
pub fn sort_for_ingredients(list: &mut [IngredientLine]) {
    list.sort_by(compare_for_ingredients);
}

/// Stable sort for the "You will need" block
pub fn sort_for_need(list: &mut [IngredientLine]) {
    list.sort_by(compare_for_need);
}
