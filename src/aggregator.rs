//! # Ingredient Aggregator
//!
//! Collapses duplicate ingredient lines for the shopping list and groups the
//! result by storage location in sweep order.

use std::collections::HashMap;

use tracing::debug;

use crate::recipe_model::{IngredientLine, Quantity};
use crate::sorting::{compare_locations, sort_for_need};

/// Merge lines that share `(variant, name, location)`.
///
/// The first occurrence seeds the merged line. Later matches add their amount
/// only when both sides are numeric and the unit strings are identical; the
/// merged line is optional if any contributor was. Output keeps the order of
/// first occurrence.
pub fn merge_by_ingredient(list: &[IngredientLine]) -> Vec<IngredientLine> {
    let mut merged: Vec<IngredientLine> = Vec::new();
    let mut index: HashMap<(Option<String>, String, String), usize> = HashMap::new();

    for line in list {
        let key = (line.variant.clone(), line.name.clone(), line.location.clone());
        match index.get(&key) {
            Some(&pos) => {
                let existing = &mut merged[pos];
                if let (Quantity::Amount(total), Quantity::Amount(extra)) =
                    (&mut existing.quantity, &line.quantity)
                {
                    if existing.unit == line.unit {
                        *total += extra;
                    }
                }
                existing.is_optional |= line.is_optional;
            }
            None => {
                index.insert(key, merged.len());
                merged.push(line.clone());
            }
        }
    }

    debug!(input = list.len(), output = merged.len(), "merged ingredient lines");
    merged
}

/// One location group of the shopping list
#[derive(Debug, Clone, PartialEq)]
pub struct LocationGroup {
    /// Normalized location, empty for "no location"
    pub location: String,
    pub ingredients: Vec<IngredientLine>,
}

/// Group lines by location, merge duplicates within each group, and sort
/// groups by sweep order and each group by the need ordering.
pub fn group_by_location<'a, I>(lines: I) -> Vec<LocationGroup>
where
    I: IntoIterator<Item = &'a IngredientLine>,
{
    let mut groups: Vec<LocationGroup> = Vec::new();
    for line in lines {
        match groups.iter_mut().find(|g| g.location == line.location) {
            Some(group) => group.ingredients.push(line.clone()),
            None => groups.push(LocationGroup {
                location: line.location.clone(),
                ingredients: vec![line.clone()],
            }),
        }
    }

    for group in &mut groups {
        group.ingredients = merge_by_ingredient(&group.ingredients);
        sort_for_need(&mut group.ingredients);
    }
    groups.sort_by(|a, b| compare_locations(&a.location, &b.location));
    groups
}
