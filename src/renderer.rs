//! # Recipe Renderer
//!
//! Pure projection of a [`Recipe`] tree into the recipe view. Render order is
//! fixed: servings, Ingredients, You will need, Measures, Instructions. Lines
//! that project an editable part of the tree carry its indices so the edit
//! session can map a click back to the tree.
//!
//! Rendering never mutates the tree; rendering the same tree twice gives the
//! same view.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::aggregator::group_by_location;
use crate::measures::compute_measures;
use crate::quantity_format::{format_ingredient_line, format_need_line};
use crate::recipe_model::{IngredientLine, Recipe};
use crate::sorting::compare_for_ingredients;

static WORD_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w").expect("word start pattern should be valid"));

pub const INGREDIENTS_HEADER: &str = "Ingredients";
pub const NEED_HEADER: &str = "You will need";
pub const MEASURES_HEADER: &str = "Measures";
pub const INSTRUCTIONS_HEADER: &str = "Instructions";

/// Which of the fixed blocks a group of lines belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlockKind {
    Servings,
    Ingredients,
    YouWillNeed,
    Measures,
    Instructions,
}

/// One rendered line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViewLine {
    /// "Servings: 4"
    Servings { text: String },
    /// Block header such as "Ingredients"
    Header { text: String },
    /// Editable section name
    SectionName { section: usize, text: String },
    /// Storage location header in the shopping list
    LocationHeader { text: String },
    Ingredient {
        section: usize,
        ingredient: usize,
        text: String,
        sub_recipe_id: Option<i64>,
    },
    Need { text: String },
    Measure { text: String },
    /// `number` is set only when the section has more than one step
    Step {
        section: usize,
        step: usize,
        number: Option<usize>,
        text: String,
    },
}

impl ViewLine {
    /// Plain-text form of the line
    pub fn text(&self) -> String {
        match self {
            ViewLine::Step {
                number: Some(n),
                text,
                ..
            } => format!("{n}. {text}"),
            ViewLine::Servings { text }
            | ViewLine::Header { text }
            | ViewLine::SectionName { text, .. }
            | ViewLine::LocationHeader { text }
            | ViewLine::Ingredient { text, .. }
            | ViewLine::Need { text }
            | ViewLine::Measure { text }
            | ViewLine::Step { text, .. } => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewBlock {
    pub kind: BlockKind,
    pub lines: Vec<ViewLine>,
}

/// The full rendered recipe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeView {
    pub title: String,
    pub blocks: Vec<ViewBlock>,
}

impl RecipeView {
    pub fn block(&self, kind: BlockKind) -> Option<&ViewBlock> {
        self.blocks.iter().find(|b| b.kind == kind)
    }

    /// One line of text per view line
    pub fn to_text(&self) -> String {
        self.blocks
            .iter()
            .flat_map(|b| b.lines.iter())
            .map(ViewLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Capitalize the first letter of each word ("above fridge" -> "Above Fridge")
pub fn capitalize_words(text: &str) -> String {
    WORD_START
        .replace_all(text, |caps: &regex::Captures| caps[0].to_uppercase())
        .into_owned()
}

/// Render the whole recipe
pub fn render_recipe(recipe: &Recipe) -> RecipeView {
    let blocks = [
        servings_block(recipe),
        ingredients_block(recipe),
        need_block(recipe),
        measures_block(recipe),
        instructions_block(recipe),
    ]
    .into_iter()
    .flatten()
    .collect();

    RecipeView {
        title: recipe.title.clone(),
        blocks,
    }
}

fn servings_block(recipe: &Recipe) -> Option<ViewBlock> {
    let servings = recipe.servings.default?;
    Some(ViewBlock {
        kind: BlockKind::Servings,
        lines: vec![ViewLine::Servings {
            text: format!("Servings: {servings}"),
        }],
    })
}

fn header(text: &str) -> ViewLine {
    ViewLine::Header {
        text: text.to_string(),
    }
}

fn ingredients_block(recipe: &Recipe) -> Option<ViewBlock> {
    if recipe.sections.iter().all(|s| s.ingredients.is_empty()) {
        return None;
    }

    let mut lines = vec![header(INGREDIENTS_HEADER)];
    for (section_index, section) in recipe.sections.iter().enumerate() {
        if section.ingredients.is_empty() {
            continue;
        }
        if let Some(name) = &section.name {
            lines.push(ViewLine::SectionName {
                section: section_index,
                text: name.clone(),
            });
        }

        let mut ordered: Vec<(usize, &IngredientLine)> =
            section.ingredients.iter().enumerate().collect();
        ordered.sort_by(|a, b| compare_for_ingredients(a.1, b.1));

        lines.extend(ordered.into_iter().map(|(index, ingredient)| ViewLine::Ingredient {
            section: section_index,
            ingredient: index,
            text: format_ingredient_line(ingredient),
            sub_recipe_id: ingredient.sub_recipe.as_ref().map(|r| r.id),
        }));
    }

    Some(ViewBlock {
        kind: BlockKind::Ingredients,
        lines,
    })
}

fn need_block(recipe: &Recipe) -> Option<ViewBlock> {
    let groups = group_by_location(recipe.all_ingredients());
    if groups.is_empty() {
        return None;
    }

    let mut lines = vec![header(NEED_HEADER)];
    for group in groups {
        if !group.location.is_empty() {
            lines.push(ViewLine::LocationHeader {
                text: capitalize_words(&group.location),
            });
        }
        lines.extend(group.ingredients.iter().map(|i| ViewLine::Need {
            text: format_need_line(i),
        }));
    }

    Some(ViewBlock {
        kind: BlockKind::YouWillNeed,
        lines,
    })
}

fn measures_block(recipe: &Recipe) -> Option<ViewBlock> {
    let measures = compute_measures(recipe.all_ingredients());
    if measures.is_empty() {
        return None;
    }

    let mut lines = vec![header(MEASURES_HEADER)];
    lines.extend(measures.into_iter().map(|m| ViewLine::Measure {
        text: m.to_string(),
    }));
    Some(ViewBlock {
        kind: BlockKind::Measures,
        lines,
    })
}

fn instructions_block(recipe: &Recipe) -> Option<ViewBlock> {
    if recipe.sections.iter().all(|s| s.steps.is_empty()) {
        return None;
    }

    let mut lines = vec![header(INSTRUCTIONS_HEADER)];
    for (section_index, section) in recipe.sections.iter().enumerate() {
        if section.steps.is_empty() {
            continue;
        }
        if let Some(name) = &section.name {
            lines.push(ViewLine::SectionName {
                section: section_index,
                text: name.clone(),
            });
        }
        let numbered = section.steps.len() > 1;
        lines.extend(section.steps.iter().enumerate().map(|(index, step)| ViewLine::Step {
            section: section_index,
            step: index,
            number: numbered.then_some(index + 1),
            text: step.instructions.clone(),
        }));
    }

    Some(ViewBlock {
        kind: BlockKind::Instructions,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe_model::{Quantity, Section, Servings, Step};

    fn step(id: i64, text: &str) -> Step {
        Step {
            id: Some(id),
            section_id: None,
            step_number: id,
            instructions: text.to_string(),
        }
    }

    fn sample() -> Recipe {
        Recipe {
            id: 1,
            title: "Pancakes".into(),
            servings: Servings {
                default: Some(4),
                ..Servings::default()
            },
            sections: vec![Section {
                id: Some(1),
                name: Some("Batter".into()),
                steps: vec![step(1, "Whisk."), step(2, "Rest.")],
                ingredients: vec![
                    IngredientLine::new("sugar")
                        .with_quantity(Quantity::Amount(1.0))
                        .with_unit("tbsp")
                        .with_location("pantry"),
                    IngredientLine::new("milk")
                        .with_quantity(Quantity::Amount(1.0))
                        .with_unit("cup")
                        .with_location("fridge"),
                    IngredientLine::new("flour")
                        .with_quantity(Quantity::Amount(0.5))
                        .with_unit("cup")
                        .with_location("pantry"),
                    IngredientLine::new("flour")
                        .with_quantity(Quantity::Amount(0.5))
                        .with_unit("cup")
                        .with_location("pantry"),
                ],
            }],
        }
    }

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("above fridge"), "Above Fridge");
        assert_eq!(capitalize_words("spices"), "Spices");
    }

    #[test]
    fn test_render_block_order() {
        let view = render_recipe(&sample());
        let kinds: Vec<BlockKind> = view.blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Servings,
                BlockKind::Ingredients,
                BlockKind::YouWillNeed,
                BlockKind::Measures,
                BlockKind::Instructions,
            ]
        );
    }

    #[test]
    fn test_render_text() {
        let text = render_recipe(&sample()).to_text();
        let expected = [
            "Servings: 4",
            "Ingredients",
            "Batter",
            "½ cup flour",
            "½ cup flour",
            "1 cup milk",
            "1 tbsp sugar",
            "You will need",
            "Fridge",
            "milk (1 cup)",
            "Pantry",
            "flour (1 cup)",
            "sugar (1 tbsp)",
            "Measures",
            "1 tbsp",
            "½ cup",
            "1 cup",
            "Instructions",
            "Batter",
            "1. Whisk.",
            "2. Rest.",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_ingredient_lines_keep_tree_indices() {
        let view = render_recipe(&sample());
        let block = view.block(BlockKind::Ingredients).unwrap();
        let indices: Vec<usize> = block
            .lines
            .iter()
            .filter_map(|l| match l {
                ViewLine::Ingredient { ingredient, .. } => Some(*ingredient),
                _ => None,
            })
            .collect();
        assert_eq!(indices, vec![2, 3, 1, 0]);
    }

    #[test]
    fn test_single_step_section_is_unnumbered() {
        let mut recipe = sample();
        recipe.sections[0].steps.truncate(1);
        let view = render_recipe(&recipe);
        let last = view.blocks.last().unwrap().lines.last().unwrap();
        assert_eq!(last.text(), "Whisk.");
    }

    #[test]
    fn test_render_is_idempotent() {
        let recipe = sample();
        assert_eq!(render_recipe(&recipe), render_recipe(&recipe));
    }
}
