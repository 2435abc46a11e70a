//! # Recipe Data Model
//!
//! In-memory tree for one recipe as loaded from the database: the recipe row,
//! its ordered sections, and each section's steps and ingredient lines.
//!
//! ## Core Concepts
//!
//! - **Recipe**: title, servings and an ordered list of sections
//! - **Section**: optional name; `None` is the unsectioned fallback group
//! - **Step**: one numbered instruction, numbered 1..N across the recipe
//! - **IngredientLine**: quantity, unit, catalog name/variant, notes, location
//! - **Quantity**: numeric amount, free text ("to taste"), or nothing
//!
//! ## Usage
//!
//! ```rust
//! use favorite_eats::recipe_model::{IngredientLine, Quantity};
//!
//! let flour = IngredientLine::new("flour")
//!     .with_quantity(Quantity::Amount(2.0))
//!     .with_unit("cup")
//!     .with_location("pantry");
//! assert_eq!(flour.display_name(), "flour");
//! ```

use serde::{Deserialize, Serialize};

/// Quantity of an ingredient line.
///
/// The database stores a single column that is either a number or free text;
/// the two readings are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Quantity {
    /// Finite, non-negative amount
    Amount(f64),
    /// Free text such as "to taste" or "2 or 3"
    Text(String),
    /// No quantity at all
    #[default]
    Empty,
}

impl Quantity {
    /// Parse a raw quantity string.
    ///
    /// The whole trimmed string must be a finite non-negative number to count
    /// as an amount; anything else that is non-empty is free text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Quantity::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => Quantity::Amount(value),
            _ => Quantity::Text(trimmed.to_string()),
        }
    }

    /// Build a quantity from a nullable database column
    pub fn from_column(raw: Option<String>) -> Self {
        raw.map(|r| Self::parse(&r)).unwrap_or_default()
    }

    /// Numeric amount, if this quantity is one
    pub fn amount(&self) -> Option<f64> {
        match self {
            Quantity::Amount(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Quantity::Empty)
    }

    /// Raw editable text: "1.5", "to taste", or ""
    pub fn raw(&self) -> String {
        match self {
            Quantity::Amount(value) => value.to_string(),
            Quantity::Text(text) => text.clone(),
            Quantity::Empty => String::new(),
        }
    }
}

/// Servings range stored on the recipe row
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Servings {
    pub default: Option<i64>,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// Lightweight reference to another recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeLink {
    pub id: i64,
    pub title: String,
}

/// One alternative for an ingredient line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substitute {
    pub quantity: Quantity,
    pub unit: String,
    pub name: String,
    pub variant: Option<String>,
}

/// One instruction step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Row identity; `None` for lines added in the current session
    pub id: Option<i64>,
    pub section_id: Option<i64>,
    /// 1-based, dense across the whole recipe
    pub step_number: i64,
    pub instructions: String,
}

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    /// Row identity in the recipe/ingredient map
    pub id: Option<i64>,
    pub section_id: Option<i64>,
    pub quantity: Quantity,
    /// Free-text unit, empty when absent
    pub unit: String,
    pub name: String,
    pub variant: Option<String>,
    pub prep_notes: Option<String>,
    pub parenthetical_note: Option<String>,
    pub is_optional: bool,
    /// Lowercase storage location, empty for "no location"
    pub location: String,
    pub substitutes: Vec<Substitute>,
    /// Best-effort link to a recipe whose title matches this ingredient
    pub sub_recipe: Option<RecipeLink>,
}

impl IngredientLine {
    /// Create a bare ingredient line with just a name
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            section_id: None,
            quantity: Quantity::Empty,
            unit: String::new(),
            name: name.to_string(),
            variant: None,
            prep_notes: None,
            parenthetical_note: None,
            is_optional: false,
            location: String::new(),
            substitutes: Vec::new(),
            sub_recipe: None,
        }
    }

    pub fn with_quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = unit.to_string();
        self
    }

    pub fn with_variant(mut self, variant: &str) -> Self {
        self.variant = non_empty(Some(variant.to_string()));
        self
    }

    pub fn with_prep_notes(mut self, notes: &str) -> Self {
        self.prep_notes = non_empty(Some(notes.to_string()));
        self
    }

    pub fn with_parenthetical_note(mut self, note: &str) -> Self {
        self.parenthetical_note = non_empty(Some(note.to_string()));
        self
    }

    pub fn with_location(mut self, location: &str) -> Self {
        self.location = normalize_location(location);
        self
    }

    pub fn with_substitute(mut self, substitute: Substitute) -> Self {
        self.substitutes.push(substitute);
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    /// "variant name", or just the name when there is no variant
    pub fn display_name(&self) -> String {
        join_variant(self.variant.as_deref(), &self.name)
    }
}

impl Substitute {
    pub fn display_name(&self) -> String {
        join_variant(self.variant.as_deref(), &self.name)
    }
}

/// A named or unnamed grouping of steps and ingredients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Row identity; `None` for the unsectioned fallback group
    pub id: Option<i64>,
    /// `None` renders without a header
    pub name: Option<String>,
    pub steps: Vec<Step>,
    pub ingredients: Vec<IngredientLine>,
}

impl Section {
    /// The synthetic group holding rows without a matching section
    pub fn unsectioned() -> Self {
        Self {
            id: None,
            name: None,
            steps: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.ingredients.is_empty()
    }
}

/// A full recipe tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub servings: Servings,
    pub sections: Vec<Section>,
}

impl Recipe {
    /// All ingredient lines across sections, in section order
    pub fn all_ingredients(&self) -> impl Iterator<Item = &IngredientLine> {
        self.sections.iter().flat_map(|s| s.ingredients.iter())
    }

    /// All steps across sections, in display order
    pub fn all_steps(&self) -> impl Iterator<Item = &Step> {
        self.sections.iter().flat_map(|s| s.steps.iter())
    }

    /// Reassign step numbers 1..N in display order
    pub fn renumber_steps(&mut self) {
        let mut next = 1;
        for step in self.sections.iter_mut().flat_map(|s| s.steps.iter_mut()) {
            step.step_number = next;
            next += 1;
        }
    }
}

/// Map empty or whitespace-only strings to `None`
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Lowercase, trimmed location with hyphens and underscores read as spaces
pub fn normalize_location(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_variant(variant: Option<&str>, name: &str) -> String {
    match variant {
        Some(v) if !v.is_empty() => format!("{v} {name}").trim().to_string(),
        _ => name.to_string(),
    }
}
