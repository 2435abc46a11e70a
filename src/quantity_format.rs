//! # Quantity Formatter
//!
//! Turns decimal quantities into Unicode fraction glyphs, pluralizes long-form
//! unit words, and composes the two display lines used by the renderer:
//!
//! - the **ingredient line** (`2 cups all-purpose flour, sifted (optional)`)
//! - the **need line** for the shopping list (`all-purpose flour (2 cups, optional)`)

use crate::recipe_model::{IngredientLine, Quantity, Substitute};

/// Default rounding denominator for displayed quantities
pub const DEFAULT_DENOMINATOR: u32 = 8;

/// Vulgar fraction glyphs for 1/8 .. 7/8
const EIGHTHS: [&str; 7] = ["⅛", "¼", "⅜", "½", "⅝", "¾", "⅞"];

/// Unit abbreviations that never take a plural "s"
const ABBREVIATED_UNITS: [&str; 12] = [
    "tsp", "tbsp", "cup", "oz", "lb", "pt", "qt", "gal", "ml", "l", "g", "kg",
];

/// Free-text quantities moved to the end of the ingredient line
const DEFERRED_PHRASES: [&str; 2] = ["to taste", "as needed"];

/// Largest scaled value an `f64` holds as an exact integer (2^53)
const MAX_EXACT_SCALED: f64 = 9_007_199_254_740_992.0;

/// Convert a decimal to a whole number plus fraction glyph.
///
/// The value is rounded to the nearest `1/denominator`. Eighths (and any
/// denominator that divides evenly into eighths) map to glyphs; other
/// fractions fall back to `n/d`. Values too large to split into a whole
/// part and a fraction are printed as a rounded whole number.
///
/// ```rust
/// use favorite_eats::quantity_format::decimal_to_fraction;
///
/// assert_eq!(decimal_to_fraction(1.5, 8), "1½");
/// assert_eq!(decimal_to_fraction(0.25, 8), "¼");
/// assert_eq!(decimal_to_fraction(3.0, 8), "3");
/// ```
pub fn decimal_to_fraction(value: f64, denominator: u32) -> String {
    let denominator = denominator.max(1);
    let scaled = (value * denominator as f64).round();
    if scaled >= MAX_EXACT_SCALED {
        return format!("{:.0}", value.round());
    }
    let scaled = scaled.max(0.0) as u64;
    let whole = scaled / denominator as u64;
    let numerator = (scaled % denominator as u64) as u32;

    let fraction = fraction_text(numerator, denominator);
    match (whole, fraction) {
        (0, Some(glyph)) => glyph,
        (w, Some(glyph)) => format!("{w}{glyph}"),
        (w, None) => w.to_string(),
    }
}

fn fraction_text(numerator: u32, denominator: u32) -> Option<String> {
    if numerator == 0 {
        return None;
    }
    let (eighths_num, denom) = (u64::from(numerator) * 8, u64::from(denominator));
    if eighths_num % denom == 0 {
        let eighths = (eighths_num / denom) as usize;
        if (1..=7).contains(&eighths) {
            return Some(EIGHTHS[eighths - 1].to_string());
        }
    }
    Some(format!("{numerator}/{denominator}"))
}

/// Pluralize a unit word for the given amount.
///
/// Abbreviations are left alone, as are words already ending in "s". The
/// amount is compared as displayed, rounded to the nearest eighth.
pub fn pluralize_unit(unit: &str, amount: f64) -> String {
    let shown = (amount * DEFAULT_DENOMINATOR as f64).round() / DEFAULT_DENOMINATOR as f64;
    if unit.is_empty() || shown == 1.0 {
        return unit.to_string();
    }
    let lower = unit.to_lowercase();
    if ABBREVIATED_UNITS.contains(&lower.as_str()) || unit.ends_with('s') {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}

/// Displayed quantity: fraction glyphs for amounts, text as-is
fn quantity_display(quantity: &Quantity) -> String {
    match quantity {
        Quantity::Amount(value) => decimal_to_fraction(*value, DEFAULT_DENOMINATOR),
        Quantity::Text(text) => text.trim().to_string(),
        Quantity::Empty => String::new(),
    }
}

/// "qty unit" with plural handling, skipping absent parts
fn quantity_with_unit(quantity: &Quantity, unit: &str) -> String {
    let unit = match quantity {
        Quantity::Amount(value) => pluralize_unit(unit.trim(), *value),
        _ => unit.trim().to_string(),
    };
    join_present(&[&quantity_display(quantity), &unit], " ")
}

fn join_present(parts: &[&str], separator: &str) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
}

/// Returns the lowercase phrase when the quantity is a deferred free-text one
fn deferred_phrase(quantity: &Quantity) -> Option<String> {
    match quantity {
        Quantity::Text(text) => {
            let lower = text.trim().to_lowercase();
            DEFERRED_PHRASES.contains(&lower.as_str()).then_some(lower)
        }
        _ => None,
    }
}

/// Render one substitute as "qty unit variant name"
pub fn format_substitute(substitute: &Substitute) -> String {
    join_present(
        &[
            &quantity_with_unit(&substitute.quantity, &substitute.unit),
            &substitute.display_name(),
        ],
        " ",
    )
}

/// Compose the ingredient line shown in the Ingredients block.
///
/// ```rust
/// use favorite_eats::quantity_format::format_ingredient_line;
/// use favorite_eats::recipe_model::{IngredientLine, Quantity};
///
/// let line = IngredientLine::new("salt")
///     .with_quantity(Quantity::Text("to taste".into()))
///     .with_variant("kosher");
/// assert_eq!(format_ingredient_line(&line), "kosher salt, to taste");
/// ```
pub fn format_ingredient_line(ingredient: &IngredientLine) -> String {
    let base = ingredient.display_name();
    let deferred = deferred_phrase(&ingredient.quantity);

    let mut text = if deferred.is_some() {
        // unit without a leading amount still reads naturally ("pinch salt")
        join_present(&[ingredient.unit.trim(), &base], " ")
    } else {
        join_present(
            &[&quantity_with_unit(&ingredient.quantity, &ingredient.unit), &base],
            " ",
        )
    };

    match (&deferred, &ingredient.prep_notes) {
        (Some(_), Some(prep)) => text = format!("{prep} {text}"),
        (None, Some(prep)) => text = format!("{text}, {prep}"),
        _ => {}
    }

    if !ingredient.substitutes.is_empty() {
        let subs: Vec<String> = ingredient.substitutes.iter().map(format_substitute).collect();
        text = format!("{text} or {}", subs.join(" or "));
    }

    // the deferred phrase closes the line, ahead of the parenthetical group
    if let Some(phrase) = &deferred {
        text = format!("{text}, {phrase}");
    }

    let mut parens: Vec<&str> = Vec::new();
    if let Some(note) = &ingredient.parenthetical_note {
        parens.push(note);
    }
    if ingredient.is_optional {
        parens.push("optional");
    }
    if !parens.is_empty() {
        text = format!("{text} ({})", parens.join(", "));
    }

    text.trim().to_string()
}

/// Compose the shopping-list line shown in the "You will need" block.
///
/// Prep notes are left out; quantity and the optional flag share one
/// trailing parenthesis.
pub fn format_need_line(ingredient: &IngredientLine) -> String {
    let mut text = ingredient.display_name();
    let amount = quantity_with_unit(&ingredient.quantity, &ingredient.unit);

    let mut parens: Vec<&str> = Vec::new();
    if !amount.is_empty() {
        parens.push(&amount);
    }
    if ingredient.is_optional {
        parens.push("optional");
    }
    if !parens.is_empty() {
        text = format!("{text} ({})", parens.join(", "));
    }

    text.trim().to_string()
}
