//! # Recipe Database Bridge
//!
//! Reads normalized recipe rows out of the SQLite file into a [`Recipe`] tree
//! and writes edited steps back. This is the only module that issues SQL.

use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use crate::errors::{RecipeError, Result};
use crate::recipe_model::{
    non_empty, normalize_location, IngredientLine, Quantity, Recipe, RecipeLink, Section, Servings,
    Step, Substitute,
};

/// Create the recipe tables when they are missing.
///
/// Existing databases are left untouched.
pub async fn init_database_schema(pool: &SqlitePool) -> Result<()> {
    info!("Initializing recipe database schema");

    let statements = [
        "CREATE TABLE IF NOT EXISTS recipes (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            servings_default INTEGER,
            servings_min INTEGER,
            servings_max INTEGER
        )",
        "CREATE TABLE IF NOT EXISTS recipe_sections (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(ID),
            name TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0
        )",
        "CREATE TABLE IF NOT EXISTS recipe_steps (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(ID),
            section_id INTEGER REFERENCES recipe_sections(ID),
            step_number INTEGER NOT NULL,
            instructions TEXT NOT NULL DEFAULT ''
        )",
        "CREATE TABLE IF NOT EXISTS ingredients (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            variant TEXT,
            parenthetical_note TEXT,
            location_at_home TEXT
        )",
        "CREATE TABLE IF NOT EXISTS recipe_ingredient_map (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(ID),
            section_id INTEGER REFERENCES recipe_sections(ID),
            ingredient_id INTEGER NOT NULL REFERENCES ingredients(ID),
            quantity,
            unit TEXT,
            prep_notes TEXT,
            is_optional INTEGER NOT NULL DEFAULT 0
        )",
        "CREATE TABLE IF NOT EXISTS recipe_ingredient_substitutes (
            ID INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_ingredient_id INTEGER NOT NULL REFERENCES recipe_ingredient_map(ID),
            quantity,
            unit TEXT,
            name TEXT NOT NULL,
            variant TEXT
        )",
    ];

    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Recipe database schema initialized");
    Ok(())
}

/// List recipes ordered by title, optionally filtered by a case-insensitive
/// substring of the title
pub async fn list_recipes(pool: &SqlitePool, filter: Option<&str>) -> Result<Vec<RecipeLink>> {
    let rows = sqlx::query("SELECT ID AS id, title FROM recipes ORDER BY title COLLATE NOCASE, ID")
        .fetch_all(pool)
        .await?;

    let needle = filter.map(|f| f.trim().to_lowercase()).unwrap_or_default();
    let mut recipes = Vec::with_capacity(rows.len());
    for row in rows {
        let link = RecipeLink {
            id: row.try_get("id")?,
            title: row.try_get::<Option<String>, _>("title")?.unwrap_or_default(),
        };
        if needle.is_empty() || link.title.to_lowercase().contains(&needle) {
            recipes.push(link);
        }
    }

    debug!(count = recipes.len(), "listed recipes");
    Ok(recipes)
}

/// Best-effort sub-recipe lookup.
///
/// Matches `variant + " " + name` as a case-insensitive substring of each
/// candidate title, skipping `exclude_id`. The first candidate wins; no match
/// gives `None`. Ambiguous titles are not an error.
pub fn resolve_sub_recipe(
    candidates: &[RecipeLink],
    exclude_id: i64,
    variant: Option<&str>,
    name: &str,
) -> Option<RecipeLink> {
    let needle = match variant {
        Some(v) if !v.trim().is_empty() => format!("{} {}", v.trim(), name.trim()),
        _ => name.trim().to_string(),
    }
    .to_lowercase();
    if needle.is_empty() {
        return None;
    }

    candidates
        .iter()
        .filter(|c| c.id != exclude_id)
        .find(|c| c.title.to_lowercase().contains(&needle))
        .cloned()
}

/// Look up a sub-recipe for one ingredient directly against the database
pub async fn find_sub_recipe(
    pool: &SqlitePool,
    exclude_id: i64,
    variant: Option<&str>,
    name: &str,
) -> Result<Option<RecipeLink>> {
    let candidates = recipe_titles_by_id(pool).await?;
    Ok(resolve_sub_recipe(&candidates, exclude_id, variant, name))
}

async fn recipe_titles_by_id(pool: &SqlitePool) -> Result<Vec<RecipeLink>> {
    let rows = sqlx::query("SELECT ID AS id, title FROM recipes ORDER BY ID")
        .fetch_all(pool)
        .await?;
    rows.into_iter()
        .map(|row| -> Result<RecipeLink> {
            Ok(RecipeLink {
                id: row.try_get("id")?,
                title: row.try_get::<Option<String>, _>("title")?.unwrap_or_default(),
            })
        })
        .collect()
}

/// Load a recipe and all its pieces into a tree.
///
/// Fails with [`RecipeError::NotFound`] before reading anything else when the
/// recipe row is missing.
pub async fn load_recipe(pool: &SqlitePool, recipe_id: i64) -> Result<Recipe> {
    info!(recipe_id, "Loading recipe");

    let row = sqlx::query(
        "SELECT ID AS id, title, servings_default, servings_min, servings_max
         FROM recipes WHERE ID = ?",
    )
    .bind(recipe_id)
    .fetch_optional(pool)
    .await?
    .ok_or(RecipeError::NotFound(recipe_id))?;

    let id: i64 = row.try_get("id")?;
    let title = row.try_get::<Option<String>, _>("title")?.unwrap_or_default();
    let servings = Servings {
        default: row.try_get("servings_default")?,
        min: row.try_get("servings_min")?,
        max: row.try_get("servings_max")?,
    };

    let mut sections = load_sections(pool, id).await?;
    let mut unsectioned = Section::unsectioned();

    for step in load_steps(pool, id).await? {
        match sections.iter_mut().find(|s| s.id.is_some() && s.id == step.section_id) {
            Some(section) => section.steps.push(step),
            None => unsectioned.steps.push(step),
        }
    }

    let titles = recipe_titles_by_id(pool).await?;
    for mut ingredient in load_ingredients(pool, id).await? {
        if let Some(line_id) = ingredient.id {
            ingredient.substitutes = load_substitutes(pool, line_id).await?;
        }
        ingredient.sub_recipe =
            resolve_sub_recipe(&titles, id, ingredient.variant.as_deref(), &ingredient.name);
        match sections
            .iter_mut()
            .find(|s| s.id.is_some() && s.id == ingredient.section_id)
        {
            Some(section) => section.ingredients.push(ingredient),
            None => unsectioned.ingredients.push(ingredient),
        }
    }

    if !unsectioned.is_empty() {
        sections.insert(0, unsectioned);
    }

    let recipe = Recipe {
        id,
        title,
        servings,
        sections,
    };
    info!(
        recipe_id,
        sections = recipe.sections.len(),
        steps = recipe.all_steps().count(),
        ingredients = recipe.all_ingredients().count(),
        "Recipe loaded"
    );
    Ok(recipe)
}

async fn load_sections(pool: &SqlitePool, recipe_id: i64) -> Result<Vec<Section>> {
    let rows = sqlx::query(
        "SELECT ID AS id, name FROM recipe_sections
         WHERE recipe_id = ? ORDER BY sort_order, ID",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| -> Result<Section> {
            Ok(Section {
                id: Some(row.try_get("id")?),
                name: non_empty(row.try_get("name")?),
                steps: Vec::new(),
                ingredients: Vec::new(),
            })
        })
        .collect()
}

async fn load_steps(pool: &SqlitePool, recipe_id: i64) -> Result<Vec<Step>> {
    let rows = sqlx::query(
        "SELECT ID AS id, section_id, step_number, instructions FROM recipe_steps
         WHERE recipe_id = ? ORDER BY step_number, ID",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| -> Result<Step> {
            Ok(Step {
                id: Some(row.try_get("id")?),
                section_id: row.try_get("section_id")?,
                step_number: row.try_get::<Option<i64>, _>("step_number")?.unwrap_or_default(),
                instructions: row
                    .try_get::<Option<String>, _>("instructions")?
                    .unwrap_or_default(),
            })
        })
        .collect()
}

async fn load_ingredients(pool: &SqlitePool, recipe_id: i64) -> Result<Vec<IngredientLine>> {
    let rows = sqlx::query(
        "SELECT rim.ID AS id, rim.section_id AS section_id,
                CAST(rim.quantity AS TEXT) AS quantity, rim.unit AS unit,
                rim.prep_notes AS prep_notes, rim.is_optional AS is_optional,
                i.name AS name, i.variant AS variant,
                i.parenthetical_note AS parenthetical_note,
                i.location_at_home AS location_at_home
         FROM recipe_ingredient_map rim
         JOIN ingredients i ON rim.ingredient_id = i.ID
         WHERE rim.recipe_id = ?
         ORDER BY rim.ID",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| -> Result<IngredientLine> {
            Ok(IngredientLine {
                id: Some(row.try_get("id")?),
                section_id: row.try_get("section_id")?,
                quantity: Quantity::from_column(row.try_get("quantity")?),
                unit: text_column(&row, "unit")?,
                name: text_column(&row, "name")?,
                variant: non_empty(row.try_get("variant")?),
                prep_notes: non_empty(row.try_get("prep_notes")?),
                parenthetical_note: non_empty(row.try_get("parenthetical_note")?),
                is_optional: row.try_get::<Option<i64>, _>("is_optional")?.unwrap_or(0) != 0,
                location: normalize_location(&text_column(&row, "location_at_home")?),
                substitutes: Vec::new(),
                sub_recipe: None,
            })
        })
        .collect()
}

async fn load_substitutes(pool: &SqlitePool, recipe_ingredient_id: i64) -> Result<Vec<Substitute>> {
    let rows = sqlx::query(
        "SELECT CAST(quantity AS TEXT) AS quantity, unit, name, variant
         FROM recipe_ingredient_substitutes
         WHERE recipe_ingredient_id = ? ORDER BY ID",
    )
    .bind(recipe_ingredient_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| -> Result<Substitute> {
            Ok(Substitute {
                quantity: Quantity::from_column(row.try_get("quantity")?),
                unit: text_column(&row, "unit")?,
                name: text_column(&row, "name")?,
                variant: non_empty(row.try_get("variant")?),
            })
        })
        .collect()
}

/// Nullable text column, trimmed, with NULL read as ""
fn text_column(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<String> {
    Ok(row
        .try_get::<Option<String>, _>(column)?
        .map(|v| v.trim().to_string())
        .unwrap_or_default())
}

/// Write every step's display position and text back to its row.
///
/// Runs in one transaction. Steps without a row identity are skipped.
/// Returns the number of rows written.
pub async fn persist_steps(pool: &SqlitePool, recipe: &Recipe) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut updated = 0;

    for (index, step) in recipe.all_steps().enumerate() {
        let Some(step_id) = step.id else {
            debug!(position = index + 1, "skipping step without identity");
            continue;
        };
        sqlx::query("UPDATE recipe_steps SET step_number = ?, instructions = ? WHERE ID = ?")
            .bind(index as i64 + 1)
            .bind(step.instructions.trim())
            .bind(step_id)
            .execute(&mut *tx)
            .await?;
        updated += 1;
    }

    tx.commit().await?;
    info!(recipe_id = recipe.id, updated, "Persisted recipe steps");
    Ok(updated)
}
