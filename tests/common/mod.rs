#![allow(dead_code)]

use anyhow::{Context, Result};
use favorite_eats::db::init_database_schema;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub const APPLE_PIE: i64 = 1;
pub const PIE_CRUST: i64 = 2;
pub const TART: i64 = 3;

/// Recipe 1 has a "Crust" and a "Filling" section plus one step with no
/// section. Recipe 3 has a named "Filling" section and an unnamed one.
const SEED: &str = "
INSERT INTO recipes (ID, title, servings_default, servings_min, servings_max)
    VALUES (1, 'Apple Pie', 8, 6, 10);
INSERT INTO recipes (ID, title) VALUES (2, 'Flaky Pie Crust');
INSERT INTO recipes (ID, title) VALUES (3, 'Plum Tart');

INSERT INTO recipe_sections (ID, recipe_id, name, sort_order) VALUES (10, 1, 'Filling', 1);
INSERT INTO recipe_sections (ID, recipe_id, name, sort_order) VALUES (11, 1, 'Crust', 0);
INSERT INTO recipe_sections (ID, recipe_id, name, sort_order) VALUES (30, 3, 'Filling', 0);
INSERT INTO recipe_sections (ID, recipe_id, name, sort_order) VALUES (31, 3, NULL, 1);

INSERT INTO recipe_steps (ID, recipe_id, section_id, step_number, instructions)
    VALUES (100, 1, 11, 1, 'Roll out the crust.');
INSERT INTO recipe_steps (ID, recipe_id, section_id, step_number, instructions)
    VALUES (101, 1, 10, 2, 'Slice the apples.');
INSERT INTO recipe_steps (ID, recipe_id, section_id, step_number, instructions)
    VALUES (102, 1, 10, 3, 'Toss with sugar.');
INSERT INTO recipe_steps (ID, recipe_id, section_id, step_number, instructions)
    VALUES (103, 1, NULL, 4, 'Bake at 375 for 50 minutes.');
INSERT INTO recipe_steps (ID, recipe_id, section_id, step_number, instructions)
    VALUES (200, 2, NULL, 1, 'Cut butter into flour.');
INSERT INTO recipe_steps (ID, recipe_id, section_id, step_number, instructions)
    VALUES (300, 3, 30, 1, 'Halve the plums.');
INSERT INTO recipe_steps (ID, recipe_id, section_id, step_number, instructions)
    VALUES (301, 3, 31, 2, 'Bake until bubbling.');

INSERT INTO ingredients (ID, name, variant, parenthetical_note, location_at_home)
    VALUES (1, 'apples', 'granny smith', NULL, 'Fruit-Stand');
INSERT INTO ingredients (ID, name, variant, parenthetical_note, location_at_home)
    VALUES (2, 'sugar', NULL, NULL, 'pantry');
INSERT INTO ingredients (ID, name, variant, parenthetical_note, location_at_home)
    VALUES (3, 'crust', 'pie', NULL, NULL);
INSERT INTO ingredients (ID, name, variant, parenthetical_note, location_at_home)
    VALUES (4, 'cinnamon', NULL, NULL, 'spices');
INSERT INTO ingredients (ID, name, variant, parenthetical_note, location_at_home)
    VALUES (5, 'plums', NULL, NULL, 'fruit stand');
INSERT INTO ingredients (ID, name, variant, parenthetical_note, location_at_home)
    VALUES (6, 'lemon', NULL, 'zested', 'fruit stand');

INSERT INTO recipe_ingredient_map (ID, recipe_id, section_id, ingredient_id, quantity, unit, prep_notes, is_optional)
    VALUES (1000, 1, 10, 1, 6, '', 'sliced', 0);
INSERT INTO recipe_ingredient_map (ID, recipe_id, section_id, ingredient_id, quantity, unit, prep_notes, is_optional)
    VALUES (1001, 1, 10, 2, 0.5, 'cup', NULL, 0);
INSERT INTO recipe_ingredient_map (ID, recipe_id, section_id, ingredient_id, quantity, unit, prep_notes, is_optional)
    VALUES (1002, 1, 11, 3, 1, NULL, NULL, 0);
INSERT INTO recipe_ingredient_map (ID, recipe_id, section_id, ingredient_id, quantity, unit, prep_notes, is_optional)
    VALUES (1003, 1, 10, 4, 'to taste', NULL, NULL, 1);
INSERT INTO recipe_ingredient_map (ID, recipe_id, section_id, ingredient_id, quantity, unit, prep_notes, is_optional)
    VALUES (3000, 3, 30, 5, 6, NULL, 'halved', 0);
INSERT INTO recipe_ingredient_map (ID, recipe_id, section_id, ingredient_id, quantity, unit, prep_notes, is_optional)
    VALUES (3001, 3, 30, 6, 1, NULL, NULL, 0);

INSERT INTO recipe_ingredient_substitutes (ID, recipe_ingredient_id, quantity, unit, name, variant)
    VALUES (1, 1001, 0.25, 'cup', 'honey', NULL)
";

/// Fresh in-memory database with the schema and the sample recipes.
///
/// One connection only: every connection to `sqlite::memory:` is its own
/// database.
pub async fn setup_test_db() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .context("Failed to open in-memory database")?;

    init_database_schema(&pool).await?;
    seed(&pool).await?;
    Ok(pool)
}

pub async fn seed(pool: &SqlitePool) -> Result<()> {
    for statement in SEED.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to seed: {statement}"))?;
    }
    Ok(())
}
