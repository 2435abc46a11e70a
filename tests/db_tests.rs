mod common;

use anyhow::Result;
use common::{setup_test_db, APPLE_PIE, PIE_CRUST, TART};
use favorite_eats::db::*;
use favorite_eats::recipe_model::{Quantity, Recipe};
use favorite_eats::RecipeError;

fn step_texts(recipe: &Recipe) -> Vec<&str> {
    recipe.all_steps().map(|s| s.instructions.as_str()).collect()
}

#[tokio::test]
async fn test_load_missing_recipe_is_not_found() -> Result<()> {
    let pool = setup_test_db().await?;
    let err = load_recipe(&pool, 999).await.unwrap_err();
    assert_eq!(err, RecipeError::NotFound(999));
    Ok(())
}

#[tokio::test]
async fn test_load_recipe_header_and_servings() -> Result<()> {
    let pool = setup_test_db().await?;
    let recipe = load_recipe(&pool, APPLE_PIE).await?;
    assert_eq!(recipe.title, "Apple Pie");
    assert_eq!(recipe.servings.default, Some(8));
    assert_eq!(recipe.servings.min, Some(6));
    assert_eq!(recipe.servings.max, Some(10));
    Ok(())
}

#[tokio::test]
async fn test_unsectioned_rows_are_prepended() -> Result<()> {
    let pool = setup_test_db().await?;
    let recipe = load_recipe(&pool, APPLE_PIE).await?;

    let names: Vec<Option<&str>> = recipe.sections.iter().map(|s| s.name.as_deref()).collect();
    assert_eq!(names, vec![None, Some("Crust"), Some("Filling")]);
    assert_eq!(recipe.sections[0].id, None);
    assert_eq!(
        step_texts(&recipe),
        vec![
            "Bake at 375 for 50 minutes.",
            "Roll out the crust.",
            "Slice the apples.",
            "Toss with sugar.",
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_no_unsectioned_group_when_everything_has_a_section() -> Result<()> {
    let pool = setup_test_db().await?;
    let recipe = load_recipe(&pool, TART).await?;
    assert_eq!(recipe.sections.len(), 2);
    assert!(recipe.sections.iter().all(|s| s.id.is_some()));
    Ok(())
}

#[tokio::test]
async fn test_ingredient_columns() -> Result<()> {
    let pool = setup_test_db().await?;
    let recipe = load_recipe(&pool, APPLE_PIE).await?;
    let filling = &recipe.sections[2];

    let apples = &filling.ingredients[0];
    assert_eq!(apples.quantity, Quantity::Amount(6.0));
    assert_eq!(apples.variant.as_deref(), Some("granny smith"));
    assert_eq!(apples.prep_notes.as_deref(), Some("sliced"));
    assert_eq!(apples.location, "fruit stand");

    let sugar = &filling.ingredients[1];
    assert_eq!(sugar.quantity, Quantity::Amount(0.5));
    assert_eq!(sugar.unit, "cup");
    assert_eq!(sugar.substitutes.len(), 1);
    assert_eq!(sugar.substitutes[0].name, "honey");
    assert_eq!(sugar.substitutes[0].quantity, Quantity::Amount(0.25));

    let cinnamon = &filling.ingredients[2];
    assert_eq!(cinnamon.quantity, Quantity::Text("to taste".into()));
    assert!(cinnamon.is_optional);
    assert_eq!(cinnamon.unit, "");
    Ok(())
}

#[tokio::test]
async fn test_sub_recipe_is_resolved_by_title() -> Result<()> {
    let pool = setup_test_db().await?;
    let recipe = load_recipe(&pool, APPLE_PIE).await?;
    let crust = &recipe.sections[1].ingredients[0];
    assert_eq!(crust.sub_recipe.as_ref().map(|r| r.id), Some(PIE_CRUST));

    let found = find_sub_recipe(&pool, APPLE_PIE, None, "granny smith apples").await?;
    assert!(found.is_none());
    Ok(())
}

#[tokio::test]
async fn test_list_recipes_filter() -> Result<()> {
    let pool = setup_test_db().await?;

    let all = list_recipes(&pool, None).await?;
    let titles: Vec<&str> = all.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Apple Pie", "Flaky Pie Crust", "Plum Tart"]);

    let pies = list_recipes(&pool, Some("PIE")).await?;
    assert_eq!(pies.len(), 2);
    assert!(list_recipes(&pool, Some("soup")).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_persist_steps_writes_display_order() -> Result<()> {
    let pool = setup_test_db().await?;
    let mut recipe = load_recipe(&pool, APPLE_PIE).await?;

    recipe.sections[2].steps.swap(0, 1);
    recipe.sections[2].steps[0].instructions = "  Toss with brown sugar. ".into();
    let updated = persist_steps(&pool, &recipe).await?;
    assert_eq!(updated, 4);

    let reloaded = load_recipe(&pool, APPLE_PIE).await?;
    assert_eq!(
        step_texts(&reloaded),
        vec![
            "Bake at 375 for 50 minutes.",
            "Roll out the crust.",
            "Toss with brown sugar.",
            "Slice the apples.",
        ]
    );
    let numbers: Vec<i64> = reloaded.all_steps().map(|s| s.step_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
    Ok(())
}

#[tokio::test]
async fn test_persist_steps_skips_steps_without_identity() -> Result<()> {
    let pool = setup_test_db().await?;
    let mut recipe = load_recipe(&pool, PIE_CRUST).await?;
    let mut unsaved = recipe.sections[0].steps[0].clone();
    unsaved.id = None;
    unsaved.instructions = "Chill for an hour.".into();
    recipe.sections[0].steps.push(unsaved);

    assert_eq!(persist_steps(&pool, &recipe).await?, 1);
    let reloaded = load_recipe(&pool, PIE_CRUST).await?;
    assert_eq!(step_texts(&reloaded), vec!["Cut butter into flour."]);
    Ok(())
}
