//! # Favorite Eats
//!
//! Loads recipes from a SQLite database into an in-memory tree, renders them
//! (ingredient list, shopping list grouped by storage location, measuring
//! tools, numbered instructions) and lets a session edit the tree inline and
//! save it back with a backup taken first.

pub mod aggregator;
pub mod backup;
pub mod config;
pub mod db;
pub mod editor;
pub mod errors;
pub mod measures;
pub mod quantity_format;
pub mod recipe_model;
pub mod renderer;
pub mod sorting;
pub mod store;

pub use editor::EditSession;
pub use errors::{RecipeError, Result};
pub use recipe_model::Recipe;
pub use renderer::{render_recipe, RecipeView};
pub use store::RecipeStore;
