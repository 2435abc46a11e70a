//! # Recipe Error Types Module
//!
//! This module defines the error type shared by the loader, the edit session
//! and the backup layer. Callers match on the variant to decide what to show
//! the user; the binary wraps everything in `anyhow`.

use std::path::PathBuf;

/// Errors raised while loading, editing or saving a recipe
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeError {
    /// No recipe row matches the requested ID
    NotFound(i64),
    /// The storage engine rejected a query or update
    Database(String),
    /// The database file lives in the read-only backup directory
    ReadOnlyBackup(PathBuf),
    /// Creating or pruning a backup copy failed
    Backup(String),
    /// An edit referenced a section, step or ingredient that does not exist
    InvalidEdit(String),
    /// A commit was requested while no inline input is open
    NoActiveEdit,
}

impl std::fmt::Display for RecipeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipeError::NotFound(id) => write!(f, "Recipe not found: {id}"),
            RecipeError::Database(msg) => write!(f, "Database error: {msg}"),
            RecipeError::ReadOnlyBackup(path) => write!(
                f,
                "Read-only backup: {} must be moved out of the backup folder before saving",
                path.display()
            ),
            RecipeError::Backup(msg) => write!(f, "Backup error: {msg}"),
            RecipeError::InvalidEdit(msg) => write!(f, "Invalid edit: {msg}"),
            RecipeError::NoActiveEdit => write!(f, "No inline edit is open"),
        }
    }
}

impl std::error::Error for RecipeError {}

impl From<sqlx::Error> for RecipeError {
    fn from(err: sqlx::Error) -> Self {
        RecipeError::Database(err.to_string())
    }
}

impl From<std::io::Error> for RecipeError {
    fn from(err: std::io::Error) -> Self {
        RecipeError::Backup(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, RecipeError>;
