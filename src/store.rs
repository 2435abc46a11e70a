//! Recipe store: the connection pool plus the save path (guard, backup,
//! persist, re-read).

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::backup::BackupManager;
use crate::config::AppConfig;
use crate::db;
use crate::errors::{RecipeError, Result};
use crate::recipe_model::{Recipe, RecipeLink};

const POOL_SIZE: u32 = 4;
const BUSY_TIMEOUT_MS: u64 = 5_000;

/// Handle on one recipe database
#[derive(Debug, Clone)]
pub struct RecipeStore {
    pool: SqlitePool,
    db_path: Option<PathBuf>,
    backups: Option<BackupManager>,
}

impl RecipeStore {
    /// Open (creating if needed) the database named by `config` and make sure
    /// the schema exists.
    ///
    /// The rollback journal is used instead of WAL so a backup is a single
    /// file copy. A database inside the backup folder is opened read-only:
    /// it must already exist and its schema is left alone.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let path = config.database_path.clone();
        let backups = BackupManager::new(config.backup.clone());
        let read_only = backups.is_in_backup_dir(&path);
        info!(path = %path.display(), read_only, "Opening recipe database");
        if read_only && !path.is_file() {
            return Err(RecipeError::Database(format!(
                "Database not found: {}",
                path.display()
            )));
        }

        let mut options = SqliteConnectOptions::from_str(&config.database_url())?
            .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));
        options = if read_only {
            options.read_only(true)
        } else {
            options
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Delete)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(POOL_SIZE)
            .connect_with(options)
            .await?;

        if !read_only {
            db::init_database_schema(&pool).await?;
        }

        Ok(Self {
            pool,
            db_path: Some(path),
            backups: Some(backups),
        })
    }

    /// Wrap an existing pool. No file path is known, so saves take no
    /// backups and skip the read-only check.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self {
            pool,
            db_path: None,
            backups: None,
        }
    }

    /// Attach a file path and backup manager to a pool-backed store
    pub fn with_backups(mut self, db_path: impl Into<PathBuf>, backups: BackupManager) -> Self {
        self.db_path = Some(db_path.into());
        self.backups = Some(backups);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn list_recipes(&self, filter: Option<&str>) -> Result<Vec<RecipeLink>> {
        db::list_recipes(&self.pool, filter).await
    }

    pub async fn load_recipe(&self, recipe_id: i64) -> Result<Recipe> {
        db::load_recipe(&self.pool, recipe_id).await
    }

    /// Save the steps of `recipe` and return the freshly loaded recipe.
    ///
    /// A database opened from the backup folder is refused before anything
    /// is written. When backups are enabled the file is copied first.
    pub async fn save_recipe(&self, recipe: &Recipe) -> Result<Recipe> {
        if let (Some(path), Some(backups)) = (&self.db_path, &self.backups) {
            backups.ensure_writable(path)?;
            if let Some(copy) = backups.create_backup(path)? {
                debug!(backup = %copy.display(), "pre-save backup taken");
            }
        }

        db::persist_steps(&self.pool, recipe).await?;
        self.load_recipe(recipe.id).await
    }
}
