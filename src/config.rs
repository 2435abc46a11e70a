//! # Configuration Module
//!
//! Defines the application configuration: where the recipe database lives
//! and how backups are taken before each save. Values come from defaults,
//! then the environment (a `.env` file is loaded by the binary), then
//! command line flags.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

// Constants for the default configuration
pub const DEFAULT_DATABASE_PATH: &str = "favorite_eats.db";
pub const DEFAULT_BACKUP_DIR_NAME: &str = "Backup";
pub const MAX_BACKUPS: usize = 8;

pub const ENV_DATABASE_PATH: &str = "FAVORITE_EATS_DB";
pub const ENV_BACKUPS_ENABLED: &str = "FAVORITE_EATS_BACKUPS";
pub const ENV_MAX_BACKUPS: &str = "FAVORITE_EATS_MAX_BACKUPS";

/// Backup configuration for saves
#[derive(Debug, Clone, PartialEq)]
pub struct BackupConfig {
    /// Whether a timestamped copy is taken before each save
    pub enabled: bool,
    /// Number of backup files kept after pruning
    pub retention: usize,
    /// Directory name, next to the database file, holding backups.
    /// Databases opened from inside it are read-only.
    pub dir_name: String,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention: MAX_BACKUPS,
            dir_name: DEFAULT_BACKUP_DIR_NAME.to_string(),
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Path to the SQLite recipe database
    pub database_path: PathBuf,
    pub backup: BackupConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            backup: BackupConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build a configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup (the environment in
    /// production, a map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path.trim());
        }

        if let Some(raw) = lookup(ENV_BACKUPS_ENABLED) {
            config.backup.enabled = parse_flag(&raw)
                .with_context(|| format!("{ENV_BACKUPS_ENABLED} must be a boolean, got {raw:?}"))?;
        }

        if let Some(raw) = lookup(ENV_MAX_BACKUPS) {
            config.backup.retention = raw
                .trim()
                .parse()
                .with_context(|| format!("{ENV_MAX_BACKUPS} must be a number, got {raw:?}"))?;
        }

        Ok(config)
    }

    /// SQLite connection URL for the configured database
    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.database_path.display())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
