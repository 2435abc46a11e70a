//! # Backup Module
//!
//! Timestamped copies of the database file taken before a save, retention
//! pruning, and the guard that keeps files inside the backup folder
//! read-only.
//!
//! Backups live in `<database dir>/<dir_name>/<stem>_<YYYYMMDD-HHMMSS>.<ext>`.
//! A second backup in the same second gets a `-01`, `-02`, ... suffix.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::config::BackupConfig;
use crate::errors::{RecipeError, Result};

/// Maximum same-second suffixes tried before giving up
const MAX_SAME_SECOND_BACKUPS: u32 = 100;

/// Takes and prunes backups according to a [`BackupConfig`]
#[derive(Debug, Clone)]
pub struct BackupManager {
    config: BackupConfig,
}

impl BackupManager {
    pub fn new(config: BackupConfig) -> Self {
        Self { config }
    }

    /// True when any component of `path` is the backup directory name
    /// (case-insensitive)
    pub fn is_in_backup_dir(&self, path: &Path) -> bool {
        path.components().any(|c| match c {
            Component::Normal(part) => part
                .to_str()
                .is_some_and(|p| p.eq_ignore_ascii_case(&self.config.dir_name)),
            _ => false,
        })
    }

    /// Refuse writes to a database that lives inside the backup directory
    pub fn ensure_writable(&self, db_path: &Path) -> Result<()> {
        if self.is_in_backup_dir(db_path) {
            warn!(path = %db_path.display(), "refusing to write into backup folder");
            return Err(RecipeError::ReadOnlyBackup(db_path.to_path_buf()));
        }
        Ok(())
    }

    /// Backup directory that sits next to `db_path`
    pub fn backup_dir_for(&self, db_path: &Path) -> PathBuf {
        db_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&self.config.dir_name)
    }

    /// Copy the current database file into the backup directory, then prune.
    ///
    /// Returns the backup path, or `None` when backups are disabled or the
    /// database file does not exist yet.
    pub fn create_backup(&self, db_path: &Path) -> Result<Option<PathBuf>> {
        self.create_backup_at(db_path, Local::now())
    }

    /// [`create_backup`](Self::create_backup) with an explicit timestamp
    pub fn create_backup_at(&self, db_path: &Path, now: DateTime<Local>) -> Result<Option<PathBuf>> {
        self.ensure_writable(db_path)?;
        if !self.config.enabled {
            debug!("backups disabled");
            return Ok(None);
        }
        if !db_path.is_file() {
            debug!(path = %db_path.display(), "no database file to back up yet");
            return Ok(None);
        }

        let dir = self.backup_dir_for(db_path);
        fs::create_dir_all(&dir)?;

        let stem = db_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("database");
        let ext = db_path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("db");

        let target = reserve_backup_path(&dir, stem, ext, &timestamp(now))?;
        fs::copy(db_path, &target)?;
        info!(backup = %target.display(), "Database backed up");

        self.prune(&dir)?;
        Ok(Some(target))
    }

    /// Delete the oldest files in `dir` beyond the retention count.
    /// Returns how many were removed.
    pub fn prune(&self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Ok(0);
        }

        let mut files: Vec<(PathBuf, std::time::SystemTime)> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let meta = entry.metadata().ok()?;
                if !meta.is_file() {
                    return None;
                }
                Some((entry.path(), meta.modified().ok()?))
            })
            .collect();

        // newest first; names break mtime ties since stamps sort lexically
        files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

        let mut removed = 0;
        for (path, _) in files.into_iter().skip(self.config.retention) {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "failed to prune backup"),
            }
        }
        if removed > 0 {
            info!(removed, "Pruned old backups");
        }
        Ok(removed)
    }
}

/// Local timestamp in `YYYYMMDD-HHMMSS` form
pub fn timestamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d-%H%M%S").to_string()
}

/// Atomically reserve a fresh backup file name
fn reserve_backup_path(dir: &Path, stem: &str, ext: &str, stamp: &str) -> Result<PathBuf> {
    for n in 0..MAX_SAME_SECOND_BACKUPS {
        let suffix = if n == 0 {
            String::new()
        } else {
            format!("-{n:02}")
        };
        let candidate = dir.join(format!("{stem}_{stamp}{suffix}.{ext}"));
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(RecipeError::Backup(
        "too many backups in the same second".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn manager(retention: usize) -> BackupManager {
        BackupManager::new(BackupConfig {
            retention,
            ..BackupConfig::default()
        })
    }

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap()
    }

    #[test]
    fn test_is_in_backup_dir() {
        let m = manager(8);
        assert!(m.is_in_backup_dir(Path::new("/data/Backup/food.db")));
        assert!(m.is_in_backup_dir(Path::new("/data/backup/old/food.db")));
        assert!(!m.is_in_backup_dir(Path::new("/data/Backups/food.db")));
        assert!(!m.is_in_backup_dir(Path::new("/data/food.db")));
    }

    #[test]
    fn test_ensure_writable_refuses_backup_copies() {
        let err = manager(8)
            .ensure_writable(Path::new("/data/Backup/food.db"))
            .unwrap_err();
        assert!(matches!(err, RecipeError::ReadOnlyBackup(_)));
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(timestamp(fixed_time()), "20240309-070502");
    }

    #[test]
    fn test_create_backup_names_and_suffixes() -> Result<()> {
        let tmp = TempDir::new()?;
        let db = tmp.path().join("favorite_eats.db");
        fs::write(&db, b"sqlite bytes")?;

        let m = manager(8);
        let first = m.create_backup_at(&db, fixed_time())?.unwrap();
        let second = m.create_backup_at(&db, fixed_time())?.unwrap();

        assert_eq!(
            first.file_name().unwrap().to_str().unwrap(),
            "favorite_eats_20240309-070502.db"
        );
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "favorite_eats_20240309-070502-01.db"
        );
        assert_eq!(fs::read(&first)?, b"sqlite bytes");
        Ok(())
    }

    #[test]
    fn test_create_backup_skips_missing_file_and_disabled() -> Result<()> {
        let tmp = TempDir::new()?;
        let db = tmp.path().join("new.db");
        assert_eq!(manager(8).create_backup(&db)?, None);

        fs::write(&db, b"x")?;
        let disabled = BackupManager::new(BackupConfig {
            enabled: false,
            ..BackupConfig::default()
        });
        assert_eq!(disabled.create_backup(&db)?, None);
        assert!(!tmp.path().join("Backup").exists());
        Ok(())
    }

    #[test]
    fn test_prune_keeps_retention_count() -> Result<()> {
        let tmp = TempDir::new()?;
        let db = tmp.path().join("food.db");
        fs::write(&db, b"x")?;

        let m = manager(2);
        for _ in 0..4 {
            m.create_backup_at(&db, fixed_time())?;
        }
        let remaining = fs::read_dir(m.backup_dir_for(&db))?.count();
        assert_eq!(remaining, 2);
        Ok(())
    }
}
