//! Pre-migration data export.
//!
//! The snapshot is the only recovery mechanism for a failed migration, so
//! it is written and flushed before any DDL runs. A write failure aborts
//! the migration.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;

use crate::config::DataConfig;
use crate::error::{Error, Result};
use crate::store::Store;

/// Writes a timestamped JSON snapshot of all domain data and returns its
/// path.
pub fn backup_database(store: &dyn Store, config: &DataConfig) -> Result<PathBuf> {
    let snapshot = store.export()?;

    let dir = config.backup_dir();
    fs::create_dir_all(&dir).map_err(|source| Error::Backup {
        path: dir.display().to_string(),
        source,
    })?;

    let file = dir.join(format!("exported-{}.json", Utc::now().timestamp_millis()));
    let body = serde_json::to_vec(&snapshot)?;
    fs::write(&file, body).map_err(|source| Error::Backup {
        path: file.display().to_string(),
        source,
    })?;

    tracing::info!("Database backup written to: {}", file.display());
    Ok(file)
}
