use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Directory holding the database file and exported backups.
    pub data_dir: PathBuf,
}

impl DataConfig {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("vellum.db")
    }

    /// Pre-migration snapshots are written here as timestamped JSON files.
    #[must_use]
    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join("data")
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}
