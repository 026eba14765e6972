use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    #[error("settings table does not exist")]
    NotInitialized,

    #[error("database version is not recognised: {0}")]
    VersionUnreadable(String),

    #[error("database version {database} is newer than this build supports ({target})")]
    VersionAhead { database: String, target: String },

    #[error("failed to write backup to {path}: {source}")]
    Backup {
        path: String,
        source: std::io::Error,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Fatal conditions terminate the process: a database ahead of the
    /// running code has no downgrade path, and an unparseable version
    /// marker cannot be migrated from.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::VersionAhead { .. } | Error::VersionUnreadable(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
