//! Schema version tracking.
//!
//! The version is a zero-padded three-digit token stored in the settings
//! table and compared ordinally, so "003" < "004" < "010". Writing it is
//! the last step of any successful migration: a crash mid-migration leaves
//! the old value in place and the whole migration retries from the top.

use std::fmt;

use crate::error::{Error, Result};
use crate::store::Store;

/// The schema version this build targets.
pub const DEFAULT_VERSION: &str = "004";

const VERSION_KEY: &str = "databaseVersion";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(raw: &str) -> Result<Self> {
        if raw.len() == 3 && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(Error::VersionUnreadable(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The compiled-in target version.
pub fn default_version() -> VersionToken {
    VersionToken(DEFAULT_VERSION.to_string())
}

/// Reads the stored version. `NotInitialized` when the settings table or
/// the version row is absent; `VersionUnreadable` when the value is
/// malformed.
pub fn database_version(store: &dyn Store) -> Result<VersionToken> {
    if !store.list_tables()?.contains("settings") {
        return Err(Error::NotInitialized);
    }
    match store.get_setting(VERSION_KEY)? {
        Some(value) => VersionToken::new(&value),
        None => Err(Error::NotInitialized),
    }
}

pub fn set_database_version(store: &dyn Store, version: &VersionToken) -> Result<()> {
    store.set_setting(VERSION_KEY, version.as_str())
}
