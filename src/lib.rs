//! # Vellum
//!
//! The data layer of a self-hostable CMS: schema bootstrap, versioned
//! migrations, and fixture population, usable both as a standalone binary
//! and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! vellum = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vellum::config::DataConfig;
//! use vellum::migrate::{self, Context};
//! use vellum::store::SqliteStore;
//!
//! let config = DataConfig::default();
//! let store = SqliteStore::new(config.db_path()).unwrap();
//! let ctx = Context::new(Arc::new(store), config);
//!
//! // Bring the database up to the current version, seeding fixtures as
//! // needed. Safe to call on every startup.
//! migrate::init(&ctx).unwrap();
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the CLI binary. Disable with `default-features = false`.

pub mod config;
pub mod error;
pub mod fixtures;
pub mod migrate;
pub mod schema;
pub mod store;
pub mod types;
