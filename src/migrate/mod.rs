//! Migration orchestration.
//!
//! `init` is the single entry point, called once at startup before the
//! application serves traffic. It detects the database state and either
//! does nothing, bootstraps a fresh database, or upgrades an existing one.
//! The whole run is strictly sequential; there is no cancellation and no
//! rollback of applied DDL. Recovery from a failed upgrade is the
//! pre-migration backup.

pub mod backup;
pub mod planner;
pub mod versioning;

use std::sync::Arc;

use crate::config::DataConfig;
use crate::error::{Error, Result};
use crate::fixtures;
use crate::schema;
use crate::store::Store;

use planner::{LiveSchema, MigrationOp};
use versioning::VersionToken;

/// Default configuration values filled in at the end of every migration.
/// Population is additive: keys already present are never overwritten.
const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("title", "Vellum"),
    ("description", "Just a publishing platform."),
    ("postsPerPage", "6"),
    ("activeTheme", "paperweight"),
    ("activePlugins", "[]"),
    ("installedApps", "[]"),
];

/// Explicit context passed to every component: store handle plus
/// configuration. No ambient singletons.
#[derive(Clone)]
pub struct Context {
    pub store: Arc<dyn Store>,
    pub config: DataConfig,
}

impl Context {
    pub fn new(store: Arc<dyn Store>, config: DataConfig) -> Self {
        Self { store, config }
    }
}

/// Brings the database up to the current version.
///
/// There are four possibilities:
/// 1. The database exists and is up to date: nothing happens.
/// 2. The database exists but is out of date: it is upgraded.
/// 3. The database version is ahead of this build, or unreadable: fatal.
/// 4. The database has not yet been created: fresh install.
pub fn init(ctx: &Context) -> Result<()> {
    let store = ctx.store.as_ref();
    let target = versioning::default_version();

    match versioning::database_version(store) {
        Ok(database) if database == target => {
            tracing::info!("Up to date at version {}", database);
            Ok(())
        }
        Ok(database) if database < target => {
            tracing::info!(
                "Database upgrade required from version {} to {}",
                database,
                target
            );
            migrate_up(ctx, &database, &target)?;
            versioning::set_database_version(store, &target)
        }
        Ok(database) => Err(Error::VersionAhead {
            database: database.to_string(),
            target: target.to_string(),
        }),
        Err(Error::NotInitialized) => {
            tracing::info!("Database initialisation required for version {}", target);
            migrate_up_fresh(ctx)
        }
        Err(e) => Err(e),
    }
}

/// Fresh-install path: create every table from the descriptor, seed the
/// full fixture set, fill default settings, and stamp the target version.
/// There is no prior data, so no backup is taken.
pub fn migrate_up_fresh(ctx: &Context) -> Result<()> {
    let store = ctx.store.as_ref();

    tracing::info!("Creating tables...");
    for descriptor in schema::tables() {
        store.create_table(&descriptor)?;
    }

    tracing::info!("Populating fixtures");
    fixtures::populate(store)?;

    tracing::info!("Populating default settings");
    populate_default_settings(store)?;

    versioning::set_database_version(store, &versioning::default_version())?;
    tracing::info!("Complete");
    Ok(())
}

/// Upgrade path from a specific version to the target. The backup is
/// written before anything mutates; the version marker is written by the
/// caller only after this returns successfully.
pub fn migrate_up(ctx: &Context, from: &VersionToken, to: &VersionToken) -> Result<()> {
    let store = ctx.store.as_ref();

    tracing::info!("Creating database backup");
    backup::backup_database(store, &ctx.config)?;

    let live = LiveSchema::introspect(store)?;
    let ops = planner::plan(&live, &schema::tables());

    if !ops.is_empty() {
        tracing::info!("Running migrations");
        execute(store, &ops)?;
    }

    tracing::info!("Updating fixtures");
    fixtures::update(store, from, to)?;

    tracing::info!("Populating default settings");
    populate_default_settings(store)?;

    tracing::info!("Complete");
    Ok(())
}

/// Runs planned DDL strictly in order, stopping at the first failure.
/// Already-applied operations are not rolled back.
fn execute(store: &dyn Store, ops: &[MigrationOp]) -> Result<()> {
    for op in ops {
        tracing::debug!("Executing step: {}", op);
        match op {
            MigrationOp::DeleteTable { table } => store.delete_table(table)?,
            MigrationOp::CreateTable { descriptor } => store.create_table(descriptor)?,
            MigrationOp::AddColumn { table, column } => store.add_column(table, column)?,
            MigrationOp::AddUnique { table, column } => store.add_unique(table, column)?,
            MigrationOp::DropUnique { table, column } => store.drop_unique(table, column)?,
        }
    }
    Ok(())
}

/// Deletes all descriptor tables in reverse creation order, so association
/// tables go before the tables they join.
pub fn reset(ctx: &Context) -> Result<()> {
    let store = ctx.store.as_ref();
    let live = store.list_tables()?;
    for descriptor in schema::tables().iter().rev() {
        if live.contains(descriptor.name) {
            store.delete_table(descriptor.name)?;
        }
    }
    Ok(())
}

fn populate_default_settings(store: &dyn Store) -> Result<()> {
    for &(key, value) in DEFAULT_SETTINGS {
        store.ensure_setting(key, value)?;
    }
    Ok(())
}
