//! Diffs the live schema against the target descriptors and produces an
//! ordered list of DDL operations.
//!
//! The order is fixed: table deletes, table adds, column adds, then unique
//! constraint changes. Columns are never dropped; the policy is forward-only
//! and additive.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::Result;
use crate::schema::{ColumnSpec, TableDescriptor, unique_index_name};
use crate::store::Store;

#[derive(Debug, Default)]
pub struct LiveTable {
    pub columns: BTreeSet<String>,
    pub indexes: BTreeSet<String>,
}

/// The introspected state of the database at planning time.
#[derive(Debug, Default)]
pub struct LiveSchema {
    pub tables: BTreeMap<String, LiveTable>,
}

impl LiveSchema {
    pub fn introspect(store: &dyn Store) -> Result<Self> {
        let mut tables = BTreeMap::new();
        for table in store.list_tables()? {
            let columns = store.list_columns(&table)?;
            let indexes = store.list_indexes(&table)?;
            tables.insert(table, LiveTable { columns, indexes });
        }
        Ok(Self { tables })
    }
}

#[derive(Debug, Clone)]
pub enum MigrationOp {
    DeleteTable { table: String },
    CreateTable { descriptor: TableDescriptor },
    AddColumn { table: &'static str, column: ColumnSpec },
    AddUnique { table: &'static str, column: &'static str },
    DropUnique { table: &'static str, column: String },
}

impl fmt::Display for MigrationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationOp::DeleteTable { table } => write!(f, "delete table {table}"),
            MigrationOp::CreateTable { descriptor } => write!(f, "create table {}", descriptor.name),
            MigrationOp::AddColumn { table, column } => {
                write!(f, "add column {table}.{}", column.name)
            }
            MigrationOp::AddUnique { table, column } => write!(f, "add unique {table}.{column}"),
            MigrationOp::DropUnique { table, column } => write!(f, "drop unique {table}.{column}"),
        }
    }
}

/// Produces the ordered operation list taking the live schema to the
/// target. The orchestrator executes it strictly in sequence, so each
/// operation sees the effect of the previous one.
pub fn plan(live: &LiveSchema, target: &[TableDescriptor]) -> Vec<MigrationOp> {
    let target_names: BTreeSet<&str> = target.iter().map(|t| t.name).collect();
    let mut ops = Vec::new();

    // Live tables with no descriptor are dropped first.
    for table in live.tables.keys() {
        if !target_names.contains(table.as_str()) {
            ops.push(MigrationOp::DeleteTable {
                table: table.clone(),
            });
        }
    }

    // Missing tables are created whole; their unique indexes come along
    // with the creation, so no separate constraint ops are needed.
    for descriptor in target {
        if !live.tables.contains_key(descriptor.name) {
            ops.push(MigrationOp::CreateTable {
                descriptor: descriptor.clone(),
            });
        }
    }

    // Columns the descriptor has but the live table lacks. Removal is
    // never planned.
    for descriptor in target {
        if let Some(live_table) = live.tables.get(descriptor.name) {
            for column in &descriptor.columns {
                if !live_table.columns.contains(column.name) {
                    ops.push(MigrationOp::AddColumn {
                        table: descriptor.name,
                        column: column.clone(),
                    });
                }
            }
        }
    }

    // Unique constraint changes on pre-existing tables, after column adds
    // so a constraint can land on a column added in the same plan.
    for descriptor in target {
        if let Some(live_table) = live.tables.get(descriptor.name) {
            for column in &descriptor.columns {
                let index = unique_index_name(descriptor.name, column.name);
                let exists = live_table.indexes.contains(&index);
                if column.unique && !exists {
                    ops.push(MigrationOp::AddUnique {
                        table: descriptor.name,
                        column: column.name,
                    });
                } else if !column.unique && exists {
                    ops.push(MigrationOp::DropUnique {
                        table: descriptor.name,
                        column: column.name.to_string(),
                    });
                }
            }
        }
    }

    ops
}
