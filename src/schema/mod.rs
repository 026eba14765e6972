mod descriptor;
mod tables;

pub use descriptor::{
    ColType, ColumnSpec, TableDescriptor, add_column_sql, add_unique_sql, drop_unique_sql,
};
pub use tables::tables;

/// Name of the unique index backing a column's `unique` flag. The planner
/// matches live index names against this to decide add/drop operations.
pub fn unique_index_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_unique")
}
