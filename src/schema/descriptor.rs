use super::unique_index_name;

/// Column storage class, mapped onto SQLite's affinities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColType {
    /// Auto-incrementing integer primary key.
    Increments,
    Integer,
    Bool,
    Text,
    DateTime,
}

impl ColType {
    fn sql_type(self) -> &'static str {
        match self {
            ColType::Increments => "INTEGER PRIMARY KEY AUTOINCREMENT",
            ColType::Integer | ColType::Bool => "INTEGER",
            ColType::Text | ColType::DateTime => "TEXT",
        }
    }

    /// Constant fallback used when adding a NOT NULL column to a table
    /// that already has rows. SQLite refuses ALTER TABLE ADD COLUMN with
    /// a NOT NULL constraint and no default.
    fn zero_default(self) -> &'static str {
        match self {
            ColType::Increments => unreachable!("primary keys are never added via ALTER"),
            ColType::Integer | ColType::Bool => "0",
            ColType::Text | ColType::DateTime => "''",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub col_type: ColType,
    pub nullable: bool,
    pub unique: bool,
    pub default: Option<&'static str>,
}

impl ColumnSpec {
    pub const fn new(name: &'static str, col_type: ColType) -> Self {
        Self {
            name,
            col_type,
            nullable: false,
            unique: false,
            default: None,
        }
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub const fn default_to(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    fn definition(&self) -> String {
        let mut def = format!("{} {}", self.name, self.col_type.sql_type());
        if self.col_type == ColType::Increments {
            return def;
        }
        if !self.nullable {
            def.push_str(" NOT NULL");
        }
        if let Some(default) = self.default {
            def.push_str(" DEFAULT ");
            def.push_str(default);
        }
        def
    }
}

#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub name: &'static str,
    pub columns: Vec<ColumnSpec>,
}

impl TableDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn create_table_sql(&self) -> String {
        let defs: Vec<String> = self.columns.iter().map(ColumnSpec::definition).collect();
        format!("CREATE TABLE {} (\n    {}\n)", self.name, defs.join(",\n    "))
    }

    /// Unique constraints live in named indexes rather than inline column
    /// constraints, so they can be introspected and dropped by name later.
    pub fn unique_index_sqls(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.unique)
            .map(|c| add_unique_sql(self.name, c.name))
            .collect()
    }
}

pub fn add_column_sql(table: &str, col: &ColumnSpec) -> String {
    let mut def = format!("ALTER TABLE {} ADD COLUMN {} {}", table, col.name, col.col_type.sql_type());
    if !col.nullable {
        def.push_str(" NOT NULL DEFAULT ");
        def.push_str(col.default.unwrap_or_else(|| col.col_type.zero_default()));
    } else if let Some(default) = col.default {
        def.push_str(" DEFAULT ");
        def.push_str(default);
    }
    def
}

pub fn add_unique_sql(table: &str, column: &str) -> String {
    format!(
        "CREATE UNIQUE INDEX {} ON {} ({})",
        unique_index_name(table, column),
        table,
        column
    )
}

pub fn drop_unique_sql(table: &str, column: &str) -> String {
    format!("DROP INDEX {}", unique_index_name(table, column))
}
