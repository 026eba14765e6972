mod sqlite;

pub use sqlite::SqliteStore;

use std::collections::BTreeSet;

use crate::error::Result;
use crate::fixtures::{ClientFixture, PermissionFixture, PostFixture, RoleFixture, TagFixture, UserFixture};
use crate::schema::{ColumnSpec, TableDescriptor};
use crate::types::{Permission, Role, User};

/// Store defines the database interface: schema introspection, DDL, the
/// entity operations the fixture seeder needs, settings, and full-data
/// export. DDL calls are logged before execution and are fatal on error;
/// no rollback is attempted on a failed statement.
pub trait Store: Send + Sync {
    // Introspection
    fn list_tables(&self) -> Result<BTreeSet<String>>;
    fn list_columns(&self, table: &str) -> Result<BTreeSet<String>>;
    fn list_indexes(&self, table: &str) -> Result<BTreeSet<String>>;

    // DDL
    fn create_table(&self, desc: &TableDescriptor) -> Result<()>;
    fn delete_table(&self, name: &str) -> Result<()>;
    fn add_column(&self, table: &str, col: &ColumnSpec) -> Result<()>;
    fn add_unique(&self, table: &str, column: &str) -> Result<()>;
    fn drop_unique(&self, table: &str, column: &str) -> Result<()>;

    // Settings (the version marker lives here too)
    fn get_setting(&self, key: &str) -> Result<Option<String>>;
    fn set_setting(&self, key: &str, value: &str) -> Result<()>;
    /// Inserts the setting only when the key is absent. Returns true when a
    /// row was inserted; existing values are never overwritten.
    fn ensure_setting(&self, key: &str, value: &str) -> Result<bool>;

    // Fixture inserts. Each returns the new row id, or AlreadyExists when
    // the row's natural key is already present.
    fn insert_post(&self, post: &PostFixture) -> Result<i64>;
    fn insert_tag(&self, tag: &TagFixture) -> Result<i64>;
    fn insert_role(&self, role: &RoleFixture) -> Result<i64>;
    fn insert_client(&self, client: &ClientFixture, secret: &str) -> Result<i64>;
    fn insert_permission(&self, permission: &PermissionFixture) -> Result<i64>;
    fn insert_user(&self, user: &UserFixture, password: &str, role_id: i64) -> Result<i64>;

    // Lookups and relations
    fn find_role_by_name(&self, name: &str) -> Result<Option<Role>>;
    fn find_permission(&self, object_type: &str, action_type: &str) -> Result<Option<Permission>>;
    fn find_post_id_by_slug(&self, slug: &str) -> Result<Option<i64>>;
    fn find_tag_id_by_slug(&self, slug: &str) -> Result<Option<i64>>;
    /// First user holding the named role, if any.
    fn find_user_with_role(&self, role_name: &str) -> Result<Option<User>>;
    fn attach_permission_to_role(&self, role_id: i64, permission_id: i64) -> Result<()>;
    fn attach_tag_to_post(&self, post_id: i64, tag_id: i64) -> Result<()>;
    fn set_user_role(&self, user_id: i64, role_id: i64) -> Result<()>;

    /// Point-in-time snapshot of every live table: top-level keys are table
    /// names, values are arrays of row objects.
    fn export(&self) -> Result<serde_json::Value>;
}
