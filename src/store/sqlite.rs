use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use super::Store;
use crate::error::{Error, Result};
use crate::fixtures::{ClientFixture, PermissionFixture, PostFixture, RoleFixture, TagFixture, UserFixture};
use crate::schema::{ColumnSpec, TableDescriptor, add_column_sql, add_unique_sql, drop_unique_sql};
use crate::types::{Permission, Role, User};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, used by tests.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Maps a duplicate-key failure to AlreadyExists so the seeder can treat
/// re-inserted fixtures as already applied.
fn map_insert(result: rusqlite::Result<usize>) -> Result<usize> {
    match result {
        Ok(rows) => Ok(rows),
        Err(rusqlite::Error::SqliteFailure(err, _))
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Err(Error::AlreadyExists)
        }
        Err(e) => Err(Error::from(e)),
    }
}

fn value_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(i) => serde_json::Value::from(i),
        ValueRef::Real(f) => serde_json::Value::from(f),
        ValueRef::Text(t) => serde_json::Value::from(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => serde_json::Value::from(String::from_utf8_lossy(b).into_owned()),
    }
}

impl Store for SqliteStore {
    // Introspection

    fn list_tables(&self) -> Result<BTreeSet<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect::<std::result::Result<BTreeSet<_>, _>>()
            .map_err(Error::from)
    }

    fn list_columns(&self, table: &str) -> Result<BTreeSet<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
        rows.collect::<std::result::Result<BTreeSet<_>, _>>()
            .map_err(Error::from)
    }

    fn list_indexes(&self, table: &str) -> Result<BTreeSet<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!("PRAGMA index_list({table})"))?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
        rows.collect::<std::result::Result<BTreeSet<_>, _>>()
            .map_err(Error::from)
    }

    // DDL

    fn create_table(&self, desc: &TableDescriptor) -> Result<()> {
        tracing::info!("Creating table: {}", desc.name);
        let conn = self.conn();
        conn.execute(&desc.create_table_sql(), [])?;
        for sql in desc.unique_index_sqls() {
            conn.execute(&sql, [])?;
        }
        Ok(())
    }

    fn delete_table(&self, name: &str) -> Result<()> {
        tracing::info!("Deleting table: {}", name);
        self.conn().execute(&format!("DROP TABLE {name}"), [])?;
        Ok(())
    }

    fn add_column(&self, table: &str, col: &ColumnSpec) -> Result<()> {
        tracing::info!("Adding column: {}.{}", table, col.name);
        self.conn().execute(&add_column_sql(table, col), [])?;
        Ok(())
    }

    fn add_unique(&self, table: &str, column: &str) -> Result<()> {
        tracing::info!("Adding unique on: {}.{}", table, column);
        self.conn().execute(&add_unique_sql(table, column), [])?;
        Ok(())
    }

    fn drop_unique(&self, table: &str, column: &str) -> Result<()> {
        tracing::info!("Dropping unique on: {}.{}", table, column);
        self.conn().execute(&drop_unique_sql(table, column), [])?;
        Ok(())
    }

    // Settings

    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let now = format_datetime(&Utc::now());
        self.conn().execute(
            "INSERT INTO settings (uuid, key, value, type, created_at, created_by)
             VALUES (?1, ?2, ?3, 'core', ?4, 1)
             ON CONFLICT(key) DO UPDATE SET value = ?3, updated_at = ?4, updated_by = 1",
            params![Uuid::new_v4().to_string(), key, value, now],
        )?;
        Ok(())
    }

    fn ensure_setting(&self, key: &str, value: &str) -> Result<bool> {
        let now = format_datetime(&Utc::now());
        let rows = self.conn().execute(
            "INSERT INTO settings (uuid, key, value, type, created_at, created_by)
             VALUES (?1, ?2, ?3, 'core', ?4, 1)
             ON CONFLICT(key) DO NOTHING",
            params![Uuid::new_v4().to_string(), key, value, now],
        )?;
        Ok(rows > 0)
    }

    // Fixture inserts

    fn insert_post(&self, post: &PostFixture) -> Result<i64> {
        let now = format_datetime(&Utc::now());
        let conn = self.conn();
        map_insert(conn.execute(
            "INSERT INTO posts (uuid, title, slug, markdown, html, featured, page, status, language,
                                author_id, created_at, created_by, published_at, published_by)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, 0, ?6, 'en_US', 1, ?7, 1, ?7, 1)",
            params![
                Uuid::new_v4().to_string(),
                post.title,
                post.slug,
                post.markdown,
                post.html,
                post.status,
                now,
            ],
        ))?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_tag(&self, tag: &TagFixture) -> Result<i64> {
        let now = format_datetime(&Utc::now());
        let conn = self.conn();
        map_insert(conn.execute(
            "INSERT INTO tags (uuid, name, slug, description, created_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            params![
                Uuid::new_v4().to_string(),
                tag.name,
                tag.slug,
                tag.description,
                now,
            ],
        ))?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_role(&self, role: &RoleFixture) -> Result<i64> {
        let now = format_datetime(&Utc::now());
        let conn = self.conn();
        map_insert(conn.execute(
            "INSERT INTO roles (uuid, name, description, created_at, created_by)
             VALUES (?1, ?2, ?3, ?4, 1)",
            params![
                Uuid::new_v4().to_string(),
                role.name,
                role.description,
                now,
            ],
        ))?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_client(&self, client: &ClientFixture, secret: &str) -> Result<i64> {
        let now = format_datetime(&Utc::now());
        let conn = self.conn();
        map_insert(conn.execute(
            "INSERT INTO clients (uuid, name, slug, secret, created_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            params![
                Uuid::new_v4().to_string(),
                client.name,
                client.slug,
                secret,
                now,
            ],
        ))?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_permission(&self, permission: &PermissionFixture) -> Result<i64> {
        let conn = self.conn();
        // Permissions carry no unique index; the (object_type, action_type)
        // pair is the logical key, enforced here.
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM permissions WHERE object_type = ?1 AND action_type = ?2",
                params![permission.object_type, permission.action_type],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Err(Error::AlreadyExists);
        }

        let now = format_datetime(&Utc::now());
        conn.execute(
            "INSERT INTO permissions (uuid, name, object_type, action_type, created_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, 1)",
            params![
                Uuid::new_v4().to_string(),
                permission.name,
                permission.object_type,
                permission.action_type,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_user(&self, user: &UserFixture, password: &str, role_id: i64) -> Result<i64> {
        let now = format_datetime(&Utc::now());
        let conn = self.conn();
        map_insert(conn.execute(
            "INSERT INTO users (uuid, name, slug, password, email, status, language, created_at, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, 'active', 'en_US', ?6, 1)",
            params![
                Uuid::new_v4().to_string(),
                user.name,
                user.slug,
                password,
                user.email,
                now,
            ],
        ))?;
        let user_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO roles_users (role_id, user_id) VALUES (?1, ?2)",
            params![role_id, user_id],
        )?;
        Ok(user_id)
    }

    // Lookups and relations

    fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, uuid, name, description, created_at, created_by FROM roles WHERE name = ?1",
            params![name],
            |row| {
                Ok(Role {
                    id: row.get(0)?,
                    uuid: row.get(1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    created_by: row.get(5)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn find_permission(&self, object_type: &str, action_type: &str) -> Result<Option<Permission>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, uuid, name, object_type, action_type, object_id, created_at, created_by
             FROM permissions WHERE object_type = ?1 AND action_type = ?2",
            params![object_type, action_type],
            |row| {
                Ok(Permission {
                    id: row.get(0)?,
                    uuid: row.get(1)?,
                    name: row.get(2)?,
                    object_type: row.get(3)?,
                    action_type: row.get(4)?,
                    object_id: row.get(5)?,
                    created_at: parse_datetime(&row.get::<_, String>(6)?),
                    created_by: row.get(7)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn find_post_id_by_slug(&self, slug: &str) -> Result<Option<i64>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id FROM posts WHERE slug = ?1",
            params![slug],
            |row| row.get(0),
        )
        .optional()
        .map_err(Error::from)
    }

    fn find_tag_id_by_slug(&self, slug: &str) -> Result<Option<i64>> {
        let conn = self.conn();
        conn.query_row("SELECT id FROM tags WHERE slug = ?1", params![slug], |row| {
            row.get(0)
        })
        .optional()
        .map_err(Error::from)
    }

    fn find_user_with_role(&self, role_name: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT u.id, u.uuid, u.name, u.slug, u.password, u.email, u.status, u.language,
                    u.last_login, u.created_at, u.created_by
             FROM users u
             JOIN roles_users ru ON ru.user_id = u.id
             JOIN roles r ON r.id = ru.role_id
             WHERE r.name = ?1
             ORDER BY u.id
             LIMIT 1",
            params![role_name],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    uuid: row.get(1)?,
                    name: row.get(2)?,
                    slug: row.get(3)?,
                    password: row.get(4)?,
                    email: row.get(5)?,
                    status: row.get(6)?,
                    language: row.get(7)?,
                    last_login: row.get::<_, Option<String>>(8)?.map(|s| parse_datetime(&s)),
                    created_at: parse_datetime(&row.get::<_, String>(9)?),
                    created_by: row.get(10)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn attach_permission_to_role(&self, role_id: i64, permission_id: i64) -> Result<()> {
        self.conn().execute(
            "INSERT INTO permissions_roles (role_id, permission_id)
             SELECT ?1, ?2
             WHERE NOT EXISTS (
                 SELECT 1 FROM permissions_roles WHERE role_id = ?1 AND permission_id = ?2
             )",
            params![role_id, permission_id],
        )?;
        Ok(())
    }

    fn attach_tag_to_post(&self, post_id: i64, tag_id: i64) -> Result<()> {
        self.conn().execute(
            "INSERT INTO posts_tags (post_id, tag_id)
             SELECT ?1, ?2
             WHERE NOT EXISTS (
                 SELECT 1 FROM posts_tags WHERE post_id = ?1 AND tag_id = ?2
             )",
            params![post_id, tag_id],
        )?;
        Ok(())
    }

    fn set_user_role(&self, user_id: i64, role_id: i64) -> Result<()> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE roles_users SET role_id = ?1 WHERE user_id = ?2",
            params![role_id, user_id],
        )?;
        if rows == 0 {
            conn.execute(
                "INSERT INTO roles_users (role_id, user_id) VALUES (?1, ?2)",
                params![role_id, user_id],
            )?;
        }
        Ok(())
    }

    // Export

    fn export(&self) -> Result<serde_json::Value> {
        let tables = self.list_tables()?;
        let conn = self.conn();
        let mut snapshot = serde_json::Map::new();

        for table in tables {
            let mut stmt = conn.prepare(&format!("SELECT * FROM {table}"))?;
            let column_names: Vec<String> =
                stmt.column_names().iter().map(|s| s.to_string()).collect();

            let rows = stmt.query_map([], |row| {
                let mut object = serde_json::Map::new();
                for (i, name) in column_names.iter().enumerate() {
                    object.insert(name.clone(), value_to_json(row.get_ref(i)?));
                }
                Ok(serde_json::Value::Object(object))
            })?;

            let rows = rows.collect::<std::result::Result<Vec<_>, _>>()?;
            snapshot.insert(table, serde_json::Value::Array(rows));
        }

        Ok(serde_json::Value::Object(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn seeded_store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        for desc in schema::tables() {
            store.create_table(&desc).unwrap();
        }
        store
    }

    #[test]
    fn test_introspection_matches_descriptor() {
        let store = seeded_store();

        let tables = store.list_tables().unwrap();
        for desc in schema::tables() {
            assert!(tables.contains(desc.name), "missing table {}", desc.name);

            let columns = store.list_columns(desc.name).unwrap();
            for col in &desc.columns {
                assert!(columns.contains(col.name), "{}.{}", desc.name, col.name);
            }

            let indexes = store.list_indexes(desc.name).unwrap();
            for col in desc.columns.iter().filter(|c| c.unique) {
                assert!(indexes.contains(&schema::unique_index_name(desc.name, col.name)));
            }
        }
    }

    #[test]
    fn test_add_and_drop_unique() {
        let store = seeded_store();

        store.drop_unique("posts", "slug").unwrap();
        assert!(!store.list_indexes("posts").unwrap().contains("posts_slug_unique"));

        store.add_unique("posts", "slug").unwrap();
        assert!(store.list_indexes("posts").unwrap().contains("posts_slug_unique"));
    }

    #[test]
    fn test_duplicate_role_maps_to_already_exists() {
        let store = seeded_store();
        let role = RoleFixture {
            name: "Editor",
            description: Some("Can edit posts"),
        };

        store.insert_role(&role).unwrap();
        let result = store.insert_role(&role);
        assert!(matches!(result, Err(Error::AlreadyExists)));
    }

    #[test]
    fn test_duplicate_permission_maps_to_already_exists() {
        let store = seeded_store();
        let perm = PermissionFixture {
            name: "Edit posts",
            object_type: "post",
            action_type: "edit",
        };

        store.insert_permission(&perm).unwrap();
        let result = store.insert_permission(&perm);
        assert!(matches!(result, Err(Error::AlreadyExists)));
    }

    #[test]
    fn test_attach_permission_is_idempotent() {
        let store = seeded_store();
        let role_id = store
            .insert_role(&RoleFixture {
                name: "Author",
                description: None,
            })
            .unwrap();
        let perm_id = store
            .insert_permission(&PermissionFixture {
                name: "Add posts",
                object_type: "post",
                action_type: "add",
            })
            .unwrap();

        store.attach_permission_to_role(role_id, perm_id).unwrap();
        store.attach_permission_to_role(role_id, perm_id).unwrap();

        let conn = store.connection();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM permissions_roles WHERE role_id = ?1 AND permission_id = ?2",
                params![role_id, perm_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_ensure_setting_is_additive() {
        let store = seeded_store();

        assert!(store.ensure_setting("title", "My Blog").unwrap());
        assert!(!store.ensure_setting("title", "Other").unwrap());
        assert_eq!(store.get_setting("title").unwrap().as_deref(), Some("My Blog"));

        store.set_setting("title", "Renamed").unwrap();
        assert_eq!(store.get_setting("title").unwrap().as_deref(), Some("Renamed"));
    }

    #[test]
    fn test_export_snapshots_all_tables() {
        let store = seeded_store();
        store
            .insert_role(&RoleFixture {
                name: "Administrator",
                description: None,
            })
            .unwrap();

        let snapshot = store.export().unwrap();
        let object = snapshot.as_object().unwrap();
        assert!(object.contains_key("roles"));
        assert!(object.contains_key("settings"));
        assert_eq!(object["roles"].as_array().unwrap().len(), 1);
        assert_eq!(
            object["roles"][0]["name"],
            serde_json::Value::from("Administrator")
        );
    }

    #[test]
    fn test_find_user_with_role_and_repoint() {
        let store = seeded_store();
        let admin_id = store
            .insert_role(&RoleFixture {
                name: "Administrator",
                description: None,
            })
            .unwrap();
        let owner_id = store
            .insert_role(&RoleFixture {
                name: "Owner",
                description: None,
            })
            .unwrap();
        let user_id = store
            .insert_user(
                &UserFixture {
                    name: "Site Owner",
                    slug: "site-owner",
                    email: "owner@example.com",
                },
                "sekrit",
                admin_id,
            )
            .unwrap();

        let admin = store.find_user_with_role("Administrator").unwrap().unwrap();
        assert_eq!(admin.id, user_id);

        store.set_user_role(user_id, owner_id).unwrap();
        assert!(store.find_user_with_role("Administrator").unwrap().is_none());
        let owner = store.find_user_with_role("Owner").unwrap().unwrap();
        assert_eq!(owner.id, user_id);
    }
}
