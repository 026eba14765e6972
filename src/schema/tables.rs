//! The target schema for the current database version.
//!
//! Only the current layout is declared; there is no historical record of
//! older layouts. Migration works by diffing this declaration against the
//! live database.

use super::{ColType, ColumnSpec, TableDescriptor};

use ColType::{Bool, DateTime, Increments, Integer, Text};

fn col(name: &'static str, col_type: ColType) -> ColumnSpec {
    ColumnSpec::new(name, col_type)
}

/// All tables for the current version, in creation order. Reset walks this
/// list in reverse so association tables drop before the tables they join.
pub fn tables() -> Vec<TableDescriptor> {
    vec![
        TableDescriptor {
            name: "posts",
            columns: vec![
                col("id", Increments),
                col("uuid", Text),
                col("title", Text),
                col("slug", Text).unique(),
                col("markdown", Text).nullable(),
                col("html", Text).nullable(),
                col("image", Text).nullable(),
                col("featured", Bool).default_to("0"),
                col("page", Bool).default_to("0"),
                col("status", Text).default_to("'draft'"),
                col("language", Text).default_to("'en_US'"),
                col("meta_title", Text).nullable(),
                col("meta_description", Text).nullable(),
                col("author_id", Integer),
                col("created_at", DateTime),
                col("created_by", Integer),
                col("updated_at", DateTime).nullable(),
                col("updated_by", Integer).nullable(),
                col("published_at", DateTime).nullable(),
                col("published_by", Integer).nullable(),
            ],
        },
        TableDescriptor {
            name: "users",
            columns: vec![
                col("id", Increments),
                col("uuid", Text),
                col("name", Text),
                col("slug", Text).unique(),
                col("password", Text),
                col("email", Text).unique(),
                col("image", Text).nullable(),
                col("bio", Text).nullable(),
                col("website", Text).nullable(),
                col("location", Text).nullable(),
                col("status", Text).default_to("'active'"),
                col("language", Text).default_to("'en_US'"),
                col("meta_title", Text).nullable(),
                col("meta_description", Text).nullable(),
                col("last_login", DateTime).nullable(),
                col("created_at", DateTime),
                col("created_by", Integer),
                col("updated_at", DateTime).nullable(),
                col("updated_by", Integer).nullable(),
            ],
        },
        TableDescriptor {
            name: "roles",
            columns: vec![
                col("id", Increments),
                col("uuid", Text),
                col("name", Text).unique(),
                col("description", Text).nullable(),
                col("created_at", DateTime),
                col("created_by", Integer),
                col("updated_at", DateTime).nullable(),
                col("updated_by", Integer).nullable(),
            ],
        },
        TableDescriptor {
            name: "roles_users",
            columns: vec![
                col("id", Increments),
                col("role_id", Integer),
                col("user_id", Integer),
            ],
        },
        TableDescriptor {
            name: "permissions",
            columns: vec![
                col("id", Increments),
                col("uuid", Text),
                col("name", Text),
                col("object_type", Text),
                col("action_type", Text),
                col("object_id", Integer).nullable(),
                col("created_at", DateTime),
                col("created_by", Integer),
                col("updated_at", DateTime).nullable(),
                col("updated_by", Integer).nullable(),
            ],
        },
        TableDescriptor {
            name: "permissions_roles",
            columns: vec![
                col("id", Increments),
                col("role_id", Integer),
                col("permission_id", Integer),
            ],
        },
        TableDescriptor {
            name: "permissions_users",
            columns: vec![
                col("id", Increments),
                col("user_id", Integer),
                col("permission_id", Integer),
            ],
        },
        TableDescriptor {
            name: "settings",
            columns: vec![
                col("id", Increments),
                col("uuid", Text),
                col("key", Text).unique(),
                col("value", Text).nullable(),
                col("type", Text).default_to("'core'"),
                col("created_at", DateTime),
                col("created_by", Integer),
                col("updated_at", DateTime).nullable(),
                col("updated_by", Integer).nullable(),
            ],
        },
        TableDescriptor {
            name: "tags",
            columns: vec![
                col("id", Increments),
                col("uuid", Text),
                col("name", Text),
                col("slug", Text).unique(),
                col("description", Text).nullable(),
                col("meta_title", Text).nullable(),
                col("meta_description", Text).nullable(),
                col("created_at", DateTime),
                col("created_by", Integer),
                col("updated_at", DateTime).nullable(),
                col("updated_by", Integer).nullable(),
            ],
        },
        TableDescriptor {
            name: "posts_tags",
            columns: vec![
                col("id", Increments),
                col("post_id", Integer),
                col("tag_id", Integer),
            ],
        },
        TableDescriptor {
            name: "clients",
            columns: vec![
                col("id", Increments),
                col("uuid", Text),
                col("name", Text),
                col("slug", Text).unique(),
                col("secret", Text),
                col("created_at", DateTime),
                col("created_by", Integer),
                col("updated_at", DateTime).nullable(),
                col("updated_by", Integer).nullable(),
            ],
        },
    ]
}
