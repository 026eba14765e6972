//! Versioned fixture manifest.
//!
//! Each batch lists only the rows introduced at that version. A fresh
//! install consumes every batch in order; an upgrade consumes the batches
//! between the stored version (exclusive) and the target (inclusive). Both
//! paths feed the same seeding function, so skipping several versions at
//! once needs no special handling.

#[derive(Debug, Clone)]
pub struct PostFixture {
    pub title: &'static str,
    pub slug: &'static str,
    pub markdown: &'static str,
    pub html: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Clone)]
pub struct TagFixture {
    pub name: &'static str,
    pub slug: &'static str,
    pub description: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct RoleFixture {
    pub name: &'static str,
    pub description: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct ClientFixture {
    pub name: &'static str,
    pub slug: &'static str,
}

#[derive(Debug, Clone)]
pub struct PermissionFixture {
    pub name: &'static str,
    pub object_type: &'static str,
    pub action_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct UserFixture {
    pub name: &'static str,
    pub slug: &'static str,
    pub email: &'static str,
}

#[derive(Debug)]
pub struct FixtureBatch {
    pub version: &'static str,
    pub posts: &'static [PostFixture],
    pub tags: &'static [TagFixture],
    pub roles: &'static [RoleFixture],
    pub clients: &'static [ClientFixture],
    pub permissions: &'static [PermissionFixture],
    /// (post slug, tag slug) pairs wired up after the batch's rows exist.
    pub post_tags: &'static [(&'static str, &'static str)],
}

const NO_POSTS: &[PostFixture] = &[];
const NO_TAGS: &[TagFixture] = &[];
const NO_ROLES: &[RoleFixture] = &[];
const NO_CLIENTS: &[ClientFixture] = &[];
const NO_PERMISSIONS: &[PermissionFixture] = &[];
const NO_POST_TAGS: &[(&str, &str)] = &[];

/// The initial owner account, created once on fresh install with a random
/// password placeholder. The real credentials are set by the setup flow.
pub const OWNER_USER: UserFixture = UserFixture {
    name: "Site Owner",
    slug: "site-owner",
    email: "owner@example.com",
};

const MANIFEST: &[FixtureBatch] = &[
    FixtureBatch {
        version: "002",
        posts: &[PostFixture {
            title: "Welcome to Vellum",
            slug: "welcome-to-vellum",
            markdown: "You're live! Nice. This is your first post, written for \
                       you by the install process. Edit it or delete it and \
                       start publishing.",
            html: "<p>You're live! Nice. This is your first post, written for \
                   you by the install process. Edit it or delete it and start \
                   publishing.</p>",
            status: "published",
        }],
        tags: &[TagFixture {
            name: "Getting Started",
            slug: "getting-started",
            description: None,
        }],
        roles: &[
            RoleFixture {
                name: "Administrator",
                description: Some("Administrators"),
            },
            RoleFixture {
                name: "Editor",
                description: Some("Editors"),
            },
            RoleFixture {
                name: "Author",
                description: Some("Authors"),
            },
        ],
        clients: NO_CLIENTS,
        permissions: &[
            PermissionFixture {
                name: "Browse posts",
                object_type: "post",
                action_type: "browse",
            },
            PermissionFixture {
                name: "Read posts",
                object_type: "post",
                action_type: "read",
            },
            PermissionFixture {
                name: "Edit posts",
                object_type: "post",
                action_type: "edit",
            },
            PermissionFixture {
                name: "Add posts",
                object_type: "post",
                action_type: "add",
            },
            PermissionFixture {
                name: "Delete posts",
                object_type: "post",
                action_type: "destroy",
            },
        ],
        post_tags: &[("welcome-to-vellum", "getting-started")],
    },
    FixtureBatch {
        version: "003",
        posts: NO_POSTS,
        tags: NO_TAGS,
        roles: &[RoleFixture {
            name: "Owner",
            description: Some("Site Owner"),
        }],
        clients: &[ClientFixture {
            name: "Vellum Admin",
            slug: "vellum-admin",
        }],
        permissions: &[
            PermissionFixture {
                name: "Export database",
                object_type: "db",
                action_type: "exportContent",
            },
            PermissionFixture {
                name: "Import database",
                object_type: "db",
                action_type: "importContent",
            },
            PermissionFixture {
                name: "Delete all content",
                object_type: "db",
                action_type: "deleteAllContent",
            },
            PermissionFixture {
                name: "Send mail",
                object_type: "mail",
                action_type: "send",
            },
            PermissionFixture {
                name: "Browse notifications",
                object_type: "notification",
                action_type: "browse",
            },
            PermissionFixture {
                name: "Add notifications",
                object_type: "notification",
                action_type: "add",
            },
            PermissionFixture {
                name: "Delete notifications",
                object_type: "notification",
                action_type: "destroy",
            },
            PermissionFixture {
                name: "Browse settings",
                object_type: "setting",
                action_type: "browse",
            },
            PermissionFixture {
                name: "Read settings",
                object_type: "setting",
                action_type: "read",
            },
            PermissionFixture {
                name: "Edit settings",
                object_type: "setting",
                action_type: "edit",
            },
            PermissionFixture {
                name: "Generate slugs",
                object_type: "slug",
                action_type: "generate",
            },
            PermissionFixture {
                name: "Browse themes",
                object_type: "theme",
                action_type: "browse",
            },
            PermissionFixture {
                name: "Edit themes",
                object_type: "theme",
                action_type: "edit",
            },
            PermissionFixture {
                name: "Browse users",
                object_type: "user",
                action_type: "browse",
            },
            PermissionFixture {
                name: "Read users",
                object_type: "user",
                action_type: "read",
            },
            PermissionFixture {
                name: "Edit users",
                object_type: "user",
                action_type: "edit",
            },
            PermissionFixture {
                name: "Add users",
                object_type: "user",
                action_type: "add",
            },
            PermissionFixture {
                name: "Delete users",
                object_type: "user",
                action_type: "destroy",
            },
        ],
        post_tags: NO_POST_TAGS,
    },
    FixtureBatch {
        version: "004",
        posts: NO_POSTS,
        tags: NO_TAGS,
        roles: NO_ROLES,
        clients: &[ClientFixture {
            name: "Vellum Frontend",
            slug: "vellum-frontend",
        }],
        permissions: NO_PERMISSIONS,
        post_tags: NO_POST_TAGS,
    },
];

pub fn manifest() -> &'static [FixtureBatch] {
    MANIFEST
}
