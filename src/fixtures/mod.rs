//! Fixture population: baseline content, roles, permissions, role grants,
//! OAuth clients, and the initial owner account.
//!
//! Seeding is re-runnable: every insert treats a duplicate-key condition as
//! "already applied" and moves on, so a partially seeded database can be
//! populated again safely.

mod manifest;
mod rules;

pub use manifest::{
    ClientFixture, FixtureBatch, OWNER_USER, PermissionFixture, PostFixture, RoleFixture,
    TagFixture, UserFixture, manifest,
};
pub use rules::{Actions, RoleGrants, RoleRule, role_rules};

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::error::{Error, Result};
use crate::migrate::versioning::VersionToken;
use crate::store::Store;

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

fn skip_existing(result: Result<i64>, what: &str) -> Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(Error::AlreadyExists) => {
            tracing::info!("Fixture already present, skipping: {}", what);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Seeds one version's rows and grants. Grants are evaluated against this
/// batch's permissions only, so re-applying the rules on upgrade never
/// touches permissions that were granted by an earlier version.
fn seed_batch(store: &dyn Store, batch: &FixtureBatch) -> Result<()> {
    for post in batch.posts {
        skip_existing(store.insert_post(post), post.slug)?;
    }
    for tag in batch.tags {
        skip_existing(store.insert_tag(tag), tag.slug)?;
    }
    for role in batch.roles {
        skip_existing(store.insert_role(role), role.name)?;
    }
    for client in batch.clients {
        skip_existing(store.insert_client(client, &random_token(26)), client.slug)?;
    }
    for permission in batch.permissions {
        skip_existing(store.insert_permission(permission), permission.name)?;
    }

    for rule in role_rules() {
        let Some(role) = store.find_role_by_name(rule.role)? else {
            continue;
        };
        for permission in batch.permissions {
            if !rule.allows(permission.object_type, permission.action_type) {
                continue;
            }
            if let Some(found) =
                store.find_permission(permission.object_type, permission.action_type)?
            {
                store.attach_permission_to_role(role.id, found.id)?;
            }
        }
    }

    for &(post_slug, tag_slug) in batch.post_tags {
        let post_id = store.find_post_id_by_slug(post_slug)?;
        let tag_id = store.find_tag_id_by_slug(tag_slug)?;
        if let (Some(post_id), Some(tag_id)) = (post_id, tag_id) {
            store.attach_tag_to_post(post_id, tag_id)?;
        }
    }

    Ok(())
}

/// Fresh-install path: every batch in order, then the owner account bound
/// to the Owner role with a generated password placeholder.
pub fn populate(store: &dyn Store) -> Result<()> {
    for batch in manifest() {
        seed_batch(store, batch)?;
    }

    let owner_role = store.find_role_by_name("Owner")?.ok_or(Error::NotFound)?;
    skip_existing(
        store.insert_user(&OWNER_USER, &random_token(50), owner_role.id),
        OWNER_USER.slug,
    )
}

/// Upgrade path: only the batches introduced after `from`, up to and
/// including `to`. When one of them introduces the Owner role, the tracked
/// administrator is re-pointed to it; if no administrator exists the step
/// is skipped rather than failing the migration.
pub fn update(store: &dyn Store, from: &VersionToken, to: &VersionToken) -> Result<()> {
    let mut owner_introduced = false;

    for batch in manifest()
        .iter()
        .filter(|b| from.as_str() < b.version && b.version <= to.as_str())
    {
        tracing::info!("Applying fixture batch {}", batch.version);
        seed_batch(store, batch)?;
        owner_introduced |= batch.roles.iter().any(|r| r.name == "Owner");
    }

    if owner_introduced {
        if let Some(owner_role) = store.find_role_by_name("Owner")? {
            match store.find_user_with_role("Administrator")? {
                Some(user) => {
                    tracing::info!("Re-pointing user {} to the Owner role", user.slug);
                    store.set_user_role(user.id, owner_role.id)?;
                }
                None => {
                    tracing::debug!("No administrator user found, skipping Owner re-point");
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use crate::store::SqliteStore;

    fn fresh_store() -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        for desc in schema::tables() {
            store.create_table(&desc).unwrap();
        }
        store
    }

    fn count(store: &SqliteStore, sql: &str) -> i64 {
        store
            .connection()
            .query_row(sql, [], |row| row.get(0))
            .unwrap()
    }

    fn grant_count(store: &SqliteStore, role: &str) -> i64 {
        store
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM permissions_roles pr
                 JOIN roles r ON r.id = pr.role_id WHERE r.name = ?1",
                [role],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn test_populate_seeds_everything() {
        let store = fresh_store();
        populate(&store).unwrap();

        assert_eq!(count(&store, "SELECT COUNT(*) FROM roles"), 4);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM posts"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM tags"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM posts_tags"), 1);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM clients"), 2);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM permissions"), 23);

        // Administrator holds every permission; Owner holds none because it
        // is all-access by definition.
        assert_eq!(grant_count(&store, "Administrator"), 23);
        assert_eq!(grant_count(&store, "Owner"), 0);
        // Editor: all post (5) + all user (5) + all slug (1) + setting browse/read (2)
        assert_eq!(grant_count(&store, "Editor"), 13);
        // Author: post.add, slug.generate, setting browse/read, user browse/read
        assert_eq!(grant_count(&store, "Author"), 6);

        let owner = store.find_user_with_role("Owner").unwrap().unwrap();
        assert_eq!(owner.slug, OWNER_USER.slug);
        assert_eq!(owner.password.len(), 50);
    }

    #[test]
    fn test_populate_twice_is_idempotent() {
        let store = fresh_store();
        populate(&store).unwrap();
        populate(&store).unwrap();

        assert_eq!(count(&store, "SELECT COUNT(*) FROM roles"), 4);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM permissions"), 23);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM users"), 1);
        assert_eq!(grant_count(&store, "Administrator"), 23);
    }

    #[test]
    fn test_update_applies_only_newer_batches() {
        let store = fresh_store();

        // Simulate a version-002 install: base batch plus an admin user.
        let base = &manifest()[0];
        assert_eq!(base.version, "002");
        seed_batch(&store, base).unwrap();
        let admin_role = store.find_role_by_name("Administrator").unwrap().unwrap();
        store
            .insert_user(
                &UserFixture {
                    name: "Old Admin",
                    slug: "old-admin",
                    email: "admin@example.com",
                },
                "hunter2",
                admin_role.id,
            )
            .unwrap();
        assert_eq!(grant_count(&store, "Administrator"), 5);

        let from = VersionToken::new("002").unwrap();
        let to = VersionToken::new("004").unwrap();
        update(&store, &from, &to).unwrap();

        assert_eq!(count(&store, "SELECT COUNT(*) FROM permissions"), 23);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM clients"), 2);
        assert_eq!(grant_count(&store, "Administrator"), 23);

        // The admin user now holds the Owner role.
        let owner = store.find_user_with_role("Owner").unwrap().unwrap();
        assert_eq!(owner.slug, "old-admin");
        assert!(store.find_user_with_role("Administrator").unwrap().is_none());
    }

    #[test]
    fn test_update_without_admin_user_is_silent() {
        let store = fresh_store();
        seed_batch(&store, &manifest()[0]).unwrap();

        let from = VersionToken::new("002").unwrap();
        let to = VersionToken::new("003").unwrap();
        update(&store, &from, &to).unwrap();

        assert!(store.find_role_by_name("Owner").unwrap().is_some());
        assert_eq!(count(&store, "SELECT COUNT(*) FROM users"), 0);
    }

    #[test]
    fn test_update_at_same_version_is_noop() {
        let store = fresh_store();
        populate(&store).unwrap();

        let v = VersionToken::new("004").unwrap();
        update(&store, &v, &v).unwrap();

        assert_eq!(count(&store, "SELECT COUNT(*) FROM permissions"), 23);
        assert_eq!(count(&store, "SELECT COUNT(*) FROM users"), 1);
    }
}
