//! Declarative per-role permission rules.
//!
//! Each role's reach is a data table of (object type, allowed actions)
//! pairs evaluated by one matcher. The Owner role is deliberately absent:
//! authorization treats it as all-access rather than storing every grant.

#[derive(Debug, Clone, Copy)]
pub enum Actions {
    All,
    Only(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub enum RoleGrants {
    /// Every object type, every action.
    All,
    Objects(&'static [(&'static str, Actions)]),
}

#[derive(Debug, Clone, Copy)]
pub struct RoleRule {
    pub role: &'static str,
    pub grants: RoleGrants,
}

impl RoleRule {
    pub fn allows(&self, object_type: &str, action_type: &str) -> bool {
        match self.grants {
            RoleGrants::All => true,
            RoleGrants::Objects(objects) => objects.iter().any(|(object, actions)| {
                *object == object_type
                    && match actions {
                        Actions::All => true,
                        Actions::Only(allowed) => allowed.contains(&action_type),
                    }
            }),
        }
    }
}

const RULES: &[RoleRule] = &[
    RoleRule {
        role: "Administrator",
        grants: RoleGrants::All,
    },
    RoleRule {
        role: "Editor",
        grants: RoleGrants::Objects(&[
            ("post", Actions::All),
            ("user", Actions::All),
            ("slug", Actions::All),
            ("setting", Actions::Only(&["browse", "read"])),
        ]),
    },
    RoleRule {
        role: "Author",
        grants: RoleGrants::Objects(&[
            ("post", Actions::Only(&["add"])),
            ("slug", Actions::Only(&["generate"])),
            ("setting", Actions::Only(&["browse", "read"])),
            ("user", Actions::Only(&["browse", "read"])),
        ]),
    },
];

pub fn role_rules() -> &'static [RoleRule] {
    RULES
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(role: &str) -> &'static RoleRule {
        role_rules().iter().find(|r| r.role == role).unwrap()
    }

    #[test]
    fn test_administrator_allows_everything() {
        let admin = rule("Administrator");
        assert!(admin.allows("post", "destroy"));
        assert!(admin.allows("db", "exportContent"));
        assert!(admin.allows("unknown", "whatever"));
    }

    #[test]
    fn test_editor_scope() {
        let editor = rule("Editor");
        assert!(editor.allows("post", "destroy"));
        assert!(editor.allows("user", "add"));
        assert!(editor.allows("setting", "browse"));
        assert!(editor.allows("setting", "read"));
        assert!(!editor.allows("setting", "edit"));
        assert!(!editor.allows("db", "exportContent"));
        assert!(!editor.allows("theme", "edit"));
    }

    #[test]
    fn test_author_scope() {
        let author = rule("Author");
        assert!(author.allows("post", "add"));
        assert!(!author.allows("post", "edit"));
        assert!(!author.allows("post", "destroy"));
        assert!(author.allows("slug", "generate"));
        assert!(author.allows("user", "browse"));
        assert!(!author.allows("user", "edit"));
    }

    #[test]
    fn test_owner_has_no_rule() {
        assert!(role_rules().iter().all(|r| r.role != "Owner"));
    }
}
