//! Permission matrix: role -> permitted action patterns
//!
//! The matrix is immutable, loaded once at process start, and injected
//! into the engine. There is no runtime hot-reload.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{AuthzError, Result};
use crate::types::Action;

/// The role every other role's set must stay a subset of
pub const ADMIN_ROLE: &str = "admin";

/// Immutable mapping from role name to permitted action patterns, plus the
/// public-action set and role alias table
#[derive(Debug, Clone)]
pub struct PermissionMatrix {
    roles: BTreeMap<String, BTreeSet<String>>,
    aliases: BTreeMap<String, String>,
    public_actions: BTreeSet<String>,
}

impl PermissionMatrix {
    /// Build a matrix from explicit tables, validating invariants
    ///
    /// Fails fast when the matrix is empty, when an alias points at an
    /// undefined role, or when a role's set escapes the admin superset.
    pub fn new(
        roles: BTreeMap<String, BTreeSet<String>>,
        aliases: BTreeMap<String, String>,
        public_actions: BTreeSet<String>,
    ) -> Result<Self> {
        if roles.is_empty() {
            return Err(AuthzError::InvalidMatrix(
                "permission matrix has no roles".to_string(),
            ));
        }

        for (alias, target) in &aliases {
            if !roles.contains_key(target) {
                return Err(AuthzError::InvalidMatrix(format!(
                    "alias '{}' points at undefined role '{}'",
                    alias, target
                )));
            }
        }

        let matrix = Self {
            roles,
            aliases,
            public_actions,
        };
        matrix.check_admin_superset()?;
        Ok(matrix)
    }

    /// The baseline role table
    ///
    /// | role      | grants |
    /// |-----------|--------|
    /// | admin     | everything, including `admin:*` |
    /// | a2a-admin | alias of admin |
    /// | operator  | read/write tasks, workers, sessions, monitor |
    /// | editor    | read/write tasks, codebases; execute agent |
    /// | viewer    | read-only tasks, codebases, sessions, monitor |
    ///
    /// Public actions (`health`, `auth:login`) bypass the matrix entirely.
    pub fn builtin() -> Self {
        let mut roles = BTreeMap::new();
        roles.insert(
            ADMIN_ROLE.to_string(),
            patterns(&[
                "admin:*",
                "tasks:*",
                "workers:*",
                "sessions:*",
                "codebases:*",
                "monitor:*",
                "agent:*",
                "auth:*",
            ]),
        );
        roles.insert(
            "operator".to_string(),
            patterns(&[
                "tasks:read",
                "tasks:write",
                "workers:read",
                "workers:write",
                "sessions:read",
                "sessions:write",
                "monitor:read",
                "monitor:write",
            ]),
        );
        roles.insert(
            "editor".to_string(),
            patterns(&[
                "tasks:read",
                "tasks:write",
                "codebases:read",
                "codebases:write",
                "agent:execute",
            ]),
        );
        roles.insert(
            "viewer".to_string(),
            patterns(&["tasks:read", "codebases:read", "sessions:read", "monitor:read"]),
        );

        // a2a-admin resolves through the alias table to admin's own set,
        // never a separately maintained copy
        let mut aliases = BTreeMap::new();
        aliases.insert("a2a-admin".to_string(), ADMIN_ROLE.to_string());

        let public_actions = patterns(&["health", "auth:login"]);

        Self::new(roles, aliases, public_actions)
            .expect("builtin permission matrix must satisfy its own invariants")
    }

    /// Permission set for a role, resolving aliases; unknown roles map to
    /// no set at all (they grant nothing, not an error)
    pub fn role_set(&self, role: &str) -> Option<&BTreeSet<String>> {
        let canonical = self.aliases.get(role).map(String::as_str).unwrap_or(role);
        self.roles.get(canonical)
    }

    /// Whether any of the given roles resolves to `admin`
    pub fn is_admin<'a>(&self, roles: impl IntoIterator<Item = &'a String>) -> bool {
        roles.into_iter().any(|role| {
            let canonical = self.aliases.get(role).map(String::as_str).unwrap_or(role);
            canonical == ADMIN_ROLE
        })
    }

    /// Whether the action is in the fixed public set
    pub fn is_public(&self, action: &Action) -> bool {
        self.public_actions.contains(action.as_str())
    }

    /// Every non-admin pattern must already be covered by the admin set,
    /// either literally or by the type wildcard
    fn check_admin_superset(&self) -> Result<()> {
        let admin = self.roles.get(ADMIN_ROLE).ok_or_else(|| {
            AuthzError::InvalidMatrix(format!("matrix has no '{}' role", ADMIN_ROLE))
        })?;

        for (role, set) in &self.roles {
            if role == ADMIN_ROLE {
                continue;
            }
            for pattern in set {
                let wildcard = Action::new(pattern.clone()).wildcard();
                if !admin.contains(pattern) && !admin.contains(&wildcard) {
                    return Err(AuthzError::InvalidMatrix(format!(
                        "role '{}' grants '{}' which admin does not cover",
                        role, pattern
                    )));
                }
            }
        }
        Ok(())
    }
}

fn patterns(entries: &[&str]) -> BTreeSet<String> {
    entries.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matrix_is_valid() {
        let matrix = PermissionMatrix::builtin();
        assert!(matrix.role_set("admin").is_some());
        assert!(matrix.role_set("operator").is_some());
        assert!(matrix.role_set("nonexistent").is_none());
    }

    #[test]
    fn alias_resolves_to_admin_set() {
        let matrix = PermissionMatrix::builtin();
        let admin = matrix.role_set("admin").unwrap();
        let alias = matrix.role_set("a2a-admin").unwrap();
        assert_eq!(admin, alias);
    }

    #[test]
    fn admin_detection_covers_alias() {
        let matrix = PermissionMatrix::builtin();
        let direct = vec!["admin".to_string()];
        let aliased = vec!["a2a-admin".to_string()];
        let neither = vec!["operator".to_string(), "viewer".to_string()];

        assert!(matrix.is_admin(&direct));
        assert!(matrix.is_admin(&aliased));
        assert!(!matrix.is_admin(&neither));
    }

    #[test]
    fn public_actions() {
        let matrix = PermissionMatrix::builtin();
        assert!(matrix.is_public(&Action::new("health")));
        assert!(matrix.is_public(&Action::new("auth:login")));
        assert!(!matrix.is_public(&Action::new("tasks:read")));
    }

    #[test]
    fn empty_matrix_is_fatal() {
        let err = PermissionMatrix::new(BTreeMap::new(), BTreeMap::new(), BTreeSet::new());
        assert!(matches!(err, Err(AuthzError::InvalidMatrix(_))));
    }

    #[test]
    fn alias_to_undefined_role_is_fatal() {
        let mut roles = BTreeMap::new();
        roles.insert(ADMIN_ROLE.to_string(), patterns(&["admin:*"]));
        let mut aliases = BTreeMap::new();
        aliases.insert("ghost".to_string(), "missing".to_string());

        let err = PermissionMatrix::new(roles, aliases, BTreeSet::new());
        assert!(matches!(err, Err(AuthzError::InvalidMatrix(_))));
    }

    #[test]
    fn role_escaping_admin_superset_is_fatal() {
        let mut roles = BTreeMap::new();
        roles.insert(ADMIN_ROLE.to_string(), patterns(&["tasks:*"]));
        roles.insert("rogue".to_string(), patterns(&["secrets:read"]));

        let err = PermissionMatrix::new(roles, BTreeMap::new(), BTreeSet::new());
        assert!(matches!(err, Err(AuthzError::InvalidMatrix(_))));
    }
}
