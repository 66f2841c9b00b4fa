//! Role resolution over the permission matrix

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::matrix::PermissionMatrix;
use crate::types::Action;

/// Resolves a principal's roles to the union of their permitted patterns
#[derive(Debug, Clone)]
pub struct RoleResolver {
    matrix: Arc<PermissionMatrix>,
}

impl RoleResolver {
    pub fn new(matrix: Arc<PermissionMatrix>) -> Self {
        Self { matrix }
    }

    /// Union the matrix entries for every role in the input set
    ///
    /// Unknown role names contribute the empty set; aliases resolve through
    /// the matrix's alias table so `a2a-admin` yields the admin set itself.
    pub fn resolve<'a>(&self, roles: impl IntoIterator<Item = &'a String>) -> BTreeSet<String> {
        let mut resolved = BTreeSet::new();
        for role in roles {
            if let Some(set) = self.matrix.role_set(role) {
                resolved.extend(set.iter().cloned());
            }
        }
        resolved
    }

    /// Whether a resolved set permits the action: literal membership, or
    /// the `<resource_type>:*` wildcard. No other pattern forms exist.
    pub fn permits(resolved: &BTreeSet<String>, action: &Action) -> bool {
        resolved.contains(action.as_str()) || resolved.contains(&action.wildcard())
    }
}
