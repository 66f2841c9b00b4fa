//! Tenant isolation and ownership checks
//!
//! Both checks are independent of the role verdict: a principal can hold
//! the base permission yet still be denied here.

use std::sync::Arc;

use crate::matrix::PermissionMatrix;
use crate::types::{Action, Principal, ResourceRef};

/// Enforces same-tenant access and ownership-based mutation rules
#[derive(Debug, Clone)]
pub struct TenantGuard {
    matrix: Arc<PermissionMatrix>,
}

impl TenantGuard {
    pub fn new(matrix: Arc<PermissionMatrix>) -> Self {
        Self { matrix }
    }

    /// Same-tenant check
    ///
    /// Defers to true when there is no resource or the resource carries no
    /// tenant. Admin bypasses tenant isolation unconditionally.
    pub fn allow_access(&self, principal: &Principal, resource: Option<&ResourceRef>) -> bool {
        let Some(tenant) = resource.and_then(|r| r.tenant_id.as_deref()) else {
            return true;
        };
        if self.matrix.is_admin(&principal.roles) {
            return true;
        }
        principal.tenant_id.as_deref() == Some(tenant)
    }

    /// Ownership check, applied only to mutating verbs
    ///
    /// Defers to true when the resource or its owner is unknown; the
    /// ownership rule is a no-op without an owner.
    pub fn allow_mutation(
        &self,
        principal: &Principal,
        action: &Action,
        resource: Option<&ResourceRef>,
    ) -> bool {
        if !action.is_mutating() {
            return true;
        }
        let Some(owner) = resource.and_then(|r| r.owner_id.as_deref()) else {
            return true;
        };
        if self.matrix.is_admin(&principal.roles) {
            return true;
        }
        owner == principal.user_id
    }
}
