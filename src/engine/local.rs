//! In-process evaluator
//!
//! Runs the role, scope, tenant, and ownership stages directly against the
//! permission matrix with zero network dependency. The stages form an
//! ordered pipeline; every failing stage contributes its reason so the
//! caller sees the complete explanation, not just the first failure.

use std::sync::Arc;

use crate::engine::{REASON_OWNER, REASON_ROLE, REASON_SCOPE, REASON_TENANT};
use crate::matrix::PermissionMatrix;
use crate::roles::RoleResolver;
use crate::scope::ScopeFilter;
use crate::tenant::TenantGuard;
use crate::types::{DecideInput, Decision};

/// A pipeline stage: `Some(reason)` on failure, `None` on pass
type Check = fn(&LocalEvaluator, &DecideInput) -> Option<&'static str>;

const PIPELINE: [Check; 4] = [
    LocalEvaluator::check_role,
    LocalEvaluator::check_scope,
    LocalEvaluator::check_tenant,
    LocalEvaluator::check_ownership,
];

/// Local evaluation backend
#[derive(Debug, Clone)]
pub struct LocalEvaluator {
    resolver: RoleResolver,
    tenant: TenantGuard,
}

impl LocalEvaluator {
    pub fn new(matrix: Arc<PermissionMatrix>) -> Self {
        Self {
            resolver: RoleResolver::new(matrix.clone()),
            tenant: TenantGuard::new(matrix),
        }
    }

    /// Run every stage and aggregate the failures
    pub fn evaluate(&self, input: &DecideInput) -> Decision {
        let reasons: Vec<String> = PIPELINE
            .iter()
            .filter_map(|check| check(self, input))
            .map(str::to_string)
            .collect();

        if reasons.is_empty() {
            Decision::allow()
        } else {
            Decision::deny_all(reasons)
        }
    }

    fn check_role(&self, input: &DecideInput) -> Option<&'static str> {
        let resolved = self.resolver.resolve(&input.user.roles);
        if RoleResolver::permits(&resolved, &input.action) {
            None
        } else {
            Some(REASON_ROLE)
        }
    }

    fn check_scope(&self, input: &DecideInput) -> Option<&'static str> {
        if ScopeFilter::permits(&input.user, &input.action) {
            None
        } else {
            Some(REASON_SCOPE)
        }
    }

    fn check_tenant(&self, input: &DecideInput) -> Option<&'static str> {
        if self.tenant.allow_access(&input.user, input.resource.as_ref()) {
            None
        } else {
            Some(REASON_TENANT)
        }
    }

    fn check_ownership(&self, input: &DecideInput) -> Option<&'static str> {
        if self
            .tenant
            .allow_mutation(&input.user, &input.action, input.resource.as_ref())
        {
            None
        } else {
            Some(REASON_OWNER)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Principal, ResourceRef};

    fn evaluator() -> LocalEvaluator {
        LocalEvaluator::new(Arc::new(PermissionMatrix::builtin()))
    }

    #[test]
    fn allow_when_every_stage_passes() {
        let input = DecideInput::new(Principal::new("user:alice", ["operator"]), "tasks:read");
        assert_eq!(evaluator().evaluate(&input), Decision::allow());
    }

    #[test]
    fn deny_collects_every_failing_stage() {
        // viewer writing someone else's resource in another tenant: role,
        // tenant, and ownership all fail at once
        let principal = Principal::new("user:bob", ["viewer"]).with_tenant("tenant-2");
        let resource = ResourceRef::new("tasks", "task-1")
            .with_owner("user:alice")
            .with_tenant("tenant-1");
        let input = DecideInput::new(principal, "tasks:write").with_resource(resource);

        let decision = evaluator().evaluate(&input);
        assert!(!decision.allowed);
        assert_eq!(
            decision.reasons,
            vec![
                REASON_ROLE.to_string(),
                REASON_TENANT.to_string(),
                REASON_OWNER.to_string(),
            ]
        );
    }

    #[test]
    fn scope_failure_reported_alongside_role_failure() {
        let principal =
            Principal::new("user:bot", ["viewer"]).with_api_key_scopes(["monitor:read"]);
        let input = DecideInput::new(principal, "tasks:write");

        let decision = evaluator().evaluate(&input);
        assert_eq!(
            decision.reasons,
            vec![REASON_ROLE.to_string(), REASON_SCOPE.to_string()]
        );
    }
}
