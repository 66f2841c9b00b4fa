//! Core authorization types

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How the principal authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthSource {
    /// JWT/OIDC session - governed by role alone
    Jwt,
    /// API key - additionally narrowed by key scopes
    ApiKey,
}

/// Principal (already-authenticated caller)
///
/// An anonymous caller is represented as a principal with no roles; it is
/// denied every action except the public ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Principal identifier (e.g. "user:alice@example.com")
    pub user_id: String,

    /// Role names assigned to the principal
    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// Tenant the principal belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    /// API-key scopes; only consulted when `auth_source` is `ApiKey`
    #[serde(default)]
    pub scopes: BTreeSet<String>,

    /// Authentication source
    pub auth_source: AuthSource,
}

impl Principal {
    /// Create a JWT-authenticated principal with the given roles
    pub fn new(user_id: impl Into<String>, roles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: roles.into_iter().map(Into::into).collect(),
            tenant_id: None,
            scopes: BTreeSet::new(),
            auth_source: AuthSource::Jwt,
        }
    }

    /// Anonymous principal (no roles, no tenant, no scopes)
    pub fn anonymous() -> Self {
        Self::new("anonymous", Vec::<String>::new())
    }

    /// Set the tenant
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// Mark the principal as API-key authenticated with the given scopes
    pub fn with_api_key_scopes(
        mut self,
        scopes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.auth_source = AuthSource::ApiKey;
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }
}

/// Action string of the form `"<resource_type>:<verb>"` (e.g. `tasks:write`)
///
/// The only wildcard form is `<resource_type>:*`, which matches every verb
/// for that resource type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(String);

/// Verbs treated as mutations for the ownership check
const MUTATING_VERBS: &[&str] = &["write", "delete", "create", "update"];

impl Action {
    /// Create a new action
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Full action string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Segment before the colon; for colon-less actions (e.g. `health`)
    /// the whole string
    pub fn resource_type(&self) -> &str {
        self.0.split(':').next().unwrap_or(&self.0)
    }

    /// Segment after the colon, if present
    pub fn verb(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, v)| v)
    }

    /// Wildcard pattern covering every verb of this action's resource type
    pub fn wildcard(&self) -> String {
        format!("{}:*", self.resource_type())
    }

    /// Whether the action mutates its target (gates the ownership check)
    pub fn is_mutating(&self) -> bool {
        self.verb().is_some_and(|v| MUTATING_VERBS.contains(&v))
    }

    /// Whether the action string is empty (malformed input)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Action {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Resource targeted by an action; absent for actions with no single
/// target (e.g. list operations)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Resource type (tasks, workers, sessions, ...)
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Resource identifier
    pub id: String,

    /// Owning user, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,

    /// Owning tenant, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

impl ResourceRef {
    /// Create a resource reference with no owner or tenant
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            owner_id: None,
            tenant_id: None,
        }
    }

    /// Set the owner
    pub fn with_owner(mut self, owner_id: impl Into<String>) -> Self {
        self.owner_id = Some(owner_id.into());
        self
    }

    /// Set the tenant
    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }
}

/// Wire input shared by the local and remote evaluation paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecideInput {
    /// Resolved principal
    pub user: Principal,

    /// Requested action
    pub action: Action,

    /// Optional target resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<ResourceRef>,
}

impl DecideInput {
    /// Build an input for an action with no single target
    pub fn new(user: Principal, action: impl Into<Action>) -> Self {
        Self {
            user,
            action: action.into(),
            resource: None,
        }
    }

    /// Attach a target resource
    pub fn with_resource(mut self, resource: ResourceRef) -> Self {
        self.resource = Some(resource);
        self
    }
}

/// Authorization verdict
///
/// `reasons` is non-empty exactly when `allowed` is false, and carries every
/// failing layer's explanation in pipeline order, not just the first. The
/// one exception is a fail-open allow, which is annotated with the
/// unreachability reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the request is allowed
    pub allowed: bool,

    /// Denial explanations, empty on allow
    #[serde(default)]
    pub reasons: Vec<String>,
}

impl Decision {
    /// Allow decision
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reasons: Vec::new(),
        }
    }

    /// Deny decision with a single reason
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reasons: vec![reason.into()],
        }
    }

    /// Deny decision with accumulated reasons
    pub fn deny_all(reasons: Vec<String>) -> Self {
        debug_assert!(!reasons.is_empty());
        Self {
            allowed: false,
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parsing() {
        let action = Action::new("tasks:write");
        assert_eq!(action.resource_type(), "tasks");
        assert_eq!(action.verb(), Some("write"));
        assert_eq!(action.wildcard(), "tasks:*");
        assert!(action.is_mutating());

        let read = Action::new("tasks:read");
        assert!(!read.is_mutating());

        let health = Action::new("health");
        assert_eq!(health.resource_type(), "health");
        assert_eq!(health.verb(), None);
        assert!(!health.is_mutating());
    }

    #[test]
    fn principal_builders() {
        let p = Principal::new("user:alice", ["operator"])
            .with_tenant("tenant-1")
            .with_api_key_scopes(["tasks:read", "tasks:write"]);

        assert_eq!(p.auth_source, AuthSource::ApiKey);
        assert_eq!(p.tenant_id.as_deref(), Some("tenant-1"));
        assert!(p.scopes.contains("tasks:write"));

        let anon = Principal::anonymous();
        assert!(anon.roles.is_empty());
        assert_eq!(anon.auth_source, AuthSource::Jwt);
    }

    #[test]
    fn decision_reasons_shape() {
        assert!(Decision::allow().reasons.is_empty());

        let deny = Decision::deny_all(vec![
            "role does not permit action".to_string(),
            "cross-tenant access denied".to_string(),
        ]);
        assert!(!deny.allowed);
        assert_eq!(deny.reasons.len(), 2);
    }

    #[test]
    fn decide_input_serializes_wire_shape() {
        let input = DecideInput::new(Principal::new("user:bob", ["viewer"]), "tasks:read")
            .with_resource(ResourceRef::new("tasks", "task-1").with_tenant("tenant-1"));

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["user"]["user_id"], "user:bob");
        assert_eq!(json["user"]["auth_source"], "jwt");
        assert_eq!(json["action"], "tasks:read");
        assert_eq!(json["resource"]["type"], "tasks");
    }
}
