//! API-key scope filter
//!
//! Scopes can only narrow a role-based allow; they never grant access the
//! role matrix denies. JWT-authenticated principals pass unfiltered.

use crate::types::{Action, AuthSource, Principal};

/// Pure filter over API-key scopes
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeFilter;

impl ScopeFilter {
    /// True unless the principal authenticated via API key and its scopes
    /// cover neither the action nor the action's `<type>:*` wildcard
    pub fn permits(principal: &Principal, action: &Action) -> bool {
        if principal.auth_source != AuthSource::ApiKey {
            return true;
        }
        principal.scopes.contains(action.as_str()) || principal.scopes.contains(&action.wildcard())
    }
}
