//! Authorization decision engine
//!
//! Orchestrates the public-action short-circuit, the verdict cache, and
//! the evaluation backend. The backend is selected once at construction
//! (strategy pattern); callers never branch on mode, and both backends
//! produce identical verdicts for identical input.

pub mod local;
pub mod remote;

pub use local::LocalEvaluator;
pub use remote::RemoteClient;

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{CacheKey, DecisionCache};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::matrix::PermissionMatrix;
use crate::types::{Action, DecideInput, Decision, Principal, ResourceRef};

/// Deny reason for a request missing its user or action
pub const REASON_INVALID_INPUT: &str = "invalid input";
/// Deny reason from the role stage
pub const REASON_ROLE: &str = "role does not permit action";
/// Deny reason from the API-key scope stage
pub const REASON_SCOPE: &str = "api key scope does not permit action";
/// Deny reason from the tenant-isolation stage
pub const REASON_TENANT: &str = "cross-tenant access denied";
/// Deny reason from the ownership stage
pub const REASON_OWNER: &str = "not resource owner";
/// Deny reason while the decision point is unreachable (fail-closed)
pub const REASON_UNREACHABLE: &str = "decision point unreachable";
/// Allow annotation while the decision point is unreachable (fail-open)
pub const REASON_UNREACHABLE_FAIL_OPEN: &str = "decision point unreachable - fail-open";

/// Evaluation backend, fixed at construction time
pub enum EvaluationBackend {
    /// In-process pipeline, zero network dependency
    Local(LocalEvaluator),
    /// HTTP sidecar decision point
    Remote(RemoteClient),
}

impl fmt::Debug for EvaluationBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(_) => f.write_str("EvaluationBackend::Local"),
            Self::Remote(client) => write!(f, "EvaluationBackend::Remote({})", client.url()),
        }
    }
}

/// Backend health surface consumed by the external health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct BackendHealth {
    /// "sidecar" or "local"
    pub mode: &'static str,
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// A denied request, carrying the full decision for the 403 body
#[derive(Debug, Clone)]
pub struct Denied {
    pub decision: Decision,
}

impl fmt::Display for Denied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "permission denied: {}", self.decision.reasons.join("; "))
    }
}

impl std::error::Error for Denied {}

/// The authorization decision engine
///
/// `decide` is a pure computation over immutable inputs plus the shared
/// cache; the engine is `Send + Sync` and safe to share behind an `Arc`
/// across request workers.
pub struct Engine {
    matrix: Arc<PermissionMatrix>,
    backend: EvaluationBackend,
    cache: DecisionCache,
    config: EngineConfig,
}

impl Engine {
    /// Build an engine over the given matrix and configuration
    ///
    /// Selects the local evaluator when `local-mode` is set or no
    /// `backend-url` is configured, otherwise the remote client.
    pub fn new(matrix: PermissionMatrix, config: EngineConfig) -> Result<Self> {
        let matrix = Arc::new(matrix);

        let backend = if config.is_local() {
            EvaluationBackend::Local(LocalEvaluator::new(matrix.clone()))
        } else {
            let url = config
                .backend_url
                .clone()
                .unwrap_or_default();
            EvaluationBackend::Remote(RemoteClient::new(url, config.timeout(), config.fail_open)?)
        };

        Ok(Self {
            matrix,
            backend,
            cache: DecisionCache::new(),
            config,
        })
    }

    /// Engine over the builtin permission matrix
    pub fn with_builtin_matrix(config: EngineConfig) -> Result<Self> {
        Self::new(PermissionMatrix::builtin(), config)
    }

    /// Produce a verdict for the input
    ///
    /// Public actions short-circuit to allow before the cache or backend is
    /// consulted. Malformed input (missing user or action) denies with
    /// `"invalid input"` - a caller bug, but never a panic. Everything else
    /// flows through cache, backend, cache-fill.
    pub async fn decide(&self, input: &DecideInput) -> Decision {
        if self.matrix.is_public(&input.action) {
            debug!(action = %input.action, "public action, allowed");
            return Decision::allow();
        }

        if input.user.user_id.is_empty() || input.action.is_empty() {
            warn!("decide called with missing user or action");
            return Decision::deny(REASON_INVALID_INPUT);
        }

        let key = CacheKey::new(
            &input.user.user_id,
            &input.action,
            input.resource.as_ref().map(|r| r.id.as_str()),
        );
        if let Some(cached) = self.cache.get(&key) {
            debug!(user = %input.user.user_id, action = %input.action, "cache hit");
            return cached;
        }

        let decision = match &self.backend {
            EvaluationBackend::Local(evaluator) => evaluator.evaluate(input),
            EvaluationBackend::Remote(client) => client.decide(input).await,
        };

        debug!(
            user = %input.user.user_id,
            action = %input.action,
            allowed = decision.allowed,
            "decision"
        );

        // Unreachability verdicts stay out of the cache: a cached fail-open
        // allow would outlive the outage and be more permissive than a
        // fresh evaluation after recovery.
        if !Self::is_unreachability_verdict(&decision) {
            self.cache.put(key, decision.clone(), self.config.cache_ttl());
        }
        decision
    }

    /// Gate a route on a permission, for the routing middleware
    ///
    /// Maps an allow to `Ok(())` and a deny to `Err(Denied)` carrying the
    /// decision, which the middleware renders as a 403.
    pub async fn require_permission(
        &self,
        principal: &Principal,
        action: impl Into<Action>,
        resource: Option<ResourceRef>,
    ) -> std::result::Result<(), Denied> {
        let mut input = DecideInput::new(principal.clone(), action.into());
        input.resource = resource;

        let decision = self.decide(&input).await;
        if decision.allowed {
            Ok(())
        } else {
            Err(Denied { decision })
        }
    }

    fn is_unreachability_verdict(decision: &Decision) -> bool {
        decision
            .reasons
            .iter()
            .any(|r| r == REASON_UNREACHABLE || r == REASON_UNREACHABLE_FAIL_OPEN)
    }

    /// Health surface for the external health endpoint
    pub fn health(&self) -> BackendHealth {
        match &self.backend {
            EvaluationBackend::Local(_) => BackendHealth {
                mode: "local",
                healthy: true,
                url: None,
            },
            EvaluationBackend::Remote(client) => BackendHealth {
                mode: "sidecar",
                healthy: client.is_healthy(),
                url: Some(client.url().to_string()),
            },
        }
    }

    /// Cache statistics
    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.cache.stats()
    }

    /// Drop expired cache entries
    pub fn sweep_cache(&self) {
        self.cache.sweep()
    }
}
