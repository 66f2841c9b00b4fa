//! # authzd
//!
//! Authorization decision engine: given an authenticated principal and a
//! requested action on an optional resource, produce an allow/deny verdict
//! with explanatory reasons.
//!
//! Three independent policy layers combine by logical AND:
//!
//! - **Roles**: the permission matrix maps role names to action patterns
//! - **Scopes**: API-key principals are narrowed to their key's scopes
//! - **Tenancy**: same-tenant access and ownership-gated mutation
//!
//! Evaluation runs either in-process or against a remote decision point
//! (HTTP sidecar); the two modes produce identical verdicts for identical
//! input and are selected once at engine construction.
//!
//! ## Example
//!
//! ```rust
//! use authzd::{DecideInput, Engine, EngineConfig, Principal, ResourceRef};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::with_builtin_matrix(EngineConfig::default())?;
//!
//!     let input = DecideInput::new(
//!         Principal::new("user:alice", ["operator"]).with_tenant("tenant-1"),
//!         "tasks:write",
//!     )
//!     .with_resource(
//!         ResourceRef::new("tasks", "task-42")
//!             .with_owner("user:alice")
//!             .with_tenant("tenant-1"),
//!     );
//!
//!     let decision = engine.decide(&input).await;
//!     assert!(decision.allowed);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod roles;
pub mod scope;
pub mod server;
pub mod tenant;
pub mod types;

// Re-export commonly used types
pub use cache::{CacheStats, DecisionCache};
pub use config::EngineConfig;
pub use engine::{BackendHealth, Denied, Engine, EvaluationBackend};
pub use error::{AuthzError, Result};
pub use matrix::PermissionMatrix;
pub use types::{Action, AuthSource, DecideInput, Decision, Principal, ResourceRef};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
