//! Error types for the authorization engine
//!
//! Denials are not errors: a policy-governed miss resolves to a
//! `Decision` value. Errors here cover construction and transport only.

use thiserror::Error;

/// Authorization engine errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// Invalid permission matrix at startup (e.g. empty, or a role set
    /// escaping the admin superset)
    #[error("Invalid permission matrix: {0}")]
    InvalidMatrix(String),

    /// Remote decision point transport failure
    #[error("Decision point request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Remote decision point returned a body we could not interpret
    #[error("Invalid decision point response: {0}")]
    InvalidResponse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;
