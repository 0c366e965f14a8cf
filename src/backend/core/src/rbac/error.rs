//! Error types for policy loading and evaluation.
//!
//! Load-time problems (`ConfigError`) are fatal to startup. Evaluation-time
//! faults (`EvaluationError`) are kept distinct from a `Deny` decision so the
//! middleware can fail closed with a server error instead of an access-denied
//! response.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating a policy.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid resource pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid action '{action}': expected an HTTP method or '*'")]
    InvalidAction { action: String },

    #[error("Role name must not be empty")]
    EmptyRole,

    #[error("Malformed policy line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Malformed TOML policy: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported policy format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read policy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub(crate) fn invalid_pattern(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}

/// Unexpected faults discovered while evaluating a request.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Request path is not absolute: '{0}'")]
    InvalidRequestPath(String),

    #[error("Role closure traversal exceeded its bound of {bound} steps")]
    TraversalBoundExceeded { bound: usize },
}

/// Errors produced at the request boundary before or during evaluation.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// No subject was attached to the request by the authentication layer.
    #[error("Missing subject in request context")]
    MissingSubject,

    #[error("Policy evaluation failed: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// Errors from the `PolicyEngine::enforce` convenience wrapper.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("Access denied for {action} {path}")]
    Denied { action: String, path: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}
