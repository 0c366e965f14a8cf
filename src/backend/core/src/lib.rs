#![allow(clippy::result_large_err)]
//! # Pathwarden Core
//!
//! Role-based access control for HTTP services.
//!
//! ## Architecture
//!
//! - **RBAC**: Policy store, path patterns, role hierarchy resolution and the
//!   decision engine, plus a tower authorization layer
//! - **Middleware**: Header-based identity layer that attaches the subject
//! - **API**: The protected resource catalogue and router assembly
//! - **Telemetry**: Structured logging and metric descriptions
//! - **Config**: File and environment layered configuration

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod rbac;
pub mod telemetry;

pub use error::{ErrorCode, ErrorSeverity, PathwardenError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{ErrorCode, ErrorSeverity, PathwardenError, Result};
    pub use crate::middleware::{HeaderIdentityLayer, IdentityConfig};
    pub use crate::rbac::{
        authorize, AuthorizationError, AuthorizationLayer, ConfigError, EvaluationError,
        PolicyDecision, PolicyEngine, PolicyError, PolicyFormat, PolicyHandle, PolicySource,
        PolicyStore, RbacContext, ResourcePattern, RoleEdge, RoleId, RoleResolver, Rule,
        RuleSpec, Subject, UserId,
    };
}
