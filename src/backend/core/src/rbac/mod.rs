//! Role-Based Access Control (RBAC) decision engine.
//!
//! This module provides:
//! - **Models**: Role, Rule, RoleEdge and Subject data structures
//! - **Patterns**: Path templates with `:param` and trailing `*rest` segments
//! - **Store**: Rules indexed by role plus the inheritance graph
//! - **Resolver**: Transitive role closure with cycle tolerance
//! - **Policy Engine**: Allow/deny decisions for (subject, path, method)
//! - **Loaders**: TOML and Casbin-style CSV policy documents
//! - **Authorization Middleware**: Tower layer enforcing decisions per request
//!
//! # Usage
//!
//! ```rust,ignore
//! use pathwarden_core::rbac::{PolicyEngine, PolicySource, Subject};
//!
//! let source = PolicySource::from_csv_str("p, free, /v1/projects, GET\ng, unlimited, free")?;
//! let engine = PolicyEngine::from_source(source)?;
//!
//! let subject = Subject::new("alice", ["unlimited"]);
//! assert!(engine.decide(&subject, "/v1/projects", "GET")?.is_allowed());
//! ```

pub mod error;
pub mod handle;
pub mod loader;
pub mod middleware;
pub mod models;
pub mod pattern;
pub mod policy;
pub mod roles;
pub mod store;

pub use error::{AuthorizationError, ConfigError, EvaluationError, PolicyError};
pub use handle::PolicyHandle;
pub use loader::{PolicyFormat, PolicySource};
pub use middleware::{authorize, AuthorizationLayer, AuthorizationService, RbacContext};
pub use models::{Action, RoleEdge, RoleId, Rule, RuleSpec, Subject, UserId};
pub use pattern::ResourcePattern;
pub use policy::{Evaluation, PolicyDecision, PolicyEngine};
pub use roles::RoleResolver;
pub use store::PolicyStore;
