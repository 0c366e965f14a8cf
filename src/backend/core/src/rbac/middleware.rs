//! Tower authorization middleware.
//!
//! Reads the [`Subject`] placed in the request extensions by the identity
//! layer, asks the current [`PolicyEngine`] for a decision on the request's
//! path and method, and either forwards the request or answers it directly:
//!
//! | Outcome                         | Response                    |
//! |---------------------------------|-----------------------------|
//! | `Allow`                         | inner service               |
//! | `Deny`                          | 401 Unauthorized            |
//! | missing subject / eval failure  | 500 Internal Server Error   |

use axum::{
    body::Body,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use std::collections::BTreeSet;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::warn;

use super::error::AuthorizationError;
use super::handle::PolicyHandle;
use super::models::{RoleId, Subject, UserId};
use super::policy::{PolicyDecision, PolicyEngine};
use crate::error::{ErrorCode, PathwardenError};

// ═══════════════════════════════════════════════════════════════════════════════
// RBAC Context (extracted in handlers)
// ═══════════════════════════════════════════════════════════════════════════════

/// Inserted into request extensions once a request has been allowed, so
/// handlers can see who was authorized for what without re-evaluating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RbacContext {
    pub username: UserId,
    /// Direct roles of the subject, as presented.
    pub roles: BTreeSet<RoleId>,
    /// The method that was checked.
    pub action: String,
    /// The path that was checked.
    pub path: String,
}

/// Axum extractor for `RbacContext`.
///
/// Rejects with a 500 when the authorization layer is not installed, since
/// that is a wiring defect rather than a client error.
#[axum::async_trait]
impl<S> FromRequestParts<S> for RbacContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RbacContext>()
            .cloned()
            .ok_or_else(|| {
                PathwardenError::internal(
                    ErrorCode::InternalError,
                    "RbacContext requested but the authorization layer is not applied",
                )
                .into_response()
            })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Decision helper
// ═══════════════════════════════════════════════════════════════════════════════

/// Evaluate one request.
///
/// A missing subject is an error, never a deny.
pub fn authorize(
    engine: &PolicyEngine,
    subject: Option<&Subject>,
    path: &str,
    action: &str,
) -> Result<PolicyDecision, AuthorizationError> {
    let subject = subject.ok_or(AuthorizationError::MissingSubject)?;
    Ok(engine.decide(subject, path, action)?)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tower Layer
// ═══════════════════════════════════════════════════════════════════════════════

/// Layer that wraps services with policy enforcement.
///
/// # Example
///
/// ```rust,ignore
/// use pathwarden_core::rbac::{AuthorizationLayer, PolicyEngine, PolicyHandle};
///
/// let handle = PolicyHandle::new(PolicyEngine::from_file(path, None)?);
///
/// let app = Router::new()
///     .route("/v1/projects", get(list_projects))
///     .layer(AuthorizationLayer::new(handle.clone()))
///     .layer(HeaderIdentityLayer::new(identity));
/// ```
#[derive(Debug, Clone)]
pub struct AuthorizationLayer {
    handle: PolicyHandle,
}

impl AuthorizationLayer {
    pub fn new(handle: PolicyHandle) -> Self {
        Self { handle }
    }
}

impl<S> Layer<S> for AuthorizationLayer {
    type Service = AuthorizationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthorizationService {
            inner,
            handle: self.handle.clone(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tower Service
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct AuthorizationService<S> {
    inner: S,
    handle: PolicyHandle,
}

impl<S> Service<Request<Body>> for AuthorizationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        let engine = self.handle.snapshot();
        // Take the service that was driven to readiness.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let path = request.uri().path().to_string();
            let action = request.method().as_str().to_string();
            let subject = request.extensions().get::<Subject>().cloned();

            match authorize(&engine, subject.as_ref(), &path, &action) {
                Ok(PolicyDecision::Allow) => {}
                Ok(PolicyDecision::Deny) => {
                    warn!(
                        user = subject.as_ref().map(|s| s.username.as_str()).unwrap_or_default(),
                        action = %action,
                        path = %path,
                        "Access denied"
                    );
                    return Ok(PathwardenError::unauthorized().into_response());
                }
                Err(e) => {
                    if matches!(e, AuthorizationError::MissingSubject) {
                        warn!(action = %action, path = %path, "No subject on request");
                    }
                    return Ok(PathwardenError::from(e).into_response());
                }
            }

            if let Some(subject) = subject {
                request.extensions_mut().insert(RbacContext {
                    username: subject.username,
                    roles: subject.roles,
                    action,
                    path,
                });
            }

            inner.call(request).await
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
