//! HTTP surface: the resource catalogue behind identity and authorization
//! layers.
//!
//! Request flow (outermost first):
//!
//! 1. `TraceLayer` - request/response spans
//! 2. `HeaderIdentityLayer` - attaches the `Subject`
//! 3. `AuthorizationLayer` - allow, 401 or 500
//! 4. catalogue handler

pub mod routes;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::{HeaderIdentityLayer, IdentityConfig};
use crate::rbac::{AuthorizationLayer, PolicyHandle};

pub use routes::{catalogue_router, paths};

/// Build the full application router.
pub fn build_router(handle: PolicyHandle, identity: IdentityConfig) -> Router {
    catalogue_router()
        .layer(AuthorizationLayer::new(handle))
        .layer(HeaderIdentityLayer::new(identity))
        .layer(TraceLayer::new_for_http())
}
