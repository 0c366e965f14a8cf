//! The protected resource catalogue.
//!
//! Every route answers `200 OK` once the authorization layer lets the
//! request through. The handlers exist so that policy can be exercised end
//! to end against a realistic route table.

use axum::{http::StatusCode, routing::get, Router};
use tracing::debug;

use crate::rbac::RbacContext;

/// Route templates, registered verbatim with axum.
pub mod paths {
    // Exports
    pub const EXPORTS_DOWNLOAD: &str = "/v1/exports/download/:namespace/:project";
    pub const EXPORTS_META_NAMESPACE: &str = "/v1/exports/meta/:namespace";
    pub const EXPORTS_META_PROJECT: &str = "/v1/exports/meta/:namespace/:project";

    // Diffs
    pub const DIFFS_DOWNLOAD: &str = "/v1/diffs/download/:date/:namespace/:project";
    pub const DIFFS_META_NAMESPACE: &str = "/v1/diffs/meta/:date/:namespace";
    pub const DIFFS_META_PROJECT: &str = "/v1/diffs/meta/:date/:namespace/:project";

    // Realtime
    pub const PAGE_DELETE: &str = "/v1/page-delete";
    pub const PAGE_UPDATE: &str = "/v1/page-update";
    pub const PAGE_VISIBILITY: &str = "/v1/page-visibility";

    // On-demand
    pub const PAGES_META: &str = "/v1/pages/meta/:project/*name";

    // Meta
    pub const PROJECTS: &str = "/v1/projects";
    pub const NAMESPACES: &str = "/v1/namespaces";

    // Open
    pub const DOCS: &str = "/v1/docs";
    pub const STATUS: &str = "/v1/status";

    /// Every catalogue route, in registration order.
    pub const ALL: &[&str] = &[
        EXPORTS_DOWNLOAD,
        EXPORTS_META_NAMESPACE,
        EXPORTS_META_PROJECT,
        DIFFS_DOWNLOAD,
        DIFFS_META_NAMESPACE,
        DIFFS_META_PROJECT,
        PAGE_DELETE,
        PAGE_UPDATE,
        PAGE_VISIBILITY,
        PAGES_META,
        PROJECTS,
        NAMESPACES,
        DOCS,
        STATUS,
    ];
}

/// Build the catalogue router without any authorization layers.
pub fn catalogue_router() -> Router {
    paths::ALL
        .iter()
        .fold(Router::new(), |router, path| router.route(path, get(granted)))
}

async fn granted(ctx: RbacContext) -> StatusCode {
    debug!(user = %ctx.username, action = %ctx.action, path = %ctx.path, "Serving request");
    StatusCode::OK
}
