//! HTTP-level tests for the identity and authorization layers.
//!
//! Tests cover:
//! - Pass-through of allowed requests
//! - 401 for denied requests with a generic body
//! - 500 for a missing subject and for evaluation faults
//! - Policy hot reload through the shared handle

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::io::Write;
use tower::ServiceExt;

use pathwarden_core::api::{build_router, catalogue_router};
use pathwarden_core::middleware::IdentityConfig;
use pathwarden_core::rbac::{
    AuthorizationLayer, PolicyEngine, PolicyHandle, PolicySource, RbacContext,
};

const POLICY: &str = "\
p, new, /v1/docs, *
p, free, /v1/exports/download/:namespace/:project, GET
p, free, /v1/projects, GET
p, unlimited, /v1/page-delete, GET
p, unlimited, /v1/pages/meta/:project/*name, GET
g, free, new
g, unlimited, free
";

fn handle() -> PolicyHandle {
    let source = PolicySource::from_csv_str(POLICY).unwrap();
    PolicyHandle::new(PolicyEngine::from_source(source).unwrap())
}

fn app() -> Router {
    build_router(handle(), IdentityConfig::default())
}

fn request(method: &str, path: &str, groups: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header("x-username", "alice");
    if let Some(groups) = groups {
        builder = builder.header("x-groups", groups);
    }
    builder.body(Body::empty()).unwrap()
}

async fn status(app: Router, request: Request<Body>) -> StatusCode {
    app.oneshot(request).await.unwrap().status()
}

async fn json_body(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

// ============================================================================
// Allow / Deny
// ============================================================================

#[tokio::test]
async fn test_allowed_request_passes_through() {
    let status = status(
        app(),
        request("GET", "/v1/exports/download/0/enwiki", Some("free")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_inherited_grant_passes_through() {
    assert_eq!(
        status(app(), request("GET", "/v1/projects", Some("unlimited"))).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_denied_request_is_unauthorized() {
    let (status, body) = json_body(app(), request("GET", "/v1/page-delete", Some("new"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let text = body.to_string();
    assert!(!text.contains("page-delete"));
    assert!(!text.contains("unlimited"));
}

#[tokio::test]
async fn test_subject_without_groups_is_unauthorized() {
    assert_eq!(
        status(app(), request("GET", "/v1/docs", None)).await,
        StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        status(app(), request("GET", "/v1/docs", Some("new"))).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_any_of_several_groups_grants() {
    assert_eq!(
        status(app(), request("GET", "/v1/page-delete", Some("ghost, unlimited"))).await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_wildcard_route() {
    assert_eq!(
        status(
            app(),
            request("GET", "/v1/pages/meta/enwiki/Main_Page", Some("unlimited"))
        )
        .await,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_method_without_rule_never_succeeds() {
    assert_ne!(
        status(app(), request("DELETE", "/v1/projects", Some("free"))).await,
        StatusCode::OK
    );
}

// ============================================================================
// Errors
// ============================================================================

#[tokio::test]
async fn test_missing_username_is_server_error() {
    let request = Request::builder()
        .uri("/v1/docs")
        .header("x-groups", "new")
        .body(Body::empty())
        .unwrap();

    let (status, body) = json_body(app(), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "MISSING_SUBJECT");
    assert_eq!(body["error"]["message"], "Internal server error");
}

#[tokio::test]
async fn test_missing_identity_layer_is_server_error() {
    let app = catalogue_router().layer(AuthorizationLayer::new(handle()));
    assert_eq!(
        status(app, request("GET", "/v1/docs", Some("new"))).await,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_missing_authorization_layer_is_server_error() {
    // The handler's RbacContext extractor refuses to run unguarded.
    assert_eq!(
        status(catalogue_router(), request("GET", "/v1/docs", Some("new"))).await,
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_rbac_context_reaches_handler() {
    use axum::{routing::get, Json};

    async fn whoami(ctx: RbacContext) -> Json<Value> {
        Json(serde_json::json!({
            "user": ctx.username.as_str(),
            "action": ctx.action,
            "path": ctx.path,
            "roles": ctx.roles.iter().map(|r| r.as_str().to_string()).collect::<Vec<_>>(),
        }))
    }

    let app = Router::new()
        .route("/v1/projects", get(whoami))
        .layer(AuthorizationLayer::new(handle()))
        .layer(pathwarden_core::middleware::HeaderIdentityLayer::new(
            IdentityConfig::default(),
        ));

    let (status, body) = json_body(app, request("GET", "/v1/projects", Some("free"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], "alice");
    assert_eq!(body["action"], "GET");
    assert_eq!(body["path"], "/v1/projects");
    assert_eq!(body["roles"], serde_json::json!(["free"]));
}

// ============================================================================
// Hot reload
// ============================================================================

#[tokio::test]
async fn test_reload_takes_effect_for_new_requests() {
    let handle = handle();
    let app = build_router(handle.clone(), IdentityConfig::default());

    assert_eq!(
        status(app.clone(), request("GET", "/v1/page-delete", Some("free"))).await,
        StatusCode::UNAUTHORIZED
    );

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "p, free, /v1/page-delete, GET").unwrap();
    handle.reload_from_file(file.path(), None).unwrap();

    assert_eq!(
        status(app.clone(), request("GET", "/v1/page-delete", Some("free"))).await,
        StatusCode::OK
    );
    // The old grants are gone with the old snapshot.
    assert_eq!(
        status(app, request("GET", "/v1/projects", Some("free"))).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_failed_reload_keeps_serving_old_policy() {
    let handle = handle();
    let app = build_router(handle.clone(), IdentityConfig::default());

    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "p, free, /v1/{{broken, GET").unwrap();
    assert!(handle.reload_from_file(file.path(), None).is_err());

    assert_eq!(
        status(app, request("GET", "/v1/projects", Some("free"))).await,
        StatusCode::OK
    );
}
