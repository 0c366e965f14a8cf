//! Header-based identity layer.
//!
//! Stands in for an upstream authenticator: it reads the username and the
//! group list from request headers and attaches a typed [`Subject`] to the
//! request extensions. Requests without a username header pass through with
//! no subject, which the authorization layer treats as an error.

use axum::{body::Body, extract::Request, http::HeaderMap};
use serde::Deserialize;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::trace;

use crate::rbac::Subject;

/// Header names and the group separator.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IdentityConfig {
    #[serde(default = "default_username_header")]
    pub username_header: String,

    #[serde(default = "default_groups_header")]
    pub groups_header: String,

    /// Separator between group names in the groups header
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            username_header: default_username_header(),
            groups_header: default_groups_header(),
            separator: default_separator(),
        }
    }
}

fn default_username_header() -> String {
    "x-username".to_string()
}

fn default_groups_header() -> String {
    "x-groups".to_string()
}

fn default_separator() -> String {
    ",".to_string()
}

/// Build a subject from request headers.
///
/// Returns `None` when the username header is missing or not valid UTF-8.
/// A missing groups header yields a subject with no roles.
pub fn subject_from_headers(headers: &HeaderMap, config: &IdentityConfig) -> Option<Subject> {
    let username = headers
        .get(config.username_header.as_str())?
        .to_str()
        .ok()?
        .trim();
    if username.is_empty() {
        return None;
    }

    let groups = headers
        .get_all(config.groups_header.as_str())
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(config.separator.as_str()))
        .map(|group| group.trim().to_string())
        .collect::<Vec<_>>();

    Some(Subject::new(username, groups))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tower Layer
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct HeaderIdentityLayer {
    config: IdentityConfig,
}

impl HeaderIdentityLayer {
    pub fn new(config: IdentityConfig) -> Self {
        Self { config }
    }
}

impl<S> Layer<S> for HeaderIdentityLayer {
    type Service = HeaderIdentityService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HeaderIdentityService {
            inner,
            config: self.config.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeaderIdentityService<S> {
    inner: S,
    config: IdentityConfig,
}

impl<S> Service<Request<Body>> for HeaderIdentityService<S>
where
    S: Service<Request<Body>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        // Only this layer attaches subjects.
        request.extensions_mut().remove::<Subject>();

        if let Some(subject) = subject_from_headers(request.headers(), &self.config) {
            trace!(user = %subject.username, roles = subject.roles.len(), "Subject attached");
            request.extensions_mut().insert(subject);
        }

        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_subject_from_headers() {
        let config = IdentityConfig::default();
        let subject = subject_from_headers(
            &headers(&[("x-username", "alice"), ("x-groups", "free, unlimited")]),
            &config,
        )
        .unwrap();

        assert_eq!(subject.username.as_str(), "alice");
        assert_eq!(subject.roles.len(), 2);
    }

    #[test]
    fn test_repeated_group_headers_merge() {
        let config = IdentityConfig::default();
        let subject = subject_from_headers(
            &headers(&[
                ("x-username", "alice"),
                ("x-groups", "free"),
                ("x-groups", "docs"),
            ]),
            &config,
        )
        .unwrap();
        assert_eq!(subject.roles.len(), 2);
    }

    #[test]
    fn test_missing_username_yields_no_subject() {
        let config = IdentityConfig::default();
        assert!(subject_from_headers(&headers(&[("x-groups", "free")]), &config).is_none());
        assert!(subject_from_headers(&headers(&[("x-username", "  ")]), &config).is_none());
    }

    #[test]
    fn test_missing_groups_yields_empty_roles() {
        let config = IdentityConfig::default();
        let subject = subject_from_headers(&headers(&[("x-username", "bob")]), &config).unwrap();
        assert!(!subject.has_roles());
    }

    #[test]
    fn test_custom_separator() {
        let config = IdentityConfig {
            separator: ";".into(),
            ..IdentityConfig::default()
        };
        let subject = subject_from_headers(
            &headers(&[("x-username", "carol"), ("x-groups", "free;docs")]),
            &config,
        )
        .unwrap();
        assert_eq!(subject.roles.len(), 2);
    }
}
