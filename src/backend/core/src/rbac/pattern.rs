//! Resource patterns and path matching.
//!
//! A pattern is a `/`-delimited template made of three kinds of segment:
//!
//! | Segment            | Matches                                              |
//! |--------------------|------------------------------------------------------|
//! | `exports`          | exactly that text (case-sensitive)                   |
//! | `:project`         | one path segment with a non-empty value              |
//! | `{project}`        | same as `:project`                                   |
//! | `*name` / `*`      | the rest of the path; must be last, needs a non-empty remainder |
//!
//! These mirror the templates used to register axum routes, so the same
//! strings can be used for routing and for policy.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::error::ConfigError;

/// Name under which an anonymous `*` wildcard binds its capture.
pub const ANONYMOUS_WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard(Option<String>),
}

impl Segment {
    fn binding(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Param(name) => Some(name.as_str()),
            Self::Wildcard(name) => name.as_deref(),
        }
    }
}

/// A parsed, validated resource pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourcePattern {
    source: String,
    segments: Vec<Segment>,
}

impl ResourcePattern {
    /// Parse and validate a pattern.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let rest = source
            .strip_prefix('/')
            .ok_or_else(|| ConfigError::invalid_pattern(source, "must start with '/'"))?;

        let mut segments: Vec<Segment> = Vec::new();
        let mut bound = HashSet::new();

        for raw in rest.split('/') {
            if matches!(segments.last(), Some(Segment::Wildcard(_))) {
                return Err(ConfigError::invalid_pattern(
                    source,
                    "wildcard must be the final segment",
                ));
            }

            let segment = parse_segment(source, raw)?;
            if let Some(name) = segment.binding() {
                if !bound.insert(name.to_string()) {
                    return Err(ConfigError::invalid_pattern(
                        source,
                        format!("duplicate parameter name '{}'", name),
                    ));
                }
            }
            segments.push(segment);
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn has_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard(_)))
    }

    /// Check whether `path` matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        self.walk(path, |_, _| {})
    }

    /// Match `path` and return the parameter bindings.
    ///
    /// Wildcard captures hold the remainder without its leading `/`.
    pub fn captures<'a>(&'a self, path: &'a str) -> Option<BTreeMap<&'a str, &'a str>> {
        let mut bindings = BTreeMap::new();
        self.walk(path, |name, value| {
            bindings.insert(name, value);
        })
        .then_some(bindings)
    }

    fn walk<'a>(&'a self, path: &'a str, mut bind: impl FnMut(&'a str, &'a str)) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };

        let mut cursor = Some(rest);
        for segment in &self.segments {
            let Some(current) = cursor else {
                return false;
            };

            if let Segment::Wildcard(name) = segment {
                if current.split('/').all(str::is_empty) {
                    return false;
                }
                bind(name.as_deref().unwrap_or(ANONYMOUS_WILDCARD), current);
                return true;
            }

            let (head, tail) = match current.split_once('/') {
                Some((head, tail)) => (head, Some(tail)),
                None => (current, None),
            };

            match segment {
                Segment::Literal(literal) if literal != head => return false,
                Segment::Param(_) if head.is_empty() => return false,
                Segment::Param(name) => bind(name.as_str(), head),
                _ => {}
            }
            cursor = tail;
        }

        cursor.is_none()
    }
}

impl fmt::Display for ResourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn parse_segment(source: &str, raw: &str) -> Result<Segment, ConfigError> {
    if let Some(name) = raw.strip_prefix(':') {
        validate_name(source, name)?;
        return Ok(Segment::Param(name.to_string()));
    }

    if let Some(name) = raw.strip_prefix('*') {
        if name.is_empty() {
            return Ok(Segment::Wildcard(None));
        }
        validate_name(source, name)?;
        return Ok(Segment::Wildcard(Some(name.to_string())));
    }

    if let Some(inner) = raw.strip_prefix('{') {
        let name = inner.strip_suffix('}').ok_or_else(|| {
            ConfigError::invalid_pattern(source, format!("unbalanced '{{' in segment '{}'", raw))
        })?;
        validate_name(source, name)?;
        return Ok(Segment::Param(name.to_string()));
    }

    if raw.contains(['{', '}']) {
        return Err(ConfigError::invalid_pattern(
            source,
            format!("unbalanced '}}' in segment '{}'", raw),
        ));
    }

    if raw.contains([':', '*']) {
        return Err(ConfigError::invalid_pattern(
            source,
            format!("partial-segment parameters are not supported: '{}'", raw),
        ));
    }

    Ok(Segment::Literal(raw.to_string()))
}

fn validate_name(source: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::invalid_pattern(source, "empty parameter name"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ConfigError::invalid_pattern(
            source,
            format!("invalid parameter name '{}'", name),
        ));
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(s: &str) -> ResourcePattern {
        ResourcePattern::parse(s).unwrap()
    }

    #[test]
    fn test_literal_match() {
        let p = pattern("/v1/projects");
        assert!(p.matches("/v1/projects"));
        assert!(!p.matches("/v1/Projects"));
        assert!(!p.matches("/v1/projects/"));
        assert!(!p.matches("/v1/projects/extra"));
        assert!(!p.matches("/v1"));
        assert!(!p.matches("v1/projects"));
    }

    #[test]
    fn test_root_pattern() {
        let p = pattern("/");
        assert!(p.matches("/"));
        assert!(!p.matches("/v1"));
    }

    #[test]
    fn test_param_match() {
        let p = pattern("/v1/exports/download/:namespace/:project");
        assert!(p.matches("/v1/exports/download/0/enwiki"));
        assert!(!p.matches("/v1/exports/download/0"));
        assert!(!p.matches("/v1/exports/download//enwiki"));
        assert!(!p.matches("/v1/exports/download/0/enwiki/extra"));
    }

    #[test]
    fn test_brace_param_match() {
        let p = pattern("/v1/exports/meta/{namespace}");
        assert!(p.matches("/v1/exports/meta/1"));
        assert!(!p.matches("/v1/exports/meta"));
    }

    #[test]
    fn test_wildcard_requires_remainder() {
        let p = pattern("/v1/pages/meta/:project/*name");
        assert!(p.has_wildcard());
        assert!(p.matches("/v1/pages/meta/enwiki/Main_Page"));
        assert!(p.matches("/v1/pages/meta/enwiki/Talk/Main_Page"));
        assert!(!p.matches("/v1/pages/meta/enwiki"));
        assert!(!p.matches("/v1/pages/meta/enwiki/"));
        assert!(!p.matches("/v1/pages/meta/enwiki//"));
    }

    #[test]
    fn test_anonymous_wildcard() {
        let p = pattern("/v1/*");
        assert!(p.matches("/v1/docs"));
        assert!(p.matches("/v1/a/b/c"));
        assert!(!p.matches("/v1"));
        assert!(!p.matches("/v2/docs"));
    }

    #[test]
    fn test_captures() {
        let p = pattern("/v1/pages/meta/:project/*name");
        let caps = p.captures("/v1/pages/meta/enwiki/Talk/Main_Page").unwrap();
        assert_eq!(caps.get("project"), Some(&"enwiki"));
        assert_eq!(caps.get("name"), Some(&"Talk/Main_Page"));
        assert!(p.captures("/v1/pages/meta/enwiki").is_none());

        let anon = pattern("/static/*");
        let caps = anon.captures("/static/css/site.css").unwrap();
        assert_eq!(caps.get(ANONYMOUS_WILDCARD), Some(&"css/site.css"));
    }

    #[test]
    fn test_malformed_patterns() {
        for bad in [
            "v1/projects",
            "/v1/:",
            "/v1/{ns",
            "/v1/ns}",
            "/v1/{}",
            "/v1/pa*th",
            "/v1/a:b",
            "/v1/*rest/more",
            "/v1/*/more",
            "/v1/:id/:id",
            "/v1/:na me",
        ] {
            let result = ResourcePattern::parse(bad);
            assert!(
                matches!(result, Err(ConfigError::InvalidPattern { .. })),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_display_round_trips_source() {
        let p = pattern("/v1/diffs/download/:date/:namespace/:project");
        assert_eq!(p.to_string(), "/v1/diffs/download/:date/:namespace/:project");
        assert_eq!(p.as_str(), p.to_string());
    }
}
