//! RBAC data models: identifiers, actions, rules, role edges, and subjects.

use axum::http::Method;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::error::ConfigError;
use super::pattern::ResourcePattern;

// ═══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed user identifier.
///
/// Carried for diagnostics and audit only; it is never compared with roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Strongly-typed role identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(pub String);

impl RoleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RoleId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RoleId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Action
// ═══════════════════════════════════════════════════════════════════════════════

/// Methods accepted in policy rules.
const RECOGNIZED_METHODS: &[Method] = &[
    Method::GET,
    Method::HEAD,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
    Method::CONNECT,
    Method::TRACE,
];

/// The action half of a rule: a concrete HTTP method or `*` for any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Any,
    Method(Method),
}

impl Action {
    /// Parse a rule action token. Method names are case-sensitive.
    pub fn parse(token: &str) -> Result<Self, ConfigError> {
        let token = token.trim();
        if token == "*" {
            return Ok(Self::Any);
        }
        RECOGNIZED_METHODS
            .iter()
            .find(|m| m.as_str() == token)
            .map(|m| Self::Method(m.clone()))
            .ok_or_else(|| ConfigError::InvalidAction {
                action: token.to_string(),
            })
    }

    /// Whether this rule action covers the requested action.
    pub fn permits(&self, requested: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Method(method) => method.as_str() == requested,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Any => "*",
            Self::Method(method) => method.as_str(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rules and role edges
// ═══════════════════════════════════════════════════════════════════════════════

/// An unvalidated rule as it appears in a policy source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub role: String,
    pub resource: String,
    pub action: String,
}

impl RuleSpec {
    pub fn new(
        role: impl Into<String>,
        resource: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            resource: resource.into(),
            action: action.into(),
        }
    }
}

/// A validated grant: members of `role` may perform `action` on `pattern`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Rule {
    pub role: RoleId,
    pub pattern: ResourcePattern,
    pub action: Action,
}

impl Rule {
    /// Validate a rule spec, parsing its pattern and action.
    pub fn from_spec(spec: &RuleSpec) -> Result<Self, ConfigError> {
        let role = RoleId::new(spec.role.trim());
        if role.is_empty() {
            return Err(ConfigError::EmptyRole);
        }
        Ok(Self {
            role,
            pattern: ResourcePattern::parse(spec.resource.trim())?,
            action: Action::parse(&spec.action)?,
        })
    }

    /// Whether this rule grants `action` on `path`.
    pub fn grants(&self, path: &str, action: &str) -> bool {
        self.action.permits(action) && self.pattern.matches(path)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.role, self.pattern, self.action)
    }
}

/// `child` inherits from `parent`: every member of `child` is also a member
/// of `parent`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleEdge {
    #[serde(rename = "role")]
    pub child: RoleId,
    pub parent: RoleId,
}

impl RoleEdge {
    pub fn new(child: impl Into<RoleId>, parent: impl Into<RoleId>) -> Self {
        Self {
            child: child.into(),
            parent: parent.into(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Subject
// ═══════════════════════════════════════════════════════════════════════════════

/// The authenticated caller as handed over by the identity layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    /// Username, used for logs only.
    pub username: UserId,
    /// Direct role memberships.
    pub roles: BTreeSet<RoleId>,
}

impl Subject {
    pub fn new<I, R>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleId>,
    {
        Self {
            username: UserId::new(username),
            roles: roles
                .into_iter()
                .map(Into::into)
                .filter(|r: &RoleId| !r.is_empty())
                .collect(),
        }
    }

    pub fn has_roles(&self) -> bool {
        !self.roles.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parse() {
        assert_eq!(Action::parse("GET").unwrap(), Action::Method(Method::GET));
        assert_eq!(Action::parse(" DELETE ").unwrap(), Action::Method(Method::DELETE));
        assert_eq!(Action::parse("*").unwrap(), Action::Any);
        assert!(matches!(
            Action::parse("get"),
            Err(ConfigError::InvalidAction { .. })
        ));
        assert!(Action::parse("FETCH").is_err());
        assert!(Action::parse("").is_err());
    }

    #[test]
    fn test_action_permits() {
        assert!(Action::Any.permits("DELETE"));
        assert!(Action::Method(Method::GET).permits("GET"));
        assert!(!Action::Method(Method::GET).permits("DELETE"));
        assert!(!Action::Method(Method::GET).permits("get"));
    }

    #[test]
    fn test_rule_from_spec() {
        let rule = Rule::from_spec(&RuleSpec::new("free", "/v1/projects", "GET")).unwrap();
        assert_eq!(rule.role.as_str(), "free");
        assert!(rule.grants("/v1/projects", "GET"));
        assert!(!rule.grants("/v1/projects", "POST"));

        assert!(matches!(
            Rule::from_spec(&RuleSpec::new("  ", "/v1/projects", "GET")),
            Err(ConfigError::EmptyRole)
        ));
        assert!(matches!(
            Rule::from_spec(&RuleSpec::new("free", "v1/projects", "GET")),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_subject_drops_blank_roles() {
        let subject = Subject::new("alice", ["free", "", "free", "unlimited"]);
        assert_eq!(subject.roles.len(), 2);
        assert!(subject.has_roles());

        let nobody = Subject::new("bob", Vec::<String>::new());
        assert!(!nobody.has_roles());
    }
}
