//! Policy engine for evaluating authorization decisions.
//!
//! The policy engine answers the question:
//! "May a subject holding roles R perform action A on path P?"
//!
//! Evaluation is an existence check: the request is allowed if some role in
//! the subject's closure has some rule whose action and pattern both match.
//! Neither role order nor rule order affects the outcome.

use metrics::counter;
use std::path::Path;
use tracing::debug;

use super::error::{ConfigError, EvaluationError, PolicyError};
use super::loader::{PolicyFormat, PolicySource};
use super::models::{RoleId, Rule, Subject};
use super::roles::RoleResolver;
use super::store::PolicyStore;
use crate::telemetry::metrics::DECISIONS_TOTAL;

// ═══════════════════════════════════════════════════════════════════════════════
// Decision
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// The action is allowed.
    Allow,
    /// No rule grants the action.
    Deny,
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Deny => "deny",
        }
    }
}

/// A decision together with the rule that granted it, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation<'a> {
    pub decision: PolicyDecision,
    pub granted_by: Option<&'a Rule>,
}

impl Evaluation<'_> {
    fn deny() -> Self {
        Self {
            decision: PolicyDecision::Deny,
            granted_by: None,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Policy Engine
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable policy engine over a loaded [`PolicyStore`].
///
/// Share it behind an `Arc`; to change policy, build a new engine and swap
/// it in through a [`PolicyHandle`](super::handle::PolicyHandle).
#[derive(Debug, Default)]
pub struct PolicyEngine {
    store: PolicyStore,
}

impl PolicyEngine {
    pub fn new(store: PolicyStore) -> Self {
        Self { store }
    }

    /// Build an engine from a parsed policy source.
    pub fn from_source(source: PolicySource) -> Result<Self, ConfigError> {
        Ok(Self::new(source.into_store()?))
    }

    /// Read, parse and validate a policy file.
    pub fn from_file(path: &Path, format: Option<PolicyFormat>) -> Result<Self, ConfigError> {
        Self::from_source(PolicySource::from_file(path, format)?)
    }

    pub fn store(&self) -> &PolicyStore {
        &self.store
    }

    pub fn resolver(&self) -> RoleResolver<'_> {
        RoleResolver::new(&self.store)
    }

    /// Decide whether `subject` may perform `action` on `path`.
    pub fn decide(
        &self,
        subject: &Subject,
        path: &str,
        action: &str,
    ) -> Result<PolicyDecision, EvaluationError> {
        self.evaluate(subject, path, action).map(|e| e.decision)
    }

    /// Like [`decide`](Self::decide), but also reports the granting rule.
    pub fn evaluate(
        &self,
        subject: &Subject,
        path: &str,
        action: &str,
    ) -> Result<Evaluation<'_>, EvaluationError> {
        let result = self.evaluate_inner(subject, path, action);
        let outcome = match &result {
            Ok(evaluation) => evaluation.decision.as_str(),
            Err(_) => "error",
        };
        counter!(DECISIONS_TOTAL, "outcome" => outcome).increment(1);
        result
    }

    fn evaluate_inner(
        &self,
        subject: &Subject,
        path: &str,
        action: &str,
    ) -> Result<Evaluation<'_>, EvaluationError> {
        if !path.starts_with('/') {
            return Err(EvaluationError::InvalidRequestPath(path.to_string()));
        }

        if !subject.has_roles() {
            debug!(user = %subject.username, action, path, "Subject has no roles");
            return Ok(Evaluation::deny());
        }

        let closure = self.resolver().closure(&subject.roles)?;

        let granted_by = closure.iter().find_map(|role| {
            self.store
                .rules_for_role(role)
                .iter()
                .find(|rule| rule.grants(path, action))
        });

        match granted_by {
            Some(rule) => {
                debug!(
                    user = %subject.username,
                    action,
                    path,
                    role = %rule.role,
                    pattern = %rule.pattern,
                    "Access granted"
                );
                Ok(Evaluation {
                    decision: PolicyDecision::Allow,
                    granted_by: Some(rule),
                })
            }
            None => {
                debug!(
                    user = %subject.username,
                    action,
                    path,
                    roles = closure.len(),
                    "No rule grants access"
                );
                Ok(Evaluation::deny())
            }
        }
    }

    /// Convenience: returns `Ok(())` if allowed, `Err(PolicyError)` otherwise.
    pub fn enforce(&self, subject: &Subject, path: &str, action: &str) -> Result<(), PolicyError> {
        match self.decide(subject, path, action)? {
            PolicyDecision::Allow => Ok(()),
            PolicyDecision::Deny => Err(PolicyError::Denied {
                action: action.to_string(),
                path: path.to_string(),
            }),
        }
    }

    /// Every rule available to holders of `roles`, including inherited ones.
    pub fn effective_rules<'r, I>(&self, roles: I) -> Result<Vec<&Rule>, EvaluationError>
    where
        I: IntoIterator<Item = &'r RoleId>,
    {
        let closure = self.resolver().closure(roles)?;
        Ok(closure
            .iter()
            .flat_map(|role| self.store.rules_for_role(role))
            .collect())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
