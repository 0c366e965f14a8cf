//! Swappable policy snapshots for hot reload.

use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use super::error::ConfigError;
use super::loader::PolicyFormat;
use super::policy::PolicyEngine;

/// Shared handle to the current [`PolicyEngine`].
///
/// Readers clone the inner `Arc` and release the lock immediately, so an
/// evaluation always runs against one consistent snapshot even if a reload
/// swaps the engine mid-request.
#[derive(Debug, Clone, Default)]
pub struct PolicyHandle {
    current: Arc<RwLock<Arc<PolicyEngine>>>,
}

impl PolicyHandle {
    pub fn new(engine: PolicyEngine) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(engine))),
        }
    }

    /// The engine in effect right now.
    pub fn snapshot(&self) -> Arc<PolicyEngine> {
        self.current.read().clone()
    }

    /// Install a new engine, returning the one it replaced.
    pub fn replace(&self, engine: PolicyEngine) -> Arc<PolicyEngine> {
        let next = Arc::new(engine);
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Rebuild the engine from `path` and swap it in.
    ///
    /// The file is parsed before the lock is taken. On failure the previous
    /// snapshot stays in effect.
    pub fn reload_from_file(
        &self,
        path: &Path,
        format: Option<PolicyFormat>,
    ) -> Result<(), ConfigError> {
        match PolicyEngine::from_file(path, format) {
            Ok(engine) => {
                let rules = engine.store().rule_count();
                let roles = engine.store().role_count();
                self.replace(engine);
                info!(path = %path.display(), rules, roles, "Policy reloaded");
                Ok(())
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "Policy reload failed, keeping previous policy"
                );
                Err(e)
            }
        }
    }
}

impl From<PolicyEngine> for PolicyHandle {
    fn from(engine: PolicyEngine) -> Self {
        Self::new(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::models::{RoleEdge, RuleSpec, Subject};
    use crate::rbac::store::PolicyStore;

    fn engine(rules: Vec<RuleSpec>) -> PolicyEngine {
        PolicyEngine::new(PolicyStore::load(rules, Vec::<RoleEdge>::new()).unwrap())
    }

    #[test]
    fn test_replace_swaps_snapshot() {
        let handle = PolicyHandle::new(PolicyEngine::default());
        let subject = Subject::new("alice", ["free"]);

        let before = handle.snapshot();
        handle.replace(engine(vec![RuleSpec::new("free", "/v1/projects", "GET")]));
        let after = handle.snapshot();

        // A snapshot taken before the swap keeps its view.
        assert!(before.decide(&subject, "/v1/projects", "GET").unwrap().is_denied());
        assert!(after.decide(&subject, "/v1/projects", "GET").unwrap().is_allowed());
    }

    #[test]
    fn test_clones_share_state() {
        let handle = PolicyHandle::default();
        let other = handle.clone();
        other.replace(engine(vec![RuleSpec::new("free", "/v1/docs", "*")]));
        assert_eq!(handle.snapshot().store().rule_count(), 1);
    }

    #[test]
    fn test_failed_reload_keeps_previous() {
        let handle = PolicyHandle::new(engine(vec![RuleSpec::new("free", "/v1/docs", "GET")]));
        let result = handle.reload_from_file(Path::new("/nonexistent/policy.csv"), None);
        assert!(matches!(result, Err(ConfigError::Io { .. })));
        assert_eq!(handle.snapshot().store().rule_count(), 1);
    }
}
