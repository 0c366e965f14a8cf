//! In-memory policy store: rules indexed by role plus the role hierarchy.
//!
//! The store is built once by [`PolicyStore::load`] and never mutated
//! afterwards, so it can be shared across request handlers without locking.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::error::ConfigError;
use super::models::{RoleEdge, RoleId, Rule, RuleSpec};

/// Rules keyed by role and `child -> parents` inheritance edges.
#[derive(Debug, Default)]
pub struct PolicyStore {
    rules: HashMap<RoleId, Vec<Rule>>,
    parents: HashMap<RoleId, Vec<RoleId>>,
    roles: HashSet<RoleId>,
    rule_count: usize,
    edge_count: usize,
}

impl PolicyStore {
    /// A store with no rules and no roles. Every decision against it is a deny.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate and index a rule set and role hierarchy.
    ///
    /// Duplicate rules and duplicate edges are collapsed. Self-edges and
    /// cycles are accepted; the resolver tolerates them.
    pub fn load<R, E>(rules: R, edges: E) -> Result<Self, ConfigError>
    where
        R: IntoIterator<Item = RuleSpec>,
        E: IntoIterator<Item = RoleEdge>,
    {
        let mut store = Self::empty();

        for spec in rules {
            let rule = Rule::from_spec(&spec)?;
            store.roles.insert(rule.role.clone());
            let entry = store.rules.entry(rule.role.clone()).or_default();
            if !entry.contains(&rule) {
                entry.push(rule);
                store.rule_count += 1;
            }
        }

        for edge in edges {
            let child = RoleId::new(edge.child.as_str().trim());
            let parent = RoleId::new(edge.parent.as_str().trim());
            if child.is_empty() || parent.is_empty() {
                return Err(ConfigError::EmptyRole);
            }
            store.roles.insert(child.clone());
            store.roles.insert(parent.clone());
            let entry = store.parents.entry(child).or_default();
            if !entry.contains(&parent) {
                entry.push(parent);
                store.edge_count += 1;
            }
        }

        debug!(
            rules = store.rule_count,
            edges = store.edge_count,
            roles = store.roles.len(),
            "Policy store loaded"
        );

        Ok(store)
    }

    /// Every rule whose role is exactly `role`. No hierarchy expansion.
    pub fn rules_for_role(&self, role: &RoleId) -> &[Rule] {
        self.rules.get(role).map(Vec::as_slice).unwrap_or_default()
    }

    /// Direct parents of `role` in the hierarchy.
    pub fn parents_of(&self, role: &RoleId) -> &[RoleId] {
        self.parents.get(role).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every role mentioned by a rule or an edge.
    pub fn known_roles(&self) -> impl Iterator<Item = &RoleId> {
        self.roles.iter()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values().flatten()
    }

    pub fn role_count(&self) -> usize {
        self.roles.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(role: &str, resource: &str, action: &str) -> RuleSpec {
        RuleSpec::new(role, resource, action)
    }

    #[test]
    fn test_rules_for_role_exact_only() {
        let store = PolicyStore::load(
            vec![
                spec("free", "/v1/projects", "GET"),
                spec("free", "/v1/docs", "*"),
                spec("unlimited", "/v1/page-delete", "GET"),
            ],
            vec![RoleEdge::new("unlimited", "free")],
        )
        .unwrap();

        assert_eq!(store.rules_for_role(&RoleId::new("free")).len(), 2);
        // No hierarchy expansion at the store level.
        assert_eq!(store.rules_for_role(&RoleId::new("unlimited")).len(), 1);
        assert!(store.rules_for_role(&RoleId::new("missing")).is_empty());
    }

    #[test]
    fn test_counts_and_dedup() {
        let store = PolicyStore::load(
            vec![
                spec("free", "/v1/projects", "GET"),
                spec("free", "/v1/projects", "GET"),
            ],
            vec![
                RoleEdge::new("unlimited", "free"),
                RoleEdge::new("unlimited", "free"),
                RoleEdge::new("admin", "unlimited"),
            ],
        )
        .unwrap();

        assert_eq!(store.rule_count(), 1);
        assert_eq!(store.edge_count(), 2);
        assert_eq!(store.role_count(), 3);
        assert_eq!(store.rules().count(), 1);
        assert_eq!(
            store.parents_of(&RoleId::new("unlimited")),
            &[RoleId::new("free")]
        );
        assert!(store.parents_of(&RoleId::new("free")).is_empty());
    }

    #[test]
    fn test_load_rejects_bad_action() {
        let result = PolicyStore::load(
            vec![spec("free", "/v1/projects", "FETCH")],
            Vec::<RoleEdge>::new(),
        );
        assert!(matches!(result, Err(ConfigError::InvalidAction { .. })));
    }

    #[test]
    fn test_load_rejects_bad_pattern() {
        let result = PolicyStore::load(
            vec![spec("free", "/v1/{project", "GET")],
            Vec::<RoleEdge>::new(),
        );
        assert!(matches!(result, Err(ConfigError::InvalidPattern { .. })));
    }

    #[test]
    fn test_load_rejects_empty_edge_role() {
        let result =
            PolicyStore::load(Vec::<RuleSpec>::new(), vec![RoleEdge::new("", "free")]);
        assert!(matches!(result, Err(ConfigError::EmptyRole)));
    }

    #[test]
    fn test_cycles_are_accepted() {
        let store = PolicyStore::load(
            Vec::<RuleSpec>::new(),
            vec![
                RoleEdge::new("a", "b"),
                RoleEdge::new("b", "a"),
                RoleEdge::new("c", "c"),
            ],
        )
        .unwrap();
        assert_eq!(store.role_count(), 3);
    }
}
