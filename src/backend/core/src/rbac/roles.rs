//! Role hierarchy resolution.
//!
//! Membership flows upward along `child -> parent` edges: a member of
//! `unlimited` that inherits from `free` is also a member of `free`, and of
//! everything `free` inherits from.

use std::collections::{HashSet, VecDeque};
use tracing::error;

use super::error::EvaluationError;
use super::models::RoleId;
use super::store::PolicyStore;

/// Computes transitive role closures over a [`PolicyStore`] hierarchy.
#[derive(Debug, Clone, Copy)]
pub struct RoleResolver<'a> {
    store: &'a PolicyStore,
}

impl<'a> RoleResolver<'a> {
    pub fn new(store: &'a PolicyStore) -> Self {
        Self { store }
    }

    /// Return `direct` plus every ancestor reachable through inheritance.
    ///
    /// Breadth-first with a visited set, so cycles terminate. Each role is
    /// expanded at most once; the step counter is bounded by the number of
    /// known roles plus the direct roles.
    pub fn closure<'r, I>(&self, direct: I) -> Result<HashSet<RoleId>, EvaluationError>
    where
        I: IntoIterator<Item = &'r RoleId>,
    {
        let mut visited: HashSet<RoleId> = HashSet::new();
        let mut queue: VecDeque<RoleId> = VecDeque::new();

        for role in direct {
            if visited.insert(role.clone()) {
                queue.push_back(role.clone());
            }
        }

        let bound = self.store.role_count() + visited.len();
        let mut steps = 0usize;

        while let Some(role) = queue.pop_front() {
            steps += 1;
            if steps > bound {
                error!(bound, "Role closure traversal exceeded its bound");
                return Err(EvaluationError::TraversalBoundExceeded { bound });
            }

            for parent in self.store.parents_of(&role) {
                if visited.insert(parent.clone()) {
                    queue.push_back(parent.clone());
                }
            }
        }

        Ok(visited)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::models::{RoleEdge, RuleSpec};

    fn store(edges: &[(&str, &str)]) -> PolicyStore {
        PolicyStore::load(
            Vec::<RuleSpec>::new(),
            edges.iter().map(|(c, p)| RoleEdge::new(*c, *p)),
        )
        .unwrap()
    }

    fn ids(names: &[&str]) -> Vec<RoleId> {
        names.iter().map(|n| RoleId::new(*n)).collect()
    }

    fn set(names: &[&str]) -> HashSet<RoleId> {
        ids(names).into_iter().collect()
    }

    #[test]
    fn test_direct_roles_always_included() {
        let store = PolicyStore::empty();
        let resolver = RoleResolver::new(&store);
        let closure = resolver.closure(&ids(&["new"])).unwrap();
        assert_eq!(closure, set(&["new"]));
    }

    #[test]
    fn test_transitive_chain() {
        let store = store(&[("admin", "unlimited"), ("unlimited", "free")]);
        let resolver = RoleResolver::new(&store);
        let closure = resolver.closure(&ids(&["admin"])).unwrap();
        assert_eq!(closure, set(&["admin", "unlimited", "free"]));

        // Inheritance does not flow downward.
        let closure = resolver.closure(&ids(&["free"])).unwrap();
        assert_eq!(closure, set(&["free"]));
    }

    #[test]
    fn test_multiple_parents_and_diamond() {
        let store = store(&[
            ("editor", "reader"),
            ("editor", "commenter"),
            ("reader", "base"),
            ("commenter", "base"),
        ]);
        let closure = RoleResolver::new(&store).closure(&ids(&["editor"])).unwrap();
        assert_eq!(closure, set(&["editor", "reader", "commenter", "base"]));
    }

    #[test]
    fn test_cycles_terminate() {
        let store = store(&[("a", "b"), ("b", "c"), ("c", "a"), ("d", "d")]);
        let resolver = RoleResolver::new(&store);
        assert_eq!(resolver.closure(&ids(&["a"])).unwrap(), set(&["a", "b", "c"]));
        assert_eq!(resolver.closure(&ids(&["d"])).unwrap(), set(&["d"]));
    }

    #[test]
    fn test_membership_independent_of_edge_order() {
        let edges = [("x", "y"), ("y", "z"), ("x", "w"), ("w", "z"), ("z", "root")];
        let mut reversed = edges;
        reversed.reverse();

        let forward = store(&edges);
        let backward = store(&reversed);
        let start = ids(&["x"]);

        assert_eq!(
            RoleResolver::new(&forward).closure(&start).unwrap(),
            RoleResolver::new(&backward).closure(&start).unwrap()
        );
    }

    #[test]
    fn test_empty_direct_set() {
        let store = store(&[("a", "b")]);
        assert!(RoleResolver::new(&store)
            .closure(std::iter::empty::<&RoleId>())
            .unwrap()
            .is_empty());
    }
}
