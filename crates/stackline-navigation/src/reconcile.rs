//! Path-to-stack diffing.
//!
//! `plan` compares the live stack with the declarative path and returns the
//! pops and pushes that make them agree. It only reads. The navigator applies
//! the plan, one host call per operation.

use smallvec::SmallVec;

use crate::host::HostEntry;
use crate::namespace::DestinationNamespace;
use crate::path::NavigationPath;
use crate::route::NavTarget;
use crate::store::BackStackStore;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Path values already matched by live entries.
    pub common_prefix: usize,
    /// Single pops to issue, top first.
    pub pops: usize,
    /// Values to push after popping, in order.
    pub pushes: SmallVec<[NavTarget; 4]>,
}

impl ReconcilePlan {
    pub fn is_noop(&self) -> bool {
        self.pops == 0 && self.pushes.is_empty()
    }

    pub fn operation_count(&self) -> usize {
        self.pops + self.pushes.len()
    }
}

/// Compute the operations that make `stack` match `path`.
///
/// The root (first live entry) is never compared. Neither are live entries
/// directly above it that have no metadata: they are treated as part of the
/// root and never popped. When the whole path is matched and everything above
/// it is an ad-hoc view push, the stack is left alone.
pub fn plan<V>(
    stack: &[HostEntry],
    path: &NavigationPath,
    store: &BackStackStore<V>,
    namespace: &DestinationNamespace,
) -> ReconcilePlan {
    if stack.is_empty() {
        return ReconcilePlan::default();
    }

    let mut live_index = 1;
    while live_index < stack.len() && !store.contains(stack[live_index].id) {
        live_index += 1;
    }

    // Figure out where the path and back stack first differ
    let mut path_index = 0;
    while path_index < path.len() && live_index < stack.len() {
        let target = store.get(stack[live_index].id).and_then(|e| e.target());
        if target != path.get(path_index) {
            break;
        }
        path_index += 1;
        live_index += 1;
    }

    let trailing = &stack[live_index..];
    if path_index == path.len() && trailing.iter().all(|e| namespace.is_view_route(&e.route)) {
        return ReconcilePlan {
            common_prefix: path_index,
            ..ReconcilePlan::default()
        };
    }

    ReconcilePlan {
        common_prefix: path_index,
        pops: trailing.len(),
        pushes: path.as_slice()[path_index..].iter().cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EntryId;
    use crate::nav_path;
    use crate::namespace::{DEFAULT_DESTINATION_COUNT, ROOT_ROUTE};
    use crate::store::BackStackEntry;

    struct Fixture {
        stack: Vec<HostEntry>,
        store: BackStackStore<()>,
        ns: DestinationNamespace,
        next: u64,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                stack: vec![HostEntry {
                    id: EntryId(1),
                    route: ROOT_ROUTE.into(),
                }],
                store: BackStackStore::new(),
                ns: DestinationNamespace::new(DEFAULT_DESTINATION_COUNT).unwrap(),
                next: 2,
            }
        }

        fn live(&mut self, route: &str, target: Option<NavTarget>) {
            let id = EntryId(self.next);
            self.next += 1;
            self.stack.push(HostEntry {
                id,
                route: route.into(),
            });
            if target.is_some() {
                self.store
                    .insert_if_absent(BackStackEntry::new(id, route, None, target));
            }
        }

        fn typed(&mut self, value: &'static str) {
            self.live(&format!("0/{value}"), Some(NavTarget::new(value)));
        }

        fn view(&mut self) {
            let (n, route) = self.ns.next_view_route();
            self.live(&route, Some(NavTarget::new(n)));
        }

        fn plan(&self, path: &NavigationPath) -> ReconcilePlan {
            plan(&self.stack, path, &self.store, &self.ns)
        }
    }

    #[test]
    fn converged_stack_needs_nothing() {
        let mut f = Fixture::new();
        f.typed("a1");
        f.typed("b1");
        let p = f.plan(&nav_path!["a1", "b1"]);
        assert!(p.is_noop());
        assert_eq!(p.common_prefix, 2);
    }

    #[test]
    fn appended_values_are_only_pushed() {
        let mut f = Fixture::new();
        f.typed("a1");
        let p = f.plan(&nav_path!["a1", "b1", "c1"]);
        assert_eq!(p.pops, 0);
        assert_eq!(p.pushes.as_slice(), &[NavTarget::new("b1"), NavTarget::new("c1")]);
    }

    #[test]
    fn divergence_pops_back_to_common_prefix() {
        let mut f = Fixture::new();
        f.typed("a1");
        f.typed("b1");
        f.typed("c1");
        let p = f.plan(&nav_path!["a1", "x"]);
        assert_eq!(p.common_prefix, 1);
        assert_eq!(p.pops, 2);
        assert_eq!(p.pushes.as_slice(), &[NavTarget::new("x")]);
    }

    #[test]
    fn empty_path_pops_everything_above_root() {
        let mut f = Fixture::new();
        f.typed("a1");
        f.typed("b1");
        let p = f.plan(&NavigationPath::new());
        assert_eq!(p.pops, 2);
        assert!(p.pushes.is_empty());
    }

    #[test]
    fn trailing_views_are_kept() {
        let mut f = Fixture::new();
        f.typed("a1");
        f.view();
        f.view();
        assert!(f.plan(&nav_path!["a1"]).is_noop());
    }

    #[test]
    fn views_before_new_values_are_popped() {
        let mut f = Fixture::new();
        f.typed("a1");
        f.view();
        let p = f.plan(&nav_path!["a1", "b1"]);
        assert_eq!(p.pops, 1);
        assert_eq!(p.pushes.as_slice(), &[NavTarget::new("b1")]);
    }

    #[test]
    fn typed_entry_above_matched_path_is_popped() {
        let mut f = Fixture::new();
        f.typed("a1");
        f.view();
        f.typed("b1");
        let p = f.plan(&nav_path!["a1"]);
        assert_eq!(p.pops, 2);
    }

    #[test]
    fn untracked_entries_above_root_are_never_popped() {
        let mut f = Fixture::new();
        f.live("legacy", None);
        f.typed("a1");
        assert!(f.plan(&nav_path!["a1"]).is_noop());
        let p = f.plan(&NavigationPath::new());
        assert_eq!(p.pops, 1);
    }

    #[test]
    fn equal_values_at_different_positions() {
        let mut f = Fixture::new();
        f.typed("a1");
        let p = f.plan(&nav_path!["a1", "a1"]);
        assert_eq!(p.pushes.as_slice(), &[NavTarget::new("a1")]);
    }
}
