//! Per-entry metadata keyed by host entry id.
//!
//! An entry is recorded once, right after the push that created it. It stays
//! in the store after the host has popped it, until a delayed prune removes
//! it: views animating out may still ask for their entry's metadata.

use std::cell::{OnceCell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use stackline_core::Binding;

use crate::host::EntryId;
use crate::namespace::ROOT_ROUTE;
use crate::registry::Destination;
use crate::route::NavTarget;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TitleDisplayMode {
    Automatic,
    Inline,
    Large,
}

pub struct BackStackEntry<V: 'static> {
    id: EntryId,
    route: String,
    destination: Option<Destination<V>>,
    target: Option<NavTarget>,
    title_display_mode: OnceCell<TitleDisplayMode>,
    /// Set to `false` when the host drops this entry.
    binding: RefCell<Option<Binding<bool>>>,
}

impl<V: 'static> BackStackEntry<V> {
    pub fn new(
        id: EntryId,
        route: impl Into<String>,
        destination: Option<Destination<V>>,
        target: Option<NavTarget>,
    ) -> Self {
        Self {
            id,
            route: route.into(),
            destination,
            target,
            title_display_mode: OnceCell::new(),
            binding: RefCell::new(None),
        }
    }

    pub fn root(id: EntryId) -> Self {
        Self::new(id, ROOT_ROUTE, None, None)
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn is_root(&self) -> bool {
        self.route == ROOT_ROUTE
    }

    pub fn target(&self) -> Option<&NavTarget> {
        self.target.as_ref()
    }

    pub fn destination(&self) -> Option<&Destination<V>> {
        self.destination.as_ref()
    }

    /// Build this entry's content. `None` for the root and for values that
    /// had no registered destination.
    pub fn render(&self) -> Option<V> {
        match (&self.destination, &self.target) {
            (Some(destination), Some(target)) => Some(destination(target)),
            _ => None,
        }
    }

    pub fn title_display_mode(&self) -> Option<TitleDisplayMode> {
        self.title_display_mode.get().copied()
    }

    /// Records `mode` unless one was recorded already. Returns the recorded mode.
    pub fn memoize_title_display_mode(&self, mode: TitleDisplayMode) -> TitleDisplayMode {
        *self.title_display_mode.get_or_init(|| mode)
    }

    pub fn attach_binding(&self, binding: Binding<bool>) {
        *self.binding.borrow_mut() = Some(binding);
    }

    pub fn has_binding(&self) -> bool {
        self.binding.borrow().is_some()
    }

    fn take_binding(&self) -> Option<Binding<bool>> {
        self.binding.borrow_mut().take()
    }

    pub fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            id: self.id,
            route: self.route.clone(),
            target: self.target.as_ref().map(NavTarget::to_json),
        }
    }
}

impl<V> fmt::Debug for BackStackEntry<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackStackEntry")
            .field("id", &self.id)
            .field("route", &self.route)
            .field("target", &self.target)
            .field("has_destination", &self.destination.is_some())
            .finish()
    }
}

/// Serialisable form of an entry: enough to rebuild it after the process is
/// recreated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub id: EntryId,
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<serde_json::Value>,
}

pub struct BackStackStore<V: 'static> {
    entries: HashMap<EntryId, Rc<BackStackEntry<V>>>,
}

impl<V: 'static> BackStackStore<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, id: EntryId) -> Option<&Rc<BackStackEntry<V>>> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.contains_key(&id)
    }

    /// The stored entry for `entry.id`, inserting `entry` if there is none.
    /// Existing metadata is never replaced.
    pub fn insert_if_absent(&mut self, entry: BackStackEntry<V>) -> Rc<BackStackEntry<V>> {
        self.entries
            .entry(entry.id)
            .or_insert_with(|| Rc::new(entry))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.entries.keys().copied()
    }

    /// Detach the bindings of every entry that is no longer live. Each binding
    /// is handed out once.
    pub fn take_dismissed_bindings(&self, live: &HashSet<EntryId>) -> Vec<Binding<bool>> {
        let mut ids: Vec<EntryId> = self
            .entries
            .keys()
            .filter(|id| !live.contains(id))
            .copied()
            .collect();
        ids.sort();
        ids.into_iter()
            .filter_map(|id| self.entries[&id].take_binding())
            .collect()
    }

    /// Drop entries for which `keep` is false. Returns how many were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(EntryId) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| keep(*id));
        before - self.entries.len()
    }

    /// Snapshots ordered by entry id.
    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        let mut out: Vec<EntrySnapshot> = self.entries.values().map(|e| e.snapshot()).collect();
        out.sort_by_key(|s| s.id);
        out
    }
}

impl<V: 'static> Default for BackStackStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
