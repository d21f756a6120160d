//! The imperative navigation host.
//!
//! A host owns the real, animated back stack. The navigator only ever asks it
//! for the current stack and issues single pushes and pops; it never caches
//! what the host returned across passes.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::namespace::ROOT_ROUTE;

/// Host-assigned id of a back stack entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostEntry {
    pub id: EntryId,
    pub route: String,
}

pub trait NavHost {
    /// Live entries, root first.
    fn current_stack(&self) -> Vec<HostEntry>;

    fn current_entry_id(&self) -> Option<EntryId> {
        self.current_stack().last().map(|e| e.id)
    }

    fn current_route(&self) -> Option<String> {
        self.current_stack().last().map(|e| e.route.clone())
    }

    /// Push a new entry for `route`. The entry shows up in the next
    /// `current_stack()`.
    fn push(&mut self, route: &str);

    /// Remove the top entry. Returns false if nothing was removed.
    fn pop(&mut self) -> bool;
}

pub type SharedHost = Rc<RefCell<dyn NavHost>>;

/// An operation the navigator issued against a `MemoryHost`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostOp {
    Push(String),
    Pop(EntryId),
}

/// In-memory host. Records every push/pop it is asked to perform; user-driven
/// pops (`user_back`) change the stack without being recorded.
pub struct MemoryHost {
    entries: Vec<HostEntry>,
    next_id: u64,
    ops: Vec<HostOp>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            entries: vec![HostEntry {
                id: EntryId(1),
                route: ROOT_ROUTE.to_string(),
            }],
            next_id: 2,
            ops: Vec::new(),
        }
    }

    pub fn shared() -> Rc<RefCell<MemoryHost>> {
        Rc::new(RefCell::new(MemoryHost::new()))
    }

    pub fn ops(&self) -> &[HostOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<HostOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn routes(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.route.clone()).collect()
    }

    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// System back gesture: drops the top entry (never the root) without
    /// recording an op.
    pub fn user_back(&mut self) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        self.entries.pop().is_some()
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl NavHost for MemoryHost {
    fn current_stack(&self) -> Vec<HostEntry> {
        self.entries.clone()
    }

    fn current_entry_id(&self) -> Option<EntryId> {
        self.entries.last().map(|e| e.id)
    }

    fn push(&mut self, route: &str) {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(HostEntry {
            id,
            route: route.to_string(),
        });
        self.ops.push(HostOp::Push(route.to_string()));
    }

    fn pop(&mut self) -> bool {
        // Don't pop the root
        if self.entries.len() <= 1 {
            return false;
        }
        match self.entries.pop() {
            Some(e) => {
                self.ops.push(HostOp::Pop(e.id));
                true
            }
            None => false,
        }
    }
}
