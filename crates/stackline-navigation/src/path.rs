use std::slice;

use crate::route::{NavTarget, NavValue};

/// An ordered list of navigation values: the declarative description of what
/// should be on the stack above the root.
///
/// Paths are plain values. Every modification returns a new path, so an app
/// edits one through its binding: `path.update(|p| p.appending(Detail(3)))`.
/// Equal values at different positions are allowed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NavigationPath {
    items: Vec<NavTarget>,
}

impl NavigationPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_targets(items: impl IntoIterator<Item = NavTarget>) -> Self {
        Self {
            items: items.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NavTarget> {
        self.items.get(index)
    }

    pub fn last(&self) -> Option<&NavTarget> {
        self.items.last()
    }

    pub fn iter(&self) -> slice::Iter<'_, NavTarget> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[NavTarget] {
        &self.items
    }

    pub fn appending<T: NavValue>(&self, value: T) -> Self {
        self.appending_target(NavTarget::new(value))
    }

    pub fn appending_target(&self, target: NavTarget) -> Self {
        let mut items = self.items.clone();
        items.push(target);
        Self { items }
    }

    /// Drops up to `k` trailing values.
    pub fn removing_last(&self, k: usize) -> Self {
        self.truncated(self.items.len().saturating_sub(k))
    }

    pub fn truncated(&self, len: usize) -> Self {
        Self {
            items: self.items.iter().take(len).cloned().collect(),
        }
    }
}

impl FromIterator<NavTarget> for NavigationPath {
    fn from_iter<I: IntoIterator<Item = NavTarget>>(iter: I) -> Self {
        Self::from_targets(iter)
    }
}

impl<'a> IntoIterator for &'a NavigationPath {
    type Item = &'a NavTarget;
    type IntoIter = slice::Iter<'a, NavTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Build a path from heterogeneous values: `nav_path!["a1", Detail(3)]`.
#[macro_export]
macro_rules! nav_path {
    () => { $crate::NavigationPath::new() };
    ($($value:expr),+ $(,)?) => {
        $crate::NavigationPath::from_targets([$($crate::NavTarget::new($value)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifications_leave_the_base_untouched() {
        let base = NavigationPath::new().appending("a").appending(2);
        let longer = base.appending("c");
        let shorter = base.removing_last(1);

        assert_eq!(base.len(), 2);
        assert_eq!(longer.len(), 3);
        assert_eq!(shorter.as_slice(), &[NavTarget::new("a")]);
    }

    #[test]
    fn removing_more_than_len_empties() {
        let p = crate::nav_path!["a", "b"];
        assert!(p.removing_last(5).is_empty());
    }

    #[test]
    fn duplicates_are_allowed() {
        let p = crate::nav_path!["a", "a"];
        assert_eq!(p.len(), 2);
        assert_eq!(p.get(0), p.get(1));
    }
}
