//! Fixed route slots.
//!
//! Routes are addressed by slot index rather than by key because some hosts
//! reset their whole back stack when the *set* of routes they know changes.
//! With a fixed set of `N` slots the host never sees that set change, no matter
//! how many destinations get declared later. The last slot belongs to ad-hoc
//! view pushes, keeping them apart from typed routes.

use crate::error::{NavError, Result};

/// Route of the root entry.
pub const ROOT_ROUTE: &str = "navigationroot";

pub const DEFAULT_DESTINATION_COUNT: usize = 100;

#[derive(Debug)]
pub struct DestinationNamespace {
    size: usize,
    next_view_value: u64,
}

impl DestinationNamespace {
    pub fn new(size: usize) -> Result<Self> {
        if size < 2 {
            return Err(NavError::InvalidNamespaceSize(size));
        }
        Ok(Self {
            size,
            next_view_value: 0,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Slots available to registered keys.
    pub fn typed_capacity(&self) -> usize {
        self.size - 1
    }

    pub fn view_index(&self) -> usize {
        self.size - 1
    }

    pub fn route(index: usize, value: &str) -> String {
        format!("{index}/{value}")
    }

    pub fn view_prefix(&self) -> String {
        Self::route(self.view_index(), "")
    }

    pub fn is_view_route(&self, route: &str) -> bool {
        route.starts_with(&self.view_prefix())
    }

    /// Route for the next ad-hoc push: `99/0`, `99/1`, ... Each call yields a
    /// distinct route so the same view can be stacked repeatedly.
    pub fn next_view_route(&mut self) -> (u64, String) {
        let value = self.next_view_value;
        self.next_view_value += 1;
        (value, Self::route(self.view_index(), &value.to_string()))
    }

    /// Ensure future ad-hoc routes start after `value`.
    pub(crate) fn reserve_view_value(&mut self, value: u64) -> Result<()> {
        let next = value.checked_add(1).ok_or_else(|| {
            NavError::InvalidRoute(Self::route(self.view_index(), &value.to_string()))
        })?;
        self.next_view_value = self.next_view_value.max(next);
        Ok(())
    }

    /// Splits `"<index>/<value>"`. Returns `None` for the root and sentinel
    /// routes, an error for anything else that is not a slot route.
    pub fn parse_route(route: &str) -> Result<Option<(usize, &str)>> {
        if route == ROOT_ROUTE || (route.ends_with('?') && !route.contains('/')) {
            return Ok(None);
        }
        let (index, value) = route
            .split_once('/')
            .ok_or_else(|| NavError::InvalidRoute(route.to_string()))?;
        let index = index
            .parse::<usize>()
            .map_err(|_| NavError::InvalidRoute(route.to_string()))?;
        Ok(Some((index, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_routes_use_the_last_slot_and_never_repeat() {
        let mut ns = DestinationNamespace::new(DEFAULT_DESTINATION_COUNT).unwrap();
        assert_eq!(ns.next_view_route(), (0, "99/0".to_string()));
        assert_eq!(ns.next_view_route(), (1, "99/1".to_string()));
        assert!(ns.is_view_route("99/1"));
        assert!(!ns.is_view_route("9/1"));
        assert_eq!(ns.typed_capacity(), 99);
    }

    #[test]
    fn reserving_skips_past_restored_values() {
        let mut ns = DestinationNamespace::new(3).unwrap();
        ns.reserve_view_value(4).unwrap();
        ns.reserve_view_value(1).unwrap();
        assert_eq!(ns.next_view_route().1, "2/5");
    }

    #[test]
    fn reserving_the_last_value_is_rejected() {
        let mut ns = DestinationNamespace::new(3).unwrap();
        assert!(matches!(
            ns.reserve_view_value(u64::MAX),
            Err(NavError::InvalidRoute(_))
        ));
        assert_eq!(ns.next_view_route().1, "2/0");
    }

    #[test]
    fn too_small_namespace_is_rejected() {
        assert!(matches!(
            DestinationNamespace::new(1),
            Err(NavError::InvalidNamespaceSize(1))
        ));
    }

    #[test]
    fn parse_route_cases() {
        assert_eq!(DestinationNamespace::parse_route("3/a%2Fb").unwrap(), Some((3, "a%2Fb")));
        assert_eq!(DestinationNamespace::parse_route(ROOT_ROUTE).unwrap(), None);
        assert_eq!(DestinationNamespace::parse_route("Detail?").unwrap(), None);
        assert!(DestinationNamespace::parse_route("x/1").is_err());
        assert!(DestinationNamespace::parse_route("nonsense").is_err());
    }
}
