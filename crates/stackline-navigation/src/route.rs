//! Route keys and type-erased target values.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use serde::Serialize;

/// Identity of a Rust type, usable as a map key.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with module paths stripped: `app::routes::Detail` -> `Detail`.
    pub fn short_name(&self) -> String {
        short_type_name(self.name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        match c {
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' => {
                out.push_str(last_segment(&segment));
                segment.clear();
                out.push(c);
            }
            _ => segment.push(c),
        }
    }
    out.push_str(last_segment(&segment));
    out
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Key a destination is registered under.
///
/// Values resolve to a key either through a user-supplied transformer (which
/// usually yields a `Tag`) or through their own type identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RouteKey {
    Tag(String),
    Type(TypeKey),
}

impl RouteKey {
    pub fn tag(tag: impl Into<String>) -> Self {
        RouteKey::Tag(tag.into())
    }

    pub fn of<T: Any>() -> Self {
        RouteKey::Type(TypeKey::of::<T>())
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteKey::Tag(tag) => f.write_str(tag),
            RouteKey::Type(ty) => f.write_str(&ty.short_name()),
        }
    }
}

impl From<&str> for RouteKey {
    fn from(tag: &str) -> Self {
        RouteKey::Tag(tag.to_string())
    }
}

impl From<String> for RouteKey {
    fn from(tag: String) -> Self {
        RouteKey::Tag(tag)
    }
}

impl From<TypeKey> for RouteKey {
    fn from(ty: TypeKey) -> Self {
        RouteKey::Type(ty)
    }
}

/// Anything that can sit in a navigation path.
///
/// Implemented for every `Eq + Hash + Serialize + Debug` type; values are
/// compared and hashed across types through the erased methods.
pub trait NavValue: Any + fmt::Debug {
    fn route_key(&self) -> RouteKey;
    fn to_json(&self) -> serde_json::Value;
    fn dyn_eq(&self, other: &dyn NavValue) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn as_any(&self) -> &dyn Any;
}

impl<T> NavValue for T
where
    T: Any + fmt::Debug + Eq + Hash + Serialize,
{
    fn route_key(&self) -> RouteKey {
        RouteKey::of::<T>()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            log::warn!("navigation value {self:?} does not serialize: {e}");
            serde_json::Value::Null
        })
    }

    fn dyn_eq(&self, other: &dyn NavValue) -> bool {
        other.as_any().downcast_ref::<T>().is_some_and(|o| o == self)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut state);
        self.hash(&mut state);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A shared, type-erased navigation value.
#[derive(Clone)]
pub struct NavTarget(Rc<dyn NavValue>);

impl NavTarget {
    pub fn new<T: NavValue>(value: T) -> Self {
        NavTarget(Rc::new(value))
    }

    pub fn route_key(&self) -> RouteKey {
        self.0.route_key()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.0.to_json()
    }

    /// Text form used inside a route: JSON strings appear bare, everything
    /// else as compact JSON. `/` is escaped since it separates route parts.
    pub fn route_value(&self) -> String {
        let raw = match self.to_json() {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        raw.replace('/', "%2F")
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.0.as_any().is::<T>()
    }
}

impl PartialEq for NavTarget {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(&*other.0)
    }
}
impl Eq for NavTarget {}

impl Hash for NavTarget {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.dyn_hash(state);
    }
}

impl fmt::Debug for NavTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, PartialEq, Eq, Hash, Serialize)]
    struct Detail {
        id: u32,
    }

    #[derive(Debug, PartialEq, Eq, Hash, Serialize)]
    struct Wrapper<T>(T);

    #[test]
    fn equal_values_of_same_type_compare_equal() {
        assert_eq!(NavTarget::new(Detail { id: 1 }), NavTarget::new(Detail { id: 1 }));
        assert_ne!(NavTarget::new(Detail { id: 1 }), NavTarget::new(Detail { id: 2 }));
    }

    #[test]
    fn values_of_different_types_never_compare_equal() {
        assert_ne!(NavTarget::new(1u32), NavTarget::new(1u64));
        assert_ne!(NavTarget::new("a".to_string()), NavTarget::new("a"));
    }

    #[test]
    fn route_value_strips_string_quotes_and_escapes_slashes() {
        assert_eq!(NavTarget::new("b1").route_value(), "b1");
        assert_eq!(NavTarget::new("a/b").route_value(), "a%2Fb");
        assert_eq!(NavTarget::new(42).route_value(), "42");
        assert_eq!(NavTarget::new(Detail { id: 7 }).route_value(), r#"{"id":7}"#);
    }

    #[test]
    fn type_keys_display_short_names() {
        assert_eq!(RouteKey::of::<Detail>().to_string(), "Detail");
        assert_eq!(RouteKey::of::<Wrapper<Detail>>().to_string(), "Wrapper<Detail>");
        assert_eq!(RouteKey::tag("settings").to_string(), "settings");
    }

    #[test]
    fn target_exposes_its_type() {
        let t = NavTarget::new(Detail { id: 3 });
        assert!(t.is::<Detail>());
        assert_eq!(t.downcast_ref::<Detail>().map(|d| d.id), Some(3));
        assert_eq!(t.route_key(), RouteKey::of::<Detail>());
    }
}
