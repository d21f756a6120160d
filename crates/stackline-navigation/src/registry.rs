use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use serde::de::DeserializeOwned;

use crate::error::{NavError, Result};
use crate::namespace::DestinationNamespace;
use crate::route::{NavTarget, NavValue, RouteKey};

/// Builds the screen content for a target value.
pub type Destination<V> = Rc<dyn Fn(&NavTarget) -> V>;

/// Rebuilds a target value from its JSON form on restore.
pub(crate) type Decoder = Rc<dyn Fn(&serde_json::Value) -> Option<NavTarget>>;

/// What a key resolved to. `key` is the key that actually matched, which may
/// be a fallback of the key that was asked for.
pub struct Resolved<V: 'static> {
    pub key: RouteKey,
    pub index: Option<usize>,
    pub destination: Destination<V>,
}

/// Destinations by key, plus the slot index each key was first given.
///
/// Registrations only accumulate. Re-registering a key replaces its builder but
/// keeps its slot.
pub struct RouteRegistry<V: 'static> {
    destinations: HashMap<RouteKey, Destination<V>>,
    indexes: HashMap<RouteKey, usize>,
    keys_by_index: Vec<RouteKey>,
    fallbacks: HashMap<RouteKey, Vec<RouteKey>>,
    decoders: HashMap<RouteKey, Decoder>,
    capacity: usize,
}

impl<V: 'static> RouteRegistry<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            destinations: HashMap::new(),
            indexes: HashMap::new(),
            keys_by_index: Vec::new(),
            fallbacks: HashMap::new(),
            decoders: HashMap::new(),
            capacity,
        }
    }

    /// Register (or replace) the destination for `key`. Returns the key's slot.
    pub fn register(&mut self, key: RouteKey, destination: Destination<V>) -> Result<usize> {
        let index = match self.indexes.get(&key) {
            Some(&index) => index,
            None => {
                if self.keys_by_index.len() >= self.capacity {
                    log::warn!(
                        "no slot left for destination `{key}` ({} in use)",
                        self.capacity
                    );
                    return Err(NavError::NamespaceExhausted {
                        capacity: self.capacity,
                    });
                }
                let index = self.keys_by_index.len();
                self.indexes.insert(key.clone(), index);
                self.keys_by_index.push(key.clone());
                log::debug!("destination `{key}` assigned slot {index}");
                index
            }
        };
        self.destinations.insert(key, destination);
        Ok(index)
    }

    /// Register under `T`'s type key and remember how to decode `T` on restore.
    pub fn register_type<T>(&mut self, destination: Destination<V>) -> Result<usize>
    where
        T: NavValue + DeserializeOwned,
    {
        let key = RouteKey::of::<T>();
        let index = self.register(key.clone(), destination)?;
        let decoder: Decoder = Rc::new(|json: &serde_json::Value| {
            serde_json::from_value::<T>(json.clone())
                .ok()
                .map(NavTarget::new)
        });
        self.decoders.insert(key, decoder);
        Ok(index)
    }

    /// Decode restored targets of `key`. Typed registrations get one
    /// automatically; tag keys need this to survive a restore.
    pub fn register_decoder(
        &mut self,
        key: RouteKey,
        decode: impl Fn(&serde_json::Value) -> Option<NavTarget> + 'static,
    ) {
        let decoder: Decoder = Rc::new(decode);
        self.decoders.insert(key, decoder);
    }

    /// Keys to try, in order, when `key` itself has no destination.
    ///
    /// Each fallback is resolved the same way, so chains nest: declaring
    /// `Leaf -> [Branch]` and `Branch -> [Root]` lets a `Leaf` value reach a
    /// destination registered for `Root`.
    pub fn declare_fallbacks(&mut self, key: RouteKey, parents: impl IntoIterator<Item = RouteKey>) {
        self.fallbacks.insert(key, parents.into_iter().collect());
    }

    pub fn lookup(&self, key: &RouteKey) -> Option<Resolved<V>> {
        let mut visited = HashSet::new();
        self.lookup_inner(key, &mut visited)
    }

    fn lookup_inner(&self, key: &RouteKey, visited: &mut HashSet<RouteKey>) -> Option<Resolved<V>> {
        if !visited.insert(key.clone()) {
            return None;
        }
        if let Some(destination) = self.destinations.get(key) {
            return Some(Resolved {
                key: key.clone(),
                index: self.indexes.get(key).copied(),
                destination: destination.clone(),
            });
        }
        self.fallbacks
            .get(key)?
            .iter()
            .find_map(|parent| self.lookup_inner(parent, visited))
    }

    pub fn index_of(&self, key: &RouteKey) -> Option<usize> {
        self.indexes.get(key).copied()
    }

    pub fn key_at(&self, index: usize) -> Option<&RouteKey> {
        self.keys_by_index.get(index)
    }

    pub(crate) fn decoder(&self, key: &RouteKey) -> Option<&Decoder> {
        self.decoders.get(key)
    }

    /// `"<slot>/<value>"` for a key with a slot, `"<key>?"` otherwise.
    pub fn route_for(&self, key: &RouteKey, value: &NavTarget) -> String {
        match self.index_of(key) {
            Some(index) => DestinationNamespace::route(index, &value.route_value()),
            None => sentinel_route(key),
        }
    }

    pub fn len(&self) -> usize {
        self.keys_by_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys_by_index.is_empty()
    }
}

pub(crate) fn sentinel_route(key: &RouteKey) -> String {
    format!("{key}?")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest(label: &'static str) -> Destination<String> {
        Rc::new(move |t: &NavTarget| format!("{label}:{}", t.route_value()))
    }

    fn render(registry: &RouteRegistry<String>, key: &RouteKey, value: &NavTarget) -> Option<String> {
        registry.lookup(key).map(|r| (r.destination)(value))
    }

    #[test]
    fn indexes_are_dense_and_stable() {
        let mut r = RouteRegistry::new(99);
        assert_eq!(r.register("a".into(), dest("a")).unwrap(), 0);
        assert_eq!(r.register("b".into(), dest("b")).unwrap(), 1);
        assert_eq!(r.register("a".into(), dest("a2")).unwrap(), 0);
        assert_eq!(r.len(), 2);

        let v = NavTarget::new("x");
        assert_eq!(render(&r, &"a".into(), &v).as_deref(), Some("a2:x"));
        assert_eq!(r.key_at(1), Some(&RouteKey::tag("b")));
    }

    #[test]
    fn exhausted_namespace_is_an_error() {
        let mut r = RouteRegistry::new(1);
        r.register("a".into(), dest("a")).unwrap();
        assert!(matches!(
            r.register("b".into(), dest("b")),
            Err(NavError::NamespaceExhausted { capacity: 1 })
        ));
        // Existing keys can still be replaced.
        assert!(r.register("a".into(), dest("a")).is_ok());
    }

    #[test]
    fn fallbacks_resolve_depth_first_in_declared_order() {
        let mut r = RouteRegistry::new(99);
        r.register("grand".into(), dest("grand")).unwrap();
        r.register("other".into(), dest("other")).unwrap();
        r.declare_fallbacks("leaf".into(), [RouteKey::tag("branch"), RouteKey::tag("other")]);
        r.declare_fallbacks("branch".into(), [RouteKey::tag("grand")]);

        let resolved = r.lookup(&"leaf".into()).unwrap();
        assert_eq!(resolved.key, RouteKey::tag("grand"));
        assert_eq!(resolved.index, Some(0));
    }

    #[test]
    fn cyclic_fallbacks_terminate() {
        let mut r: RouteRegistry<String> = RouteRegistry::new(99);
        r.declare_fallbacks("a".into(), [RouteKey::tag("b")]);
        r.declare_fallbacks("b".into(), [RouteKey::tag("a")]);
        assert!(r.lookup(&"a".into()).is_none());
    }

    #[test]
    fn routes_use_slot_or_sentinel() {
        let mut r = RouteRegistry::new(99);
        r.register("a".into(), dest("a")).unwrap();
        r.register("b".into(), dest("b")).unwrap();
        assert_eq!(r.route_for(&"b".into(), &NavTarget::new("b1")), "1/b1");
        assert_eq!(r.route_for(&"X".into(), &NavTarget::new("x")), "X?");
    }

    #[test]
    fn typed_registration_records_a_decoder() {
        let mut r = RouteRegistry::new(99);
        r.register_type::<u32>(dest("n")).unwrap();
        let decode = r.decoder(&RouteKey::of::<u32>()).unwrap();
        assert_eq!(decode(&serde_json::json!(7)), Some(NavTarget::new(7u32)));
        assert_eq!(decode(&serde_json::json!("nope")), None);
    }

    #[test]
    fn tag_keys_take_an_explicit_decoder() {
        let mut r = RouteRegistry::new(99);
        r.register("n".into(), dest("n")).unwrap();
        assert!(r.decoder(&"n".into()).is_none());
        r.register_decoder("n".into(), |json| json.as_u64().map(NavTarget::new));
        let decode = r.decoder(&"n".into()).unwrap();
        assert_eq!(decode(&serde_json::json!(3)), Some(NavTarget::new(3u64)));
    }
}
