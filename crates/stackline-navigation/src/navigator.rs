use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use slotmap::{SlotMap, new_key_type};
use stackline_core::{Binding, Clock, Dispose, TimerKey, TimerQueue, system_clock};

use crate::config::NavigatorConfig;
use crate::debounce::NavigationDebounce;
use crate::error::{NavError, Result};
use crate::host::{EntryId, HostEntry, SharedHost};
use crate::namespace::{DestinationNamespace, ROOT_ROUTE};
use crate::path::NavigationPath;
use crate::presentation::PresentationSync;
use crate::reconcile;
use crate::registry::{Destination, RouteRegistry, sentinel_route};
use crate::route::{NavTarget, NavValue, RouteKey};
use crate::store::{BackStackEntry, BackStackStore, EntrySnapshot, TitleDisplayMode};

/// Maps a value to the key of its destination, overriding its type identity.
pub type KeyTransformer = Rc<dyn Fn(&NavTarget) -> RouteKey>;

new_key_type! {
    pub struct PresentationKey;
}

/// Target of an ad-hoc view entry. Distinct from any app type, so a path
/// holding plain integers never matches a view push.
#[derive(Debug, PartialEq, Eq, Hash, Serialize)]
struct ViewSlot(u64);

struct State<V: 'static> {
    registry: RouteRegistry<V>,
    namespace: DestinationNamespace,
    store: BackStackStore<V>,
    path: Option<Binding<NavigationPath>>,
    key_transformer: Option<KeyTransformer>,
    /// Live ids the last prune was scheduled for.
    prune_scheduled_for: Option<Vec<EntryId>>,
    prune_timers: Vec<TimerKey>,
}

struct Inner<V: 'static> {
    host: SharedHost,
    config: NavigatorConfig,
    timers: Rc<TimerQueue>,
    debounce: Rc<NavigationDebounce>,
    state: RefCell<State<V>>,
    presentations: RefCell<SlotMap<PresentationKey, Rc<dyn PresentationSync<V>>>>,
}

impl<V: 'static> Drop for Inner<V> {
    fn drop(&mut self) {
        for key in self.state.get_mut().prune_timers.drain(..) {
            self.timers.cancel(key);
        }
    }
}

/// Keeps a host back stack in step with a declarative path and with
/// presentation bindings.
///
/// Call [`Navigator::reconcile`] once per render pass, and
/// [`Navigator::run_timers`] from the event loop so popped entries get pruned.
/// Clones share the same state.
pub struct Navigator<V: 'static> {
    inner: Rc<Inner<V>>,
}

impl<V: 'static> Clone for Navigator<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: 'static> Navigator<V> {
    pub fn new(host: SharedHost, config: NavigatorConfig) -> Result<Self> {
        Self::with_clock(host, config, system_clock())
    }

    pub fn with_clock(host: SharedHost, config: NavigatorConfig, clock: Rc<dyn Clock>) -> Result<Self> {
        let timers = Rc::new(TimerQueue::new(clock.clone()));
        let debounce = Rc::new(NavigationDebounce::new(clock, config.min_navigation_interval));
        Self::with_parts(host, config, timers, debounce)
    }

    /// Build on an existing timer queue and debounce, e.g. to share one
    /// debounce between several navigation stacks.
    pub fn with_parts(
        host: SharedHost,
        config: NavigatorConfig,
        timers: Rc<TimerQueue>,
        debounce: Rc<NavigationDebounce>,
    ) -> Result<Self> {
        let namespace = DestinationNamespace::new(config.destination_count)?;
        let state = State {
            registry: RouteRegistry::new(namespace.typed_capacity()),
            namespace,
            store: BackStackStore::new(),
            path: None,
            key_transformer: None,
            prune_scheduled_for: None,
            prune_timers: Vec::new(),
        };
        Ok(Self {
            inner: Rc::new(Inner {
                host,
                config,
                timers,
                debounce,
                state: RefCell::new(state),
                presentations: RefCell::new(SlotMap::with_key()),
            }),
        })
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.inner.config
    }

    pub fn timers(&self) -> &Rc<TimerQueue> {
        &self.inner.timers
    }

    pub fn debounce(&self) -> &Rc<NavigationDebounce> {
        &self.inner.debounce
    }

    // --- Destinations ---

    pub fn register_destination(
        &self,
        key: impl Into<RouteKey>,
        destination: impl Fn(&NavTarget) -> V + 'static,
    ) -> Result<usize> {
        let destination: Destination<V> = Rc::new(destination);
        self.inner
            .state
            .borrow_mut()
            .registry
            .register(key.into(), destination)
    }

    /// Register a destination for every value of type `T`. Entries for `T`
    /// can be rebuilt by [`Navigator::restore`].
    pub fn register_type<T>(&self, destination: impl Fn(&NavTarget) -> V + 'static) -> Result<usize>
    where
        T: NavValue + DeserializeOwned,
    {
        let destination: Destination<V> = Rc::new(destination);
        self.inner
            .state
            .borrow_mut()
            .registry
            .register_type::<T>(destination)
    }

    /// How to rebuild targets of a tag key on [`Navigator::restore`].
    pub fn register_decoder(
        &self,
        key: impl Into<RouteKey>,
        decode: impl Fn(&serde_json::Value) -> Option<NavTarget> + 'static,
    ) {
        self.inner
            .state
            .borrow_mut()
            .registry
            .register_decoder(key.into(), decode);
    }

    pub fn declare_fallbacks(&self, key: impl Into<RouteKey>, parents: impl IntoIterator<Item = RouteKey>) {
        self.inner
            .state
            .borrow_mut()
            .registry
            .declare_fallbacks(key.into(), parents);
    }

    pub fn set_key_transformer(&self, transformer: impl Fn(&NavTarget) -> RouteKey + 'static) {
        self.inner.state.borrow_mut().key_transformer = Some(Rc::new(transformer));
    }

    pub fn clear_key_transformer(&self) {
        self.inner.state.borrow_mut().key_transformer = None;
    }

    // --- Path ---

    pub fn bind_path(&self, path: Binding<NavigationPath>) {
        self.inner.state.borrow_mut().path = Some(path);
    }

    pub fn unbind_path(&self) {
        self.inner.state.borrow_mut().path = None;
    }

    fn path_binding(&self) -> Option<Binding<NavigationPath>> {
        self.inner.state.borrow().path.clone()
    }

    // --- Navigation ---

    /// Navigate to `value`. With a bound path the value is appended to it and
    /// pushed on the next pass; otherwise it is pushed right away.
    ///
    /// Returns false if the request was debounced or nothing could be pushed.
    pub fn navigate<T: NavValue>(&self, value: T) -> bool {
        self.navigate_target(NavTarget::new(value))
    }

    pub fn navigate_target(&self, target: NavTarget) -> bool {
        if !self.inner.debounce.accept() {
            log::debug!("navigation to {target:?} dropped (debounced)");
            return false;
        }
        match self.path_binding() {
            Some(path) => {
                path.update(|p| p.appending_target(target));
                true
            }
            None => self.push_keyed(target),
        }
    }

    /// Push `view` outside the typed path. Returns the new entry's id.
    pub fn navigate_to_view(&self, view: V) -> Option<EntryId>
    where
        V: Clone,
    {
        if !self.inner.debounce.accept() {
            log::debug!("view navigation dropped (debounced)");
            return None;
        }
        self.push_view(view, None)
    }

    pub fn navigate_back(&self) {
        let top_is_view = {
            let route = self.inner.host.borrow().current_route();
            let st = self.inner.state.borrow();
            route.is_some_and(|r| st.namespace.is_view_route(&r))
        };
        // Views pushed outside the path are not in it, so pop them directly.
        if top_is_view {
            self.pop_top();
            return;
        }
        match self.path_binding() {
            Some(path) => path.update(|p| p.removing_last(1)),
            None => {
                if !self.is_root() {
                    self.pop_top();
                }
            }
        }
    }

    /// Whether the stack holds only the root.
    pub fn is_root(&self) -> bool {
        self.inner.host.borrow().current_stack().len() <= 1
    }

    pub fn is_presented(&self, id: EntryId, as_top: bool) -> bool {
        let stack = self.inner.host.borrow().current_stack();
        if as_top {
            return stack.last().is_some_and(|e| e.id == id);
        }
        stack.iter().any(|e| e.id == id)
    }

    pub(crate) fn push_view(&self, view: V, binding: Option<Binding<bool>>) -> Option<EntryId>
    where
        V: Clone,
    {
        let (value, route) = self.inner.state.borrow_mut().namespace.next_view_route();
        let destination: Destination<V> = Rc::new(move |_: &NavTarget| view.clone());
        self.push_route(&route, Some(destination), NavTarget::new(ViewSlot(value)), binding)
    }

    pub(crate) fn pop_top(&self) -> bool {
        let popped = self.inner.host.borrow_mut().pop();
        if popped {
            log::debug!("pop");
        }
        popped
    }

    fn resolve_key(&self, target: &NavTarget) -> RouteKey {
        let transformer = self.inner.state.borrow().key_transformer.clone();
        match transformer {
            Some(transform) => transform(target),
            None => target.route_key(),
        }
    }

    fn push_keyed(&self, target: NavTarget) -> bool {
        let key = self.resolve_key(&target);
        let (route, destination) = {
            let st = self.inner.state.borrow();
            match st.registry.lookup(&key) {
                Some(resolved) => (
                    st.registry.route_for(&resolved.key, &target),
                    Some(resolved.destination),
                ),
                None if self.inner.config.push_unregistered => {
                    log::warn!("no destination for `{key}`; pushing placeholder route");
                    (sentinel_route(&key), None)
                }
                None => {
                    log::warn!("no destination for `{key}`; ignoring navigation");
                    return false;
                }
            }
        };
        self.push_route(&route, destination, target, None).is_some()
    }

    fn push_route(
        &self,
        route: &str,
        destination: Option<Destination<V>>,
        target: NavTarget,
        binding: Option<Binding<bool>>,
    ) -> Option<EntryId> {
        self.inner.host.borrow_mut().push(route);
        let id = self.inner.host.borrow().current_entry_id();
        let Some(id) = id else {
            log::warn!("host produced no entry for `{route}`");
            return None;
        };
        let entry = self.inner.state.borrow_mut().store.insert_if_absent(BackStackEntry::new(
            id,
            route,
            destination,
            Some(target),
        ));
        if let Some(binding) = binding {
            entry.attach_binding(binding);
        }
        log::debug!("push `{route}` -> {id}");
        Some(id)
    }

    // --- Entry metadata ---

    /// Metadata for a live or recently popped entry. The root's metadata is
    /// created on first request.
    pub fn state_for(&self, id: EntryId) -> Option<Rc<BackStackEntry<V>>> {
        if let Some(entry) = self.inner.state.borrow().store.get(id) {
            return Some(entry.clone());
        }
        let root = self.inner.host.borrow().current_stack().first().map(|e| e.id);
        if root != Some(id) {
            return None;
        }
        Some(
            self.inner
                .state
                .borrow_mut()
                .store
                .insert_if_absent(BackStackEntry::root(id)),
        )
    }

    /// Build the content of an entry.
    pub fn render(&self, id: EntryId) -> Option<V> {
        self.state_for(id)?.render()
    }

    /// The title display mode an entry should use.
    ///
    /// An explicit preference is remembered on the entry. Without one, an
    /// untitled entry is inline and a titled entry inherits the nearest mode
    /// remembered below it.
    pub fn title_display_mode(
        &self,
        id: EntryId,
        has_title: bool,
        preference: Option<TitleDisplayMode>,
    ) -> TitleDisplayMode {
        if let Some(preference) = preference {
            if let Some(entry) = self.state_for(id) {
                entry.memoize_title_display_mode(preference);
            }
            return preference;
        }
        if !has_title {
            return TitleDisplayMode::Inline;
        }

        let stack = self.inner.host.borrow().current_stack();
        let st = self.inner.state.borrow();
        stack
            .iter()
            .take_while(|e| e.id != id)
            .filter_map(|e| st.store.get(e.id).and_then(|s| s.title_display_mode()))
            .last()
            .unwrap_or(TitleDisplayMode::Automatic)
    }

    pub fn stored_entry_count(&self) -> usize {
        self.inner.state.borrow().store.len()
    }

    // --- Render pass ---

    /// One render pass: sync the store with the host, reconcile the path, then
    /// sync every attached presentation.
    pub fn reconcile(&self) {
        self.sync_state();
        self.navigate_to_path();
        self.sync_presentations();
    }

    /// Fire due timers (the delayed prune). Call from the event loop.
    pub fn run_timers(&self) -> usize {
        self.inner.timers.run_due()
    }

    /// Re-sync `presentation` on every pass until the returned guard runs.
    pub fn attach(&self, presentation: Rc<dyn PresentationSync<V>>) -> Dispose {
        let key = self.inner.presentations.borrow_mut().insert(presentation);
        let weak = Rc::downgrade(&self.inner);
        Dispose::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.presentations.borrow_mut().remove(key);
            }
        })
    }

    fn sync_state(&self) {
        let live: Vec<EntryId> = self
            .inner
            .host
            .borrow()
            .current_stack()
            .iter()
            .map(|e| e.id)
            .collect();
        let live_set: HashSet<EntryId> = live.iter().copied().collect();

        // Flip bindings of popped entries right away so nothing re-presents a
        // view that is on its way out.
        let dismissed = self.inner.state.borrow().store.take_dismissed_bindings(&live_set);
        for binding in dismissed {
            binding.set(false);
        }

        self.schedule_prune(live, live_set);
    }

    fn schedule_prune(&self, live: Vec<EntryId>, live_set: HashSet<EntryId>) {
        let mut st = self.inner.state.borrow_mut();
        if st.prune_scheduled_for.as_ref() == Some(&live) {
            return;
        }
        let timers = &self.inner.timers;
        st.prune_timers.retain(|key| timers.is_pending(*key));

        let weak = Rc::downgrade(&self.inner);
        let key = timers.schedule(self.inner.config.prune_delay, move || {
            if let Some(inner) = weak.upgrade() {
                Navigator { inner }.prune(&live_set);
            }
        });
        st.prune_timers.push(key);
        st.prune_scheduled_for = Some(live);
    }

    /// Drops entries that were already gone when this prune was scheduled and
    /// are still gone now.
    fn prune(&self, live_when_scheduled: &HashSet<EntryId>) {
        let live_now: HashSet<EntryId> = self
            .inner
            .host
            .borrow()
            .current_stack()
            .iter()
            .map(|e| e.id)
            .collect();
        let removed = self
            .inner
            .state
            .borrow_mut()
            .store
            .retain(|id| live_when_scheduled.contains(&id) || live_now.contains(&id));
        if removed > 0 {
            log::debug!("pruned {removed} popped entries");
        }
    }

    fn navigate_to_path(&self) {
        let Some(binding) = self.path_binding() else {
            return;
        };
        let path = binding.get();
        let stack = self.inner.host.borrow().current_stack();
        let plan = {
            let st = self.inner.state.borrow();
            reconcile::plan(&stack, &path, &st.store, &st.namespace)
        };
        if plan.is_noop() {
            return;
        }
        log::debug!(
            "reconcile: keep {}, pop {}, push {}",
            plan.common_prefix,
            plan.pops,
            plan.pushes.len()
        );
        for _ in 0..plan.pops {
            if !self.pop_top() {
                log::warn!("host refused a pop while reconciling path");
                break;
            }
        }
        for target in plan.pushes {
            // Nothing goes above a skipped value; it would never match the path.
            if !self.push_keyed(target) {
                break;
            }
        }
    }

    fn sync_presentations(&self) {
        let presentations: Vec<Rc<dyn PresentationSync<V>>> =
            self.inner.presentations.borrow().values().cloned().collect();
        for presentation in presentations {
            presentation.sync(self);
        }
    }

    // --- Snapshots ---

    pub fn snapshot(&self) -> Vec<EntrySnapshot> {
        self.inner.state.borrow().store.snapshot()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    pub fn restore_json(&self, json: &str) -> Result<usize> {
        let snapshots: Vec<EntrySnapshot> = serde_json::from_str(json)?;
        self.restore(&snapshots)
    }

    /// Rebuild metadata for live entries from snapshots. Entries no longer on
    /// the host's stack are skipped. Returns how many entries were restored.
    ///
    /// Every snapshot is checked before anything is stored, so an error
    /// leaves the store untouched. Targets are decoded with the decoder of
    /// their key: `register_type` records one, tag keys need
    /// [`Navigator::register_decoder`]. Entries restored without a target no
    /// longer match the path and are replaced on the next pass.
    pub fn restore(&self, snapshots: &[EntrySnapshot]) -> Result<usize> {
        let live: HashSet<EntryId> = self
            .inner
            .host
            .borrow()
            .current_stack()
            .iter()
            .map(|e| e.id)
            .collect();
        let mut st = self.inner.state.borrow_mut();
        let mut entries = Vec::new();
        let mut last_view_value = None;
        for snap in snapshots {
            if !live.contains(&snap.id) || st.store.contains(snap.id) {
                continue;
            }
            let (entry, view_value) = st.rebuild(snap)?;
            last_view_value = last_view_value.max(view_value);
            entries.push(entry);
        }

        if let Some(value) = last_view_value {
            st.namespace.reserve_view_value(value)?;
        }
        let restored = entries.len();
        for entry in entries {
            st.store.insert_if_absent(entry);
        }
        Ok(restored)
    }

    /// The live stack as `root > 0/a1 > 99/0`.
    pub fn describe_stack(&self) -> String {
        let stack: Vec<HostEntry> = self.inner.host.borrow().current_stack();
        stack
            .iter()
            .map(|e| if e.route == ROOT_ROUTE { "root" } else { e.route.as_str() })
            .collect::<Vec<_>>()
            .join(" > ")
    }
}

impl<V: 'static> State<V> {
    /// The entry for `snap`, plus its ad-hoc view slot number if it is a view.
    fn rebuild(&self, snap: &EntrySnapshot) -> Result<(BackStackEntry<V>, Option<u64>)> {
        let Some((index, _)) = DestinationNamespace::parse_route(&snap.route)? else {
            let entry = if snap.route == ROOT_ROUTE {
                BackStackEntry::root(snap.id)
            } else {
                BackStackEntry::new(snap.id, snap.route.clone(), None, None)
            };
            return Ok((entry, None));
        };

        if index == self.namespace.view_index() {
            // View content is not serialisable; keep the slot value so later
            // pushes keep distinct routes.
            let value = snap.target.as_ref().and_then(|t| t.as_u64());
            if value == Some(u64::MAX) {
                return Err(NavError::InvalidRoute(snap.route.clone()));
            }
            let entry = BackStackEntry::new(
                snap.id,
                snap.route.clone(),
                None,
                value.map(|v| NavTarget::new(ViewSlot(v))),
            );
            return Ok((entry, value));
        }

        let Some(key) = self.registry.key_at(index).cloned() else {
            log::warn!("restored route `{}` has no registered slot", snap.route);
            return Ok((BackStackEntry::new(snap.id, snap.route.clone(), None, None), None));
        };
        let target = match (self.registry.decoder(&key), &snap.target) {
            (Some(decode), Some(json)) => decode(json),
            _ => None,
        };
        if target.is_none() {
            log::warn!("could not decode target of restored route `{}`", snap.route);
        }
        let destination = self.registry.lookup(&key).map(|r| r.destination);
        let entry = BackStackEntry::new(snap.id, snap.route.clone(), destination, target);
        Ok((entry, None))
    }
}
