//! Presentation bindings.
//!
//! A presentation keeps an app-owned flag (`Binding<bool>`) or optional item
//! (`Binding<Option<T>>`) in step with an ad-hoc entry on the stack:
//!
//! ```text
//! Idle --present--> Pushed --user back------> Idle
//!                          --binding cleared--> Idle
//! ```
//!
//! Both ways out look the same to the app: the binding reads "absent". They
//! differ internally so that a user pop, which already removed the entry, does
//! not trigger a second pop when the binding change is observed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use stackline_core::Binding;

use crate::host::EntryId;
use crate::navigator::Navigator;

/// Anything the navigator re-syncs on every pass.
pub trait PresentationSync<V: 'static> {
    fn sync(&self, nav: &Navigator<V>);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentationState {
    Idle,
    Pushed(EntryId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dismissal {
    /// The host dropped the entry (back gesture, back button, path change).
    User,
    /// The app cleared the binding while the entry was presented.
    Binding,
}

#[derive(Default)]
struct Slot {
    id: Cell<Option<EntryId>>,
    /// Set once the current push has been dismissed either way.
    consumed: RefCell<Option<Rc<Cell<bool>>>>,
    dismissed_by_navigator: Rc<Cell<bool>>,
    last_dismissal: Cell<Option<Dismissal>>,
}

impl Slot {
    fn state(&self) -> PresentationState {
        match self.id.get() {
            Some(id) => PresentationState::Pushed(id),
            None => PresentationState::Idle,
        }
    }

    fn present<V: Clone + 'static>(&self, nav: &Navigator<V>, shown: &Binding<bool>, build: impl FnOnce() -> V) {
        if self.id.get().is_some_and(|id| nav.is_presented(id, false)) {
            return;
        }

        if let Some(stale) = self.consumed.borrow_mut().take() {
            stale.set(true);
        }

        // The store calls this binding with `false` once the host drops the entry.
        let consumed = Rc::new(Cell::new(false));
        let binding = {
            let consumed = consumed.clone();
            let flag = self.dismissed_by_navigator.clone();
            let read = shown.clone();
            let write = shown.clone();
            Binding::new(
                move || read.get(),
                move |value| {
                    if !value && !consumed.replace(true) {
                        flag.set(true);
                        write.set(false);
                    }
                },
            )
        };

        self.dismissed_by_navigator.set(false);
        let id = nav.push_view(build(), Some(binding));
        log::debug!("presentation pushed {id:?}");
        self.id.set(id);
        *self.consumed.borrow_mut() = Some(consumed);
    }

    fn absent<V: 'static>(&self, nav: &Navigator<V>) {
        let by_navigator = self.dismissed_by_navigator.replace(false);
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(consumed) = self.consumed.borrow_mut().take() {
            consumed.set(true);
        }

        if by_navigator {
            self.last_dismissal.set(Some(Dismissal::User));
            return;
        }
        if nav.is_presented(id, true) {
            nav.pop_top();
        } else {
            log::debug!("presentation {id:?} cleared but not on top; leaving stack as is");
        }
        self.last_dismissal.set(Some(Dismissal::Binding));
    }
}

/// Presents `destination` while `is_presented` reads `true`.
pub struct BoolPresentation<V: 'static> {
    is_presented: Binding<bool>,
    destination: Rc<dyn Fn() -> V>,
    slot: Slot,
}

impl<V: 'static> BoolPresentation<V> {
    pub fn new(is_presented: Binding<bool>, destination: impl Fn() -> V + 'static) -> Rc<Self> {
        Rc::new(Self {
            is_presented,
            destination: Rc::new(destination),
            slot: Slot::default(),
        })
    }

    pub fn state(&self) -> PresentationState {
        self.slot.state()
    }

    pub fn entry_id(&self) -> Option<EntryId> {
        self.slot.id.get()
    }

    pub fn last_dismissal(&self) -> Option<Dismissal> {
        self.slot.last_dismissal.get()
    }
}

impl<V: Clone + 'static> PresentationSync<V> for BoolPresentation<V> {
    fn sync(&self, nav: &Navigator<V>) {
        if self.is_presented.get() {
            self.slot
                .present(nav, &self.is_presented, || (self.destination)());
        } else {
            self.slot.absent(nav);
        }
    }
}

/// Presents `destination(item)` while `item` holds a value.
pub struct ItemPresentation<T: Clone + 'static, V: 'static> {
    item: Binding<Option<T>>,
    shown: Binding<bool>,
    destination: Rc<dyn Fn(&T) -> V>,
    slot: Slot,
}

impl<T: Clone + 'static, V: 'static> ItemPresentation<T, V> {
    pub fn new(item: Binding<Option<T>>, destination: impl Fn(&T) -> V + 'static) -> Rc<Self> {
        // Writing `false` clears the item; writing `true` has no item to set.
        let shown = item.map(|v| v.is_some(), |shown| (!shown).then_some(None));
        Rc::new(Self {
            item,
            shown,
            destination: Rc::new(destination),
            slot: Slot::default(),
        })
    }

    pub fn state(&self) -> PresentationState {
        self.slot.state()
    }

    pub fn entry_id(&self) -> Option<EntryId> {
        self.slot.id.get()
    }

    pub fn last_dismissal(&self) -> Option<Dismissal> {
        self.slot.last_dismissal.get()
    }
}

impl<T: Clone + 'static, V: Clone + 'static> PresentationSync<V> for ItemPresentation<T, V> {
    fn sync(&self, nav: &Navigator<V>) {
        match self.item.get() {
            Some(value) => self
                .slot
                .present(nav, &self.shown, || (self.destination)(&value)),
            None => self.slot.absent(nav),
        }
    }
}
