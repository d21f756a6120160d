//! Two-way bindings.
//!
//! A `Binding<T>` is a getter/setter pair. The owner of the value decides where
//! it lives (a `Signal`, a field behind a `RefCell`, a constant); consumers only
//! see `get`/`set`. Navigation uses bindings for the declarative path and for
//! "is presented" flags, so the app keeps ownership of its state.

use std::fmt;
use std::rc::Rc;

use crate::Signal;

pub struct Binding<T: 'static> {
    get: Rc<dyn Fn() -> T>,
    set: Rc<dyn Fn(T)>,
}

impl<T> Clone for Binding<T> {
    fn clone(&self) -> Self {
        Self {
            get: self.get.clone(),
            set: self.set.clone(),
        }
    }
}

impl<T> fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Binding(..)")
    }
}

impl<T: 'static> Binding<T> {
    pub fn new(get: impl Fn() -> T + 'static, set: impl Fn(T) + 'static) -> Self {
        Self {
            get: Rc::new(get),
            set: Rc::new(set),
        }
    }

    pub fn get(&self) -> T {
        (self.get)()
    }

    pub fn set(&self, v: T) {
        (self.set)(v)
    }

    /// Read, transform, write back.
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        let next = f(self.get());
        self.set(next);
    }

    /// Project this binding onto another type.
    ///
    /// `back` returns `None` to drop the write.
    pub fn map<U: 'static>(
        &self,
        forward: impl Fn(T) -> U + 'static,
        back: impl Fn(U) -> Option<T> + 'static,
    ) -> Binding<U> {
        let get = self.get.clone();
        let set = self.set.clone();
        Binding::new(
            move || forward(get()),
            move |u| {
                if let Some(t) = back(u) {
                    set(t)
                }
            },
        )
    }
}

impl<T: Clone + 'static> Binding<T> {
    pub fn from_signal(sig: &Signal<T>) -> Self {
        let read = sig.clone();
        let write = sig.clone();
        Self::new(move || read.get(), move |v| write.set(v))
    }

    /// A binding that always reads `value` and ignores writes.
    pub fn constant(value: T) -> Self {
        Self::new(move || value.clone(), |_| {})
    }
}

impl<T: Clone + 'static> From<&Signal<T>> for Binding<T> {
    fn from(sig: &Signal<T>) -> Self {
        Binding::from_signal(sig)
    }
}
