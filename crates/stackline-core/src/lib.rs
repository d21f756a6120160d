//! # Signals, Bindings, and Timers
//!
//! Stackline's navigation layer runs inside a single-threaded render loop. This
//! crate holds the small set of primitives it is built on:
//!
//! - `Signal<T>`: observable value shared by cloning the handle.
//! - `Binding<T>`: get/set pair so app state can stay owned by the app.
//! - `Dispose`: run-once cleanup guard.
//! - `Clock` / `TimerQueue`: deterministic time and fire-once timers.
//!
//! ## Signals
//!
//! ```rust
//! use stackline_core::*;
//!
//! let count = signal(0);
//! count.set(1);
//! count.update(|v| *v += 1);
//! assert_eq!(count.get(), 2);
//! ```
//!
//! ## Bindings
//!
//! A binding can wrap a signal, or any pair of closures:
//!
//! ```rust
//! use stackline_core::*;
//!
//! let shown = signal(false);
//! let binding = Binding::from_signal(&shown);
//! binding.set(true);
//! assert!(shown.get());
//! ```
//!
//! ## Timers
//!
//! Timers never run on their own. The owner calls `run_due()` from its event
//! loop, which keeps every callback on the UI thread:
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc, time::Duration};
//! use stackline_core::*;
//!
//! let clock = ManualClock::new();
//! let timers = TimerQueue::new(Rc::new(clock.clone()));
//! let fired = Rc::new(Cell::new(false));
//! let f = fired.clone();
//! timers.schedule(Duration::from_secs(1), move || f.set(true));
//!
//! assert_eq!(timers.run_due(), 0);
//! clock.advance(Duration::from_secs(1));
//! assert_eq!(timers.run_due(), 1);
//! assert!(fired.get());
//! ```

pub mod binding;
pub mod clock;
pub mod effects;
pub mod prelude;
pub mod signal;
pub mod tests;
pub mod timer;

pub use binding::*;
pub use clock::*;
pub use effects::*;
pub use prelude::*;
pub use signal::*;
pub use timer::*;
