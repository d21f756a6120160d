//! # Navigation
//!
//! Keeps an imperative, host-owned back stack in step with a declarative
//! [`NavigationPath`] and with presentation bindings.
//!
//! The app owns the path (through a `Binding`) and describes what should be
//! on screen. Each render pass, [`Navigator::reconcile`] diffs the path against
//! the host's live stack and issues the fewest single pops and pushes that make
//! them agree. Entries the user pops with a back gesture flow the other way:
//! their presentation bindings are reset, and their metadata is pruned a little
//! later.
//!
//! ```rust
//! use stackline_core::*;
//! use stackline_navigation::*;
//!
//! let host = MemoryHost::shared();
//! let nav: Navigator<String> = Navigator::new(host, NavigatorConfig::default()).unwrap();
//! nav.register_destination("a", |t| format!("A {}", t.route_value())).unwrap();
//! nav.register_destination("b", |t| format!("B {}", t.route_value())).unwrap();
//! nav.set_key_transformer(|t| {
//!     let s = t.downcast_ref::<&str>().copied().unwrap_or_default();
//!     RouteKey::tag(&s[..1])
//! });
//!
//! let path = signal(nav_path!["a1", "b1"]);
//! nav.bind_path(Binding::from_signal(&path));
//! nav.reconcile();
//! assert_eq!(nav.describe_stack(), "root > 0/a1 > 1/b1");
//!
//! path.set(NavigationPath::new());
//! nav.reconcile();
//! assert!(nav.is_root());
//! ```

pub mod config;
pub mod debounce;
pub mod error;
pub mod host;
pub mod namespace;
pub mod navigator;
pub mod path;
pub mod presentation;
pub mod reconcile;
pub mod registry;
pub mod route;
pub mod store;

pub use config::NavigatorConfig;
pub use debounce::{DEFAULT_MIN_NAVIGATION_INTERVAL, NavigationDebounce};
pub use error::{NavError, Result};
pub use host::{EntryId, HostEntry, HostOp, MemoryHost, NavHost, SharedHost};
pub use namespace::{DEFAULT_DESTINATION_COUNT, DestinationNamespace, ROOT_ROUTE};
pub use navigator::{KeyTransformer, Navigator, PresentationKey};
pub use path::NavigationPath;
pub use presentation::{
    BoolPresentation, Dismissal, ItemPresentation, PresentationState, PresentationSync,
};
pub use reconcile::{ReconcilePlan, plan};
pub use registry::{Destination, Resolved, RouteRegistry};
pub use route::{NavTarget, NavValue, RouteKey, TypeKey};
pub use store::{BackStackEntry, BackStackStore, EntrySnapshot, TitleDisplayMode};
