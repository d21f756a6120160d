use std::cell::Cell;
use std::rc::Rc;

use stackline_core::Clock;
use web_time::{Duration, Instant};

pub const DEFAULT_MIN_NAVIGATION_INTERVAL: Duration = Duration::from_millis(350);

/// Drops navigation requests that arrive too soon after the last accepted one.
///
/// Meant to swallow the duplicate taps a slow control produces, not to rate
/// limit navigation: dropped requests are not queued. Share one instance
/// between navigators to debounce across all of them.
pub struct NavigationDebounce {
    clock: Rc<dyn Clock>,
    interval: Duration,
    last_accepted: Cell<Option<Instant>>,
}

impl NavigationDebounce {
    pub fn new(clock: Rc<dyn Clock>, interval: Duration) -> Self {
        Self {
            clock,
            interval,
            last_accepted: Cell::new(None),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True if the request may proceed; records it as the last accepted one.
    pub fn accept(&self) -> bool {
        let now = self.clock.now();
        if let Some(last) = self.last_accepted.get()
            && now.saturating_duration_since(last) < self.interval
        {
            return false;
        }
        self.last_accepted.set(Some(now));
        true
    }

    pub fn reset(&self) {
        self.last_accepted.set(None);
    }
}

#[cfg(test)]
mod tests {
    use stackline_core::ManualClock;

    use super::*;

    #[test]
    fn second_request_inside_interval_is_dropped() {
        let clock = ManualClock::new();
        let d = NavigationDebounce::new(Rc::new(clock.clone()), DEFAULT_MIN_NAVIGATION_INTERVAL);
        assert!(d.accept());
        clock.advance(Duration::from_millis(100));
        assert!(!d.accept());
        // Dropped requests don't extend the window.
        clock.advance(Duration::from_millis(250));
        assert!(d.accept());
    }

    #[test]
    fn reset_forgets_the_last_request() {
        let clock = ManualClock::new();
        let d = NavigationDebounce::new(Rc::new(clock), DEFAULT_MIN_NAVIGATION_INTERVAL);
        assert!(d.accept());
        d.reset();
        assert!(d.accept());
    }
}
