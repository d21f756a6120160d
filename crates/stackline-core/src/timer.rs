//! Fire-once timers on the owner's event loop.
//!
//! Nothing here spawns a thread. The loop that owns the queue calls
//! [`TimerQueue::run_due`] between frames; every callback whose deadline has
//! passed runs exactly once, in deadline order, on that same thread.

use std::cell::RefCell;
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};
use web_time::{Duration, Instant};

use crate::Clock;

new_key_type! {
    pub struct TimerKey;
}

struct Timer {
    deadline: Instant,
    callback: Box<dyn FnOnce()>,
}

pub struct TimerQueue {
    clock: Rc<dyn Clock>,
    timers: RefCell<SlotMap<TimerKey, Timer>>,
}

impl TimerQueue {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            timers: RefCell::new(SlotMap::with_key()),
        }
    }

    pub fn clock(&self) -> &Rc<dyn Clock> {
        &self.clock
    }

    pub fn schedule(&self, delay: Duration, f: impl FnOnce() + 'static) -> TimerKey {
        let deadline = self.clock.now() + delay;
        self.timers.borrow_mut().insert(Timer {
            deadline,
            callback: Box::new(f),
        })
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&self, key: TimerKey) -> bool {
        self.timers.borrow_mut().remove(key).is_some()
    }

    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.timers.borrow().contains_key(key)
    }

    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.borrow().values().map(|t| t.deadline).min()
    }

    /// Fire every timer that is due now. Returns how many ran.
    ///
    /// Timers scheduled by a callback wait for the next call, even with a zero
    /// delay.
    pub fn run_due(&self) -> usize {
        let now = self.clock.now();
        let mut due: Vec<(Instant, TimerKey)> = self
            .timers
            .borrow()
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .map(|(k, t)| (t.deadline, k))
            .collect();
        due.sort_by_key(|(deadline, _)| *deadline);

        let mut fired = 0;
        for (_, key) in due {
            // An earlier callback may have cancelled this one.
            let timer = self.timers.borrow_mut().remove(key);
            if let Some(timer) = timer {
                (timer.callback)();
                fired += 1;
            }
        }
        if fired > 0 {
            log::trace!("timers: fired {fired}, {} pending", self.pending());
        }
        fired
    }
}
