#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use web_time::Duration;

    use crate::binding::*;
    use crate::clock::*;
    use crate::effects::*;
    use crate::signal::*;
    use crate::timer::*;

    #[test]
    fn test_signal_basic() {
        let sig = signal(42);
        assert_eq!(sig.get(), 42);

        sig.set(100);
        assert_eq!(sig.get(), 100);

        sig.update(|v| *v += 1);
        assert_eq!(sig.get(), 101);
        assert_eq!(sig.version(), 2);
    }

    #[test]
    fn test_signal_subscription() {
        let sig = signal(0);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        let id = sig.subscribe(move |v| seen_clone.borrow_mut().push(*v));

        sig.set(42);
        sig.unsubscribe(id);
        sig.set(7);
        assert_eq!(*seen.borrow(), vec![42]);
    }

    #[test]
    fn test_binding_writes_through_to_signal() {
        let sig = signal(vec![1, 2]);
        let b = Binding::from_signal(&sig);
        b.update(|mut v| {
            v.push(3);
            v
        });
        assert_eq!(sig.get(), vec![1, 2, 3]);
    }

    #[test]
    fn test_binding_map_drops_rejected_writes() {
        let item = signal(Some(5));
        let shown = Binding::from_signal(&item).map(
            |v| v.is_some(),
            |shown| if shown { None } else { Some(None) },
        );
        assert!(shown.get());
        shown.set(true);
        assert_eq!(item.get(), Some(5));
        shown.set(false);
        assert_eq!(item.get(), None);
        assert!(!shown.get());
    }

    #[test]
    fn test_constant_binding_ignores_writes() {
        let b = Binding::constant(3);
        b.set(9);
        assert_eq!(b.get(), 3);
    }

    #[test]
    fn test_dispose_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let d = Dispose::new(move || c.set(c.get() + 1));
        assert!(d.is_pending());
        d.run();
        d.clone().run();
        assert_eq!(count.get(), 1);
        assert!(!d.is_pending());
        assert!(!Dispose::empty().is_pending());
    }

    #[test]
    fn test_timer_fires_after_deadline() {
        let clock = ManualClock::new();
        let timers = TimerQueue::new(Rc::new(clock.clone()));
        let fired = Rc::new(Cell::new(0));

        let f = fired.clone();
        timers.schedule(Duration::from_millis(500), move || f.set(f.get() + 1));

        clock.advance(Duration::from_millis(499));
        assert_eq!(timers.run_due(), 0);
        clock.advance(Duration::from_millis(1));
        assert_eq!(timers.run_due(), 1);
        assert_eq!(timers.run_due(), 0);
        assert_eq!(fired.get(), 1);
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_timer_cancel() {
        let clock = ManualClock::new();
        let timers = TimerQueue::new(Rc::new(clock.clone()));
        let fired = Rc::new(Cell::new(false));

        let f = fired.clone();
        let key = timers.schedule(Duration::from_millis(10), move || f.set(true));
        assert!(timers.is_pending(key));
        assert!(timers.cancel(key));
        assert!(!timers.cancel(key));

        clock.advance(Duration::from_secs(1));
        assert_eq!(timers.run_due(), 0);
        assert!(!fired.get());
    }

    #[test]
    fn test_timers_run_in_deadline_order() {
        let clock = ManualClock::new();
        let timers = TimerQueue::new(Rc::new(clock.clone()));
        let order = Rc::new(RefCell::new(Vec::new()));

        for (label, ms) in [("late", 30u64), ("early", 10), ("mid", 20)] {
            let order = order.clone();
            timers.schedule(Duration::from_millis(ms), move || order.borrow_mut().push(label));
        }
        assert_eq!(
            timers.next_deadline(),
            Some(clock.now() + Duration::from_millis(10))
        );

        clock.advance(Duration::from_millis(30));
        assert_eq!(timers.run_due(), 3);
        assert_eq!(*order.borrow(), vec!["early", "mid", "late"]);
    }

    #[test]
    fn test_timer_scheduled_from_callback_waits_for_next_run() {
        let clock = ManualClock::new();
        let timers = Rc::new(TimerQueue::new(Rc::new(clock.clone())));
        let fired = Rc::new(Cell::new(0));

        let t = timers.clone();
        let f = fired.clone();
        timers.schedule(Duration::ZERO, move || {
            f.set(f.get() + 1);
            let f = f.clone();
            t.schedule(Duration::ZERO, move || f.set(f.get() + 1));
        });

        assert_eq!(timers.run_due(), 1);
        assert_eq!(fired.get(), 1);
        assert_eq!(timers.run_due(), 1);
        assert_eq!(fired.get(), 2);
    }
}
