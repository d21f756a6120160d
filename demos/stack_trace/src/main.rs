use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stackline_core::*;
use stackline_navigation::*;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Inbox;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
struct Thread {
    id: u32,
}

fn screen(title: &str) -> String {
    format!("[{title}]")
}

fn step(label: &str, nav: &Navigator<String>, host: &Rc<RefCell<MemoryHost>>, clock: &ManualClock) {
    nav.reconcile();
    clock.advance(Duration::from_millis(400));
    nav.run_timers();
    let ops = host.borrow_mut().take_ops();
    log::info!("{label}: {ops:?}");
    println!("{label:<24} {}", nav.describe_stack());
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let host = MemoryHost::shared();
    let clock = ManualClock::new();
    let nav: Navigator<String> =
        Navigator::with_clock(host.clone(), NavigatorConfig::default(), Rc::new(clock.clone()))?;

    nav.register_type::<Inbox>(|_| screen("inbox"))?;
    nav.register_type::<Thread>(|t| {
        let id = t.downcast_ref::<Thread>().map(|t| t.id).unwrap_or_default();
        screen(&format!("thread {id}"))
    })?;

    let path = signal(NavigationPath::new());
    nav.bind_path(Binding::from_signal(&path));

    let compose = signal(false);
    let sheet = BoolPresentation::new(Binding::from_signal(&compose), || screen("compose"));
    let _sheet = nav.attach(sheet);

    step("start", &nav, &host, &clock);

    path.set(nav_path![Inbox, Thread { id: 7 }]);
    step("open thread", &nav, &host, &clock);

    compose.set(true);
    step("compose", &nav, &host, &clock);

    host.borrow_mut().user_back();
    step("swipe back", &nav, &host, &clock);
    log::info!("compose flag after swipe: {}", compose.get());

    nav.navigate(Thread { id: 8 });
    step("open another thread", &nav, &host, &clock);

    let saved = nav.to_json()?;
    log::info!("snapshot: {saved}");

    path.set(nav_path![Inbox]);
    step("back to inbox", &nav, &host, &clock);

    path.set(NavigationPath::new());
    clock.advance(Duration::from_secs(1));
    step("home", &nav, &host, &clock);
    println!("stored entries: {}", nav.stored_entry_count());

    Ok(())
}
