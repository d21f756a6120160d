pub use crate::binding::Binding;
pub use crate::clock::{Clock, ManualClock, SystemClock, system_clock};
pub use crate::effects::Dispose;
pub use crate::signal::{Signal, SubId, signal};
pub use crate::timer::{TimerKey, TimerQueue};
