use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use once_cell::sync::Lazy;

static MONOTONIC_ORIGIN: Lazy<Instant> = Lazy::new(Instant::now);

pub fn get_monotonic_time() -> Duration { MONOTONIC_ORIGIN.elapsed() }

/// Shareable lazy clock.
///
/// The clock fetches the time once and retains it until explicitly cleared with
/// [`Clock::clear`], so every animation sampled while handling one input event
/// sees the same "now".
#[derive(Debug, Default, Clone)]
pub struct Clock {
    inner: Rc<RefCell<LazyClock>>,
}

#[derive(Debug, Default)]
struct LazyClock {
    time: Option<Duration>,
    complete_instantly: bool,
}

impl Clock {
    pub fn with_time(time: Duration) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LazyClock { time: Some(time), complete_instantly: false })),
        }
    }

    pub fn now(&self) -> Duration {
        *self.inner.borrow_mut().time.get_or_insert_with(get_monotonic_time)
    }

    pub fn set_unadjusted(&mut self, time: Duration) { self.inner.borrow_mut().time = Some(time); }

    /// Clears the stored time so it's re-fetched on the next read.
    pub fn clear(&mut self) { self.inner.borrow_mut().time = None; }

    pub fn should_complete_instantly(&self) -> bool { self.inner.borrow().complete_instantly }

    pub fn set_complete_instantly(&mut self, value: bool) {
        self.inner.borrow_mut().complete_instantly = value;
    }
}

impl PartialEq for Clock {
    fn eq(&self, other: &Self) -> bool { Rc::ptr_eq(&self.inner, &other.inner) }
}

impl Eq for Clock {}
