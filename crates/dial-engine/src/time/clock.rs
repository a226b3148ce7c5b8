use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of "now" for schedulers.
///
/// Animators never read the system clock directly; they ask a `Clock`.
/// Implementations must be non-decreasing for window ids to stay ordered.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Clock backed by `Instant::now()`.
#[derive(Debug, Copy, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually driven clock.
///
/// Clones share the same underlying instant, so a test (or a scripted host)
/// can keep one handle and give another to the animator.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        let base = Instant::now();
        Self {
            base,
            now: Rc::new(Cell::new(base)),
        }
    }

    /// Instant the clock was created at.
    pub fn base(&self) -> Instant {
        self.base
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Sets the clock to `base + offset`.
    ///
    /// Going backwards is allowed; animators treat it as zero elapsed time.
    pub fn set_offset(&self, offset: Duration) {
        self.now.set(self.base + offset);
    }

    /// Sets the clock to `base + ms` milliseconds. Fractional values are kept.
    pub fn set_millis(&self, ms: f64) {
        let nanos = (ms.max(0.0) * 1_000_000.0).round() as u64;
        self.set_offset(Duration::from_nanos(nanos));
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}
