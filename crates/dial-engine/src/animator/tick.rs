use std::cell::Cell;
use std::rc::Rc;

use super::sampler::FrameCounters;

/// Scheduling port: asks the host for exactly one more tick.
///
/// Requests are one-shot. An animator calls `request_tick` at the end of every
/// tick it wants to be followed by another; a host delivers at most one tick
/// per request.
pub trait TickPort {
    fn request_tick(&mut self);
}

/// Minimal one-shot port: remembers whether a tick was requested.
///
/// Hosts poll it with [`PendingTick::take`] after each tick; the winit runtime
/// turns a taken request into `Window::request_redraw`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub struct PendingTick {
    armed: bool,
}

impl PendingTick {
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Consumes the pending request, returning whether one existed.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.armed)
    }
}

impl TickPort for PendingTick {
    fn request_tick(&mut self) {
        self.armed = true;
    }
}

/// Shared cancellation flag.
///
/// Cloned into paint callbacks so an animator can be stopped from inside its
/// own paint. After [`StopHandle::stop`] returns, the owning animator paints no
/// more and stops re-arming. A stop applies to the current run only: the next
/// `Animator::start` clears it.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }

    pub(crate) fn reset(&self) {
        self.0.set(false);
    }
}

/// What a single tick did.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickOutcome {
    /// The paint callback ran.
    Painted,
    /// Counted as a system frame, but no paint was due.
    Skipped,
    /// The animator is not running; nothing was counted or re-armed.
    Idle,
}

/// Lifecycle of an animator.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Phase {
    Unstarted,
    Running,
    Stopped,
}

/// Common driver contract for frame-throttling animators.
///
/// Hosts call `start` once, then `tick` each time a requested tick fires.
pub trait Animator {
    /// Resets state and requests the first tick.
    ///
    /// Also clears any earlier stop, whether it came from [`Animator::stop`]
    /// or a [`StopHandle`], including one made before the first `start`.
    fn start(&mut self, port: &mut dyn TickPort);

    /// Runs one host tick.
    ///
    /// Paint failures are returned after the next tick has been requested.
    fn tick(&mut self, port: &mut dyn TickPort) -> anyhow::Result<TickOutcome>;

    /// Stops painting and re-arming.
    fn stop(&mut self);

    fn phase(&self) -> Phase;

    fn counters(&self) -> FrameCounters;

    /// Highest paint rate this animator can reach regardless of host rate,
    /// when it is known.
    fn theoretical_upper_bound_fps(&self) -> Option<f64> {
        None
    }

    fn is_running(&self) -> bool {
        self.phase() == Phase::Running
    }
}
