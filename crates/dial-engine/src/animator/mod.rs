//! Frame-throttling animators.
//!
//! A host delivers ticks (one per display refresh, at a rate the animator does
//! not control). Animators decide per tick whether the paint callback runs,
//! count what they observed, and re-arm the next tick through a [`TickPort`].
//!
//! - [`AdaptiveAnimator`]: at most one paint per fixed time window
//! - [`LevelThrottle`]: one paint every N ticks, N picked by a performance level
//! - [`FrameRateSampler`]: turns counter snapshots into observed rates

mod adaptive;
mod error;
mod level;
mod sampler;
mod tick;

pub use adaptive::{AdaptiveAnimator, AnimatorConfig, PaintFn, MIN_WINDOW_LENGTH_MS};
pub use error::{AnimatorError, Result};
pub use level::{LevelConfig, LevelThrottle};
pub use sampler::{FrameCounters, FrameRateSampler, FrameRates};
pub use tick::{Animator, PendingTick, Phase, StopHandle, TickOutcome, TickPort};
