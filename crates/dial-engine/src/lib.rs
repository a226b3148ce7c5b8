//! Dial engine crate.
//!
//! Frame-throttled animation for clock-style demos: hand angles from wall-clock
//! time, animators that cap how often a paint runs under a faster host tick,
//! and a `winit` host that delivers those ticks.

pub mod animator;
pub mod clock;
pub mod core;
pub mod time;
pub mod window;

pub mod logging;
