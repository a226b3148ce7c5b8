//! Analog clock geometry.
//!
//! Converts wall-clock instants into hand angles. The computation is pure;
//! callers pass the instant (usually `chrono::Local::now()`) so tests can pin it.

mod pointer;

pub use pointer::{day_passed_ratio, pointer_radians, ClockPosition, Hand};
