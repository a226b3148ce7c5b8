//! Time subsystem.
//!
//! Provides injectable time sources so animators can be driven by scripted
//! timestamps in tests and by `Instant::now()` in production.
//! - `SystemClock` for real hosts
//! - `ManualClock` for tests and scripted hosts

mod clock;

pub use clock::{Clock, ManualClock, SystemClock};
