//! Core engine-facing contracts.
//!
//! This module defines the interface between the host runtime (platform loop)
//! and demos. A demo sees a window handle and a scheduling port, nothing of
//! the event loop itself.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
