use winit::window::Window;

use crate::animator::PendingTick;

/// Handle to the window a frame is delivered for.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Replaces the window title.
    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }
}

/// Per-tick context passed to `core::App::on_start` and `core::App::on_frame`.
pub struct FrameCtx<'a> {
    pub window: WindowCtx<'a>,
    /// One-shot scheduling port. Arm it to receive another `on_frame`.
    pub port: &'a mut PendingTick,
    /// Ticks delivered so far, counting this one. Zero in `on_start`.
    pub frame_index: u64,
}
