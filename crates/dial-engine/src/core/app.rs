use winit::event::WindowEvent;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by demos.
///
/// The runtime calls `on_start` once the window exists, then `on_frame` once
/// per tick the app requested through `FrameCtx::port`. A frame that does not
/// re-arm the port is the last one the app receives.
pub trait App {
    /// Called once, before any frame. Animators take their start instant here.
    fn on_start(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Called for window events.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per requested tick.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;
}
