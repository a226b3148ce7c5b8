//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window and acts as the tick host for
//! animators: a requested tick becomes `Window::request_redraw`, and the
//! matching `RedrawRequested` becomes `App::on_frame`.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
