use anyhow::{Context, Result};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::animator::PendingTick;
use crate::core::{App, AppControl, FrameCtx, WindowCtx};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "dial".to_string(),
            initial_size: LogicalSize::new(480.0, 480.0),
            resizable: true,
        }
    }
}

/// Turns the app's one-shot tick requests into redraw requests.
///
/// The platform may also deliver redraws nobody asked for (expose, resize).
/// Those are not ticks: only a redraw that follows an armed port reaches
/// `App::on_frame`, so each request yields at most one frame.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub(crate) struct TickGate {
    awaiting: bool,
}

impl TickGate {
    /// Consumes a pending request. Returns true when a redraw must be requested.
    pub(crate) fn arm_from(&mut self, port: &mut PendingTick) -> bool {
        if port.take() && !self.awaiting {
            self.awaiting = true;
            return true;
        }
        false
    }

    /// Called on every redraw. Returns true when it should run a frame.
    pub(crate) fn accept_redraw(&mut self) -> bool {
        std::mem::take(&mut self.awaiting)
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens one window and drives `app` until it exits or the window closes.
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = HostState::new(config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        log::info!("runtime finished after {} frames", state.frames());
        Ok(())
    }
}

struct WindowEntry {
    window: Window,
    port: PendingTick,
    gate: TickGate,
    frame_index: u64,
}

impl WindowEntry {
    fn ctx(&mut self) -> FrameCtx<'_> {
        FrameCtx {
            window: WindowCtx {
                window: &self.window,
            },
            port: &mut self.port,
            frame_index: self.frame_index,
        }
    }

    /// Forwards a pending tick request to the platform.
    fn rearm(&mut self) {
        if self.gate.arm_from(&mut self.port) {
            self.window.request_redraw();
        }
    }
}

struct HostState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    app: A,

    entry: Option<WindowEntry>,
    exit_requested: bool,
}

impl<A> HostState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, app: A) -> Self {
        Self {
            config,
            app,
            entry: None,
            exit_requested: false,
        }
    }

    fn frames(&self) -> u64 {
        self.entry.as_ref().map_or(0, |e| e.frame_index)
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        Ok(WindowEntry {
            window,
            port: PendingTick::default(),
            gate: TickGate::default(),
            frame_index: 0,
        })
    }
}

impl<A> ApplicationHandler for HostState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() {
            return;
        }

        let mut entry = match self.create_window_entry(event_loop) {
            Ok(entry) => entry,
            Err(e) => {
                log::error!("failed to create window: {e:#}");
                self.request_exit(event_loop);
                return;
            }
        };

        let control = self.app.on_start(&mut entry.ctx());
        entry.rearm();
        self.entry = Some(entry);

        if control == AppControl::Exit {
            self.request_exit(event_loop);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Redraw requests are the only wake-up source; no polling.
        event_loop.set_control_flow(ControlFlow::Wait);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Split borrows so the app can be called while the entry is held.
        let (app, entry) = (&mut self.app, &mut self.entry);

        let Some(entry) = entry.as_mut().filter(|e| e.window.id() == window_id) else {
            return;
        };

        if app.on_window_event(&event) == AppControl::Exit {
            self.request_exit(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::debug!("close requested");
                self.request_exit(event_loop);
            }

            WindowEvent::RedrawRequested => {
                if !entry.gate.accept_redraw() {
                    log::trace!("ignoring unrequested redraw");
                    return;
                }

                entry.frame_index += 1;
                let control = app.on_frame(&mut entry.ctx());
                entry.rearm();

                if control == AppControl::Exit {
                    self.request_exit(event_loop);
                }
            }

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::TickPort;

    #[test]
    fn unarmed_port_requests_nothing() {
        let mut gate = TickGate::default();
        let mut port = PendingTick::default();
        assert!(!gate.arm_from(&mut port));
        assert!(!gate.accept_redraw());
    }

    #[test]
    fn one_request_yields_one_frame() {
        let mut gate = TickGate::default();
        let mut port = PendingTick::default();

        port.request_tick();
        assert!(gate.arm_from(&mut port));

        // Expose + requested redraw arriving back to back: one frame only.
        assert!(gate.accept_redraw());
        assert!(!gate.accept_redraw());
    }

    #[test]
    fn rearming_while_awaiting_does_not_double_request() {
        let mut gate = TickGate::default();
        let mut port = PendingTick::default();

        port.request_tick();
        assert!(gate.arm_from(&mut port));
        port.request_tick();
        assert!(!gate.arm_from(&mut port));
        assert!(!port.is_armed());

        assert!(gate.accept_redraw());
    }
}
