use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Local, NaiveTime, Timelike};
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use dial_engine::animator::{
    AdaptiveAnimator, Animator, AnimatorConfig, FrameRateSampler, LevelConfig, LevelThrottle,
    TickOutcome,
};
use dial_engine::clock::{ClockPosition, Hand};
use dial_engine::core::{App, AppControl, FrameCtx};

use crate::options::{StudioOptions, Throttle};

/// What one paint produced for the drawing layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DialFrame {
    pub time: NaiveTime,
    pub position: ClockPosition,
}

impl DialFrame {
    fn capture() -> Self {
        let now = Local::now();
        Self {
            time: now.time(),
            position: ClockPosition::at(&now),
        }
    }

    /// Window title for this frame.
    pub fn title(&self) -> String {
        let p = &self.position;
        format!(
            "dial  {:02}:{:02}:{:02}  h {:5.1}°  m {:5.1}°  s {:5.1}°",
            self.time.hour(),
            self.time.minute(),
            self.time.second(),
            p.dial_degrees(Hand::Hour),
            p.dial_degrees(Hand::Minute),
            p.dial_degrees(Hand::Second),
        )
    }
}

enum Driver {
    Window(AdaptiveAnimator),
    Levels(LevelThrottle),
}

impl Driver {
    fn animator(&mut self) -> &mut dyn Animator {
        match self {
            Driver::Window(a) => a,
            Driver::Levels(l) => l,
        }
    }
}

/// The analog clock demo.
///
/// The paint callback only captures fresh hand angles; presenting them (here:
/// the window title) happens after a painted tick.
pub struct ClockApp {
    driver: Driver,
    latest: Rc<Cell<Option<DialFrame>>>,
    sampler: FrameRateSampler,
    paint_failures: u64,
}

impl ClockApp {
    pub fn new(options: &StudioOptions) -> Result<Self> {
        let latest: Rc<Cell<Option<DialFrame>>> = Rc::default();
        let sink = latest.clone();
        let paint = move || -> Result<()> {
            sink.set(Some(DialFrame::capture()));
            Ok(())
        };

        let mut driver = match options.throttle {
            Throttle::Window { window_ms } => {
                let config = AnimatorConfig::new(window_ms)?;
                Driver::Window(AdaptiveAnimator::new(config, paint))
            }
            Throttle::Levels { total, current } => {
                let config = LevelConfig::new(total, current)?;
                Driver::Levels(LevelThrottle::new(config, paint))
            }
        };

        let ceiling = driver.animator().theoretical_upper_bound_fps();
        let interval = Duration::try_from_secs_f64(options.sample_secs)?;
        let sampler = FrameRateSampler::new(interval, ceiling)?;

        Ok(Self {
            driver,
            latest,
            sampler,
            paint_failures: 0,
        })
    }

    fn shift_level(&mut self, up: bool) {
        let Driver::Levels(throttle) = &mut self.driver else {
            return;
        };
        let moved = if up { throttle.upgrade() } else { throttle.degrade() };
        if moved {
            log::info!(
                "performance level {}, painting every {} ticks",
                throttle.current_level(),
                throttle.divisor()
            );
            self.sampler.reset();
        }
    }
}

impl App for ClockApp {
    fn on_start(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        self.driver.animator().start(ctx.port);
        self.sampler.reset();
        AppControl::Continue
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput { event, .. } = event else {
            return AppControl::Continue;
        };
        if event.state != ElementState::Pressed || event.repeat {
            return AppControl::Continue;
        }

        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape) => return AppControl::Exit,
            PhysicalKey::Code(KeyCode::ArrowUp) => self.shift_level(true),
            PhysicalKey::Code(KeyCode::ArrowDown) => self.shift_level(false),
            _ => {}
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        let animator = self.driver.animator();

        match animator.tick(ctx.port) {
            Ok(TickOutcome::Painted) => {
                if let Some(frame) = self.latest.take() {
                    ctx.window.set_title(&frame.title());
                }
            }
            Ok(TickOutcome::Skipped) => {}
            Ok(TickOutcome::Idle) => return AppControl::Exit,
            Err(e) => {
                self.paint_failures += 1;
                log::error!(
                    "frame {} (paint failure #{}): {e:#}",
                    ctx.frame_index,
                    self.paint_failures
                );
            }
        }

        if let Some(rates) = self.sampler.sample(Instant::now(), animator.counters()) {
            log::info!("{rates}");
        }

        AppControl::Continue
    }
}
