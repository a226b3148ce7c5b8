use std::time::{Duration, Instant};

use super::error::{AnimatorError, Result};
use super::sampler::FrameCounters;
use super::tick::{Animator, Phase, StopHandle, TickOutcome, TickPort};
use crate::time::{Clock, SystemClock};

/// Paint callback: one visual update, reading whatever state it needs fresh.
pub type PaintFn = Box<dyn FnMut() -> anyhow::Result<()>>;

/// Shortest accepted window: one microsecond.
///
/// Window indices are `u64`; anything shorter would saturate the index within
/// practical run times and stall painting.
pub const MIN_WINDOW_LENGTH_MS: f64 = 0.001;

/// Immutable animator configuration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimatorConfig {
    window_length_ms: f64,
}

impl AnimatorConfig {
    /// Validates `window_length_ms`. NaN, infinite and lengths below
    /// [`MIN_WINDOW_LENGTH_MS`] (zero and negatives included) are rejected.
    pub fn new(window_length_ms: f64) -> Result<Self> {
        if !window_length_ms.is_finite() || window_length_ms < MIN_WINDOW_LENGTH_MS {
            return Err(AnimatorError::InvalidWindowLength(window_length_ms));
        }
        Ok(Self { window_length_ms })
    }

    /// Window length giving a ceiling of `fps` paints per second.
    pub fn from_fps(fps: f64) -> Result<Self> {
        Self::new(1000.0 / fps)
    }

    pub fn window_length_ms(&self) -> f64 {
        self.window_length_ms
    }

    /// `1000 / window_length_ms`.
    pub fn theoretical_upper_bound_fps(&self) -> f64 {
        1000.0 / self.window_length_ms
    }

    /// Index of the window containing `elapsed`.
    pub fn window_index(&self, elapsed: Duration) -> u64 {
        let elapsed_ms = elapsed.as_nanos() as f64 / 1_000_000.0;
        (elapsed_ms / self.window_length_ms).floor() as u64
    }
}

impl Default for AnimatorConfig {
    /// 60 paints per second at most.
    fn default() -> Self {
        Self {
            window_length_ms: 1000.0 / 60.0,
        }
    }
}

/// Time-windowed paint throttle.
///
/// Driven by a host tick of unknown (possibly much higher) frequency, it paints
/// at most once per `window_length_ms` window. Windows are anchored to the
/// start instant, not to the previous paint, so slow paints never shift later
/// windows; a paint longer than a window makes the following window(s) get
/// skipped instead.
///
/// Two counters are kept: system frames (ticks observed while running) and
/// actual frames (paint invocations). `actual_frames <= system_frames` always.
pub struct AdaptiveAnimator<C: Clock = SystemClock> {
    config: AnimatorConfig,
    clock: C,
    paint: PaintFn,

    phase: Phase,
    stop: StopHandle,
    started_at: Option<Instant>,
    last_paint_window: Option<u64>,

    system_frames: u64,
    actual_frames: u64,
}

impl AdaptiveAnimator<SystemClock> {
    pub fn new<F>(config: AnimatorConfig, paint: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        Self::with_clock(config, SystemClock, paint)
    }
}

impl<C: Clock> AdaptiveAnimator<C> {
    pub fn with_clock<F>(config: AnimatorConfig, clock: C, paint: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        Self {
            config,
            clock,
            paint: Box::new(paint),
            phase: Phase::Unstarted,
            stop: StopHandle::default(),
            started_at: None,
            last_paint_window: None,
            system_frames: 0,
            actual_frames: 0,
        }
    }

    pub fn config(&self) -> &AnimatorConfig {
        &self.config
    }

    /// Handle that stops this animator; safe to move into the paint callback.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Window claimed by the most recent tick, `None` before the first tick.
    pub fn last_paint_window(&self) -> Option<u64> {
        self.last_paint_window
    }

    pub fn system_frames(&self) -> u64 {
        self.system_frames
    }

    pub fn actual_frames(&self) -> u64 {
        self.actual_frames
    }

    fn sync_stop(&mut self) {
        if self.phase == Phase::Running && self.stop.is_stopped() {
            self.phase = Phase::Stopped;
            log::debug!(
                "adaptive animator stopped after {} system / {} actual frames",
                self.system_frames,
                self.actual_frames
            );
        }
    }
}

impl<C: Clock> Animator for AdaptiveAnimator<C> {
    fn start(&mut self, port: &mut dyn TickPort) {
        self.stop.reset();
        self.phase = Phase::Running;
        self.started_at = Some(self.clock.now());
        self.last_paint_window = None;
        self.system_frames = 0;
        self.actual_frames = 0;

        log::debug!(
            "adaptive animator started: window {:.3} ms, ceiling {:.1} fps",
            self.config.window_length_ms,
            self.config.theoretical_upper_bound_fps()
        );

        port.request_tick();
    }

    fn tick(&mut self, port: &mut dyn TickPort) -> anyhow::Result<TickOutcome> {
        self.sync_stop();
        let (Phase::Running, Some(started_at)) = (self.phase, self.started_at) else {
            return Ok(TickOutcome::Idle);
        };

        self.system_frames += 1;

        let elapsed = self.clock.now().saturating_duration_since(started_at);
        let window = self.config.window_index(elapsed);

        let painted = if self.last_paint_window != Some(window) {
            let result = (self.paint)();
            self.actual_frames += 1;
            Some(result)
        } else {
            None
        };

        // Claimed by whichever tick first observes it.
        self.last_paint_window = Some(window);

        // Paint may have stopped us through a StopHandle.
        self.sync_stop();
        if self.phase == Phase::Running {
            port.request_tick();
        }

        match painted {
            Some(Ok(())) => Ok(TickOutcome::Painted),
            Some(Err(err)) => Err(err.context(format!("paint failed in window {window}"))),
            None => Ok(TickOutcome::Skipped),
        }
    }

    fn stop(&mut self) {
        self.stop.stop();
        self.sync_stop();
    }

    fn phase(&self) -> Phase {
        self.phase
    }

    fn counters(&self) -> FrameCounters {
        FrameCounters {
            system: self.system_frames,
            actual: self.actual_frames,
        }
    }

    fn theoretical_upper_bound_fps(&self) -> Option<f64> {
        Some(self.config.theoretical_upper_bound_fps())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::PendingTick;
    use crate::time::ManualClock;
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    /// Delivers one tick per timestamp (ms since start), as long as the animator
    /// keeps re-arming.
    fn drive<C: Clock>(
        animator: &mut AdaptiveAnimator<C>,
        clock: &ManualClock,
        port: &mut PendingTick,
        stamps: &[f64],
    ) -> Vec<TickOutcome> {
        stamps
            .iter()
            .map(|&ms| {
                clock.set_millis(ms);
                if port.take() {
                    animator.tick(port).expect("tick")
                } else {
                    TickOutcome::Idle
                }
            })
            .collect()
    }

    fn counting(ms: f64) -> (AdaptiveAnimator<ManualClock>, ManualClock, Rc<Cell<u32>>) {
        let clock = ManualClock::new();
        let paints = Rc::new(Cell::new(0));
        let p = paints.clone();
        let animator = AdaptiveAnimator::with_clock(
            AnimatorConfig::new(ms).unwrap(),
            clock.clone(),
            move || {
                p.set(p.get() + 1);
                Ok(())
            },
        );
        (animator, clock, paints)
    }

    // ── configuration ─────────────────────────────────────────────────────

    #[test]
    fn rejects_degenerate_window_lengths() {
        for bad in [0.0, -1.0, -0.5, f64::NAN, f64::INFINITY, 1e-300, 0.000_999] {
            assert!(matches!(
                AnimatorConfig::new(bad),
                Err(AnimatorError::InvalidWindowLength(_))
            ));
        }
    }

    #[test]
    fn shortest_window_keeps_advancing() {
        let config = AnimatorConfig::new(MIN_WINDOW_LENGTH_MS).unwrap();
        assert_eq!(config.window_index(Duration::from_millis(3)), 3_000);

        let (mut animator, clock, paints) = counting(MIN_WINDOW_LENGTH_MS);
        let mut port = PendingTick::default();
        animator.start(&mut port);
        drive(&mut animator, &clock, &mut port, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(paints.get(), 4);
        assert_eq!(animator.last_paint_window(), Some(4_000));
    }

    #[test]
    fn accepts_fractional_window_length() {
        let config = AnimatorConfig::new(16.5).unwrap();
        assert_eq!(config.window_length_ms(), 16.5);
        assert_eq!(config.window_index(Duration::from_millis(33)), 2);
        assert_eq!(config.window_index(Duration::from_micros(32_999)), 1);
    }

    #[test]
    fn theoretical_upper_bound() {
        assert_eq!(AnimatorConfig::new(1000.0).unwrap().theoretical_upper_bound_fps(), 1.0);
        assert_eq!(AnimatorConfig::new(40.0).unwrap().theoretical_upper_bound_fps(), 25.0);
        assert!((AnimatorConfig::from_fps(30.0).unwrap().window_length_ms() - 33.333).abs() < 1e-3);
        assert!(AnimatorConfig::from_fps(0.0).is_err());
    }

    // ── tick loop ─────────────────────────────────────────────────────────

    #[test]
    fn paints_once_per_window() {
        let (mut animator, clock, paints) = counting(1000.0);
        let mut port = PendingTick::default();
        animator.start(&mut port);

        let outcomes = drive(
            &mut animator,
            &clock,
            &mut port,
            &[0.0, 200.0, 400.0, 999.0, 1001.0, 1500.0, 2001.0],
        );

        use TickOutcome::{Painted as P, Skipped as S};
        assert_eq!(outcomes, vec![P, S, S, S, P, S, P]);
        assert_eq!(animator.system_frames(), 7);
        assert_eq!(animator.actual_frames(), 3);
        assert_eq!(paints.get(), 3);
        assert_eq!(animator.last_paint_window(), Some(2));
    }

    #[test]
    fn slow_host_skips_windows_without_drift() {
        let (mut animator, clock, _) = counting(100.0);
        let mut port = PendingTick::default();
        animator.start(&mut port);

        // Host stalls across windows 1..=3; boundaries stay anchored at start.
        drive(&mut animator, &clock, &mut port, &[0.0, 450.0, 510.0, 599.0, 600.0]);

        assert_eq!(animator.last_paint_window(), Some(6));
        assert_eq!(animator.counters(), FrameCounters { system: 5, actual: 4 });
    }

    #[test]
    fn restart_resets_state() {
        let (mut animator, clock, _) = counting(10.0);
        let mut port = PendingTick::default();
        animator.start(&mut port);
        drive(&mut animator, &clock, &mut port, &[0.0, 15.0, 25.0]);
        assert_eq!(animator.actual_frames(), 3);

        clock.set_millis(1000.0);
        animator.start(&mut port);
        assert_eq!(animator.counters(), FrameCounters::default());
        assert_eq!(animator.last_paint_window(), None);

        drive(&mut animator, &clock, &mut port, &[1005.0]);
        assert_eq!(animator.last_paint_window(), Some(0));
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn tick_before_start_is_idle() {
        let (mut animator, _clock, paints) = counting(10.0);
        let mut port = PendingTick::default();

        assert_eq!(animator.tick(&mut port).unwrap(), TickOutcome::Idle);
        assert_eq!(animator.phase(), Phase::Unstarted);
        assert_eq!(animator.system_frames(), 0);
        assert_eq!(paints.get(), 0);
        assert!(!port.is_armed());
    }

    #[test]
    fn stop_prevents_further_paints() {
        let (mut animator, clock, paints) = counting(10.0);
        let mut port = PendingTick::default();
        animator.start(&mut port);
        drive(&mut animator, &clock, &mut port, &[0.0]);
        assert!(port.is_armed());

        animator.stop();
        clock.set_millis(50.0);
        assert_eq!(animator.tick(&mut port).unwrap(), TickOutcome::Idle);
        assert_eq!(paints.get(), 1);
        assert_eq!(animator.phase(), Phase::Stopped);
    }

    #[test]
    fn start_clears_an_earlier_stop() {
        let (mut animator, clock, paints) = counting(10.0);
        let mut port = PendingTick::default();

        // Stop requests belong to a run; one made before `start` is dropped.
        animator.stop_handle().stop();
        assert_eq!(animator.phase(), Phase::Unstarted);
        animator.start(&mut port);
        assert!(animator.is_running());
        assert_eq!(drive(&mut animator, &clock, &mut port, &[0.0]), vec![TickOutcome::Painted]);

        animator.stop();
        animator.start(&mut port);
        assert!(animator.is_running());
        drive(&mut animator, &clock, &mut port, &[5.0]);
        assert_eq!(paints.get(), 2);
    }

    #[test]
    fn stop_from_inside_paint() {
        let clock = ManualClock::new();
        let calls = Rc::new(Cell::new(0));
        let handle: Rc<RefCell<Option<StopHandle>>> = Rc::default();

        let (c, h) = (calls.clone(), handle.clone());
        let mut animator = AdaptiveAnimator::with_clock(
            AnimatorConfig::new(10.0).unwrap(),
            clock.clone(),
            move || {
                c.set(c.get() + 1);
                if c.get() == 2 {
                    if let Some(stop) = h.borrow().as_ref() {
                        stop.stop();
                    }
                }
                Ok(())
            },
        );
        *handle.borrow_mut() = Some(animator.stop_handle());

        let mut port = PendingTick::default();
        animator.start(&mut port);
        let outcomes = drive(&mut animator, &clock, &mut port, &[0.0, 10.0, 20.0, 30.0]);

        assert_eq!(calls.get(), 2);
        assert_eq!(
            outcomes,
            vec![TickOutcome::Painted, TickOutcome::Painted, TickOutcome::Idle, TickOutcome::Idle]
        );
        assert!(!animator.is_running());
    }

    // ── paint failures ────────────────────────────────────────────────────

    #[test]
    fn failing_paint_does_not_stop_ticks() {
        let clock = ManualClock::new();
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let mut animator = AdaptiveAnimator::with_clock(
            AnimatorConfig::new(100.0).unwrap(),
            clock.clone(),
            move || {
                c.set(c.get() + 1);
                if c.get() == 1 {
                    anyhow::bail!("canvas not ready");
                }
                Ok(())
            },
        );

        let mut port = PendingTick::default();
        animator.start(&mut port);

        clock.set_millis(0.0);
        assert!(port.take());
        let err = animator.tick(&mut port).unwrap_err();
        assert!(format!("{err:#}").contains("canvas not ready"));
        assert!(port.is_armed());

        drive(&mut animator, &clock, &mut port, &[50.0, 120.0, 130.0]);
        assert_eq!(animator.system_frames(), 4);
        assert_eq!(animator.actual_frames(), 2);
        assert_eq!(calls.get(), 2);
    }

    // ── properties ────────────────────────────────────────────────────────

    /// Non-decreasing timestamps in ms, built from random increments.
    fn rising_stamps() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0.0f64..250.0, 1..300).prop_map(|steps| {
            steps
                .into_iter()
                .scan(0.0, |t, dt| {
                    *t += dt;
                    Some(*t)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn last_window_is_non_decreasing(window_ms in 0.5f64..2_000.0, stamps in rising_stamps()) {
            let (mut animator, clock, paints) = counting(window_ms);
            let mut port = PendingTick::default();
            animator.start(&mut port);

            let mut prev = None;
            for &ms in &stamps {
                drive(&mut animator, &clock, &mut port, &[ms]);
                let cur = animator.last_paint_window();
                prop_assert!(cur >= prev);
                prev = cur;

                let c = animator.counters();
                prop_assert!(c.actual <= c.system);
            }

            let c = animator.counters();
            prop_assert_eq!(c.system, stamps.len() as u64);
            prop_assert_eq!(c.actual, u64::from(paints.get()));
            // One paint per distinct window observed.
            let config = *animator.config();
            let mut windows: Vec<u64> = stamps
                .iter()
                .map(|&ms| config.window_index(Duration::from_nanos((ms * 1e6).round() as u64)))
                .collect();
            windows.dedup();
            prop_assert_eq!(c.actual, windows.len() as u64);
        }
    }
}
