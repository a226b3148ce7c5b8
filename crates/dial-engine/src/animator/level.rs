use super::adaptive::PaintFn;
use super::error::{AnimatorError, Result};
use super::sampler::FrameCounters;
use super::tick::{Animator, Phase, StopHandle, TickOutcome, TickPort};

/// Level throttle configuration.
///
/// Levels run from `0` (most degraded) to `total_levels - 1` (paint every tick).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LevelConfig {
    total_levels: u32,
    default_level: u32,
}

impl LevelConfig {
    pub fn new(total_levels: u32, default_level: u32) -> Result<Self> {
        if total_levels == 0 {
            return Err(AnimatorError::InvalidLevelCount);
        }
        check_level(default_level, total_levels)?;
        Ok(Self {
            total_levels,
            default_level,
        })
    }

    pub fn total_levels(&self) -> u32 {
        self.total_levels
    }

    pub fn default_level(&self) -> u32 {
        self.default_level
    }
}

fn check_level(level: u32, total: u32) -> Result<()> {
    if level >= total {
        return Err(AnimatorError::LevelOutOfRange { level, total });
    }
    Ok(())
}

/// Frame-skipping throttle keyed on a performance level.
///
/// Paints on every Nth host tick, with `N = total_levels - current_level`.
/// Unlike [`AdaptiveAnimator`](super::AdaptiveAnimator) it ignores wall-clock
/// time entirely, so its paint rate follows the host's refresh rate.
pub struct LevelThrottle {
    config: LevelConfig,
    current_level: u32,
    paint: PaintFn,

    phase: Phase,
    stop: StopHandle,
    frame_id: u32,

    system_frames: u64,
    actual_frames: u64,
}

impl LevelThrottle {
    pub fn new<F>(config: LevelConfig, paint: F) -> Self
    where
        F: FnMut() -> anyhow::Result<()> + 'static,
    {
        Self {
            config,
            current_level: config.default_level,
            paint: Box::new(paint),
            phase: Phase::Unstarted,
            stop: StopHandle::default(),
            frame_id: 0,
            system_frames: 0,
            actual_frames: 0,
        }
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    /// Host ticks per paint at the current level.
    pub fn divisor(&self) -> u32 {
        self.config.total_levels - self.current_level
    }

    /// Changes the level. Takes effect from the next tick.
    pub fn set_level(&mut self, level: u32) -> Result<()> {
        check_level(level, self.config.total_levels)?;
        if level != self.current_level {
            log::debug!("performance level {} -> {}", self.current_level, level);
            self.current_level = level;
            // A shorter cycle must not leave frame_id past its end.
            self.frame_id %= self.divisor();
        }
        Ok(())
    }

    /// Steps one level down (fewer paints). Returns false at level 0.
    pub fn degrade(&mut self) -> bool {
        match self.current_level.checked_sub(1) {
            Some(level) => self.set_level(level).is_ok(),
            None => false,
        }
    }

    /// Steps one level up (more paints). Returns false at the top level.
    pub fn upgrade(&mut self) -> bool {
        self.set_level(self.current_level.saturating_add(1)).is_ok()
    }

    fn sync_stop(&mut self) {
        if self.phase == Phase::Running && self.stop.is_stopped() {
            self.phase = Phase::Stopped;
            log::debug!("level throttle stopped at level {}", self.current_level);
        }
    }
}

impl Animator for LevelThrottle {
    fn start(&mut self, port: &mut dyn TickPort) {
        self.stop.reset();
        self.phase = Phase::Running;
        self.frame_id = 0;
        self.system_frames = 0;
        self.actual_frames = 0;

        log::debug!(
            "level throttle started at level {}/{}",
            self.current_level,
            self.config.total_levels
        );

        port.request_tick();
    }

    fn tick(&mut self, port: &mut dyn TickPort) -> anyhow::Result<TickOutcome> {
        self.sync_stop();
        if self.phase != Phase::Running {
            return Ok(TickOutcome::Idle);
        }

        self.system_frames += 1;

        let painted = if self.frame_id == 0 {
            let result = (self.paint)();
            self.actual_frames += 1;
            Some(result)
        } else {
            None
        };

        self.frame_id = (self.frame_id + 1) % self.divisor();

        self.sync_stop();
        if self.phase == Phase::Running {
            port.request_tick();
        }

        match painted {
            Some(Ok(())) => Ok(TickOutcome::Painted),
            Some(Err(err)) => Err(err.context("paint failed")),
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
}
