use std::fmt;
use std::time::{Duration, Instant};

use super::error::{AnimatorError, Result};

/// Snapshot of an animator's frame counters.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct FrameCounters {
    /// Host ticks observed while running.
    pub system: u64,
    /// Paint invocations.
    pub actual: u64,
}

/// Observed rates over one sampling interval.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameRates {
    pub system_fps: f64,
    pub actual_fps: f64,
    pub theoretical_fps: Option<f64>,
}

impl fmt::Display for FrameRates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "system {:.1} fps, actual {:.1} fps",
            self.system_fps, self.actual_fps
        )?;
        if let Some(ceiling) = self.theoretical_fps {
            write!(f, " (ceiling {ceiling:.1} fps)")?;
        }
        Ok(())
    }
}

/// Turns counter snapshots into rates at a fixed interval.
///
/// Not part of any animator: the host decides when to sample.
#[derive(Debug, Clone)]
pub struct FrameRateSampler {
    interval: Duration,
    theoretical_fps: Option<f64>,
    baseline: Option<(Instant, FrameCounters)>,
}

impl FrameRateSampler {
    pub fn new(interval: Duration, theoretical_fps: Option<f64>) -> Result<Self> {
        if interval.is_zero() {
            return Err(AnimatorError::InvalidSampleInterval);
        }
        Ok(Self {
            interval,
            theoretical_fps,
            baseline: None,
        })
    }

    /// Drops the baseline, e.g. after the animator restarted.
    pub fn reset(&mut self) {
        self.baseline = None;
    }

    /// Records a snapshot and returns rates once `interval` has passed since
    /// the previous emitted sample.
    ///
    /// The first call only sets the baseline.
    pub fn sample(&mut self, now: Instant, counters: FrameCounters) -> Option<FrameRates> {
        let Some((since, base)) = self.baseline else {
            self.baseline = Some((now, counters));
            return None;
        };

        let elapsed = now.saturating_duration_since(since);
        if elapsed < self.interval {
            return None;
        }

        // Counters only go backwards when the animator was restarted.
        if counters.system < base.system || counters.actual < base.actual {
            self.baseline = Some((now, counters));
            return None;
        }

        let secs = elapsed.as_secs_f64();
        let rates = FrameRates {
            system_fps: (counters.system - base.system) as f64 / secs,
            actual_fps: (counters.actual - base.actual) as f64 / secs,
            theoretical_fps: self.theoretical_fps,
        };

        self.baseline = Some((now, counters));
        Some(rates)
    }
}
