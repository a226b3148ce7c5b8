use clap::Parser;

/// Default repaint ceiling for the clock: 30 paints per second.
pub const DEFAULT_WINDOW_MS: f64 = 1000.0 / 30.0;

/// Analog clock demo driven by a frame-throttling animator
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "dial-studio")]
#[command(version = "0.1.0")]
#[command(about = "Analog clock demo driven by a frame-throttling animator")]
pub struct Cli {
    /// Repaint window in milliseconds [default: 33.333]
    #[arg(value_name = "WINDOW_MS", allow_negative_numbers = true, conflicts_with = "levels")]
    pub window_ms: Option<f64>,

    /// Use the level throttle with TOTAL levels, starting at CURRENT
    #[arg(long, value_name = "TOTAL:CURRENT", value_parser = parse_levels)]
    pub levels: Option<LevelSpec>,

    /// Frame-rate log interval in seconds
    #[arg(long, default_value_t = 1.0)]
    pub sample_secs: f64,
}

/// `--levels` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelSpec {
    pub total: u32,
    pub current: u32,
}

fn parse_levels(s: &str) -> Result<LevelSpec, String> {
    let (total, current) = s
        .split_once(':')
        .ok_or_else(|| format!("expected TOTAL:CURRENT, got {s:?}"))?;
    let total = total
        .trim()
        .parse()
        .map_err(|e| format!("invalid level total {total:?}: {e}"))?;
    let current = current
        .trim()
        .parse()
        .map_err(|e| format!("invalid current level {current:?}: {e}"))?;
    Ok(LevelSpec { total, current })
}

/// Which throttle drives the clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Throttle {
    Window { window_ms: f64 },
    Levels { total: u32, current: u32 },
}

/// Resolved demo settings.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioOptions {
    pub throttle: Throttle,
    pub sample_secs: f64,
}

impl Default for StudioOptions {
    fn default() -> Self {
        Self {
            throttle: Throttle::Window {
                window_ms: DEFAULT_WINDOW_MS,
            },
            sample_secs: 1.0,
        }
    }
}

impl From<Cli> for StudioOptions {
    fn from(cli: Cli) -> Self {
        let throttle = match (cli.levels, cli.window_ms) {
            (Some(LevelSpec { total, current }), _) => Throttle::Levels { total, current },
            (None, Some(window_ms)) => Throttle::Window { window_ms },
            (None, None) => Throttle::Window {
                window_ms: DEFAULT_WINDOW_MS,
            },
        };
        Self {
            throttle,
            sample_secs: cli.sample_secs,
        }
    }
}
