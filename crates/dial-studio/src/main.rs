mod clock_app;
mod options;

use anyhow::Result;
use clap::Parser;
use winit::dpi::LogicalSize;

use dial_engine::logging::{init_logging, LoggingConfig};
use dial_engine::window::{Runtime, RuntimeConfig};

use clock_app::ClockApp;
use options::{Cli, StudioOptions, Throttle};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let options = StudioOptions::from(Cli::parse());

    match options.throttle {
        Throttle::Window { window_ms } => {
            log::info!("adaptive animator, {window_ms:.3} ms windows")
        }
        Throttle::Levels { total, current } => {
            log::info!("level throttle, level {current} of {total} (arrow keys change it)")
        }
    }

    let app = ClockApp::new(&options)?;

    Runtime::run(
        RuntimeConfig {
            title: "dial".to_string(),
            initial_size: LogicalSize::new(560.0, 120.0),
            resizable: true,
        },
        app,
    )
}
