//! # engine_app
//!
//! Headless driver for the component runtime. Loads the playground scene and
//! runs it at a fixed tick rate, feeding it a scripted input pattern.
//!
//! ## Configuration
//!
//! Defaults, then an optional JSON file (`--config`), then command-line
//! flags. Logging honours `RUST_LOG`.

mod config;
mod playground;
mod tick;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use engine_math::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::TickConfig;
use playground::{PlaygroundScene, ScriptedInput};
use tick::TickLoop;

#[derive(Parser)]
#[command(name = "engine_app", about = "Run the playground scene headlessly")]
struct Args {
    /// JSON file with tick_rate, max_ticks and viewport
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target ticks per second
    #[arg(short, long)]
    tick_rate: Option<f64>,

    /// Stop after this many ticks (0 = run forever)
    #[arg(short, long)]
    max_ticks: Option<u64>,

    /// Viewport width in pixels
    #[arg(long)]
    width: Option<f32>,

    /// Viewport height in pixels
    #[arg(long)]
    height: Option<f32>,
}

impl Args {
    fn resolve(&self) -> Result<TickConfig> {
        let mut config = match &self.config {
            Some(path) => TickConfig::load(path)?,
            None => TickConfig::default(),
        };
        if let Some(tick_rate) = self.tick_rate {
            config.tick_rate = tick_rate;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.max_ticks = max_ticks;
        }
        config.viewport = Vec2::new(
            self.width.unwrap_or(config.viewport.x),
            self.height.unwrap_or(config.viewport.y),
        );
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("engine_app=info".parse()?))
        .init();

    let args = Args::parse();
    let config = args.resolve()?;
    info!(?config, "engine starting");

    let scene = PlaygroundScene::new(config.viewport)?;
    let script = ScriptedInput::default();

    let mut tick_loop = TickLoop::new(config);
    tick_loop.set_input(move |tick, now, input| script.apply(tick, now, input));
    tick_loop.change_scene(Box::new(scene));
    tick_loop.run()?;

    info!(ticks = tick_loop.tick_id(), "engine shut down");
    Ok(())
}
