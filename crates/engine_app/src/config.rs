//! Driver configuration.
//!
//! Values come from three layers: [`TickConfig::default`], an optional JSON
//! file, and command-line flags. Later layers win.

use std::path::Path;

use anyhow::{Context, Result, bail};
use engine_math::Vec2;
use serde::Deserialize;

/// Configuration for the tick loop.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
    /// Display bounds in pixels, as `[width, height]`.
    pub viewport: Vec2,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_ticks: 0,
            viewport: Vec2::new(800.0, 600.0),
        }
    }
}

impl TickConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).context("invalid tick config")?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("in {}", path.display()))
    }

    /// Reject values the loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.tick_rate.is_finite() || self.tick_rate <= 0.0 {
            bail!("tick_rate must be a positive number, got {}", self.tick_rate);
        }
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            bail!(
                "viewport must be positive, got {}x{}",
                self.viewport.x,
                self.viewport.y
            );
        }
        Ok(())
    }

    /// Target frame time in milliseconds.
    #[must_use]
    pub fn frame_ms(&self) -> f64 {
        1000.0 / self.tick_rate
    }
}
