use std::path::Path;

use anyhow::{ensure, Context};
use gridmap::GridMapConfig;
use serde::Deserialize;
use simulator::SimulatorConfig;

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map: GridMapConfig,
    pub simulator: SimulatorConfig,
    pub publish: PublishConfig,

    /// Number of scans that may wait for the mapping thread before new ones are dropped.
    pub queue_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            map: GridMapConfig::default(),
            simulator: SimulatorConfig::default(),
            publish: PublishConfig::default(),
            queue_depth: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Publication cycles per second.
    pub rate_hz: f32,

    /// A full grid snapshot goes out every `grid_every`-th cycle, metadata every cycle.
    pub grid_every: usize,

    /// Number of publication cycles before the host shuts down.
    pub cycles: usize,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            rate_hz: 10.0,
            grid_every: 10,
            cycles: 100,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        Self::from_contents(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_contents(contents: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.map.validate()?;
        ensure!(
            self.publish.rate_hz.is_finite() && self.publish.rate_hz > 0.0,
            "publish.rate_hz must be positive, got {}",
            self.publish.rate_hz
        );
        ensure!(self.publish.grid_every > 0, "publish.grid_every must be at least 1");
        ensure!(self.queue_depth > 0, "queue_depth must be at least 1");

        let sim = &self.simulator.parameters;
        for (field, value) in [
            ("simulator.parameters.wheel_base", sim.wheel_base),
            ("simulator.parameters.update_period", sim.update_period),
            ("simulator.parameters.scanner_range", sim.scanner_range),
        ] {
            ensure!(
                value.is_finite() && value > 0.0,
                "{field} must be finite and positive, got {value}"
            );
        }
        Ok(())
    }
}
