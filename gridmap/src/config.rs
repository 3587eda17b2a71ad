use common::math::{LogOdds, Probability};
use nalgebra::Vector2;
use serde::Deserialize;

use crate::error::ConfigError;

/// Largest supported grid, in cells along one side.
pub const MAX_CELLS_PER_SIDE: usize = 1 << 14;

/// Geometry and sensor model of the map. Fixed for the lifetime of a [`crate::LogOddsMap`].
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GridMapConfig {
    /// World position of the lower-left corner of the covered area.
    pub position: Vector2<f32>,

    /// Side length in meters of the (square) covered area.
    pub extent: f32,

    /// Meters per cell.
    pub resolution: f32,

    pub sensor_model: SensorModelConfig,
}

impl Default for GridMapConfig {
    fn default() -> Self {
        Self {
            position: Vector2::new(-5.0, -5.0),
            extent: 10.0,
            resolution: 0.1,
            sensor_model: SensorModelConfig::default(),
        }
    }
}

/// Inverse sensor model used when fusing observations.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct SensorModelConfig {
    /// Probability that a cell holding a ray endpoint is occupied.
    pub p_occupied: f64,

    /// Probability that a cell a ray passed through is occupied.
    pub p_free: f64,

    /// Belief assumed for cells that were never observed.
    pub p_prior: f64,

    /// Log-odds are kept within `[-log_odds_limit, log_odds_limit]`.
    pub log_odds_limit: f64,
}

impl Default for SensorModelConfig {
    fn default() -> Self {
        Self {
            p_occupied: 0.99,
            p_free: 0.01,
            p_prior: 0.5,
            log_odds_limit: 50.0,
        }
    }
}

impl SensorModelConfig {
    pub fn occupied(&self) -> LogOdds {
        Probability::new(self.p_occupied).log_odds()
    }

    pub fn free(&self) -> LogOdds {
        Probability::new(self.p_free).log_odds()
    }

    pub fn prior(&self) -> LogOdds {
        Probability::new(self.p_prior).log_odds()
    }
}

impl GridMapConfig {
    /// Number of cells along each side, `ceil(extent / resolution)`.
    pub fn cells_per_side(&self) -> usize {
        (self.extent / self.resolution).ceil() as usize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(ConfigError::invalid(
                "resolution",
                format!("must be finite and positive, got {}", self.resolution),
            ));
        }
        if !(self.extent.is_finite() && self.extent > 0.0) {
            return Err(ConfigError::invalid(
                "extent",
                format!("must be finite and positive, got {}", self.extent),
            ));
        }
        if self.cells_per_side() > MAX_CELLS_PER_SIDE {
            return Err(ConfigError::invalid(
                "resolution",
                format!(
                    "{} cells per side for an extent of {}m, at most {MAX_CELLS_PER_SIDE} are supported",
                    self.cells_per_side(),
                    self.extent
                ),
            ));
        }
        if !(self.position.x.is_finite() && self.position.y.is_finite()) {
            return Err(ConfigError::invalid("position", "must be finite"));
        }

        let model = &self.sensor_model;
        for (field, p) in [
            ("sensor_model.p_occupied", model.p_occupied),
            ("sensor_model.p_free", model.p_free),
            ("sensor_model.p_prior", model.p_prior),
        ] {
            if !(p > 0.0 && p < 1.0) {
                return Err(ConfigError::invalid(
                    field,
                    format!("must lie strictly between 0 and 1, got {p}"),
                ));
            }
        }
        if !(model.log_odds_limit.is_finite() && model.log_odds_limit > 0.0) {
            return Err(ConfigError::invalid(
                "sensor_model.log_odds_limit",
                format!("must be finite and positive, got {}", model.log_odds_limit),
            ));
        }

        Ok(())
    }
}
