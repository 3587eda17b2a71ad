//! Incremental 2D occupancy grid mapping from planar range scans.
//!
//! A scan plus the sensor pose is projected into two sets of grid cells ([`OccupancyUpdate`]):
//! the ray endpoints (obstacles) and the cells the rays passed through (free space). The batch is
//! then fused into a persistent [`LogOddsMap`] in log-odds space.

mod config;
mod error;
mod grid;

pub use config::{GridMapConfig, SensorModelConfig};
pub use error::{ConfigError, ScanError};

pub use grid::map::{Belief, CellCoord, LogOddsMap, Occupancy};
pub use grid::mapper::{OccupancyMapper, UpdateOutcome};
pub use grid::projector::{OccupancyUpdate, ScanProjector};
pub use grid::ray::{trace, trace_into, walk, BresenhamIterator};
pub use grid::shared::SharedMap;
pub use grid::transform::{
    range_bearing_to_point, to_cell, world_to_normalized, GridFrame, WorldBounds,
};
