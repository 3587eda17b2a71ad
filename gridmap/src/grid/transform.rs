//! Conversions between world coordinates and grid coordinates.
//!
//! The grid uses a top-left origin: rows grow with decreasing world `y` and columns grow with
//! decreasing world `x`, both measured from the upper corner of the covered area.

use common::robot::{MapMetaData, Pose};
use nalgebra::Vector2;

use super::map::CellCoord;
use crate::config::GridMapConfig;

/// Normalized coordinates further away than this are not turned into cells.
const CELL_LIMIT: f32 = (1u32 << 20) as f32;

/// Axis aligned world area covered by the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub min: Vector2<f32>,
    pub max: Vector2<f32>,
}

/// Geometry of the grid: where it lies in the world and how many cells it has.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridFrame {
    pub bounds: WorldBounds,
    pub resolution: f32,
    pub width: usize,
    pub height: usize,
}

impl GridFrame {
    pub fn new(config: &GridMapConfig) -> Self {
        // calculate the required size in cells to fill the desired area based on the resolution
        let cells = config.cells_per_side();

        // calculate the "real" size of this grid map (potentially larger caused by ceil())
        let world_size = cells as f32 * config.resolution;

        Self {
            bounds: WorldBounds {
                min: config.position,
                max: config.position + Vector2::new(world_size, world_size),
            },
            resolution: config.resolution,
            width: cells,
            height: cells,
        }
    }

    pub fn contains(&self, cell: CellCoord) -> bool {
        (0..self.height as isize).contains(&cell.row) && (0..self.width as isize).contains(&cell.col)
    }

    pub fn meta(&self) -> MapMetaData {
        MapMetaData {
            resolution: self.resolution,
            width: self.width,
            height: self.height,
        }
    }

    /// Position of the sensor in normalized grid coordinates.
    pub fn normalized_position(&self, pose: &Pose) -> Vector2<f32> {
        world_to_normalized(pose, &self.bounds, self.resolution)
    }
}

/// Maps the position of `pose` into fractional grid coordinates (`x` is the row, `y` the column).
pub fn world_to_normalized(pose: &Pose, bounds: &WorldBounds, resolution: f32) -> Vector2<f32> {
    Vector2::new(
        (bounds.max.y - pose.y) / resolution,
        (bounds.max.x - pose.x) / resolution,
    )
}

/// Projects a single range sample taken at `angle` (relative to a sensor heading `yaw`) from the
/// normalized position `origin`. The result is normalized but not yet rounded to a cell.
pub fn range_bearing_to_point(
    origin: Vector2<f32>,
    yaw: f32,
    angle: f32,
    range: f32,
    resolution: f32,
) -> Vector2<f32> {
    let (sin, cos) = (angle + yaw).sin_cos();
    let range = range / resolution;
    Vector2::new(origin.x + range * cos, origin.y + range * sin)
}

/// Rounds a normalized point to its cell (half away from zero). Returns `None` for points that
/// are not finite or too far away to be addressed.
pub fn to_cell(point: Vector2<f32>) -> Option<CellCoord> {
    let row = point.x.round();
    let col = point.y.round();
    if !(row.abs() < CELL_LIMIT && col.abs() < CELL_LIMIT) {
        return None;
    }
    Some(CellCoord::new(row as isize, col as isize))
}
