use std::collections::BTreeSet;

use common::robot::{LaserScan, Pose};

use super::{
    map::CellCoord,
    ray::walk,
    transform::{range_bearing_to_point, to_cell, GridFrame},
};
use crate::{
    config::GridMapConfig,
    error::{ConfigError, ScanError},
};

/// The cells observed by one scan: ray endpoints (`filled`) and the cells the rays passed
/// through on their way there (`unfilled`). The two sets never share a cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyUpdate {
    filled: BTreeSet<CellCoord>,
    unfilled: BTreeSet<CellCoord>,
}

impl OccupancyUpdate {
    /// Builds a batch. Cells present in both sets are kept as `filled` only.
    pub fn new(filled: BTreeSet<CellCoord>, mut unfilled: BTreeSet<CellCoord>) -> Self {
        unfilled.retain(|cell| !filled.contains(cell));
        Self { filled, unfilled }
    }

    pub fn filled(&self) -> &BTreeSet<CellCoord> {
        &self.filled
    }

    pub fn unfilled(&self) -> &BTreeSet<CellCoord> {
        &self.unfilled
    }

    /// Total number of cells in the batch.
    pub fn len(&self) -> usize {
        self.filled.len() + self.unfilled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filled.is_empty() && self.unfilled.is_empty()
    }
}

/// Turns a range scan taken at a known pose into an [`OccupancyUpdate`].
#[derive(Debug, Clone)]
pub struct ScanProjector {
    frame: GridFrame,
}

impl ScanProjector {
    pub fn new(config: &GridMapConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            frame: GridFrame::new(config),
        })
    }

    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    /// Projects every sample of `scan` from `pose`.
    ///
    /// Samples without a return (infinite, or outside of `[range_min, range_max]`) and samples
    /// whose endpoint falls outside of the grid are dropped. A NaN or negative range, or a pose
    /// that is not finite, rejects the whole scan.
    pub fn project(&self, pose: &Pose, scan: &LaserScan) -> Result<OccupancyUpdate, ScanError> {
        if scan.is_empty() {
            return Ok(OccupancyUpdate::default());
        }

        if !pose.is_finite() {
            return Err(ScanError::degenerate(format!("pose is not finite: {pose:?}")));
        }
        if !(scan.angle_min.is_finite() && scan.angle_increment.is_finite()) {
            return Err(ScanError::degenerate("scan angles are not finite"));
        }
        if let Some((i, range)) = scan
            .ranges
            .iter()
            .enumerate()
            .find(|(_, r)| r.is_nan() || **r < 0.0)
        {
            return Err(ScanError::degenerate(format!(
                "range {range} of sample {i} is not a distance"
            )));
        }

        let origin = self.frame.normalized_position(pose);
        let origin_cell = to_cell(origin).ok_or_else(|| {
            ScanError::degenerate(format!("sensor origin {origin:?} can not be addressed"))
        })?;

        let mut filled = BTreeSet::new();
        let mut traversed = BTreeSet::new();
        let mut no_return = 0;
        let mut out_of_bounds = 0;

        for (bearing, range) in scan.samples() {
            if range.is_infinite() || range < scan.range_min || range > scan.range_max {
                no_return += 1;
                continue;
            }

            let point = range_bearing_to_point(
                origin,
                pose.yaw,
                bearing,
                range,
                self.frame.resolution,
            );
            let Some(end) = to_cell(point).filter(|&cell| self.frame.contains(cell)) else {
                out_of_bounds += 1;
                continue;
            };

            filled.insert(end);
            traversed.extend(walk(origin_cell, end).filter(|&cell| self.frame.contains(cell)));
        }

        // every endpoint is part of its own ray, `new` drops them from the free cells again
        let update = OccupancyUpdate::new(filled, traversed);

        tracing::debug!(
            samples = scan.len(),
            no_return,
            out_of_bounds,
            filled = update.filled().len(),
            unfilled = update.unfilled().len(),
            "projected scan"
        );

        Ok(update)
    }
}
