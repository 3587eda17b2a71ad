use common::robot::{LaserScan, Pose};

use super::{projector::ScanProjector, shared::SharedMap};
use crate::{
    config::GridMapConfig,
    error::{ConfigError, ScanError},
};

/// What happened to a scan handed to [`OccupancyMapper::update`].
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The scan was fused. Counts are the cells that were updated as hit and as free.
    Applied { filled: usize, unfilled: usize },

    /// The scan was not usable, the map is unchanged.
    Rejected(ScanError),
}

impl UpdateOutcome {
    pub fn cells_processed(&self) -> usize {
        match self {
            UpdateOutcome::Applied { filled, unfilled } => filled + unfilled,
            UpdateOutcome::Rejected(_) => 0,
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, UpdateOutcome::Rejected(_))
    }
}

/// The full pipeline: projects a `(pose, scan)` pair and fuses the result into the shared map.
pub struct OccupancyMapper {
    projector: ScanProjector,
    map: SharedMap,
}

impl OccupancyMapper {
    pub fn new(config: &GridMapConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            projector: ScanProjector::new(config)?,
            map: SharedMap::new(config)?,
        })
    }

    /// The map this mapper writes into. Clone it to read from other threads.
    pub fn map(&self) -> &SharedMap {
        &self.map
    }

    pub fn update(&self, pose: &Pose, scan: &LaserScan) -> UpdateOutcome {
        let batch = match self.projector.project(pose, scan) {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!("rejected scan: {e}");
                return UpdateOutcome::Rejected(e);
            }
        };

        if batch.is_empty() {
            return UpdateOutcome::Applied {
                filled: 0,
                unfilled: 0,
            };
        }

        // every cell of a projected batch lies within the grid
        let filled = batch.filled().len();
        let unfilled = batch.unfilled().len();
        let fused = self.map.apply(batch);
        debug_assert_eq!(fused, filled + unfilled);

        UpdateOutcome::Applied { filled, unfilled }
    }
}
