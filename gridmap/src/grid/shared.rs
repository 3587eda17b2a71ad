use std::sync::Arc;

use common::robot::{MapMetaData, OccupancyGrid};
use parking_lot::RwLock;

use super::{
    map::{Belief, CellCoord, LogOddsMap},
    projector::OccupancyUpdate,
};
use crate::{config::GridMapConfig, error::ConfigError};

/// Handle to a [`LogOddsMap`] shared between the thread fusing scans and the threads reading it.
///
/// A batch is applied while holding the write lock, so readers see either none or all of it.
#[derive(Clone)]
pub struct SharedMap {
    map: Arc<RwLock<LogOddsMap>>,
}

impl SharedMap {
    pub fn new(config: &GridMapConfig) -> Result<Self, ConfigError> {
        Ok(Self::from_map(LogOddsMap::new(config)?))
    }

    pub fn from_map(map: LogOddsMap) -> Self {
        Self {
            map: Arc::new(RwLock::new(map)),
        }
    }

    /// Fuses a whole batch, returns the number of cells updated.
    pub fn apply(&self, batch: OccupancyUpdate) -> usize {
        self.map.write().update(batch)
    }

    pub fn read(&self, cell: CellCoord) -> Belief {
        self.map.read().read(cell)
    }

    pub fn snapshot(&self) -> OccupancyGrid {
        self.map.read().snapshot()
    }

    pub fn meta(&self) -> MapMetaData {
        self.map.read().meta()
    }

    pub fn observed_cells(&self) -> usize {
        self.map.read().observed_cells()
    }
}
