use common::{
    math::LogOdds,
    robot::{MapMetaData, OccupancyGrid},
};
use nalgebra::Vector2;

use super::{projector::OccupancyUpdate, transform::GridFrame};
use crate::{
    config::{GridMapConfig, SensorModelConfig},
    error::ConfigError,
};

/// Integer address of a grid cell. Ordered lexicographically by `(row, col)`.
///
/// Coordinates may lie outside of the grid, [`GridFrame::contains`] tells whether they do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellCoord {
    pub row: isize,
    pub col: isize,
}

impl CellCoord {
    pub const fn new(row: isize, col: isize) -> Self {
        Self { row, col }
    }
}

/// Occupancy probability in percent, `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Occupancy(u8);

impl Occupancy {
    pub const MAX: u8 = 100;

    /// `100 * e^L / (1 + e^L)`, truncated towards zero.
    pub fn from_log_odds(log_odds: LogOdds) -> Self {
        let percent = (log_odds.probability().value() * Self::MAX as f64).trunc();
        // NaN casts to 0
        Self(percent.clamp(0.0, Self::MAX as f64) as u8)
    }

    pub fn percent(&self) -> u8 {
        self.0
    }
}

/// What is known about a single cell.
///
/// Observed cells keep their full (clamped) log-odds so that repeated fusion stays exact; the
/// percentage is only derived when the belief is read.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Belief {
    /// Never observed.
    #[default]
    Unknown,
    Observed(LogOdds),
}

impl Belief {
    pub fn occupancy(&self) -> Option<Occupancy> {
        match self {
            Belief::Unknown => None,
            Belief::Observed(l) => Some(Occupancy::from_log_odds(*l)),
        }
    }

    /// Value used in the flat grid representation: `-1` for unknown, else the percentage.
    pub fn as_i8(&self) -> i8 {
        self.occupancy()
            .map_or(OccupancyGrid::UNKNOWN, |o| o.percent() as i8)
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Belief::Observed(_))
    }
}

#[derive(Clone)]
pub struct GridData<T> {
    /** the size of the grid in cells (rows, columns) */
    size: Vector2<usize>,

    /// Vector containing all the data values
    data: Vec<T>,
}

impl<T> GridData<T> {
    fn index(&self, cell: CellCoord) -> Option<usize> {
        // Row-major order
        let row = usize::try_from(cell.row).ok()?;
        let col = usize::try_from(cell.col).ok()?;
        (row < self.size.x && col < self.size.y).then(|| row * self.size.y + col)
    }

    pub fn get(&self, cell: CellCoord) -> Option<&T> {
        self.index(cell).map(|i| &self.data[i])
    }

    pub fn get_mut(&mut self, cell: CellCoord) -> Option<&mut T> {
        let index = self.index(cell)?;
        Some(&mut self.data[index])
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T: Clone> GridData<T> {
    pub fn new_fill(size: Vector2<usize>, initial_value: T) -> Self {
        Self {
            size,
            data: vec![initial_value; size.x * size.y],
        }
    }
}

/// The persistent belief grid. Observations are fused in log-odds space and stored back as
/// percentages.
#[derive(Clone)]
pub struct LogOddsMap {
    frame: GridFrame,
    sensor_model: SensorModelConfig,
    cells: GridData<Belief>,
}

impl LogOddsMap {
    pub fn new(config: &GridMapConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let frame = GridFrame::new(config);
        Ok(Self {
            cells: GridData::new_fill(Vector2::new(frame.height, frame.width), Belief::Unknown),
            sensor_model: config.sensor_model,
            frame,
        })
    }

    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    pub fn meta(&self) -> MapMetaData {
        self.frame.meta()
    }

    /// Current belief of `cell`. Cells outside of the grid are always unknown.
    pub fn read(&self, cell: CellCoord) -> Belief {
        self.cells.get(cell).copied().unwrap_or_default()
    }

    /// Fuses one batch of observations, returns the number of cells that were updated.
    ///
    /// Every cell is updated from its own previous value only. The batch is disjoint by
    /// construction, so a cell is never fused as both hit and free from the same scan.
    pub fn update(&mut self, batch: OccupancyUpdate) -> usize {
        let occupied = self.sensor_model.occupied();
        let free = self.sensor_model.free();

        let mut fused = 0;
        for &cell in batch.filled() {
            fused += self.fuse(cell, occupied) as usize;
        }
        for &cell in batch.unfilled() {
            fused += self.fuse(cell, free) as usize;
        }

        let skipped = batch.len() - fused;
        if skipped > 0 {
            tracing::trace!("skipped {skipped} cells outside of the map");
        }

        fused
    }

    fn fuse(&mut self, cell: CellCoord, observation: LogOdds) -> bool {
        let limit = self.sensor_model.log_odds_limit;
        let prior = self.sensor_model.prior();

        let Some(belief) = self.cells.get_mut(cell) else {
            return false;
        };

        let previous = match *belief {
            Belief::Unknown => prior,
            Belief::Observed(l) => l,
        }
        .clamp(limit);

        *belief = Belief::Observed((previous + observation - prior).clamp(limit));
        true
    }

    /// Number of cells that have been observed at least once.
    pub fn observed_cells(&self) -> usize {
        self.cells.iter().filter(|b| b.is_known()).count()
    }

    /// Flat row-major copy of the grid for publication.
    pub fn snapshot(&self) -> OccupancyGrid {
        OccupancyGrid {
            info: self.meta(),
            data: self.cells.iter().map(Belief::as_i8).collect(),
        }
    }
}
