use std::fmt::Display;

use common::robot::{MapMetaData, OccupancyGrid};
use gridmap::SharedMap;

/// Cells at or above this value count as occupied in published summaries.
pub const OCCUPIED_THRESHOLD: i8 = 65;

/// Cells at or below this value count as free in published summaries.
pub const FREE_THRESHOLD: i8 = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSummary {
    pub known: usize,
    pub occupied: usize,
    pub free: usize,
}

impl GridSummary {
    pub fn of(grid: &OccupancyGrid) -> Self {
        Self {
            known: grid.known_cells(),
            occupied: grid.occupied_cells(OCCUPIED_THRESHOLD),
            free: grid.free_cells(FREE_THRESHOLD),
        }
    }
}

impl Display for GridSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} known ({} occupied, {} free)",
            self.known, self.occupied, self.free
        )
    }
}

/// What went out in one publication cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Publication {
    Metadata(MapMetaData),
    Grid(MapMetaData, OccupancyGrid),
}

impl Publication {
    pub fn meta(&self) -> &MapMetaData {
        match self {
            Publication::Metadata(meta) | Publication::Grid(meta, _) => meta,
        }
    }

    pub fn grid(&self) -> Option<&OccupancyGrid> {
        match self {
            Publication::Metadata(_) => None,
            Publication::Grid(_, grid) => Some(grid),
        }
    }
}

/// Reads the shared map at a fixed cadence. Metadata goes out every cycle, the full grid only
/// every `grid_every`-th cycle (starting with the first).
pub struct Publisher {
    map: SharedMap,
    grid_every: usize,
    cycle: usize,
}

impl Publisher {
    pub fn new(map: SharedMap, grid_every: usize) -> Self {
        Self {
            map,
            grid_every: grid_every.max(1),
            cycle: 0,
        }
    }

    pub fn cycle(&self) -> usize {
        self.cycle
    }

    pub fn publish(&mut self) -> Publication {
        let meta = self.map.meta();
        let publication = if self.cycle % self.grid_every == 0 {
            let grid = self.map.snapshot();
            tracing::info!(
                cycle = self.cycle,
                "grid {}x{} @ {}m: {}",
                meta.width,
                meta.height,
                meta.resolution,
                GridSummary::of(&grid)
            );
            Publication::Grid(meta, grid)
        } else {
            tracing::debug!(
                cycle = self.cycle,
                "metadata {}x{} @ {}m",
                meta.width,
                meta.height,
                meta.resolution
            );
            Publication::Metadata(meta)
        };

        self.cycle += 1;
        publication
    }
}

#[cfg(test)]
mod test {
    use common::robot::{LaserScan, Pose};
    use gridmap::{GridMapConfig, OccupancyMapper};

    use super::*;

    #[test]
    fn summary_counts() {
        let grid = OccupancyGrid {
            info: MapMetaData {
                resolution: 0.1,
                width: 3,
                height: 2,
            },
            data: vec![-1, 0, 35, 50, 65, 100],
        };

        assert_eq!(
            GridSummary::of(&grid),
            GridSummary {
                known: 5,
                occupied: 2,
                free: 2
            }
        );
    }

    #[test]
    fn grid_goes_out_every_nth_cycle() {
        let mapper = OccupancyMapper::new(&GridMapConfig::default()).unwrap();
        let mut publisher = Publisher::new(mapper.map().clone(), 3);

        let kinds: Vec<bool> = (0..7)
            .map(|_| publisher.publish().grid().is_some())
            .collect();
        assert_eq!(kinds, [true, false, false, true, false, false, true]);
        assert_eq!(publisher.cycle(), 7);
    }

    #[test]
    fn snapshots_follow_the_map() {
        let mapper = OccupancyMapper::new(&GridMapConfig::default()).unwrap();
        let mut publisher = Publisher::new(mapper.map().clone(), 1);

        let Publication::Grid(_, before) = publisher.publish() else {
            panic!("expected a grid");
        };
        assert_eq!(before.known_cells(), 0);

        mapper.update(&Pose::default(), &LaserScan::new(0.0, 0.1, vec![1.0]));

        let Publication::Grid(meta, after) = publisher.publish() else {
            panic!("expected a grid");
        };
        assert_eq!((meta.width, meta.height), (100, 100));
        assert_eq!(
            GridSummary::of(&after),
            GridSummary {
                known: 11,
                occupied: 1,
                free: 10
            }
        );
    }
}
