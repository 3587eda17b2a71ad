use std::collections::BTreeSet;

use common::robot::{LaserScan, Pose};
use gridmap::{
    trace, Belief, CellCoord, GridMapConfig, LogOddsMap, OccupancyMapper, OccupancyUpdate,
    ScanProjector, UpdateOutcome,
};

fn cell(row: isize, col: isize) -> CellCoord {
    CellCoord::new(row, col)
}

#[test]
fn single_hit_scenario() {
    let config = GridMapConfig::default();
    let projector = ScanProjector::new(&config).unwrap();
    let mut map = LogOddsMap::new(&config).unwrap();

    let meta = map.meta();
    assert_eq!((meta.width, meta.height), (100, 100));

    let scan = LaserScan::new(0.0, 0.01, vec![1.0]);
    let batch = projector.project(&Pose::default(), &scan).unwrap();

    let endpoint = cell(60, 50);
    assert_eq!(batch.filled(), &BTreeSet::from([endpoint]));

    // the sensor cell and every cell up to (excluding) the hit are free
    let interior: BTreeSet<_> = trace(cell(50, 50), endpoint)
        .into_iter()
        .filter(|&c| c != endpoint)
        .collect();
    assert_eq!(batch.unfilled(), &interior);
    assert_eq!(interior.len(), 10);

    map.update(batch);
    let after_one = map.read(endpoint).as_i8();
    assert!(after_one > 50);

    for _ in 0..2 {
        map.update(projector.project(&Pose::default(), &scan).unwrap());
    }
    let after_three = map.read(endpoint).as_i8();
    assert!(after_three >= after_one);
    assert!(after_three <= 100);

    // the free cells went the other way
    for c in interior {
        assert!(map.read(c).as_i8() < 50);
    }
}

#[test]
fn empty_scan_leaves_the_grid_unmodified() {
    let mapper = OccupancyMapper::new(&GridMapConfig::default()).unwrap();
    mapper.update(&Pose::default(), &LaserScan::new(0.0, 0.1, vec![2.0, 2.0]));
    let before = mapper.map().snapshot();

    let outcome = mapper.update(&Pose::default(), &LaserScan::new(0.0, 0.1, vec![]));
    assert_eq!(outcome.cells_processed(), 0);
    assert!(!outcome.is_rejected());
    assert_eq!(mapper.map().snapshot(), before);
}

#[test]
fn reads_are_idempotent() {
    let mapper = OccupancyMapper::new(&GridMapConfig::default()).unwrap();
    mapper.update(
        &Pose::new(0.5, -0.5, 0.3),
        &LaserScan::new(-1.5, 0.05, vec![1.5; 60]),
    );

    let first = mapper.map().snapshot();
    let second = mapper.map().snapshot();
    assert_eq!(first, second);
    assert_eq!(mapper.map().read(cell(10, 10)), mapper.map().read(cell(10, 10)));
}

#[test]
fn first_observation_is_permanent() {
    let config = GridMapConfig::default();
    let mut map = LogOddsMap::new(&config).unwrap();
    let c = cell(20, 30);
    assert_eq!(map.read(c), Belief::Unknown);

    map.update(OccupancyUpdate::new(BTreeSet::new(), BTreeSet::from([c])));
    for i in 0..50 {
        let batch = if i % 2 == 0 {
            OccupancyUpdate::new(BTreeSet::from([c]), BTreeSet::new())
        } else {
            OccupancyUpdate::new(BTreeSet::new(), BTreeSet::from([c]))
        };
        map.update(batch);
        assert_ne!(map.read(c).as_i8(), -1);
    }
}

#[test]
fn repeated_scans_converge() {
    let mapper = OccupancyMapper::new(&GridMapConfig::default()).unwrap();
    let scan = LaserScan::new(0.0, 0.0, vec![2.0]);
    let hit = cell(70, 50);
    let free = cell(60, 50);

    let mut last_hit = -1;
    let mut last_free = 101;
    for _ in 0..25 {
        let outcome = mapper.update(&Pose::default(), &scan);
        assert!(matches!(outcome, UpdateOutcome::Applied { filled: 1, .. }));

        let h = mapper.map().read(hit).as_i8();
        let f = mapper.map().read(free).as_i8();
        assert!(h >= last_hit && h <= 100);
        assert!(f <= last_free && f >= 0);
        last_hit = h;
        last_free = f;
    }
    assert!(last_hit >= 98);
    assert!(last_free <= 1);
}

#[test]
fn filled_cells_are_never_reported_free() {
    let projector = ScanProjector::new(&GridMapConfig::default()).unwrap();

    // a fan of beams, the short ones end inside the rays of the long ones
    let ranges: Vec<f32> = (0..90).map(|i| if i % 2 == 0 { 0.8 } else { 3.0 }).collect();
    let scan = LaserScan::new(0.0, 0.005, ranges);
    let batch = projector.project(&Pose::new(-1.0, 1.0, 0.2), &scan).unwrap();

    assert!(!batch.filled().is_empty());
    assert!(batch.filled().is_disjoint(batch.unfilled()));
}

#[test]
fn batch_order_does_not_change_the_map() {
    let config = GridMapConfig::default();
    let projector = ScanProjector::new(&config).unwrap();

    let a = projector
        .project(&Pose::new(1.0, 1.0, 0.0), &LaserScan::new(0.0, 0.2, vec![2.0; 10]))
        .unwrap();
    let b = projector
        .project(&Pose::new(1.0, 1.0, 0.0), &LaserScan::new(0.1, 0.2, vec![1.0; 10]))
        .unwrap();

    let mut ab = LogOddsMap::new(&config).unwrap();
    ab.update(a.clone());
    ab.update(b.clone());

    let mut ba = LogOddsMap::new(&config).unwrap();
    ba.update(b);
    ba.update(a);

    assert!(ab.observed_cells() > 0);
    assert_eq!(ab.snapshot(), ba.snapshot());

    // fusion adds log-odds, the stored beliefs agree as well
    for row in 0..100 {
        for col in 0..100 {
            let c = cell(row, col);
            assert_eq!(ab.read(c), ba.read(c), "cell {c:?}");
        }
    }
}

#[test]
fn hits_overturn_earlier_misses() {
    let mapper = OccupancyMapper::new(&GridMapConfig::default()).unwrap();
    let pose = Pose::default();
    let corridor = cell(55, 50);

    // the beam runs through the cell twice before an obstacle shows up right there
    for _ in 0..2 {
        mapper.update(&pose, &LaserScan::new(0.0, 0.0, vec![2.0]));
    }
    assert_eq!(mapper.map().read(corridor).as_i8(), 0);

    let mut last = 0;
    for _ in 0..6 {
        mapper.update(&pose, &LaserScan::new(0.0, 0.0, vec![0.5]));
        let value = mapper.map().read(corridor).as_i8();
        assert!(value >= last);
        last = value;
    }
    assert!(last >= 98, "cell stuck at {last}");
}

#[test]
fn snapshot_values_stay_in_range() {
    let mapper = OccupancyMapper::new(&GridMapConfig::default()).unwrap();

    for step in 0..40 {
        let pose = Pose::new(-2.0 + step as f32 * 0.1, 0.5, step as f32 * 0.2);
        let ranges = (0..180).map(|i| 0.5 + (i % 13) as f32 * 0.25).collect();
        mapper.update(&pose, &LaserScan::new(-3.0, 0.035, ranges));
    }

    let snapshot = mapper.map().snapshot();
    assert_eq!(snapshot.data.len(), 100 * 100);
    assert!(snapshot.known_cells() > 0);
    assert!(snapshot
        .data
        .iter()
        .all(|&v| v == -1 || (0..=100).contains(&v)));
}
