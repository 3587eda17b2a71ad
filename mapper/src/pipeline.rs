use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc::{sync_channel, Receiver, SyncSender, TrySendError},
        Arc,
    },
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use anyhow::anyhow;
use common::{robot::Pose, PerfStats};
use gridmap::{OccupancyMapper, SharedMap, UpdateOutcome};
use simulator::{SensorFrame, Simulator};

/// Counters the scanner thread reports once it stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScannerReport {
    pub sent: usize,
    pub dropped: usize,
}

/// Counters the mapping thread reports once its input runs dry.
#[derive(Default)]
pub struct MappingReport {
    pub applied: usize,
    pub rejected: usize,
    pub stats: PerfStats,
}

/// Background threads feeding simulated scans into the map.
///
/// The scanner thread pushes frames into a bounded queue, the mapping thread fuses them one
/// whole scan at a time. When the queue is full the newest scan is dropped.
pub struct Pipeline {
    running: Arc<AtomicBool>,
    scanner: JoinHandle<ScannerReport>,
    mapping: JoinHandle<MappingReport>,
    map: SharedMap,
}

impl Pipeline {
    pub fn start(simulator: Simulator, mapper: OccupancyMapper, queue_depth: usize) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let map = mapper.map().clone();
        let (tx, rx) = sync_channel(queue_depth);

        let scanner = thread::spawn({
            let running = running.clone();
            move || scanner_thread(simulator, tx, running)
        });
        let mapping = thread::spawn(move || mapping_thread(mapper, rx));

        Self {
            running,
            scanner,
            mapping,
            map,
        }
    }

    pub fn map(&self) -> &SharedMap {
        &self.map
    }

    /// Stops the scanner and waits until every queued scan has been fused.
    pub fn stop(self) -> anyhow::Result<(ScannerReport, MappingReport)> {
        self.running.store(false, Ordering::Relaxed);

        let scanner = self
            .scanner
            .join()
            .map_err(|_| anyhow!("scanner thread panicked"))?;
        let mapping = self
            .mapping
            .join()
            .map_err(|_| anyhow!("mapping thread panicked"))?;

        Ok((scanner, mapping))
    }
}

fn scanner_thread(
    mut simulator: Simulator,
    tx: SyncSender<SensorFrame>,
    running: Arc<AtomicBool>,
) -> ScannerReport {
    tracing::info!("scanner thread started");

    // fixed timestep, see https://www.gafferongames.com/post/fix_your_timestep/
    let dt = 1.0 / 30.0;

    let mut report = ScannerReport::default();
    let mut current_time = Instant::now();
    let mut accumulator = 0.0;

    'outer: while running.load(Ordering::Relaxed) {
        let new_time = Instant::now();
        accumulator += (new_time - current_time).as_secs_f64();
        current_time = new_time;

        while accumulator >= dt {
            accumulator -= dt;

            let Some(frame) = simulator.tick(dt as f32) else {
                continue;
            };

            match tx.try_send(frame) {
                Ok(()) => report.sent += 1,
                Err(TrySendError::Full(frame)) => {
                    tracing::debug!(
                        "mapping queue full, dropping scan {} taken at {:?}",
                        frame.id,
                        simulator.get_pose()
                    );
                    report.dropped += 1;
                }
                Err(TrySendError::Disconnected(_)) => {
                    tracing::warn!("mapping thread is gone");
                    break 'outer;
                }
            }
        }

        thread::sleep(Duration::from_secs_f64(dt));
    }

    tracing::info!(
        "scanner thread ended, {} scans sent, {} dropped",
        report.sent,
        report.dropped
    );
    report
}

fn mapping_thread(mapper: OccupancyMapper, rx: Receiver<SensorFrame>) -> MappingReport {
    tracing::info!("mapping thread started");

    let mut report = MappingReport::default();

    // ends once the scanner drops its sender and the queue is drained
    for frame in rx {
        let pose = Pose::from_orientation(frame.position.x, frame.position.y, &frame.orientation);

        let start = Instant::now();
        let outcome = mapper.update(&pose, &frame.scan);
        report.stats.update(start.elapsed());

        match outcome {
            UpdateOutcome::Applied { filled, unfilled } => {
                report.applied += 1;
                tracing::debug!(
                    scan = frame.id,
                    filled,
                    unfilled,
                    "fused in {}",
                    report.stats
                );
            }
            UpdateOutcome::Rejected(_) => report.rejected += 1,
        }
    }

    tracing::info!(
        "mapping thread ended, {} scans applied, {} rejected",
        report.applied,
        report.rejected
    );
    report
}
