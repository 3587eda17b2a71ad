use std::f32::consts::TAU;

use common::robot::{LaserScan, Pose};
use nalgebra::{Point2, UnitQuaternion};
use rand::{distributions::Distribution, rngs::StdRng, SeedableRng};
use serde::Deserialize;
use statrs::{distribution::Normal, StatsError};

use crate::scene::ray::{Intersect, Ray, Scene};

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SimParameters {
    /// The wheel base (in meters) of the differential robot used in the simulator, i.e,
    /// the distance between the wheels.
    pub wheel_base: f32,

    /// The update period (in seconds) of the laser range scanner, i.e., 1/Hz.
    pub update_period: f32,

    /// Laser range scanner maximum distance in meters.
    pub scanner_range: f32,

    /// Number of beams in one revolution of the scanner.
    pub beam_count: usize,

    /// Standard deviation in meters of the noise added to every range.
    pub range_noise: f32,
}

impl Default for SimParameters {
    fn default() -> Self {
        Self {
            wheel_base: 0.2,
            update_period: 0.2,
            scanner_range: 4.0,
            beam_count: 360,
            range_noise: 0.01,
        }
    }
}

/// A Command to move the robot by setting the desired left and right wheel speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Command {
    /// The target speed in meters/second that the left wheel of the robot should move.
    pub speed_left: f32,

    /// The target speed in meters/second that the right wheel of the robot should move.
    pub speed_right: f32,
}

/// One scan together with the pose it was taken at, the way a robot would report it.
#[derive(Debug, Clone)]
pub struct SensorFrame {
    pub id: usize,
    pub position: Point2<f32>,
    pub orientation: UnitQuaternion<f32>,
    pub scan: LaserScan,
}

pub struct Simulator {
    scene: Scene,
    parameters: SimParameters,
    pose: Pose,
    command: Command,
    noise: Option<Normal>,
    rng: StdRng,
    scan_update_timer: f32,
    scan_counter: usize,
}

impl Simulator {
    pub fn new(
        scene: Scene,
        parameters: SimParameters,
        pose: Pose,
        command: Command,
        seed: u64,
    ) -> Result<Self, StatsError> {
        let noise = if parameters.range_noise > 0.0 {
            Some(Normal::new(0.0, parameters.range_noise as f64)?)
        } else {
            None
        };

        Ok(Self {
            scene,
            parameters,
            pose,
            command,
            noise,
            rng: StdRng::seed_from_u64(seed),
            scan_update_timer: 0.0,
            scan_counter: 0,
        })
    }

    pub fn get_pose(&self) -> Pose {
        self.pose
    }

    /// Advances the simulation by `dt` seconds. Returns a frame whenever the scanner completed
    /// a revolution.
    pub fn tick(&mut self, dt: f32) -> Option<SensorFrame> {
        self.motion_model(self.command.speed_left * dt, self.command.speed_right * dt);

        self.scan_update_timer += dt;
        if self.scan_update_timer < self.parameters.update_period {
            return None;
        }
        self.scan_update_timer -= self.parameters.update_period;

        Some(self.scan())
    }

    /// Takes a full revolution scan from the current pose.
    pub fn scan(&mut self) -> SensorFrame {
        let beams = self.parameters.beam_count.max(1);
        let increment = TAU / beams as f32;
        let origin = Point2::new(self.pose.x, self.pose.y);

        let ranges = (0..beams)
            .map(|i| {
                let angle = i as f32 * increment;
                match self
                    .scene
                    .intersect(&Ray::from_origin_angle(origin, angle + self.pose.yaw))
                {
                    Some(distance) if distance < self.parameters.scanner_range => {
                        let noise = self
                            .noise
                            .as_ref()
                            .map_or(0.0, |n| n.sample(&mut self.rng) as f32);
                        (distance + noise).max(0.0)
                    }
                    // no return within range
                    _ => f32::INFINITY,
                }
            })
            .collect();

        let frame = SensorFrame {
            id: self.scan_counter,
            position: origin,
            orientation: UnitQuaternion::from_euler_angles(0.0, 0.0, self.pose.yaw),
            scan: LaserScan::new(0.0, increment, ranges)
                .with_limits(0.0, self.parameters.scanner_range),
        };
        self.scan_counter += 1;

        tracing::trace!("simulated scan {} at {:?}", frame.id, self.pose);
        frame
    }

    fn motion_model(&mut self, sl: f32, sr: f32) {
        // from https://rossum.sourceforge.net/papers/DiffSteer/DiffSteer.html
        let sbar = (sr + sl) / 2.0;
        self.pose.yaw += (sr - sl) / self.parameters.wheel_base;
        self.pose.x += sbar * self.pose.yaw.cos();
        self.pose.y += sbar * self.pose.yaw.sin();
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    use super::*;

    fn room() -> Scene {
        let mut scene = Scene::new();
        scene.add_rect(Point2::new(-2.0, -2.0), Vector2::new(4.0, 4.0));
        scene
    }

    fn noiseless() -> SimParameters {
        SimParameters {
            range_noise: 0.0,
            beam_count: 4,
            ..Default::default()
        }
    }

    #[test]
    fn scan_of_a_square_room() {
        let mut sim =
            Simulator::new(room(), noiseless(), Pose::default(), Command::default(), 0).unwrap();
        let frame = sim.scan();

        assert_eq!(frame.id, 0);
        assert_eq!(frame.scan.len(), 4);
        for &range in &frame.scan.ranges {
            assert_relative_eq!(range, 2.0, epsilon = 1e-4);
        }
        assert_eq!(sim.scan().id, 1);
    }

    #[test]
    fn walls_out_of_range_are_no_returns() {
        let parameters = SimParameters {
            scanner_range: 1.5,
            ..noiseless()
        };
        let mut sim =
            Simulator::new(room(), parameters, Pose::default(), Command::default(), 0).unwrap();
        assert!(sim.scan().scan.ranges.iter().all(|r| r.is_infinite()));
    }

    #[test]
    fn orientation_carries_the_heading() {
        let mut sim = Simulator::new(
            room(),
            noiseless(),
            Pose::new(0.5, 0.0, 0.7),
            Command::default(),
            0,
        )
        .unwrap();

        let frame = sim.scan();
        let (_, _, yaw) = frame.orientation.euler_angles();
        assert_relative_eq!(yaw, 0.7, epsilon = 1e-5);
        assert_relative_eq!(frame.position, Point2::new(0.5, 0.0));
    }

    #[test]
    fn scans_follow_the_update_period() {
        let command = Command {
            speed_left: 0.1,
            speed_right: 0.1,
        };
        let mut sim = Simulator::new(room(), noiseless(), Pose::default(), command, 0).unwrap();

        let frames = (0..10).filter_map(|_| sim.tick(0.1)).count();
        assert_eq!(frames, 5);

        // driving straight ahead
        assert_relative_eq!(sim.get_pose().x, 0.1, epsilon = 1e-5);
        assert_relative_eq!(sim.get_pose().yaw, 0.0);
    }

    #[test]
    fn noise_is_reproducible() {
        let parameters = SimParameters {
            range_noise: 0.05,
            ..Default::default()
        };
        let mut a = Simulator::new(room(), parameters, Pose::default(), Command::default(), 7)
            .unwrap();
        let mut b = Simulator::new(room(), parameters, Pose::default(), Command::default(), 7)
            .unwrap();

        let scan = a.scan().scan;
        assert_eq!(scan, b.scan().scan);
        assert!(scan.ranges.iter().all(|r| *r >= 0.0));
    }
}
