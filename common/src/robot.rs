use nalgebra::UnitQuaternion;
use serde::{Deserialize, Serialize};

/// The pose of a robot in the 2D plane.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// The x position of the robot
    pub x: f32,

    /// The y position of the robot
    pub y: f32,

    /// The heading of the robot, measured in radians counter-clockwise from the positive x-axis.
    pub yaw: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, yaw: f32) -> Self {
        Self { x, y, yaw }
    }

    /// Builds a planar pose from a 3D orientation, keeping only the rotation around the z-axis
    /// (`atan2(2(wz + xy), 1 - 2(y² + z²))`).
    pub fn from_orientation(x: f32, y: f32, orientation: &UnitQuaternion<f32>) -> Self {
        let (_roll, _pitch, yaw) = orientation.euler_angles();
        Self { x, y, yaw }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.yaw.is_finite()
    }
}

impl From<Pose> for (f32, f32) {
    fn from(val: Pose) -> Self {
        (val.x, val.y)
    }
}

/// A single sweep of a planar laser range finder. Sample `i` was taken at the bearing
/// `angle_min + i * angle_increment`, relative to the sensor heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserScan {
    /// Bearing of the first sample in radians.
    pub angle_min: f32,

    /// Angular distance between consecutive samples in radians.
    pub angle_increment: f32,

    /// Ranges below this value are not returns.
    #[serde(default)]
    pub range_min: f32,

    /// Ranges above this value are not returns.
    #[serde(default = "_default_range_max")]
    pub range_max: f32,

    /// The measured distances in meters.
    pub ranges: Vec<f32>,
}

const fn _default_range_max() -> f32 {
    f32::MAX
}

impl LaserScan {
    pub fn new(angle_min: f32, angle_increment: f32, ranges: Vec<f32>) -> Self {
        Self {
            angle_min,
            angle_increment,
            range_min: 0.0,
            range_max: _default_range_max(),
            ranges,
        }
    }

    pub fn with_limits(mut self, range_min: f32, range_max: f32) -> Self {
        self.range_min = range_min;
        self.range_max = range_max;
        self
    }

    /// The bearing (relative to the sensor) of the sample at `index`.
    pub fn bearing(&self, index: usize) -> f32 {
        self.angle_min + index as f32 * self.angle_increment
    }

    /// Iterates over `(bearing, range)` pairs.
    pub fn samples(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.ranges
            .iter()
            .enumerate()
            .map(|(i, &range)| (self.bearing(i), range))
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Static description of an occupancy grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapMetaData {
    /// The size of one cell in meters.
    pub resolution: f32,

    /// Number of columns.
    pub width: usize,

    /// Number of rows.
    pub height: usize,
}

/// A snapshot of an occupancy grid ready to be handed to whoever publishes it.
///
/// Cells are stored row-major (`row * width + col`). Each value is `-1` for unknown or an
/// occupancy probability in percent (`0..=100`).
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyGrid {
    pub info: MapMetaData,
    pub data: Vec<i8>,
}

impl OccupancyGrid {
    pub const UNKNOWN: i8 = -1;

    pub fn get(&self, row: usize, col: usize) -> Option<i8> {
        if row >= self.info.height || col >= self.info.width {
            return None;
        }
        self.data.get(row * self.info.width + col).copied()
    }

    pub fn known_cells(&self) -> usize {
        self.data.iter().filter(|&&v| v != Self::UNKNOWN).count()
    }

    /// Number of cells with a value at or above `threshold`.
    pub fn occupied_cells(&self, threshold: i8) -> usize {
        self.data
            .iter()
            .filter(|&&v| v != Self::UNKNOWN && v >= threshold)
            .count()
    }

    /// Number of known cells with a value at or below `threshold`.
    pub fn free_cells(&self, threshold: i8) -> usize {
        self.data
            .iter()
            .filter(|&&v| v != Self::UNKNOWN && v <= threshold)
            .count()
    }
}

#[cfg(test)]
mod test {
    use std::f32::consts::FRAC_PI_2;

    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;

    use super::*;

    #[test]
    fn yaw_from_quaternion() {
        for yaw in [-2.5f32, -FRAC_PI_2, 0.0, 0.3, FRAC_PI_2, 3.0] {
            let q = UnitQuaternion::from_euler_angles(0.0, 0.0, yaw);
            let pose = Pose::from_orientation(1.0, 2.0, &q);
            assert_relative_eq!(pose.yaw, yaw, epsilon = 1e-5);
            assert_eq!((pose.x, pose.y), (1.0, 2.0));
        }
    }

    #[test]
    fn non_finite_pose() {
        assert!(Pose::new(0.0, 0.0, 0.0).is_finite());
        assert!(!Pose::new(f32::NAN, 0.0, 0.0).is_finite());
        assert!(!Pose::new(0.0, 0.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn bearings_start_at_angle_min() {
        let scan = LaserScan::new(-1.0, 0.5, vec![1.0, 2.0, 3.0]);
        let samples: Vec<_> = scan.samples().collect();
        assert_eq!(samples, vec![(-1.0, 1.0), (-0.5, 2.0), (0.0, 3.0)]);
    }

    #[test]
    fn grid_statistics() {
        let grid = OccupancyGrid {
            info: MapMetaData {
                resolution: 0.1,
                width: 3,
                height: 2,
            },
            data: vec![-1, 0, 100, 50, -1, 99],
        };

        assert_eq!(grid.get(0, 2), Some(100));
        assert_eq!(grid.get(1, 0), Some(50));
        assert_eq!(grid.get(2, 0), None);
        assert_eq!(grid.get(0, 3), None);
        assert_eq!(grid.known_cells(), 4);
        assert_eq!(grid.occupied_cells(65), 2);
        assert_eq!(grid.free_cells(20), 1);
    }
}
