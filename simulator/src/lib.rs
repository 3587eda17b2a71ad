//! Headless laser scanner simulator. Drives a differential robot through a scene of line
//! segments and reports what a planar range finder mounted on it would see.

use common::robot::Pose;
use nalgebra::{Point2, Vector2};
use serde::Deserialize;
use statrs::StatsError;

mod scene;
mod sim;

pub use scene::ray::{Intersect, LineSegment, Ray, Scene};
pub use sim::{Command, SensorFrame, SimParameters, Simulator};

#[derive(Clone, Deserialize)]
pub struct SimulatorConfig {
    #[serde(default = "_default_scene")]
    pub scene: Vec<SceneObject>,

    #[serde(default)]
    pub start: Pose,

    #[serde(default = "_default_command")]
    pub command: Command,

    #[serde(default)]
    pub seed: u64,

    #[serde(default)]
    pub parameters: SimParameters,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub enum SceneObject {
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
    },
    Rectangle {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Polyline {
        points: Vec<[f32; 2]>,
        #[serde(default)]
        closed: bool,
    },
}

fn _default_scene() -> Vec<SceneObject> {
    vec![
        SceneObject::Rectangle {
            x: -3.0,
            y: -3.0,
            width: 6.0,
            height: 6.0,
        },
        SceneObject::Rectangle {
            x: 1.0,
            y: 1.0,
            width: 0.5,
            height: 1.0,
        },
    ]
}

const fn _default_command() -> Command {
    // slow circle with a radius of 0.5m
    Command {
        speed_left: 0.2,
        speed_right: 0.3,
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            scene: _default_scene(),
            start: Pose::default(),
            command: _default_command(),
            seed: 0,
            parameters: SimParameters::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn build_scene(&self) -> Scene {
        let mut scene = Scene::new();

        for o in &self.scene {
            match o {
                &SceneObject::Line { x1, y1, x2, y2 } => {
                    scene.add(Box::new(LineSegment::new(x1, y1, x2, y2)));
                }
                &SceneObject::Rectangle {
                    x,
                    y,
                    width,
                    height,
                } => {
                    scene.add_rect(Point2::new(x, y), Vector2::new(width, height));
                }
                SceneObject::Polyline { points, closed } => {
                    let points: Vec<_> = points.iter().map(|&[x, y]| Point2::new(x, y)).collect();
                    scene.add_polyline(&points, *closed);
                }
            }
        }

        scene
    }

    pub fn instantiate(&self) -> Result<Simulator, StatsError> {
        Simulator::new(
            self.build_scene(),
            self.parameters,
            self.start,
            self.command,
            self.seed,
        )
    }
}
