use nalgebra::{Point2, Vector2};

/// Segments shorter than this, or rays (almost) parallel to them, never report a hit.
const EPSILON: f32 = 1e-9;

/// Half line starting at `origin`. Distances along it are measured in multiples of `direction`.
pub struct Ray {
    origin: Point2<f32>,
    direction: Vector2<f32>,
}

impl Ray {
    pub fn from_origin_direction(origin: Point2<f32>, direction: Vector2<f32>) -> Self {
        Self { origin, direction }
    }

    /// Ray with a unit direction, distances along it are in meters.
    pub fn from_origin_angle(origin: Point2<f32>, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_origin_direction(origin, Vector2::new(cos, sin))
    }

    pub fn at(&self, u: f32) -> Point2<f32> {
        self.origin + self.direction * u
    }
}

pub trait Intersect {
    /// Returns the intersection between the object and the `Ray` as a
    /// length `u` along the `direction` of the ray such that the
    /// intersection point can be described by `ray.origin + u*ray.direction`,
    /// or `None` if no intersection occurs.
    fn intersect(&self, ray: &Ray) -> Option<f32>;
}

/// 2-D cross product (z component of the 3-D one).
fn perp_dot(a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
    a.x * b.y - a.y * b.x
}

/// A wall between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    start: Point2<f32>,
    end: Point2<f32>,
}

impl LineSegment {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::between(Point2::new(x1, y1), Point2::new(x2, y2))
    }

    pub fn between(start: Point2<f32>, end: Point2<f32>) -> Self {
        Self { start, end }
    }
}

impl Intersect for LineSegment {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        // solve origin + u * direction = start + t * (end - start)
        let edge = self.end - self.start;
        let denom = perp_dot(&ray.direction, &edge);
        if denom.abs() < EPSILON {
            return None;
        }

        let to_start = self.start - ray.origin;
        let u = perp_dot(&to_start, &edge) / denom;
        let t = perp_dot(&to_start, &ray.direction) / denom;

        ((0.0..=1.0).contains(&t) && u > 0.0).then_some(u)
    }
}

/// Collection of obstacles the simulated scanner can see.
#[derive(Default)]
pub struct Scene {
    objects: Vec<Box<dyn Intersect + Send + Sync>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, obj: Box<dyn Intersect + Send + Sync>) -> &mut Self {
        self.objects.push(obj);
        self
    }

    /// Adds one segment per consecutive pair of `points`, plus a closing one when `closed`.
    pub fn add_polyline(&mut self, points: &[Point2<f32>], closed: bool) -> &mut Self {
        for pair in points.windows(2) {
            self.add(Box::new(LineSegment::between(pair[0], pair[1])));
        }
        if let (true, [first, .., last]) = (closed, points) {
            self.add(Box::new(LineSegment::between(*last, *first)));
        }
        self
    }

    /// Axis aligned rectangle with its lower-left corner at `origin`.
    pub fn add_rect(&mut self, origin: Point2<f32>, size: Vector2<f32>) -> &mut Self {
        let corners = [
            origin,
            origin + Vector2::new(size.x, 0.0),
            origin + size,
            origin + Vector2::new(0.0, size.y),
        ];
        self.add_polyline(&corners, true)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Intersect for Scene {
    /// Closest hit over all objects.
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        self.objects
            .iter()
            .filter_map(|o| o.intersect(ray))
            .min_by(f32::total_cmp)
    }
}
