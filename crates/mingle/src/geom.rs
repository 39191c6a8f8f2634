//! Planar points and edge segments.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dist(self, other: Point) -> f64 {
        (self - other).norm()
    }

    /// `self + (to - self) * t`.
    pub fn lerp(self, to: Point, t: f64) -> Point {
        Point::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }

    pub fn midpoint(self, other: Point) -> Point {
        self.lerp(other, 0.5)
    }

    /// Counter-clockwise perpendicular.
    pub fn perp(self) -> Point {
        Point::new(-self.y, self.x)
    }

    /// Unit vector in the same direction, or [`Point::ZERO`] for a zero-length vector.
    pub fn normalized(self) -> Point {
        let n = self.norm();
        if n > 0.0 && n.is_finite() {
            Point::new(self.x / n, self.y / n)
        } else {
            Point::ZERO
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, k: f64) -> Point {
        Point::new(self.x * k, self.y * k)
    }
}

/// An edge segment as `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coords(pub [f64; 4]);

impl Coords {
    pub fn new(start: Point, end: Point) -> Self {
        Self([start.x, start.y, end.x, end.y])
    }

    pub fn start(&self) -> Point {
        Point::new(self.0[0], self.0[1])
    }

    pub fn end(&self) -> Point {
        Point::new(self.0[2], self.0[3])
    }

    pub fn length(&self) -> f64 {
        self.start().dist(self.end())
    }

    pub fn midpoint(&self) -> Point {
        self.start().midpoint(self.end())
    }

    pub fn as_array(&self) -> [f64; 4] {
        self.0
    }
}
