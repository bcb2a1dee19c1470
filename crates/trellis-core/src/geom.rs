//! World-space geometry.
//!
//! Points, vectors and sizes are plain `euclid` aliases. `Rect` is kept as a top-left anchored
//! `{x, y, width, height}` record because that is the shape every caller reads back per frame.

use serde::{Deserialize, Serialize};

pub type Unit = euclid::UnknownUnit;

pub type Point = euclid::Point2D<f64, Unit>;
pub type Vector = euclid::Vector2D<f64, Unit>;
pub type Size = euclid::Size2D<f64, Unit>;

pub fn point(x: f64, y: f64) -> Point {
    euclid::point2(x, y)
}

pub fn vector(x: f64, y: f64) -> Vector {
    euclid::vec2(x, y)
}

pub fn size(width: f64, height: f64) -> Size {
    euclid::size2(width, height)
}

/// Top-left anchored rectangle. Width and height are expected to be non-negative; nothing here
/// validates that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn from_center_size(center: Point, size: Size) -> Self {
        Self::new(
            center.x - size.width * 0.5,
            center.y - size.height * 0.5,
            size.width,
            size.height,
        )
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width * 0.5
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height * 0.5
    }

    pub fn origin(&self) -> Point {
        point(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        point(self.center_x(), self.center_y())
    }

    pub fn size(&self) -> Size {
        size(self.width, self.height)
    }

    /// Inclusive on every edge, matching pointer hit-testing on rendered cards.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Grows the rectangle outward by `amount` on each side.
    pub fn inflate(&self, amount: f64) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }
}

/// Oriented bounding box: center, half extents along the local axes, and a rotation in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Point,
    pub half_extents: Vector,
    pub angle: f64,
}

impl Obb {
    pub fn from_rect(r: &Rect) -> Self {
        Self {
            center: r.center(),
            half_extents: vector(r.width * 0.5, r.height * 0.5),
            angle: 0.0,
        }
    }

    /// The box's two local unit axes.
    pub fn axes(&self) -> [Vector; 2] {
        let (s, c) = self.angle.sin_cos();
        [vector(c, s), vector(-s, c)]
    }

    /// Half-length of the box's shadow on `axis` (assumed unit length).
    pub fn projected_radius(&self, axis: Vector) -> f64 {
        let [a1, a2] = self.axes();
        a1.dot(axis).abs() * self.half_extents.x + a2.dot(axis).abs() * self.half_extents.y
    }

    /// Separating-axis test over both boxes' local axes. Boxes whose shadows merely touch on
    /// every axis count as intersecting.
    pub fn intersects(&self, other: &Obb) -> bool {
        let d = other.center - self.center;
        let [a1, a2] = self.axes();
        let [b1, b2] = other.axes();
        for axis in [a1, a2, b1, b2] {
            let dist = d.dot(axis).abs();
            if dist > self.projected_radius(axis) + other.projected_radius(axis) {
                return false;
            }
        }
        true
    }
}
