//! Integer screen-space geometry
//!
//! Points and axis-aligned rectangles in pixel coordinates. Y grows downward,
//! so a rectangle's "top" is its smaller Y.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x:{},y:{})", self.x, self.y)
    }
}

/// Axis-aligned rectangle stored as upper-left and lower-right corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rectangle {
    upper_left: Point,
    lower_right: Point,
}

impl Rectangle {
    /// Build from any two opposite corners; corners are normalized so the
    /// first is always upper-left.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            upper_left: Point::new(a.x.min(b.x), a.y.min(b.y)),
            lower_right: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Build from an upper-left corner and a size
    pub fn from_origin(origin: Point, width: i32, height: i32) -> Self {
        Self::new(origin, Point::new(origin.x + width, origin.y + height))
    }

    #[inline]
    pub fn upper_left(&self) -> Point {
        self.upper_left
    }

    #[inline]
    pub fn lower_right(&self) -> Point {
        self.lower_right
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.upper_left.x
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.lower_right.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.upper_left.y
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.lower_right.y
    }

    pub fn width(&self) -> i32 {
        (self.lower_right.x - self.upper_left.x).abs()
    }

    pub fn height(&self) -> i32 {
        (self.lower_right.y - self.upper_left.y).abs()
    }

    /// Strict overlap test. Rectangles that only share an edge or a corner
    /// do not intersect.
    pub fn intersects(&self, other: &Rectangle) -> bool {
        let left = self.left().max(other.left());
        let right = self.right().min(other.right());
        let top = self.top().max(other.top());
        let bottom = self.bottom().min(other.bottom());
        left < right && bottom > top
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[x1y1:{},x2y2:{}]@{}x{}",
            self.upper_left,
            self.lower_right,
            self.width(),
            self.height()
        )
    }
}
