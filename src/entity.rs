//! Moving, sized game objects
//!
//! A single entity type covers paddles and balls. Optional capabilities
//! (a name, an appearance) replace the usual drawable/named subclassing:
//! renderers ask an entity what it can do instead of downcasting it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MOTION_TIME_SCALE;
use crate::geometry::{Point, Rectangle};

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Display attributes, present only on entities a renderer should draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appearance {
    pub color: Rgb,
}

impl Default for Appearance {
    fn default() -> Self {
        Self { color: Rgb::WHITE }
    }
}

/// A positioned object with a heading.
///
/// Travel is described by an angle (degrees), a speed, and a ±1 multiplier
/// per axis. Bouncing flips a multiplier instead of recomputing the angle,
/// so one angle covers all four quadrants of travel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Centre, kept in floating point so slow motion accumulates
    pos: Vec2,
    width: i32,
    height: i32,
    /// Degrees in [0, 360) when set from a non-negative value
    angle: f32,
    /// Pixels per frame at the 60 fps reference rate
    speed: f32,
    direction_x: f32,
    direction_y: f32,
    name: Option<String>,
    appearance: Option<Appearance>,
}

impl Entity {
    /// A stationary entity centred on (x, y)
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            pos: Vec2::new(x as f32, y as f32),
            width,
            height,
            angle: 0.0,
            speed: 0.0,
            direction_x: 1.0,
            direction_y: 1.0,
            name: None,
            appearance: None,
        }
    }

    pub fn with_motion(mut self, angle: f32, speed: f32) -> Self {
        self.set_angle(angle);
        self.set_speed(speed);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        self.appearance = Some(appearance);
        self
    }

    /// Rounded horizontal centre
    #[inline]
    pub fn x(&self) -> i32 {
        round_px(self.pos.x)
    }

    /// Rounded vertical centre
    #[inline]
    pub fn y(&self) -> i32 {
        round_px(self.pos.y)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x(), self.y())
    }

    /// Unrounded centre
    pub fn exact_position(&self) -> Vec2 {
        self.pos
    }

    pub fn place(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.pos = Vec2::new(x as f32, y as f32);
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Angles of 360 or more wrap by modulo. Negative angles are stored as
    /// given.
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = if angle >= 360.0 { angle % 360.0 } else { angle };
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    pub fn direction_x(&self) -> f32 {
        self.direction_x
    }

    pub fn direction_y(&self) -> f32 {
        self.direction_y
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn appearance(&self) -> Option<&Appearance> {
        self.appearance.as_ref()
    }

    pub fn is_drawable(&self) -> bool {
        self.appearance.is_some()
    }

    /// Unit vector of actual travel, direction multipliers applied
    pub fn heading(&self) -> Vec2 {
        let radians = self.angle.to_radians();
        Vec2::new(
            radians.cos() * self.direction_x,
            radians.sin() * self.direction_y,
        )
    }

    /// Advance along the heading for an elapsed interval in milliseconds.
    ///
    /// Non-positive intervals leave the entity where it is.
    pub fn advance(&mut self, elapsed_ms: i64) -> Point {
        if elapsed_ms > 0 {
            let distance = self.speed / (elapsed_ms as f32 / MOTION_TIME_SCALE);
            self.pos += self.heading() * distance;
        }
        self.position()
    }

    pub fn bounce_x(&mut self) {
        self.direction_x = -self.direction_x;
    }

    pub fn bounce_y(&mut self) {
        self.direction_y = -self.direction_y;
    }

    /// Box of the configured size centred on the rounded position
    pub fn bounding_rect(&self) -> Rectangle {
        Rectangle::from_origin(
            Point::new(self.x() - self.width / 2, self.y() - self.height / 2),
            self.width,
            self.height,
        )
    }

    pub fn collides_with(&self, other: &Entity) -> bool {
        self.bounding_rect().intersects(&other.bounding_rect())
    }
}

/// Round half away from zero
#[inline]
fn round_px(value: f32) -> i32 {
    value.round() as i32
}
