//! 2D primitives shared by the layout engine, the state machine and hit testing.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point or offset in editor space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2d {
    pub x: f32,
    pub y: f32,
}

impl Vector2d {
    pub const ZERO: Vector2d = Vector2d { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn add(a: Vector2d, b: Vector2d) -> Vector2d {
        Vector2d::new(a.x + b.x, a.y + b.y)
    }

    pub fn subtract(a: Vector2d, b: Vector2d) -> Vector2d {
        Vector2d::new(a.x - b.x, a.y - b.y)
    }

    /// Componentwise floor
    pub fn floor(self) -> Vector2d {
        Vector2d::new(self.x.floor(), self.y.floor())
    }

    /// Exact componentwise equality
    pub fn compare(a: Vector2d, b: Vector2d) -> bool {
        a.x == b.x && a.y == b.y
    }
}

impl Add for Vector2d {
    type Output = Vector2d;

    fn add(self, rhs: Vector2d) -> Vector2d {
        Vector2d::add(self, rhs)
    }
}

impl Sub for Vector2d {
    type Output = Vector2d;

    fn sub(self, rhs: Vector2d) -> Vector2d {
        Vector2d::subtract(self, rhs)
    }
}

/// Width and height of a surface (the editor viewport, typically).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Axis-aligned rectangle given by its top-left corner and its extent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub pos: Vector2d,
    pub size: Vector2d,
}

impl Rect {
    pub const fn new(pos: Vector2d, size: Vector2d) -> Self {
        Self { pos, size }
    }

    pub fn left(&self) -> f32 {
        self.pos.x
    }

    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    pub fn top(&self) -> f32 {
        self.pos.y
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vector2d {
        Vector2d::new(self.pos.x + self.size.x / 2.0, self.pos.y + self.size.y / 2.0)
    }

    /// Point containment, closed on all four edges.
    pub fn hit(&self, v: Vector2d) -> bool {
        v.x >= self.left() && v.x <= self.right() && v.y >= self.top() && v.y <= self.bottom()
    }

    pub fn compare(a: &Rect, b: &Rect) -> bool {
        Vector2d::compare(a.pos, b.pos) && Vector2d::compare(a.size, b.size)
    }
}
