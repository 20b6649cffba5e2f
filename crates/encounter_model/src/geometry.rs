//! Planar points and wall poles.

use serde::{Deserialize, Serialize};

/// A 2D point in encounter coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A wall anchor: a point with a height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pole {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "h")]
    pub height: f64,
}

impl Pole {
    pub const fn new(x: f64, y: f64, height: f64) -> Self {
        Self { x, y, height }
    }

    /// Planar position of the pole
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}
