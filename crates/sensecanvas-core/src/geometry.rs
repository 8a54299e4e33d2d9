//! Grid geometry for widget placement.
//!
//! Widgets are axis-aligned boxes on a canvas. Positions snap to a square
//! grid whose cell size is clamped to `[MIN_GRID_SIZE, MAX_GRID_SIZE]`.

use serde::{Deserialize, Serialize};

/// Smallest grid cell allowed.
pub const MIN_GRID_SIZE: f64 = 10.0;
/// Largest grid cell allowed.
pub const MAX_GRID_SIZE: f64 = 50.0;

/// Top-left corner of a widget on the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Widget extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub w: f64,
    pub h: f64,
}

impl Size {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_parts(position: Position, size: Size) -> Self {
        Self::new(position.x, position.y, size.w, size.h)
    }

    /// True iff the boxes overlap on both axes.
    ///
    /// Boxes that share only an edge (or a corner) do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.x >= other.x + other.w
            || self.x + self.w <= other.x
            || self.y >= other.y + other.h
            || self.y + self.h <= other.y)
    }
}

/// Round a coordinate pair to the nearest multiple of `grid`.
///
/// Ties round toward positive infinity on both axes, so `-10` on a grid
/// of 20 snaps to `0`. A non-positive grid leaves the coordinates
/// unchanged.
pub fn snap_to_grid(x: f64, y: f64, grid: f64) -> Position {
    if grid <= 0.0 || !grid.is_finite() {
        return Position::new(x, y);
    }
    let snap = |v: f64| (v / grid + 0.5).floor() * grid;
    Position::new(snap(x), snap(y))
}

/// Clamp a requested grid size into the supported range.
pub fn clamp_grid_size(size: f64) -> f64 {
    if size.is_nan() {
        return MIN_GRID_SIZE;
    }
    size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE)
}
