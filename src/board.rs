//! Board geometry for the sausage grid.
//!
//! The board is a fixed rectangle of cells addressed as `(column, row)`.
//! Only cells whose column and row sum to an even number are playable,
//! giving the grid its checkerboard parity. All predicates here are pure;
//! shape-level rules live in [`crate::shape`].

use serde::{Deserialize, Serialize};

/// Default board width in columns.
pub const DEFAULT_WIDTH: i32 = 9;
/// Default board height in rows.
pub const DEFAULT_HEIGHT: i32 = 7;
/// Maximum per-axis distance between connected sausage points.
pub const MAX_DISTANCE: i32 = 2;

/// A grid cell, addressed as `(column, row)`.
///
/// Serializes as a two-element array, matching the wire format of the
/// `ovals` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point(pub i32, pub i32);

impl Point {
    /// Column of the cell.
    pub fn col(self) -> i32 {
        self.0
    }

    /// Row of the cell.
    pub fn row(self) -> i32 {
        self.1
    }
}

/// A fixed rectangular board with checkerboard parity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    width: i32,
    height: i32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Board {
    /// Creates a board of the given dimensions.
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Board width in columns.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Board height in rows.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// True if the cell is on the board and of even column+row parity.
    pub fn is_playable(&self, p: Point) -> bool {
        p.col() >= 0
            && p.col() < self.width
            && p.row() >= 0
            && p.row() < self.height
            && (p.col() + p.row()) % 2 == 0
    }

    /// Iterates over every playable cell, column-major.
    pub fn playable_cells(&self) -> impl Iterator<Item = Point> {
        let (width, height) = (self.width, self.height);
        (0..width)
            .flat_map(move |col| (0..height).map(move |row| Point(col, row)))
            .filter(|p| (p.col() + p.row()) % 2 == 0)
    }
}

/// Chebyshev adjacency: the two cells are within [`MAX_DISTANCE`] on each
/// axis independently.
pub fn within_reach(a: Point, b: Point) -> bool {
    (a.col() - b.col()).abs() <= MAX_DISTANCE && (a.row() - b.row()).abs() <= MAX_DISTANCE
}

/// Strict counter-clockwise turn test for `a -> b -> c`.
///
/// Collinear triples are not counter-clockwise, which is what makes
/// [`segments_cross`] treat touching and collinear overlap as tolerated.
fn ccw(a: Point, b: Point, c: Point) -> bool {
    (c.row() - a.row()) * (b.col() - a.col()) > (b.row() - a.row()) * (c.col() - a.col())
}

/// True if segment `ab` properly intersects segment `cd`.
///
/// Each segment's endpoints must lie on strictly opposite sides of the
/// other segment's line. Purely collinear or touching-at-endpoint
/// configurations count as non-intersecting.
pub fn segments_cross(a: Point, b: Point, c: Point, d: Point) -> bool {
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}
