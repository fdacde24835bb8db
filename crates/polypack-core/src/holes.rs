//! Profile-based hole filling.
//!
//! For every row the first set cell seen from the west and from the east is
//! recorded, and for every column the first set cell seen from the north and
//! from the south. A cell lying strictly inside all four profiles is enclosed
//! on every side and gets filled.
//!
//! The input must be 8-connected. For disconnected rasters the profiles of
//! unrelated parts combine and cells between them are filled as well.

use crate::shape::{BitGrid, Shape};

/// Per-row and per-column first-hit positions of a raster.
struct Profiles {
    west: Vec<Option<i32>>,
    east: Vec<Option<i32>>,
    north: Vec<Option<i32>>,
    south: Vec<Option<i32>>,
}

impl Profiles {
    fn of(cells: &BitGrid) -> Self {
        let rows = 0..cells.height();
        let cols = 0..cells.width();

        let west = rows
            .clone()
            .map(|y| (0..cells.width()).find(|&x| cells.get(x, y)))
            .collect();
        let east = rows
            .map(|y| (0..cells.width()).rev().find(|&x| cells.get(x, y)))
            .collect();
        let north = cols
            .clone()
            .map(|x| (0..cells.height()).find(|&y| cells.get(x, y)))
            .collect();
        let south = cols
            .map(|x| (0..cells.height()).rev().find(|&y| cells.get(x, y)))
            .collect();

        Self {
            west,
            east,
            north,
            south,
        }
    }

    fn encloses(&self, x: i32, y: i32) -> bool {
        let (row, col) = (y as usize, x as usize);
        let horizontal = matches!(
            (self.west[row], self.east[row]),
            (Some(w), Some(e)) if w < x && x < e
        );
        let vertical = matches!(
            (self.north[col], self.south[col]),
            (Some(n), Some(s)) if n < y && y < s
        );
        horizontal && vertical
    }
}

/// Returns a copy of the raster with all enclosed cells set.
pub fn fill_holes(cells: &BitGrid) -> BitGrid {
    let profiles = Profiles::of(cells);
    let mut filled = cells.clone();
    for y in 0..cells.height() {
        for x in 0..cells.width() {
            if !cells.get(x, y) && profiles.encloses(x, y) {
                filled.set(x, y);
            }
        }
    }
    filled
}

/// Returns a copy of the shape with its holes filled.
pub fn fill_shape_holes(shape: &Shape) -> Shape {
    shape.with_cells(fill_holes(shape.cells()))
}
