//! The unbounded occupancy grid shapes are packed onto.
//!
//! [`PlanarGrid`] covers the whole integer plane. Internally it keeps a
//! finite window of cells that grows whenever a shape is committed outside
//! of it; everything outside the window is free. Besides blocked cells the
//! grid keeps the extension corridors of committed shapes: half-infinite
//! strips that no later shape may cover, so that external edges can still
//! leave the packed drawing on their side.

use log::trace;

use crate::{
    shape::{Extension, Shape},
    side::Side,
};

/// Inclusive bounds of a set of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl CellBounds {
    fn point(x: i32, y: i32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    /// Number of columns covered
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    /// Number of rows covered
    pub fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    fn include(&mut self, x: i32, y: i32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

/// A half-infinite strip reserved for an external extension.
///
/// For east and west corridors `first..=last` spans rows and `start` is the first
/// reserved column; for north and south corridors it spans columns and
/// `start` is the first reserved row. The strip runs from `start` toward
/// `side` without bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corridor {
    side: Side,
    first: i32,
    last: i32,
    start: i32,
}

impl Corridor {
    /// Corridor of `extension` for `shape` placed with its top-left cell at
    /// `(left, top)`.
    fn of(extension: Extension, shape: &Shape, left: i32, top: i32) -> Self {
        let (first, last, start) = match extension.side() {
            Side::East => (
                top + extension.first(),
                top + extension.last(),
                left + shape.width(),
            ),
            Side::West => (top + extension.first(), top + extension.last(), left - 1),
            Side::North => (left + extension.first(), left + extension.last(), top - 1),
            Side::South => (
                left + extension.first(),
                left + extension.last(),
                top + shape.height(),
            ),
        };
        Self {
            side: extension.side(),
            first,
            last,
            start,
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns true if the cell lies inside the strip
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (along, across) = if self.side.is_horizontal() {
            (x, y)
        } else {
            (y, x)
        };
        if across < self.first || across > self.last {
            return false;
        }
        match self.side {
            Side::East | Side::South => along >= self.start,
            Side::West | Side::North => along <= self.start,
        }
    }

    /// Intersection of the strip with `bounds`, or `None` if they are disjoint
    fn clip(&self, bounds: CellBounds) -> Option<CellBounds> {
        let clipped = match self.side {
            Side::East => CellBounds {
                min_x: self.start.max(bounds.min_x),
                max_x: bounds.max_x,
                min_y: self.first.max(bounds.min_y),
                max_y: self.last.min(bounds.max_y),
            },
            Side::West => CellBounds {
                min_x: bounds.min_x,
                max_x: self.start.min(bounds.max_x),
                min_y: self.first.max(bounds.min_y),
                max_y: self.last.min(bounds.max_y),
            },
            Side::North => CellBounds {
                min_x: self.first.max(bounds.min_x),
                max_x: self.last.min(bounds.max_x),
                min_y: bounds.min_y,
                max_y: self.start.min(bounds.max_y),
            },
            Side::South => CellBounds {
                min_x: self.first.max(bounds.min_x),
                max_x: self.last.min(bounds.max_x),
                min_y: self.start.max(bounds.min_y),
                max_y: bounds.max_y,
            },
        };
        (clipped.min_x <= clipped.max_x && clipped.min_y <= clipped.max_y).then_some(clipped)
    }
}

/// Where a shape was committed on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Grid position of the shape's center cell
    pub offset: (i32, i32),
    /// Grid position of the shape's top-left cell
    pub top_left: (i32, i32),
}

/// Boolean occupancy map over the integer plane.
///
/// # Examples
///
/// ```
/// # use polypack_core::grid::PlanarGrid;
/// # use polypack_core::shape::{Shape, ShapeId};
/// let square = Shape::builder(ShapeId::new(0), 2, 2).fill_rect(0, 0, 1, 1).build();
/// let mut grid = PlanarGrid::new();
///
/// assert!(!grid.overlaps_center_based(&square, 0, 0));
/// grid.commit(&square, 0, 0);
/// assert!(grid.overlaps_center_based(&square, 1, 1));
/// assert!(!grid.overlaps_center_based(&square, 2, 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlanarGrid {
    origin_x: i32,
    origin_y: i32,
    width: i32,
    height: i32,
    cells: Vec<bool>,
    occupied: Option<CellBounds>,
    corridors: Vec<Corridor>,
}

impl PlanarGrid {
    /// Creates an empty grid
    pub fn new() -> Self {
        Self::default()
    }

    /// Width of the allocated window
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height of the allocated window
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns whether the cell is blocked. Cells outside the allocated
    /// window are never blocked.
    pub fn blocked(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|index| self.cells[index])
    }

    /// Blocks a single cell, growing the window as needed
    pub fn set_blocked(&mut self, x: i32, y: i32) {
        self.reserve(CellBounds::point(x, y));
        if let Some(index) = self.index(x, y) {
            self.cells[index] = true;
        }
        match self.occupied.as_mut() {
            Some(bounds) => bounds.include(x, y),
            None => self.occupied = Some(CellBounds::point(x, y)),
        }
    }

    /// Returns the reserved extension corridors
    pub fn corridors(&self) -> &[Corridor] {
        &self.corridors
    }

    /// Tests whether placing the shape's center cell at `(dx, dy)` collides
    /// with anything already committed.
    ///
    /// A collision is a shape cell on a blocked cell or inside a reserved
    /// corridor, or a blocked cell inside one of the shape's own corridors.
    pub fn overlaps_center_based(&self, shape: &Shape, dx: i32, dy: i32) -> bool {
        let left = dx - shape.center_x();
        let top = dy - shape.center_y();

        let cell_collides = shape.cells().iter_set().any(|(x, y)| {
            let (gx, gy) = (left + x, top + y);
            self.blocked(gx, gy) || self.corridors.iter().any(|c| c.contains(gx, gy))
        });
        if cell_collides {
            return true;
        }

        let Some(occupied) = self.occupied else {
            return false;
        };
        shape.extensions().iter().any(|ext| {
            Corridor::of(*ext, shape, left, top)
                .clip(occupied)
                .is_some_and(|area| self.any_blocked(area))
        })
    }

    /// Blocks all cells of the shape with its center at `(dx, dy)` and
    /// reserves its extension corridors.
    pub fn commit(&mut self, shape: &Shape, dx: i32, dy: i32) -> Placement {
        let left = dx - shape.center_x();
        let top = dy - shape.center_y();

        if shape.width() > 0 && shape.height() > 0 {
            self.reserve(CellBounds {
                min_x: left,
                min_y: top,
                max_x: left + shape.width() - 1,
                max_y: top + shape.height() - 1,
            });
        }
        for (x, y) in shape.cells().iter_set() {
            self.set_blocked(left + x, top + y);
        }
        self.corridors.extend(
            shape
                .extensions()
                .iter()
                .map(|ext| Corridor::of(*ext, shape, left, top)),
        );

        trace!(
            shape = shape.id().index(), dx, dy, corridors = self.corridors.len();
            "Committed shape"
        );
        Placement {
            offset: (dx, dy),
            top_left: (left, top),
        }
    }

    /// Bounds of all blocked cells, or `None` if nothing is blocked
    pub fn filled_bounds(&self) -> Option<CellBounds> {
        self.occupied
    }

    fn any_blocked(&self, area: CellBounds) -> bool {
        (area.min_y..=area.max_y)
            .any(|y| (area.min_x..=area.max_x).any(|x| self.blocked(x, y)))
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let lx = x - self.origin_x;
        let ly = y - self.origin_y;
        (lx >= 0 && ly >= 0 && lx < self.width && ly < self.height)
            .then(|| (ly * self.width + lx) as usize)
    }

    fn window(&self) -> Option<CellBounds> {
        (self.width > 0 && self.height > 0).then(|| CellBounds {
            min_x: self.origin_x,
            min_y: self.origin_y,
            max_x: self.origin_x + self.width - 1,
            max_y: self.origin_y + self.height - 1,
        })
    }

    /// Grows the window so that it covers `area`. Growth adds slack on the
    /// sides that had to grow, so that repeated commits do not reallocate
    /// every time.
    fn reserve(&mut self, area: CellBounds) {
        let Some(window) = self.window() else {
            self.origin_x = area.min_x;
            self.origin_y = area.min_y;
            self.width = area.width();
            self.height = area.height();
            self.cells = vec![false; (self.width as usize) * (self.height as usize)];
            return;
        };
        if window.contains(area.min_x, area.min_y) && window.contains(area.max_x, area.max_y) {
            return;
        }

        let slack_x = window.width() / 2 + 1;
        let slack_y = window.height() / 2 + 1;
        let grown = CellBounds {
            min_x: if area.min_x < window.min_x { area.min_x - slack_x } else { window.min_x },
            min_y: if area.min_y < window.min_y { area.min_y - slack_y } else { window.min_y },
            max_x: if area.max_x > window.max_x { area.max_x + slack_x } else { window.max_x },
            max_y: if area.max_y > window.max_y { area.max_y + slack_y } else { window.max_y },
        };

        let mut cells = vec![false; (grown.width() as usize) * (grown.height() as usize)];
        for y in window.min_y..=window.max_y {
            for x in window.min_x..=window.max_x {
                if self.blocked(x, y) {
                    let index = (y - grown.min_y) * grown.width() + (x - grown.min_x);
                    cells[index as usize] = true;
                }
            }
        }

        self.origin_x = grown.min_x;
        self.origin_y = grown.min_y;
        self.width = grown.width();
        self.height = grown.height();
        self.cells = cells;
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::shape::ShapeId;
    use proptest::prelude::*;

    fn cells_strategy() -> impl Strategy<Value = Vec<(i32, i32)>> {
        prop::collection::vec((-40i32..40, -40i32..40), 1..60)
    }

    fn check_blocked_cells_survive_growth(cells: &[(i32, i32)]) -> Result<(), TestCaseError> {
        let mut grid = PlanarGrid::new();
        for &(x, y) in cells {
            grid.set_blocked(x, y);
        }
        for &(x, y) in cells {
            prop_assert!(grid.blocked(x, y));
        }
        let bounds = grid.filled_bounds().expect("cells were blocked");
        for &(x, y) in cells {
            prop_assert!(bounds.contains(x, y));
        }
        Ok(())
    }

    fn check_committed_shapes_never_overlap(
        offsets: &[(i32, i32)],
    ) -> Result<(), TestCaseError> {
        let shape = Shape::builder(ShapeId::new(0), 3, 2)
            .fill_rect(0, 0, 2, 1)
            .build();
        let mut grid = PlanarGrid::new();
        let mut committed: Vec<(i32, i32)> = Vec::new();
        for &(dx, dy) in offsets {
            if !grid.overlaps_center_based(&shape, dx, dy) {
                for &(cx, cy) in &committed {
                    prop_assert!((dx - cx).abs() >= 3 || (dy - cy).abs() >= 2);
                }
                grid.commit(&shape, dx, dy);
                committed.push((dx, dy));
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn blocked_cells_survive_growth(cells in cells_strategy()) {
            check_blocked_cells_survive_growth(&cells)?;
        }

        #[test]
        fn committed_shapes_never_overlap(offsets in cells_strategy()) {
            check_committed_shapes_never_overlap(&offsets)?;
        }
    }
}
