//! Rasterized component outlines (polyominoes).
//!
//! A [`Shape`] is a low-resolution boolean raster of one component's hull,
//! together with the [`Extension`]s marking where external edges leave the
//! component. Shapes are assembled with a [`ShapeBuilder`] and are immutable
//! afterwards.
//!
//! Cell coordinates are local to the shape, with `(0, 0)` at its top-left
//! cell. The shape's *center* is the cell `((width - 1) / 2, (height - 1) / 2)`;
//! placements on a [`PlanarGrid`](crate::grid::PlanarGrid) are expressed as
//! the grid position of this center cell.

use indexmap::IndexMap;

use crate::side::{Side, SideSet};

/// Identifies a shape within one packing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(usize);

impl ShapeId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the index this id was created from
    pub fn index(self) -> usize {
        self.0
    }
}

/// A fixed-size boolean raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitGrid {
    width: i32,
    height: i32,
    cells: Vec<bool>,
}

impl BitGrid {
    /// Creates an empty raster. Negative dimensions are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![false; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns true if `(x, y)` lies inside the raster
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Returns whether the cell is set. Out-of-range cells are never set.
    pub fn get(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.cells[self.index(x, y)]
    }

    /// Sets the cell. Out-of-range coordinates are ignored.
    pub fn set(&mut self, x: i32, y: i32) {
        if self.in_bounds(x, y) {
            let index = self.index(x, y);
            self.cells[index] = true;
        }
    }

    /// Returns the number of set cells
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|cell| **cell).count()
    }

    /// Iterates the coordinates of all set cells, row by row
    pub fn iter_set(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).filter_map(move |x| self.get(x, y).then_some((x, y)))
        })
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }
}

/// A protrusion on a shape's boundary, marking where external edges leave
/// the component.
///
/// `first..=last` is the range of boundary cells the extension covers,
/// measured along the side: columns for north and south, rows for east and
/// west. `multiplicity` counts how many external connections were merged
/// into this extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extension {
    side: Side,
    first: i32,
    last: i32,
    multiplicity: u32,
}

impl Extension {
    pub fn new(side: Side, first: i32, last: i32, multiplicity: u32) -> Self {
        Self {
            side,
            first: first.min(last),
            last: first.max(last),
            multiplicity,
        }
    }

    pub fn side(self) -> Side {
        self.side
    }

    pub fn first(self) -> i32 {
        self.first
    }

    pub fn last(self) -> i32 {
        self.last
    }

    pub fn multiplicity(self) -> u32 {
        self.multiplicity
    }
}

/// A rasterized component outline with its extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    id: ShapeId,
    cells: BitGrid,
    extensions: Vec<Extension>,
}

impl Shape {
    /// Starts building a shape of `width` x `height` cells
    pub fn builder(id: ShapeId, width: i32, height: i32) -> ShapeBuilder {
        ShapeBuilder {
            id,
            cells: BitGrid::new(width, height),
            extensions: IndexMap::new(),
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn width(&self) -> i32 {
        self.cells.width()
    }

    pub fn height(&self) -> i32 {
        self.cells.height()
    }

    /// X-coordinate of the (truncated) center cell
    pub fn center_x(&self) -> i32 {
        (self.width() - 1).max(0) >> 1
    }

    /// Y-coordinate of the (truncated) center cell
    pub fn center_y(&self) -> i32 {
        (self.height() - 1).max(0) >> 1
    }

    /// Returns whether the cell at shape-local `(x, y)` is part of the shape
    pub fn is_set(&self, x: i32, y: i32) -> bool {
        self.cells.get(x, y)
    }

    /// Returns the underlying raster
    pub fn cells(&self) -> &BitGrid {
        &self.cells
    }

    /// Returns the extensions in insertion order
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Returns the set of sides carrying at least one extension
    pub fn extension_sides(&self) -> SideSet {
        self.extensions.iter().map(|ext| ext.side()).collect()
    }

    /// Returns a copy of this shape with its raster replaced.
    ///
    /// The dimensions of `cells` must match the shape's.
    pub fn with_cells(&self, cells: BitGrid) -> Self {
        debug_assert_eq!(cells.width(), self.width());
        debug_assert_eq!(cells.height(), self.height());
        Self {
            id: self.id,
            cells,
            extensions: self.extensions.clone(),
        }
    }
}

/// Builder for [`Shape`].
///
/// # Examples
///
/// ```
/// # use polypack_core::shape::{Shape, ShapeId};
/// # use polypack_core::side::Side;
/// let shape = Shape::builder(ShapeId::new(0), 3, 2)
///     .fill_rect(0, 0, 2, 1)
///     .extension(Side::East, 0, 1)
///     .extension(Side::East, 0, 1)
///     .build();
///
/// assert!(shape.is_set(2, 1));
/// assert_eq!(shape.extensions().len(), 1);
/// assert_eq!(shape.extensions()[0].multiplicity(), 2);
/// ```
#[derive(Debug)]
pub struct ShapeBuilder {
    id: ShapeId,
    cells: BitGrid,
    extensions: IndexMap<(Side, i32, i32), u32>,
}

impl ShapeBuilder {
    /// Sets a single cell
    pub fn cell(mut self, x: i32, y: i32) -> Self {
        self.cells.set(x, y);
        self
    }

    /// Sets all cells in the inclusive range `(x0, y0)..=(x1, y1)`
    pub fn fill_rect(mut self, x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        for y in y0.min(y1)..=y0.max(y1) {
            for x in x0.min(x1)..=x0.max(x1) {
                self.cells.set(x, y);
            }
        }
        self
    }

    /// Adds an extension, merging it with an identical one if present.
    ///
    /// The range is clamped to the shape's extent along `side`.
    pub fn extension(mut self, side: Side, first: i32, last: i32) -> Self {
        let limit = if side.is_horizontal() {
            self.cells.height()
        } else {
            self.cells.width()
        };
        let max = (limit - 1).max(0);
        let lo = first.min(last).clamp(0, max);
        let hi = first.max(last).clamp(0, max);
        *self.extensions.entry((side, lo, hi)).or_insert(0) += 1;
        self
    }

    pub fn build(self) -> Shape {
        let extensions = self
            .extensions
            .into_iter()
            .map(|((side, first, last), multiplicity)| {
                Extension::new(side, first, last, multiplicity)
            })
            .collect();
        Shape {
            id: self.id,
            cells: self.cells,
            extensions,
        }
    }
}
