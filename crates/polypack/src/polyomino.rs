//! Polyomino packing of disconnected components.
//!
//! Components are rasterized into [`Shape`]s on a coarse grid, sorted, and
//! placed one after another onto a [`PlanarGrid`]. Each shape starts at the
//! grid's origin and walks the offsets produced by a [`Successor`] until it
//! fits without collisions.
//!
//! # Pipeline
//!
//! ```text
//! Components
//!     ↓ raster
//! Shapes
//!     ↓ sort
//! Placement order
//!     ↓ PolyominoPacker::pack
//! Grid placements
//!     ↓ PackedShapes::real_offsets
//! Component translations
//! ```

pub mod raster;
pub mod sort;
pub mod successor;

use log::{debug, info, trace};

use polypack_core::{
    geometry::{Point, Size},
    grid::{CellBounds, Placement, PlanarGrid},
    shape::Shape,
};

use raster::{CellSize, Raster};
use sort::{HighLevelSort, LowLevelSort};
use successor::{Successor, TraversalStrategy};

/// Places shapes onto a planar grid.
///
/// # Examples
///
/// ```
/// # use polypack::polyomino::PolyominoPacker;
/// # use polypack::polyomino::successor::TraversalStrategy;
/// # use polypack_core::shape::{Shape, ShapeId};
/// let shapes: Vec<Shape> = (0..2)
///     .map(|i| Shape::builder(ShapeId::new(i), 2, 2).fill_rect(0, 0, 1, 1).build())
///     .collect();
///
/// let packed = PolyominoPacker::new()
///     .with_traversal(TraversalStrategy::Manhattan)
///     .pack(&shapes);
///
/// assert_eq!(packed.placement(0).offset, (0, 0));
/// assert_eq!(packed.placement(1).offset, (2, 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PolyominoPacker {
    low_level_sort: LowLevelSort,
    high_level_sort: HighLevelSort,
    traversal: TraversalStrategy,
    jitter_seed: u64,
}

impl PolyominoPacker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_low_level_sort(mut self, sort: LowLevelSort) -> Self {
        self.low_level_sort = sort;
        self
    }

    pub fn with_high_level_sort(mut self, sort: HighLevelSort) -> Self {
        self.high_level_sort = sort;
        self
    }

    pub fn with_traversal(mut self, traversal: TraversalStrategy) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn with_jitter_seed(mut self, seed: u64) -> Self {
        self.jitter_seed = seed;
        self
    }

    /// Packs the shapes and returns their placements, indexed like `shapes`.
    ///
    /// Termination relies on the traversal visiting every offset of the
    /// plane eventually, which all built-in strategies do.
    pub fn pack(&self, shapes: &[Shape]) -> PackedShapes {
        info!(shapes = shapes.len(), traversal:? = self.traversal; "Packing shapes");

        let order = sort::placement_order(shapes, self.low_level_sort, self.high_level_sort);
        let mut successor = Successor::from_strategy(self.traversal, self.jitter_seed);
        let mut grid = PlanarGrid::new();
        let mut placements = vec![None; shapes.len()];

        for index in order {
            let shape = &shapes[index];
            let mut offset = (0, 0);
            let mut trials = 0usize;
            while grid.overlaps_center_based(shape, offset.0, offset.1) {
                offset = successor.next(offset, shape);
                trials += 1;
            }
            trace!(shape = index, offset:?, trials; "Placed shape");
            placements[index] = Some(grid.commit(shape, offset.0, offset.1));
        }

        let placements: Vec<Placement> = placements.into_iter().flatten().collect();
        debug!(
            placed = placements.len(),
            grid_width = grid.width(),
            grid_height = grid.height();
            "Shapes packed"
        );
        PackedShapes {
            placements,
            bounds: grid.filled_bounds(),
        }
    }
}

/// Result of packing shapes onto the grid.
#[derive(Debug, Clone)]
pub struct PackedShapes {
    placements: Vec<Placement>,
    bounds: Option<CellBounds>,
}

impl PackedShapes {
    /// Placement of the shape at `index` in the packed slice
    pub fn placement(&self, index: usize) -> Placement {
        self.placements[index]
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Bounds of all occupied cells
    pub fn bounds(&self) -> Option<CellBounds> {
        self.bounds
    }

    /// Real-valued translation of every raster after cropping the grid to
    /// its occupied cells.
    ///
    /// The top-left cell of each shape lands at its cropped cell position
    /// scaled by the cell size.
    pub fn real_offsets(&self, rasters: &[Raster], cell: CellSize) -> Vec<Point> {
        let (min_x, min_y) = self
            .bounds
            .map_or((0, 0), |bounds| (bounds.min_x, bounds.min_y));
        self.placements
            .iter()
            .zip(rasters)
            .map(|(placement, raster)| {
                let (left, top) = placement.top_left;
                Point::new(
                    f64::from(left - min_x) * cell.x(),
                    f64::from(top - min_y) * cell.y(),
                )
                .sub_point(raster.origin)
            })
            .collect()
    }

    /// Size of the cropped grid in real coordinates
    pub fn real_size(&self, cell: CellSize) -> Size {
        self.bounds.map_or(Size::default(), |bounds| {
            Size::new(
                f64::from(bounds.width()) * cell.x(),
                f64::from(bounds.height()) * cell.y(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use polypack_core::{shape::ShapeId, side::Side};

    const ALL_STRATEGIES: [TraversalStrategy; 9] = [
        TraversalStrategy::Spiral,
        TraversalStrategy::LineByLine,
        TraversalStrategy::Manhattan,
        TraversalStrategy::Jitter,
        TraversalStrategy::QuadrantsManhattan,
        TraversalStrategy::QuadrantsLineByLine,
        TraversalStrategy::QuadrantsJitter,
        TraversalStrategy::CombineLineByLineManhattan,
        TraversalStrategy::CombineJitterManhattan,
    ];

    fn square(id: usize, size: i32) -> Shape {
        Shape::builder(ShapeId::new(id), size, size)
            .fill_rect(0, 0, size - 1, size - 1)
            .build()
    }

    fn occupied_cells(shape: &Shape, placement: Placement) -> HashSet<(i32, i32)> {
        let (left, top) = placement.top_left;
        shape
            .cells()
            .iter_set()
            .map(|(x, y)| (left + x, top + y))
            .collect()
    }

    #[test]
    fn test_two_squares_are_adjacent_for_every_strategy() {
        let shapes = vec![square(0, 2), square(1, 2)];
        for strategy in ALL_STRATEGIES {
            let packed = PolyominoPacker::new().with_traversal(strategy).pack(&shapes);
            assert_eq!(packed.placement(0).offset, (0, 0));
            let (dx, dy) = packed.placement(1).offset;
            assert_eq!(dx.abs().max(dy.abs()), 2, "{strategy:?} placed at ({dx}, {dy})");
        }
    }

    #[test]
    fn test_packed_shapes_never_share_cells() {
        let shapes: Vec<Shape> = (0..12)
            .map(|i| {
                let w = 1 + (i as i32 * 7) % 5;
                let h = 1 + (i as i32 * 3) % 4;
                Shape::builder(ShapeId::new(i), w, h)
                    .fill_rect(0, 0, w - 1, h - 1)
                    .build()
            })
            .collect();
        for strategy in ALL_STRATEGIES {
            let packed = PolyominoPacker::new().with_traversal(strategy).pack(&shapes);
            let mut seen = HashSet::new();
            for (shape, placement) in shapes.iter().zip(packed.placements()) {
                for cell in occupied_cells(shape, *placement) {
                    assert!(seen.insert(cell), "{strategy:?} reused cell {cell:?}");
                }
            }
        }
    }

    #[test]
    fn test_east_extension_stays_east() {
        let shapes = vec![
            square(0, 3),
            Shape::builder(ShapeId::new(1), 2, 2)
                .fill_rect(0, 0, 1, 1)
                .extension(Side::East, 0, 1)
                .build(),
        ];
        let packed = PolyominoPacker::new()
            .with_traversal(TraversalStrategy::QuadrantsManhattan)
            .pack(&shapes);
        // The shape with an extension is placed second and must not leave
        // the non-negative half-plane.
        assert!(packed.placement(1).offset.0 >= 0);
    }

    #[test]
    fn test_pack_is_deterministic() {
        let shapes: Vec<Shape> = (0..6).map(|i| square(i, 1 + i as i32 % 3)).collect();
        let packer = PolyominoPacker::new()
            .with_traversal(TraversalStrategy::Jitter)
            .with_jitter_seed(99);
        let a = packer.pack(&shapes);
        let b = packer.pack(&shapes);
        assert_eq!(a.placements(), b.placements());
    }

    #[test]
    fn test_real_offsets_crop_to_origin() {
        let shapes = vec![square(0, 2), square(1, 2)];
        let packed = PolyominoPacker::new()
            .with_traversal(TraversalStrategy::Manhattan)
            .pack(&shapes);
        assert_eq!(packed.placement(1).offset, (2, 0));
        let rasters: Vec<Raster> = shapes
            .iter()
            .map(|shape| Raster {
                shape: shape.clone(),
                origin: Point::new(100.0, 100.0),
            })
            .collect();
        let cell = CellSize::new(5.0, 5.0);
        let offsets = packed.real_offsets(&rasters, cell);
        assert_eq!(offsets[0], Point::new(-100.0, -100.0));
        assert_eq!(offsets[1], Point::new(-90.0, -100.0));
        assert_eq!(packed.real_size(cell), Size::new(20.0, 10.0));
    }
}
