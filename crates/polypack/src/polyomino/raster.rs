//! Conversion of components into low-resolution shapes.

use log::debug;

use polypack_core::{
    geometry::{Point, Rect},
    holes,
    shape::{Shape, ShapeId},
};

use crate::component::Component;

/// Upper bound on the average number of cells per shape.
const CELLS_PER_SHAPE: f64 = 100.0;

/// Real-valued extent of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellSize {
    x: f64,
    y: f64,
}

impl CellSize {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Square cells of the given size, stretched to match `aspect_ratio`
    /// (width by height).
    pub fn with_aspect_ratio(size: f64, aspect_ratio: f64) -> Self {
        if aspect_ratio > 1.0 {
            Self::new(size * aspect_ratio, size)
        } else {
            Self::new(size, size / aspect_ratio)
        }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }
}

/// Computes the grid step for the given component bounding boxes.
///
/// The step `l` is the positive root of
/// `(c·n − 1)·l² − Σ(Wᵢ + Hᵢ)·l − Σ(Wᵢ·Hᵢ) = 0`, where `c` bounds the average
/// number of cells per shape and `n` is the number of components.
pub fn recommended_cell_size(bounds: &[Rect]) -> f64 {
    let (sum, product) = bounds.iter().fold((0.0, 0.0), |(sum, product), rect| {
        (
            sum + rect.width() + rect.height(),
            product + rect.width() * rect.height(),
        )
    });
    let n = bounds.len() as f64;

    let numerator =
        (4.0 * CELLS_PER_SHAPE * n * product - 4.0 * product + sum * sum).sqrt() + sum;
    let denominator = 2.0 * (CELLS_PER_SHAPE * n - 1.0);
    if denominator == 0.0 {
        numerator
    } else {
        numerator / denominator
    }
}

/// A shape together with the real coordinates of its top-left cell.
#[derive(Debug, Clone)]
pub struct Raster {
    pub shape: Shape,
    pub origin: Point,
}

/// First and last cell index covered by the interval `[start, end]` of a
/// raster starting at `origin` with cells of `step`.
fn cell_span(start: f64, end: f64, origin: f64, step: f64, cells: i32) -> (i32, i32) {
    let first = ((start - origin) / step).floor() as i32;
    let last = (((end - origin) / step).ceil() as i32 - 1).max(first);
    (first.clamp(0, cells - 1), last.clamp(0, cells - 1))
}

/// Rasterizes a component.
///
/// The shape covers the component's hull grown by half the spacing, so that
/// two shapes that do not share a cell keep their hulls at least `spacing`
/// apart. Extensions cover the parent rectangle's range along their side.
pub fn rasterize(
    id: ShapeId,
    component: &Component,
    spacing: f64,
    cell: CellSize,
    fill_holes: bool,
) -> Option<Raster> {
    let margin = spacing / 2.0;
    let frame = component.bounding_box()?.grow(margin);

    let width = ((frame.width() / cell.x()).ceil() as i32).max(1);
    let height = ((frame.height() / cell.y()).ceil() as i32).max(1);

    let mut builder = Shape::builder(id, width, height);
    for rect in component.hull() {
        let rect = rect.grow(margin);
        let (x0, x1) = cell_span(rect.x(), rect.max_x(), frame.x(), cell.x(), width);
        let (y0, y1) = cell_span(rect.y(), rect.max_y(), frame.y(), cell.y(), height);
        builder = builder.fill_rect(x0, y0, x1, y1);
    }

    for extension in component.extensions() {
        let parent = extension.parent();
        let (first, last) = if extension.side().is_horizontal() {
            cell_span(parent.y(), parent.max_y(), frame.y(), cell.y(), height)
        } else {
            cell_span(parent.x(), parent.max_x(), frame.x(), cell.x(), width)
        };
        builder = builder.extension(extension.side(), first, last);
    }

    let mut shape = builder.build();
    if fill_holes {
        shape = holes::fill_shape_holes(&shape);
    }

    debug!(
        shape = id.index(), width, height, extensions = shape.extensions().len();
        "Rasterized component"
    );
    Some(Raster {
        shape,
        origin: frame.position(),
    })
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;
    use crate::component::ExternalExtension;
    use polypack_core::side::Side;

    #[test]
    fn test_recommended_cell_size_solves_quadratic() {
        let bounds = [
            Rect::new(0.0, 0.0, 40.0, 20.0),
            Rect::new(0.0, 0.0, 10.0, 10.0),
        ];
        let l = recommended_cell_size(&bounds);
        let n = bounds.len() as f64;
        let residual = (CELLS_PER_SHAPE * n - 1.0) * l * l - 80.0 * l - 900.0;
        assert!(l > 0.0);
        assert!(residual.abs() < 1e-6, "residual {residual}");
    }

    #[test]
    fn test_aspect_ratio() {
        let wide = CellSize::with_aspect_ratio(2.0, 2.0);
        assert!(approx_eq!(f64, wide.x(), 4.0));
        assert!(approx_eq!(f64, wide.y(), 2.0));

        let tall = CellSize::with_aspect_ratio(2.0, 0.5);
        assert!(approx_eq!(f64, tall.x(), 2.0));
        assert!(approx_eq!(f64, tall.y(), 4.0));
    }

    #[test]
    fn test_rasterize_single_box() {
        let component = Component::new(vec![Rect::new(10.0, 10.0, 8.0, 4.0)]);
        let raster = rasterize(ShapeId::new(0), &component, 2.0, CellSize::new(1.0, 1.0), true)
            .expect("non-empty hull");
        // 8x4 grown by 1 on every side.
        assert_eq!(raster.shape.width(), 10);
        assert_eq!(raster.shape.height(), 6);
        assert_eq!(raster.shape.cells().count(), 60);
        assert_eq!(raster.origin, Point::new(9.0, 9.0));
    }

    #[test]
    fn test_rasterize_l_shape_leaves_gap() {
        let component = Component::new(vec![
            Rect::new(0.0, 0.0, 10.0, 2.0),
            Rect::new(0.0, 2.0, 2.0, 8.0),
        ]);
        let raster = rasterize(ShapeId::new(0), &component, 0.0, CellSize::new(2.0, 2.0), false)
            .expect("non-empty hull");
        let shape = raster.shape;
        assert_eq!((shape.width(), shape.height()), (5, 5));
        assert!(shape.is_set(4, 0));
        assert!(shape.is_set(0, 4));
        assert!(!shape.is_set(4, 4));
        assert_eq!(shape.cells().count(), 9);
    }

    #[test]
    fn test_rasterize_extensions_follow_parent() {
        let body = Rect::new(0.0, 0.0, 10.0, 10.0);
        let top = Rect::new(0.0, 0.0, 10.0, 4.0);
        let component = Component::new(vec![body])
            .with_extension(ExternalExtension::new(
                Side::East,
                top,
                Rect::new(10.0, 1.0, 5.0, 2.0),
            ))
            .with_extension(ExternalExtension::new(
                Side::East,
                top,
                Rect::new(10.0, 2.0, 5.0, 1.0),
            ));
        let raster = rasterize(ShapeId::new(0), &component, 0.0, CellSize::new(2.0, 2.0), true)
            .expect("non-empty hull");
        let extensions = raster.shape.extensions();
        assert_eq!(extensions.len(), 1);
        assert_eq!(extensions[0].side(), Side::East);
        assert_eq!((extensions[0].first(), extensions[0].last()), (0, 1));
        assert_eq!(extensions[0].multiplicity(), 2);
    }

    #[test]
    fn test_rasterize_empty_hull() {
        let component = Component::new(Vec::new());
        assert!(rasterize(ShapeId::new(0), &component, 1.0, CellSize::new(1.0, 1.0), true).is_none());
    }
}
