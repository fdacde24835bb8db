//! Placement order of shapes.
//!
//! Shapes are sorted in two stages. The low-level sort orders by size,
//! largest first. The high-level sort then runs a chain of stable sorts over
//! the extension structure of the shapes; each later sort of the chain is the
//! primary key, earlier ones only break its ties. Shapes that compare equal
//! under every stage keep their input order.

use serde::{Deserialize, Serialize};

use polypack_core::shape::Shape;

/// Size ordering applied first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LowLevelSort {
    /// Descending half-perimeter of the bounding box
    BySize,
    /// Like `BySize`, but the shorter side is squared so that square-ish
    /// shapes are placed after elongated ones of equal perimeter
    #[default]
    BySizeAndShape,
}

/// Extension-based ordering applied after the size ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HighLevelSort {
    /// Fewer extension sides first, ties broken by fewer extensions
    #[default]
    NumOfExternalSidesThenNumOfExtensions,
    /// Shapes with extensions on two orthogonal sides last, before them
    /// shapes with extensions on a single side, ties broken by fewer
    /// extensions
    CornerCasesThenSingleSideLast,
}

fn size_key(shape: &Shape) -> i64 {
    i64::from(shape.width()) + i64::from(shape.height())
}

fn size_and_shape_key(shape: &Shape) -> i64 {
    let (mut width, mut height) = (i64::from(shape.width()), i64::from(shape.height()));
    if width < height {
        width *= width;
    } else {
        height *= height;
    }
    width + height
}

fn single_side_key(shape: &Shape) -> u8 {
    u8::from(shape.extension_sides().len() == 1)
}

fn corner_case_key(shape: &Shape) -> u8 {
    let sides = shape.extension_sides();
    u8::from(sides.len() == 2 && sides.horizontal_count() == 1)
}

/// Returns the indices of `shapes` in placement order.
pub fn placement_order(shapes: &[Shape], low: LowLevelSort, high: HighLevelSort) -> Vec<usize> {
    let mut order: Vec<usize> = (0..shapes.len()).collect();

    match low {
        LowLevelSort::BySize => order.sort_by_key(|&i| std::cmp::Reverse(size_key(&shapes[i]))),
        LowLevelSort::BySizeAndShape => {
            order.sort_by_key(|&i| std::cmp::Reverse(size_and_shape_key(&shapes[i])))
        }
    }

    order.sort_by_key(|&i| shapes[i].extensions().len());
    match high {
        HighLevelSort::NumOfExternalSidesThenNumOfExtensions => {
            order.sort_by_key(|&i| shapes[i].extension_sides().len());
        }
        HighLevelSort::CornerCasesThenSingleSideLast => {
            order.sort_by_key(|&i| single_side_key(&shapes[i]));
            order.sort_by_key(|&i| corner_case_key(&shapes[i]));
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use polypack_core::{shape::ShapeId, side::Side};

    fn rect_shape(id: usize, w: i32, h: i32, sides: &[Side]) -> Shape {
        sides
            .iter()
            .fold(
                Shape::builder(ShapeId::new(id), w, h).fill_rect(0, 0, w - 1, h - 1),
                |builder, side| builder.extension(*side, 0, 0),
            )
            .build()
    }

    #[test]
    fn test_by_size_is_descending_and_stable() {
        let shapes = vec![
            rect_shape(0, 2, 2, &[]),
            rect_shape(1, 5, 1, &[]),
            rect_shape(2, 3, 3, &[]),
            rect_shape(3, 1, 3, &[]),
        ];
        let order = placement_order(
            &shapes,
            LowLevelSort::BySize,
            HighLevelSort::NumOfExternalSidesThenNumOfExtensions,
        );
        // Half-perimeters: 4, 6, 6, 4.
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn test_by_size_and_shape_penalizes_squares() {
        // 3x3 -> 3 + 9 = 12, 5x1 -> 5 + 1 = 6, 4x2 -> 4 + 4 = 8
        let shapes = vec![
            rect_shape(0, 5, 1, &[]),
            rect_shape(1, 3, 3, &[]),
            rect_shape(2, 4, 2, &[]),
        ];
        let order = placement_order(
            &shapes,
            LowLevelSort::BySizeAndShape,
            HighLevelSort::NumOfExternalSidesThenNumOfExtensions,
        );
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_fewer_extension_sides_first() {
        let shapes = vec![
            rect_shape(0, 4, 4, &[Side::North, Side::East]),
            rect_shape(1, 2, 2, &[]),
            rect_shape(2, 3, 3, &[Side::West]),
        ];
        let order = placement_order(
            &shapes,
            LowLevelSort::BySize,
            HighLevelSort::NumOfExternalSidesThenNumOfExtensions,
        );
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_corner_cases_last() {
        let shapes = vec![
            rect_shape(0, 6, 6, &[Side::North, Side::East]),
            rect_shape(1, 5, 5, &[Side::West]),
            rect_shape(2, 4, 4, &[Side::North, Side::South]),
            rect_shape(3, 3, 3, &[]),
            rect_shape(4, 2, 2, &[Side::North, Side::East, Side::South]),
        ];
        let order = placement_order(
            &shapes,
            LowLevelSort::BySize,
            HighLevelSort::CornerCasesThenSingleSideLast,
        );
        // Rest (by number of extensions): 3 (0), 2 (2), 4 (3); then single side: 1;
        // then corner case: 0.
        assert_eq!(order, vec![3, 2, 4, 1, 0]);
    }
}
