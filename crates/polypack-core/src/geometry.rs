//! Geometric primitives for component packing.
//!
//! This module provides the real-valued types used by the packer and the
//! compactor to describe where component hulls and external edge extensions
//! live on the canvas.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate or translation vector
//! - [`Size`] - Width and height dimensions
//! - [`Rect`] - An axis-aligned rectangle given by its top-left corner and size
//!
//! # Coordinate System
//!
//! Polypack uses the usual screen coordinate system:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! North is toward negative Y, south toward positive Y.

use serde::{Deserialize, Serialize};

/// A 2D point, also used as a translation vector.
///
/// # Examples
///
/// ```
/// # use polypack_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Returns the point mirrored through the origin
    pub fn negate(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }

    /// Multiplies each coordinate by its own factor.
    ///
    /// # Examples
    ///
    /// ```
    /// # use polypack_core::geometry::Point;
    /// let cells = Point::new(3.0, 2.0);
    /// let real = cells.scale_xy(10.0, 25.0);
    /// assert_eq!(real.x(), 30.0);
    /// assert_eq!(real.y(), 50.0);
    /// ```
    pub fn scale_xy(self, factor_x: f64, factor_y: f64) -> Self {
        Self {
            x: self.x * factor_x,
            y: self.y * factor_y,
        }
    }

    /// Returns true if both coordinates are finite
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f64 {
        self.height
    }

    /// Returns a new Size with the maximum width and height between this size and another
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// An axis-aligned rectangle given by its top-left corner and its size.
///
/// Rectangles are the unit in which components describe their hulls and
/// external edge extensions. Width and height are expected to be
/// non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rect {
    /// Creates a new rectangle from its top-left corner and dimensions
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a new rectangle from a top-left point and a size
    pub fn from_top_left(top_left: Point, size: Size) -> Self {
        Self::new(top_left.x, top_left.y, size.width, size.height)
    }

    /// Returns the x-coordinate of the left edge
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the top edge
    pub fn y(self) -> f64 {
        self.y
    }

    /// Returns the width of the rectangle
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height of the rectangle
    pub fn height(self) -> f64 {
        self.height
    }

    /// Returns the x-coordinate of the right edge
    pub fn max_x(self) -> f64 {
        self.x + self.width
    }

    /// Returns the y-coordinate of the bottom edge
    pub fn max_y(self) -> f64 {
        self.y + self.height
    }

    /// Returns the top-left corner as a Point
    pub fn position(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the dimensions of the rectangle
    pub fn size(self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    /// Moves the top-left corner to the given position, keeping the size
    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Moves the rectangle by the specified offset.
    ///
    /// # Examples
    ///
    /// ```
    /// # use polypack_core::geometry::{Point, Rect};
    /// let rect = Rect::new(10.0, 20.0, 50.0, 30.0);
    ///
    /// let moved = rect.translate(Point::new(100.0, 50.0));
    /// assert_eq!(moved.x(), 110.0);
    /// assert_eq!(moved.y(), 70.0);
    /// assert_eq!(moved.width(), 50.0);
    /// ```
    pub fn translate(self, offset: Point) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..self
        }
    }

    /// Grows the rectangle by `amount` on every side
    pub fn grow(self, amount: f64) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + 2.0 * amount,
            height: self.height + 2.0 * amount,
        }
    }

    /// Returns the smallest rectangle containing both rectangles
    pub fn union(self, other: Rect) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.max_x().max(other.max_x()) - x,
            height: self.max_y().max(other.max_y()) - y,
        }
    }

    /// Returns the smallest rectangle containing all given rectangles, or
    /// `None` if the iterator is empty
    pub fn union_all(rects: impl IntoIterator<Item = Rect>) -> Option<Self> {
        rects.into_iter().reduce(Rect::union)
    }

    /// Returns true if the interiors of both rectangles overlap
    pub fn intersects(self, other: Rect) -> bool {
        self.x < other.max_x()
            && other.x < self.max_x()
            && self.y < other.max_y()
            && other.y < self.max_y()
    }

    /// Returns true if all components are finite and the size is non-negative
    pub fn is_valid(self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }

    /// Axis-aligned gap between two rectangles.
    ///
    /// Returns the larger of the horizontal and vertical gaps, which is
    /// negative if the rectangles overlap.
    pub fn gap(self, other: Rect) -> f64 {
        let horizontal = (other.x - self.max_x()).max(self.x - other.max_x());
        let vertical = (other.y - self.max_y()).max(self.y - other.max_y());
        horizontal.max(vertical)
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn rect_strategy() -> impl Strategy<Value = Rect> {
        (
            -1000.0f64..1000.0,
            -1000.0f64..1000.0,
            0.0f64..500.0,
            0.0f64..500.0,
        )
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
    }

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    // ===================
    // Property Test Functions
    // ===================

    /// The union of two rectangles contains both of them.
    fn check_union_contains_both(a: Rect, b: Rect) -> Result<(), TestCaseError> {
        let union = a.union(b);
        for rect in [a, b] {
            prop_assert!(union.x() <= rect.x());
            prop_assert!(union.y() <= rect.y());
            prop_assert!(union.max_x() >= rect.max_x() - 1e-9);
            prop_assert!(union.max_y() >= rect.max_y() - 1e-9);
        }
        Ok(())
    }

    /// Translating back and forth restores the rectangle.
    fn check_translate_roundtrip(rect: Rect, offset: Point) -> Result<(), TestCaseError> {
        let back = rect.translate(offset).translate(offset.negate());
        prop_assert!(approx_eq!(f64, back.x(), rect.x(), epsilon = 1e-9));
        prop_assert!(approx_eq!(f64, back.y(), rect.y(), epsilon = 1e-9));
        prop_assert_eq!(back.size(), rect.size());
        Ok(())
    }

    /// The gap is symmetric.
    fn check_gap_is_symmetric(a: Rect, b: Rect) -> Result<(), TestCaseError> {
        prop_assert!(approx_eq!(f64, a.gap(b), b.gap(a), epsilon = 1e-9));
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn union_contains_both(a in rect_strategy(), b in rect_strategy()) {
            check_union_contains_both(a, b)?;
        }

        #[test]
        fn translate_roundtrip(rect in rect_strategy(), offset in point_strategy()) {
            check_translate_roundtrip(rect, offset)?;
        }

        #[test]
        fn gap_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
            check_gap_is_symmetric(a, b)?;
        }
    }
}
