//! Input model: the disconnected components to pack.
//!
//! A [`Component`] is described purely geometrically. Its hull is a list of
//! rectangles, and every edge leaving the component toward the outside of
//! the drawing is summarized as an [`ExternalExtension`]. Packing translates
//! components in place; it never resizes hull rectangles.

use serde::{Deserialize, Serialize};

use polypack_core::{
    geometry::{Point, Rect},
    side::{Side, SideSet},
};

use crate::error::PolypackError;

/// An edge (or bundle of edges) leaving a component toward the outside of
/// the drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExternalExtension {
    /// Rectangle occupied by the edge between the component and the
    /// drawing's boundary.
    representor: Rect,
    /// Optional rectangle reserving space on the drawing's boundary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<Rect>,
    /// The hull piece the edge leaves from.
    parent: Rect,
    /// The side the edge leaves through.
    side: Side,
}

impl ExternalExtension {
    pub fn new(side: Side, parent: Rect, representor: Rect) -> Self {
        Self {
            representor,
            placeholder: None,
            parent,
            side,
        }
    }

    /// Sets the placeholder rectangle
    pub fn with_placeholder(mut self, placeholder: Rect) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn parent(&self) -> Rect {
        self.parent
    }

    pub fn representor(&self) -> Rect {
        self.representor
    }

    pub fn placeholder(&self) -> Option<Rect> {
        self.placeholder
    }

    pub(crate) fn set_representor(&mut self, representor: Rect) {
        self.representor = representor;
    }

    pub(crate) fn set_placeholder(&mut self, placeholder: Rect) {
        self.placeholder = Some(placeholder);
    }

    pub(crate) fn set_parent(&mut self, parent: Rect) {
        self.parent = parent;
    }

    fn translate(&mut self, offset: Point) {
        self.representor = self.representor.translate(offset);
        self.parent = self.parent.translate(offset);
        if let Some(placeholder) = self.placeholder.as_mut() {
            *placeholder = placeholder.translate(offset);
        }
    }
}

/// One connected piece of a drawing.
///
/// # Examples
///
/// ```
/// # use polypack::component::{Component, ExternalExtension};
/// # use polypack::geometry::Rect;
/// # use polypack::side::Side;
/// let body = Rect::new(0.0, 0.0, 40.0, 20.0);
/// let component = Component::new(vec![body])
///     .with_extension(ExternalExtension::new(
///         Side::East,
///         body,
///         Rect::new(40.0, 8.0, 60.0, 4.0),
///     ))
///     .with_external_side(Side::East);
///
/// assert_eq!(component.bounding_box(), Some(body));
/// assert!(component.external_sides().contains(Side::East));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Component {
    hull: Vec<Rect>,
    #[serde(default)]
    extensions: Vec<ExternalExtension>,
    #[serde(default)]
    external_sides: SideSet,
}

impl Component {
    /// Creates a component from its hull rectangles
    pub fn new(hull: Vec<Rect>) -> Self {
        Self {
            hull,
            extensions: Vec::new(),
            external_sides: SideSet::EMPTY,
        }
    }

    pub fn with_extension(mut self, extension: ExternalExtension) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Marks a side as carrying external connections
    pub fn with_external_side(mut self, side: Side) -> Self {
        self.external_sides.insert(side);
        self
    }

    pub fn hull(&self) -> &[Rect] {
        &self.hull
    }

    pub fn extensions(&self) -> &[ExternalExtension] {
        &self.extensions
    }

    /// Sides on which the component connects to the outside
    pub fn external_sides(&self) -> SideSet {
        self.external_sides
    }

    /// Bounding box of the hull, or `None` for an empty hull
    pub fn bounding_box(&self) -> Option<Rect> {
        Rect::union_all(self.hull.iter().copied())
    }

    /// Top-left corner of the hull's bounding box
    pub fn position(&self) -> Option<Point> {
        self.bounding_box().map(Rect::position)
    }

    /// Moves the hull and all extensions by `offset`
    pub fn translate(&mut self, offset: Point) {
        for rect in &mut self.hull {
            *rect = rect.translate(offset);
        }
        for extension in &mut self.extensions {
            extension.translate(offset);
        }
    }

    pub(crate) fn hull_mut(&mut self) -> &mut [Rect] {
        &mut self.hull
    }

    pub(crate) fn extensions_mut(&mut self) -> &mut [ExternalExtension] {
        &mut self.extensions
    }

    /// Checks that the component can be packed.
    ///
    /// # Errors
    ///
    /// Returns [`PolypackError::InvalidInput`] if the hull is empty or any
    /// rectangle has non-finite coordinates or a negative size.
    pub fn validate(&self, index: usize) -> Result<(), PolypackError> {
        if self.hull.is_empty() {
            return Err(PolypackError::invalid_input(format!(
                "component {index} has an empty hull"
            )));
        }
        let rects = self.hull.iter().copied().chain(self.extensions.iter().flat_map(|ext| {
            [Some(ext.representor), Some(ext.parent), ext.placeholder]
                .into_iter()
                .flatten()
        }));
        for rect in rects {
            if !rect.is_valid() {
                return Err(PolypackError::invalid_input(format!(
                    "component {index} contains an invalid rectangle {rect:?}"
                )));
            }
        }
        Ok(())
    }
}
