//! SVG rendering of components, their edge representors and placeholders.

use std::{fs::File, io::Write, path::Path};

use log::{debug, info};
use svg::{Document, node::element as svg_element};

use polypack_core::geometry::{Point, Rect};

use crate::{component::Component, error::PolypackError};

const HULL_FILL: &str = "#dbe9f6";
const HULL_STROKE: &str = "#2b5d8a";
const REPRESENTOR_FILL: &str = "#f4c27a";
const PLACEHOLDER_STROKE: &str = "#b03a2e";

/// Renders components into an SVG document.
///
/// Each component becomes one group holding its hull rectangles, the
/// representors of its external extensions and, dashed, their placeholders.
///
/// # Examples
///
/// ```
/// # use polypack::component::Component;
/// # use polypack::export::svg::SvgExporter;
/// # use polypack::geometry::Rect;
/// let components = vec![Component::new(vec![Rect::new(0.0, 0.0, 10.0, 10.0)])];
/// let svg = SvgExporter::new().render(&components).to_string();
/// assert!(svg.contains("<rect"));
/// ```
#[derive(Debug, Clone)]
pub struct SvgExporter {
    margin: f64,
    labels: bool,
}

impl Default for SvgExporter {
    fn default() -> Self {
        Self {
            margin: 10.0,
            labels: true,
        }
    }
}

impl SvgExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty space around the drawing
    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Whether each component is labeled with its index
    pub fn with_labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }

    pub fn render(&self, components: &[Component]) -> Document {
        let bounds = drawing_bounds(components).unwrap_or_default();
        let width = bounds.width() + 2.0 * self.margin;
        let height = bounds.height() + 2.0 * self.margin;

        let mut doc = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    bounds.x() - self.margin,
                    bounds.y() - self.margin,
                    width,
                    height
                ),
            )
            .set("width", width)
            .set("height", height);

        for (index, component) in components.iter().enumerate() {
            doc = doc.add(self.render_component(index, component));
        }
        debug!(components = components.len(), width, height; "Rendered SVG");
        doc
    }

    /// Renders the components and writes the document to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PolypackError::Io`] if the file cannot be written.
    pub fn write(&self, components: &[Component], path: &Path) -> Result<(), PolypackError> {
        let doc = self.render(components);
        let mut file = File::create(path)?;
        write!(file, "{doc}")?;
        info!(path:? = path; "SVG written");
        Ok(())
    }

    fn render_component(&self, index: usize, component: &Component) -> svg_element::Group {
        let mut group = svg_element::Group::new().set("id", format!("component-{index}"));

        for extension in component.extensions() {
            group = group.add(
                rectangle(extension.representor())
                    .set("fill", REPRESENTOR_FILL)
                    .set("opacity", 0.6),
            );
            if let Some(placeholder) = extension.placeholder() {
                group = group.add(
                    rectangle(placeholder)
                        .set("fill", "none")
                        .set("stroke", PLACEHOLDER_STROKE)
                        .set("stroke-dasharray", "2 2"),
                );
            }
        }

        for rect in component.hull() {
            group = group.add(
                rectangle(*rect)
                    .set("fill", HULL_FILL)
                    .set("stroke", HULL_STROKE)
                    .set("stroke-width", 1),
            );
        }

        if self.labels {
            if let Some(bbox) = component.bounding_box() {
                let center = Point::new(
                    bbox.x() + bbox.width() / 2.0,
                    bbox.y() + bbox.height() / 2.0,
                );
                group = group.add(
                    svg_element::Text::new(index.to_string())
                        .set("x", center.x())
                        .set("y", center.y())
                        .set("text-anchor", "middle")
                        .set("dominant-baseline", "middle")
                        .set("font-size", 10),
                );
            }
        }
        group
    }
}

fn rectangle(rect: Rect) -> svg_element::Rectangle {
    svg_element::Rectangle::new()
        .set("x", rect.x())
        .set("y", rect.y())
        .set("width", rect.width())
        .set("height", rect.height())
}

/// Bounds of every rectangle that gets drawn
fn drawing_bounds(components: &[Component]) -> Option<Rect> {
    Rect::union_all(components.iter().flat_map(|component| {
        component.hull().iter().copied().chain(
            component.extensions().iter().flat_map(|ext| {
                std::iter::once(ext.representor()).chain(ext.placeholder())
            }),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ExternalExtension;
    use polypack_core::side::Side;

    fn components() -> Vec<Component> {
        let body = Rect::new(0.0, 0.0, 20.0, 10.0);
        vec![
            Component::new(vec![body]).with_extension(
                ExternalExtension::new(Side::East, body, Rect::new(20.0, 4.0, 30.0, 2.0))
                    .with_placeholder(Rect::new(50.0, 4.0, 1.0, 2.0)),
            ),
            Component::new(vec![Rect::new(0.0, 20.0, 10.0, 10.0)]),
        ]
    }

    #[test]
    fn test_render_contains_all_rectangles() {
        let svg = SvgExporter::new().render(&components()).to_string();
        assert_eq!(svg.matches("<rect").count(), 4);
        assert!(svg.contains("component-0"));
        assert!(svg.contains("component-1"));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("viewBox=\"-10 -10 71 50\""));
    }

    #[test]
    fn test_labels_can_be_disabled() {
        let svg = SvgExporter::new()
            .with_labels(false)
            .render(&components())
            .to_string();
        assert!(!svg.contains("<text"));
    }

    #[test]
    fn test_empty_input_renders_margin_only() {
        let svg = SvgExporter::new().with_margin(5.0).render(&[]).to_string();
        assert!(svg.contains("viewBox=\"-5 -5 10 10\""));
    }
}
