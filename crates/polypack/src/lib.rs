//! Polypack - packing of disconnected graph components.
//!
//! Components of a drawing that are not connected to each other are
//! arranged by rasterizing them into polyominoes, placing those on a grid,
//! and finally compacting the result along both axes while keeping a
//! minimum spacing.

pub mod compaction;
pub mod component;
pub mod config;
pub mod export;
pub mod polyomino;

mod error;

pub use polypack_core::{geometry, grid, holes, shape, side};

pub use error::PolypackError;

use log::{debug, info};

use polypack_core::shape::{Shape, ShapeId};

use compaction::{CompactionReport, ComponentsCompactor};
use component::Component;
use config::PackingConfig;
use geometry::{Point, Rect, Size};
use polyomino::{
    PolyominoPacker,
    raster::{self, CellSize, Raster},
};

/// Builder for packing components.
///
/// # Examples
///
/// ```
/// use polypack::{ComponentPacker, component::Component, geometry::Rect};
///
/// let mut components = vec![
///     Component::new(vec![Rect::new(0.0, 0.0, 40.0, 20.0)]),
///     Component::new(vec![Rect::new(500.0, 300.0, 10.0, 10.0)]),
/// ];
///
/// let layout = ComponentPacker::default()
///     .pack(&mut components)
///     .expect("valid input");
///
/// assert_eq!(layout.offsets().len(), 2);
/// assert!(layout.size().width() < 500.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ComponentPacker {
    config: PackingConfig,
}

impl ComponentPacker {
    /// Create a new packer with the given configuration.
    pub fn new(config: PackingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PackingConfig {
        &self.config
    }

    /// Packs the components and translates them in place.
    ///
    /// # Errors
    ///
    /// Returns [`PolypackError::InvalidInput`] if the configuration or any
    /// component is invalid. Nothing is moved in that case.
    pub fn pack(&self, components: &mut [Component]) -> Result<PackedLayout, PolypackError> {
        self.config.validate()?;
        for (index, component) in components.iter().enumerate() {
            component.validate(index)?;
        }
        info!(components = components.len(); "Packing components");

        if components.is_empty() {
            return Ok(PackedLayout::default());
        }

        let settings = self.config.packing();
        let originals: Vec<Point> = components
            .iter()
            .map(|c| c.position().unwrap_or_default())
            .collect();
        let cell = self.cell_size(components);
        debug!(cell_x = cell.x(), cell_y = cell.y(); "Grid cell size");

        let rasters = components
            .iter()
            .enumerate()
            .map(|(index, component)| {
                raster::rasterize(
                    ShapeId::new(index),
                    component,
                    settings.spacing(),
                    cell,
                    settings.fill_holes(),
                )
                .ok_or_else(|| {
                    PolypackError::invalid_input(format!("component {index} has an empty hull"))
                })
            })
            .collect::<Result<Vec<Raster>, _>>()?;
        let shapes: Vec<Shape> = rasters.iter().map(|r| r.shape.clone()).collect();

        let packed = PolyominoPacker::new()
            .with_low_level_sort(settings.low_level_sort())
            .with_high_level_sort(settings.high_level_sort())
            .with_traversal(settings.traversal())
            .with_jitter_seed(settings.jitter_seed())
            .pack(&shapes);

        for (component, offset) in components.iter_mut().zip(packed.real_offsets(&rasters, cell)) {
            component.translate(offset);
        }

        let mut size = packed.real_size(cell);
        let mut global_offset = Point::default();
        let mut compaction = None;
        if self.config.compaction().enabled() {
            let report = ComponentsCompactor::new(settings.spacing()).compact(components);
            size = report.bounds().size;
            global_offset = report.bounds().global_offset;
            compaction = Some(report);
        }

        let offsets = components
            .iter()
            .zip(originals)
            .map(|(c, original)| c.position().unwrap_or_default().sub_point(original))
            .collect();

        info!(width = size.width(), height = size.height(); "Components packed");
        Ok(PackedLayout {
            offsets,
            size,
            global_offset,
            compaction,
        })
    }

    fn cell_size(&self, components: &[Component]) -> CellSize {
        let settings = self.config.packing();
        let size = settings.cell_size().unwrap_or_else(|| {
            let bounds: Vec<Rect> = components.iter().filter_map(Component::bounding_box).collect();
            let size = raster::recommended_cell_size(&bounds);
            // Degenerate components have no extent to derive a step from.
            if size.is_finite() && size > 0.0 {
                size
            } else {
                settings.spacing().max(1.0)
            }
        });
        CellSize::with_aspect_ratio(size, settings.aspect_ratio())
    }
}

/// Result of [`ComponentPacker::pack`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackedLayout {
    offsets: Vec<Point>,
    size: Size,
    global_offset: Point,
    compaction: Option<CompactionReport>,
}

impl PackedLayout {
    /// Translation of every component relative to its position before
    /// packing, indexed like the packed slice
    pub fn offsets(&self) -> &[Point] {
        &self.offsets
    }

    /// Size of the packed drawing
    pub fn size(&self) -> Size {
        self.size
    }

    /// Translation that moves the packed drawing to non-negative
    /// coordinates
    pub fn global_offset(&self) -> Point {
        self.global_offset
    }

    /// Offset of the component at `index` including the global offset
    pub fn normalized_offset(&self, index: usize) -> Point {
        self.offsets[index].add_point(self.global_offset)
    }

    /// Report of the compaction stage, if it ran
    pub fn compaction(&self) -> Option<&CompactionReport> {
        self.compaction.as_ref()
    }
}
