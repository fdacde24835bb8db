//! Configuration types for packing and compaction.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! TOML or any other serde format. Every field has a default, so an empty
//! document is a valid configuration.
//!
//! # Overview
//!
//! - [`PackingConfig`] - Top-level configuration combining both stages.
//! - [`PolyominoConfig`] - Grid resolution, spacing and placement strategies.
//! - [`CompactionConfig`] - Whether the packed layout is compacted.
//!
//! # Example
//!
//! ```
//! # use polypack::config::PackingConfig;
//! let config = PackingConfig::default();
//! assert_eq!(config.packing().spacing(), 20.0);
//! assert!(config.compaction().enabled());
//! assert!(config.validate().is_ok());
//! ```

use serde::Deserialize;

use crate::{
    error::PolypackError,
    polyomino::{
        sort::{HighLevelSort, LowLevelSort},
        successor::TraversalStrategy,
    },
};

const DEFAULT_SPACING: f64 = 20.0;

/// Top-level configuration combining packing and compaction settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PackingConfig {
    /// Polyomino packing section.
    #[serde(default)]
    packing: PolyominoConfig,

    /// Compaction section.
    #[serde(default)]
    compaction: CompactionConfig,
}

impl PackingConfig {
    /// Creates a new [`PackingConfig`] from its two sections.
    pub fn new(packing: PolyominoConfig, compaction: CompactionConfig) -> Self {
        Self {
            packing,
            compaction,
        }
    }

    /// Returns the packing configuration.
    pub fn packing(&self) -> &PolyominoConfig {
        &self.packing
    }

    /// Returns the compaction configuration.
    pub fn compaction(&self) -> &CompactionConfig {
        &self.compaction
    }

    /// Checks that all numeric settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`PolypackError::InvalidInput`] naming the first offending
    /// setting.
    pub fn validate(&self) -> Result<(), PolypackError> {
        self.packing.validate()
    }
}

/// Settings of the polyomino packing stage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PolyominoConfig {
    /// Minimum distance between two components.
    spacing: f64,

    /// Explicit grid step; computed from the components when unset.
    cell_size: Option<f64>,

    /// Width by height ratio of a grid cell.
    aspect_ratio: f64,

    /// Whether enclosed holes of a shape count as occupied.
    fill_holes: bool,

    low_level_sort: LowLevelSort,

    high_level_sort: HighLevelSort,

    traversal: TraversalStrategy,

    /// Seed of the jitter traversals.
    jitter_seed: u64,
}

impl Default for PolyominoConfig {
    fn default() -> Self {
        Self {
            spacing: DEFAULT_SPACING,
            cell_size: None,
            aspect_ratio: 1.0,
            fill_holes: true,
            low_level_sort: LowLevelSort::default(),
            high_level_sort: HighLevelSort::default(),
            traversal: TraversalStrategy::default(),
            jitter_seed: 0,
        }
    }
}

impl PolyominoConfig {
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = Some(cell_size);
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    pub fn with_fill_holes(mut self, fill_holes: bool) -> Self {
        self.fill_holes = fill_holes;
        self
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

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn cell_size(&self) -> Option<f64> {
        self.cell_size
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn fill_holes(&self) -> bool {
        self.fill_holes
    }

    pub fn low_level_sort(&self) -> LowLevelSort {
        self.low_level_sort
    }

    pub fn high_level_sort(&self) -> HighLevelSort {
        self.high_level_sort
    }

    pub fn traversal(&self) -> TraversalStrategy {
        self.traversal
    }

    pub fn jitter_seed(&self) -> u64 {
        self.jitter_seed
    }

    fn validate(&self) -> Result<(), PolypackError> {
        if !self.spacing.is_finite() || self.spacing < 0.0 {
            return Err(PolypackError::invalid_input(format!(
                "spacing must be a non-negative number, got {}",
                self.spacing
            )));
        }
        if let Some(cell_size) = self.cell_size.filter(|c| !(c.is_finite() && *c > 0.0)) {
            return Err(PolypackError::invalid_input(format!(
                "cell-size must be a positive number, got {cell_size}"
            )));
        }
        if !(self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0) {
            return Err(PolypackError::invalid_input(format!(
                "aspect-ratio must be a positive number, got {}",
                self.aspect_ratio
            )));
        }
        Ok(())
    }
}

/// Settings of the compaction stage.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CompactionConfig {
    /// Whether packed components are compacted afterwards.
    enabled: bool,
}

impl Default for CompactionConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl CompactionConfig {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PackingConfig::default();
        let packing = config.packing();
        assert_eq!(packing.spacing(), DEFAULT_SPACING);
        assert_eq!(packing.cell_size(), None);
        assert_eq!(packing.aspect_ratio(), 1.0);
        assert!(packing.fill_holes());
        assert_eq!(packing.low_level_sort(), LowLevelSort::BySizeAndShape);
        assert_eq!(
            packing.high_level_sort(),
            HighLevelSort::NumOfExternalSidesThenNumOfExtensions
        );
        assert_eq!(packing.traversal(), TraversalStrategy::QuadrantsLineByLine);
        assert_eq!(packing.jitter_seed(), 0);
        assert!(config.compaction().enabled());
    }

    #[test]
    fn test_validate_rejects_bad_numbers() {
        let bad = [
            PolyominoConfig::default().with_spacing(-1.0),
            PolyominoConfig::default().with_spacing(f64::NAN),
            PolyominoConfig::default().with_cell_size(0.0),
            PolyominoConfig::default().with_aspect_ratio(0.0),
            PolyominoConfig::default().with_aspect_ratio(f64::INFINITY),
        ];
        for packing in bad {
            let config = PackingConfig::new(packing, CompactionConfig::default());
            assert!(matches!(
                config.validate(),
                Err(PolypackError::InvalidInput(_))
            ));
        }

        let zero = PackingConfig::new(
            PolyominoConfig::default().with_spacing(0.0),
            CompactionConfig::new(false),
        );
        assert!(zero.validate().is_ok());
    }
}
