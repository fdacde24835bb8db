//! TOML documents read and written by the CLI.
//!
//! The input lists the components to pack:
//!
//! ```toml
//! [[components]]
//! hull = [{ x = 0.0, y = 0.0, width = 40.0, height = 20.0 }]
//! external-sides = ["east"]
//!
//! [[components.extensions]]
//! side = "east"
//! parent = { x = 0.0, y = 0.0, width = 40.0, height = 20.0 }
//! representor = { x = 40.0, y = 8.0, width = 60.0, height = 4.0 }
//! ```
//!
//! The output is a [`PlacementReport`].

use std::io;

use serde::{Deserialize, Serialize};

use polypack::{
    PackedLayout, PolypackError,
    component::Component,
    geometry::{Point, Size},
};

#[derive(Debug, Deserialize)]
struct ComponentFile {
    #[serde(default)]
    components: Vec<Component>,
}

/// Parses the components of an input document.
///
/// # Errors
///
/// Returns [`PolypackError::InvalidInput`] if the document is not valid
/// TOML or does not describe components.
pub fn parse_components(source: &str) -> Result<Vec<Component>, PolypackError> {
    let file: ComponentFile = toml::from_str(source)
        .map_err(|e| PolypackError::invalid_input(format!("failed to parse components: {e}")))?;
    Ok(file.components)
}

/// Where every component ended up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlacementReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    compaction_iterations: Option<usize>,
    size: Size,
    global_offset: Point,
    #[serde(default)]
    components: Vec<Placement>,
}

/// Translation applied to a single component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Placement {
    index: usize,
    offset: Point,
    /// Offset including the global offset
    normalized_offset: Point,
}

impl PlacementReport {
    pub fn new(layout: &PackedLayout) -> Self {
        let components = (0..layout.offsets().len())
            .map(|index| Placement {
                index,
                offset: layout.offsets()[index],
                normalized_offset: layout.normalized_offset(index),
            })
            .collect();
        Self {
            compaction_iterations: layout.compaction().map(|c| c.iterations()),
            size: layout.size(),
            global_offset: layout.global_offset(),
            components,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn global_offset(&self) -> Point {
        self.global_offset
    }

    pub fn compaction_iterations(&self) -> Option<usize> {
        self.compaction_iterations
    }

    pub fn components(&self) -> &[Placement] {
        &self.components
    }

    /// Serializes the report as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`PolypackError::Io`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, PolypackError> {
        toml::to_string(self).map_err(|e| PolypackError::Io(io::Error::other(e.to_string())))
    }
}

impl Placement {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn normalized_offset(&self) -> Point {
        self.normalized_offset
    }
}
