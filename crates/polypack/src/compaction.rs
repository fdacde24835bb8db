//! One-dimensional compaction of packed components.
//!
//! Packing on a coarse grid leaves gaps between components. Compaction
//! closes them by repeatedly pushing components left, right, up and down
//! while keeping the configured spacing.
//!
//! # Model
//!
//! - [`graph`]: arena of rectangle nodes and the rigid groups they belong to
//! - [`transformer`]: builds the graph from components and writes positions
//!   back
//! - [`compactor`]: longest-path compaction in a single direction
//! - [`components`]: the alternating horizontal and vertical rounds

pub mod compactor;
pub mod components;
pub mod graph;
pub mod transformer;

pub use components::{CompactionReport, ComponentsCompactor};
pub use transformer::LayoutBounds;
