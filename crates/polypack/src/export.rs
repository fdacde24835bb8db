//! Rendering of packed components for inspection.

pub mod svg;
