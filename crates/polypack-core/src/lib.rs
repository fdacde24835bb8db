//! Polypack Core Types
//!
//! This crate provides the grid-level building blocks of the Polypack
//! component packer. It includes:
//!
//! - **Geometry**: Real-valued points, sizes and rectangles ([`geometry`] module)
//! - **Sides**: Compass sides and side sets ([`side::Side`], [`side::SideSet`])
//! - **Shapes**: Rasterized component outlines with extensions ([`shape::Shape`])
//! - **Grid**: The unbounded occupancy grid shapes are packed onto ([`grid::PlanarGrid`])
//! - **Holes**: Profile-based hole filling for shapes ([`holes`] module)

pub mod geometry;
pub mod grid;
pub mod holes;
pub mod shape;
pub mod side;
