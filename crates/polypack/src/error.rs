//! Error types for Polypack operations.
//!
//! This module provides the main error type [`PolypackError`]. The packing
//! and compaction algorithms themselves cannot fail once their input has
//! been validated, so errors are raised at the boundary only.

use std::io;

use thiserror::Error;

/// The main error type for Polypack operations.
#[derive(Debug, Error)]
pub enum PolypackError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PolypackError {
    /// Create a new `InvalidInput` error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
