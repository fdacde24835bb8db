//! CLI logic for the Polypack component packer.
//!
//! Reads components from a TOML file, packs them and writes a TOML
//! placement report, optionally together with an SVG preview.

pub mod document;
pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, path::Path};

use log::info;

use polypack::{ComponentPacker, PolypackError, export::svg::SvgExporter};

use document::PlacementReport;

/// Run the Polypack CLI application
///
/// # Errors
///
/// Returns `PolypackError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed or invalid components
pub fn run(args: &Args) -> Result<(), PolypackError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing components"
    );

    let config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let mut components = document::parse_components(&source)?;

    let layout = ComponentPacker::new(config).pack(&mut components)?;
    let report = PlacementReport::new(&layout);
    fs::write(&args.output, report.to_toml()?)?;
    info!(output_file = args.output; "Placement report written");

    if let Some(svg_path) = &args.svg {
        SvgExporter::new().write(&components, Path::new(svg_path))?;
    }

    Ok(())
}
