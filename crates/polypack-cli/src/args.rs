//! Command-line argument definitions for the Polypack CLI.
//!
//! The [`Args`] structure is parsed from the command line using [`clap`].
//! Arguments select the component file to pack, where the placement report
//! and the optional SVG preview go, the configuration file and the logging
//! verbosity.

use clap::Parser;

/// Command-line arguments for the Polypack component packer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input TOML file listing the components
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output TOML placement report
    #[arg(short, long, default_value = "packed.toml")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Also render the packed components to this SVG file
    #[arg(long)]
    pub svg: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
