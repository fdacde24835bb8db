//! Configuration file loading for the CLI
//!
//! This module finds and loads the TOML packing configuration from an
//! explicit path, the local directory or the platform config directory.

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use polypack::{PolypackError, config::PackingConfig};

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ConfigError> for PolypackError {
    fn from(err: ConfigError) -> Self {
        PolypackError::Config(err.to_string())
    }
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (polypack/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed
/// - Config values are out of range
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<PackingConfig, PolypackError> {
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    let local_config = Path::new("polypack/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    if let Some(proj_dirs) = ProjectDirs::from("com", "polypack", "polypack") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    debug!("No configuration file found, using default configuration");
    Ok(PackingConfig::default())
}

/// Load and validate configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<PackingConfig, PolypackError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()).into());
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Result<PackingConfig, PolypackError> {
    let config: PackingConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config
        .validate()
        .map_err(|e| ConfigError::Validation(e.to_string()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use polypack::polyomino::successor::TraversalStrategy;

    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [packing]
            spacing = 5.0
            aspect-ratio = 2.0
            traversal = "combine-jitter-manhattan"
            jitter-seed = 7

            [compaction]
            enabled = false
            "#,
        )
        .expect("valid config");

        assert_eq!(config.packing().spacing(), 5.0);
        assert_eq!(config.packing().aspect_ratio(), 2.0);
        assert_eq!(
            config.packing().traversal(),
            TraversalStrategy::CombineJitterManhattan
        );
        assert_eq!(config.packing().jitter_seed(), 7);
        assert!(!config.compaction().enabled());
    }

    #[test]
    fn test_empty_config_is_default() {
        let config = parse_config("").expect("empty config");
        assert_eq!(config, PackingConfig::default());
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = parse_config("[packing]\nspacing = -3.0\n").expect_err("negative spacing");
        assert!(matches!(err, PolypackError::Config(_)));
        assert!(err.to_string().contains("spacing"), "{err}");

        let err = parse_config("[packing]\ntraversal = \"zigzag\"\n").expect_err("unknown");
        assert!(matches!(err, PolypackError::Config(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = load_config(Some("definitely/not/here.toml")).expect_err("missing file");
        assert!(err.to_string().contains("Missing configuration file"), "{err}");
    }
}
