//! Configuration loading and discovery for `hqxc.toml`
//!
//! Provides functions to find, load, and merge configuration.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::schema::HqxcConfig;
use crate::build::{BuildTarget, CompileOptions};
use crate::case::CasePermutation;
use crate::emit::Dialect;
use crate::error::{EXIT_INVALID_ARGS, EXIT_IO};
use crate::table::Zoom;
use crate::variants::{narrowed_size, Axis};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "hqxc.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse hqxc.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

impl ConfigError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ConfigError::Io(_) => EXIT_IO,
            ConfigError::Parse(_) | ConfigError::Validation(_) => EXIT_INVALID_ARGS,
        }
    }
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override output directory
    pub out: Option<PathBuf>,
    /// Override source dialect
    pub dialect: Option<Dialect>,
    /// Force the lite variant on
    pub lite: Option<bool>,
    /// Fold contradiction cases into the fallback
    pub prune_contradictions: Option<bool>,
}

/// A loaded configuration and the directory its relative paths start from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: HqxcConfig,
    /// Directory of the config file, or the working directory without one
    pub root: PathBuf,
    /// The file the configuration came from, if any
    pub path: Option<PathBuf>,
}

/// Find hqxc.toml by walking up from the current working directory.
///
/// # Returns
/// - `Some(path)` if a hqxc.toml file is found
/// - `None` if no config file is found
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find hqxc.toml by walking up from a specific directory.
///
/// This is the internal implementation that allows specifying the start directory,
/// useful for testing.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Some(config_path);
        }

        // Move to parent directory
        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a hqxc.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns a default
/// configuration rooted at the working directory.
///
/// # Arguments
/// - `path` - Optional path to a hqxc.toml file
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            let config = load_config_file(&p)?;
            let root = project_root(&p).map(Path::to_path_buf).unwrap_or_default();
            log::debug!("loaded configuration from {}", p.display());
            Ok(LoadedConfig { config, root, path: Some(p) })
        }
        None => Ok(LoadedConfig {
            config: HqxcConfig::default(),
            root: env::current_dir()?,
            path: None,
        }),
    }
}

/// Load and validate configuration from a specific file path.
pub fn load_config_file(path: &Path) -> Result<HqxcConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: HqxcConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut HqxcConfig, overrides: &CliOverrides) {
    if let Some(ref out) = overrides.out {
        config.output.dir = out.clone();
    }
    if let Some(dialect) = overrides.dialect {
        config.output.dialect = dialect;
    }
    if let Some(lite) = overrides.lite {
        config.lite.enabled = lite;
    }
    if let Some(prune) = overrides.prune_contradictions {
        config.output.prune_contradictions = prune;
    }
}

/// Compile options for one zoom factor under this configuration.
pub fn compile_options(
    config: &HqxcConfig,
    zoom: Zoom,
    narrow: Option<Axis>,
) -> Result<CompileOptions, ConfigError> {
    let bit_order = CasePermutation::from_slice(&config.binary.bit_order)
        .map_err(|e| ConfigError::Validation(vec![format!("binary.bit_order: {}", e)]))?;
    let (width, height) = match narrow {
        Some(axis) => narrowed_size(zoom.size(), zoom.size(), axis),
        None => (zoom.size(), zoom.size()),
    };
    Ok(CompileOptions {
        dialect: config.output.dialect,
        packing: config.packing,
        coord_scale: config.binary.coord_scale,
        bit_order,
        prune_contradictions: config.output.prune_contradictions,
        lite: config.lite.enabled.then(|| config.lite_biases(width, height)),
        narrow,
    })
}

/// Build targets for every `[[target]]`, with rule paths resolved against `root`.
pub fn build_targets(config: &HqxcConfig, root: &Path) -> Result<Vec<BuildTarget>, ConfigError> {
    config
        .targets
        .iter()
        .map(|t| {
            let options = compile_options(config, t.zoom, t.narrow)?;
            Ok(BuildTarget::new(t.zoom, resolve_path(root, &t.rules), options))
        })
        .collect()
}

/// Get the project root directory from a config file path.
///
/// Returns the parent directory of the hqxc.toml file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
