//! Configuration schema types for `hqxc.toml`
//!
//! Defines the structure and validation rules for rule-compiler projects.
//!
//! ```toml
//! [output]
//! dir = "gen"
//! dialect = "rust"
//! prune_contradictions = false
//!
//! [packing]
//! group_a = 0x00FF00FF
//! group_b = 0x0000FF00
//!
//! [binary]
//! coord_scale = 64
//! bit_order = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]
//!
//! [lite]
//! enabled = true
//! bias = { "3x3" = ["none", "right", "none", "none", "none", "none", "none", "right", "none"] }
//!
//! [[target]]
//! zoom = 3
//! rules = "rules/hq3x.rules"
//!
//! [[target]]
//! zoom = 4
//! rules = "rules/hq4x.rules"
//! narrow = "horizontal"
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::case::{CasePermutation, EDGE_COUNT};
use crate::emit::{BinaryLayout, ColorPacking, Dialect};
use crate::table::Zoom;
use crate::variants::{Axis, Bias};

/// Output section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving generated artifacts
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    /// Language of generated source
    #[serde(default)]
    pub dialect: Dialect,
    /// Fold contradiction cases into the unreachable fallback
    #[serde(default)]
    pub prune_contradictions: bool,
}

fn default_dir() -> PathBuf {
    PathBuf::from("gen")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: default_dir(), dialect: Dialect::default(), prune_contradictions: false }
    }
}

/// Binary table section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryConfig {
    /// Texture coordinate scale, 1..=127
    #[serde(default = "default_coord_scale")]
    pub coord_scale: u8,
    /// Destination bit of each case bit in the consumer's order
    #[serde(default = "default_bit_order")]
    pub bit_order: Vec<u8>,
}

fn default_coord_scale() -> u8 {
    BinaryLayout::DEFAULT_COORD_SCALE
}

fn default_bit_order() -> Vec<u8> {
    (0..EDGE_COUNT as u8).collect()
}

impl Default for BinaryConfig {
    fn default() -> Self {
        Self { coord_scale: default_coord_scale(), bit_order: default_bit_order() }
    }
}

/// Lite variant section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteConfig {
    /// Emit lite offsets for every target
    #[serde(default)]
    pub enabled: bool,
    /// Per-sub-pixel biases keyed by the final grid ("3x3", or "2x4" once narrowed)
    #[serde(default)]
    pub bias: BTreeMap<String, Vec<Bias>>,
}

/// One `[[target]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub zoom: Zoom,
    /// Rule source, relative to the config file
    pub rules: PathBuf,
    /// Narrow the expanded table along this axis
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrow: Option<Axis>,
}

/// Complete `hqxc.toml` configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HqxcConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub packing: ColorPacking,
    #[serde(default)]
    pub binary: BinaryConfig,
    #[serde(default)]
    pub lite: LiteConfig,
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetConfig>,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "binary.coord_scale")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hqxc.toml: '{}' {}", self.field, self.message)
    }
}

impl HqxcConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut error = |field: String, message: &str| {
            errors.push(ConfigValidationError { field, message: message.to_string() });
        };

        if !(1..=127).contains(&self.binary.coord_scale) {
            error("binary.coord_scale".into(), "must be between 1 and 127");
        }
        if CasePermutation::from_slice(&self.binary.bit_order).is_err() {
            error("binary.bit_order".into(), "must list each of the bits 0..11 exactly once");
        }
        if let Err(e) = self.packing.validate() {
            error("packing".into(), &e.to_string());
        }

        for (key, biases) in &self.lite.bias {
            match parse_grid(key) {
                Some((w, h)) if biases.len() > w * h => {
                    error(format!("lite.bias.{}", key), "has more entries than the grid has sub-pixels")
                }
                Some(_) => {}
                None => error(
                    format!("lite.bias.{}", key),
                    "must be keyed by a grid size such as \"3x3\" or \"2x4\"",
                ),
            }
        }

        let mut seen = HashSet::new();
        for (i, target) in self.targets.iter().enumerate() {
            if target.rules.as_os_str().is_empty() {
                error(format!("target[{}].rules", i), "must be a non-empty path");
            }
            if target.narrow.is_some() && target.zoom.size() % 2 != 0 {
                error(format!("target[{}].narrow", i), "needs an even zoom factor");
            }
            if !seen.insert((target.zoom, target.narrow)) {
                error(format!("target[{}]", i), "duplicates the zoom and narrowing of an earlier target");
            }
        }

        errors
    }

    /// Lite biases configured for a `width x height` grid.
    pub fn lite_biases(&self, width: usize, height: usize) -> Vec<Bias> {
        self.lite.bias.get(&format!("{}x{}", width, height)).cloned().unwrap_or_default()
    }
}

/// Parse a `WxH` grid key; both sides are between 1 and 4.
fn parse_grid(key: &str) -> Option<(usize, usize)> {
    let (w, h) = key.split_once('x')?;
    let side = |s: &str| s.parse::<usize>().ok().filter(|n| (1..=Zoom::X4.size()).contains(n));
    Some((side(w)?, side(h)?))
}
