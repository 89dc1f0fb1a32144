//! Output backends
//!
//! - [`source`] - dispatch code over the case value, in C or Rust
//! - [`binary`] - fixed-size offset and weight records read as textures
//!
//! Both accept any full-layout table, canonical or derived.

pub mod binary;
pub mod source;

pub use binary::{emit_lite_offsets, emit_offsets, emit_weights, BinaryLayout};
pub use source::{emit_source, render_expr};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::StructuralError;
use crate::table::{Layout, PixelTable};

/// Language of the generated source artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// `switch` over the case value, for C and C-like shader languages
    #[default]
    C,
    /// `match` over the case value
    Rust,
}

impl Dialect {
    /// File extension of generated sources.
    pub fn extension(self) -> &'static str {
        match self {
            Dialect::C => "c",
            Dialect::Rust => "rs",
        }
    }
}

/// Channel masks for blends whose weight sum is too large for a packed pixel.
///
/// Each group is weighted and divided separately so that one channel cannot
/// carry into the next; the masked results are OR-ed back together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPacking {
    #[serde(default = "default_group_a")]
    pub group_a: u32,
    #[serde(default = "default_group_b")]
    pub group_b: u32,
}

fn default_group_a() -> u32 {
    0x00FF_00FF
}

fn default_group_b() -> u32 {
    0x0000_FF00
}

impl Default for ColorPacking {
    fn default() -> Self {
        Self { group_a: default_group_a(), group_b: default_group_b() }
    }
}

impl ColorPacking {
    /// Reject masks that are empty or overlap.
    pub fn validate(&self) -> Result<(), StructuralError> {
        let reason = if self.group_a == 0 || self.group_b == 0 {
            "a mask is empty"
        } else if self.group_a & self.group_b != 0 {
            "masks overlap"
        } else {
            return Ok(());
        };
        Err(StructuralError::ColorPacking { group_a: self.group_a, group_b: self.group_b, reason })
    }
}

fn require_full(table: &PixelTable) -> Result<(), StructuralError> {
    match table.layout() {
        Layout::Full => Ok(()),
        other => Err(StructuralError::LayoutMismatch {
            expected: Layout::Full.name(),
            found: other.name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packing_defaults() {
        let packing = ColorPacking::default();
        assert_eq!(packing.group_a, 0x00FF00FF);
        assert_eq!(packing.group_b, 0x0000FF00);
        assert!(packing.validate().is_ok());
    }

    #[test]
    fn test_packing_rejects_overlap() {
        let packing = ColorPacking { group_a: 0x00FF00FF, group_b: 0x0000FFFF };
        assert!(matches!(
            packing.validate(),
            Err(StructuralError::ColorPacking { reason: "masks overlap", .. })
        ));
        assert!(ColorPacking { group_a: 0, group_b: 1 }.validate().is_err());
    }

    #[test]
    fn test_dialect_serde() {
        let dialect: Dialect = serde_json::from_str("\"rust\"").unwrap();
        assert_eq!(dialect, Dialect::Rust);
        assert_eq!(Dialect::C.extension(), "c");
    }
}
