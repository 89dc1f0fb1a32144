//! Table variants
//!
//! Every transform here consumes a validated table and derives a new one; the
//! input is never modified, so several variants can come from one table.
//!
//! - [`lite`] - collapse each blend onto at most one neighbour besides the centre
//! - [`narrow`] - merge pairs of adjacent sub-pixels along an axis
//! - [`permute`] - reorder the case bits for a consumer

pub mod lite;
pub mod narrow;
pub mod permute;

pub use lite::{collapse_weights, lite, lite_weights, Bias, LitePreference};
pub use narrow::{narrow, narrowed_size};
pub use permute::permute_cases;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Axis of the sub-pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Along rows; changes the width
    Horizontal,
    /// Along columns; changes the height
    Vertical,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
