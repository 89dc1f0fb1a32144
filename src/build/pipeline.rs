//! The compile pipeline for one zoom factor.
//!
//! ```text
//! rules ─ parse ─ validate ─ expand ─ [narrow] ─ [prune] ─┬─ emit source
//!                                                         ├─ permute ─ emit offsets/weights
//!                                                         └─ [lite] ─ permute ─ emit lite offsets
//! ```
//!
//! Every stage derives a new table; the validated table is never modified.

use crate::case::CasePermutation;
use crate::emit::{
    emit_lite_offsets, emit_offsets, emit_source, emit_weights, BinaryLayout, ColorPacking,
    Dialect,
};
use crate::error::CompileError;
use crate::expand::expand;
use crate::parser::parse_rules;
use crate::table::{Layout, PixelTable, Zoom};
use crate::validate::{prune_contradictions, validate};
use crate::variants::{lite, narrow, permute_cases, Axis, Bias, LitePreference};

use super::result::{Artifact, Artifacts};

/// Everything that shapes the output of a compile, besides the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Language of the generated source
    pub dialect: Dialect,
    /// Channel masks for large-sum blends in generated source
    pub packing: ColorPacking,
    /// Texture coordinate scale of binary records
    pub coord_scale: u8,
    /// Case-bit order expected by the binary consumer
    pub bit_order: CasePermutation,
    /// Emit contradiction cases as unreachable instead of centre-only
    pub prune_contradictions: bool,
    /// Per-sub-pixel biases of the lite variant; `None` skips the variant
    pub lite: Option<Vec<Bias>>,
    /// Narrow the table along this axis after expansion
    pub narrow: Option<Axis>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            packing: ColorPacking::default(),
            coord_scale: BinaryLayout::DEFAULT_COORD_SCALE,
            bit_order: CasePermutation::IDENTITY,
            prune_contradictions: false,
            lite: None,
            narrow: None,
        }
    }
}

/// The tables a compile produces before emission.
#[derive(Debug, Clone)]
pub struct Tables {
    /// The full table in canonical case-bit order
    pub table: PixelTable,
    /// The lite variant, if requested
    pub lite: Option<PixelTable>,
}

impl Tables {
    /// File stem of every artifact, e.g. `hq4x4` or `hq2x4` once narrowed.
    pub fn stem(&self) -> String {
        format!("hq{}x{}", self.table.width(), self.table.height())
    }
}

/// Compiles rule sources with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: CompileOptions,
}

impl Pipeline {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Run every stage up to, but not including, emission.
    pub fn tables(&self, source: &str, zoom: Zoom) -> Result<Tables, CompileError> {
        let raw = parse_rules(source, zoom)?;
        let validated = validate(&raw)?;
        let mut table = match validated.layout() {
            Layout::Quadrant => expand(&validated)?,
            Layout::Full => validated,
        };
        if let Some(axis) = self.options.narrow {
            table = narrow(&table, axis)?;
        }
        if self.options.prune_contradictions {
            table = prune_contradictions(&table);
        }
        let lite = match &self.options.lite {
            Some(biases) => {
                let pref = LitePreference::for_grid(table.width(), table.height(), biases);
                Some(lite(&table, &pref)?)
            }
            None => None,
        };
        Ok(Tables { table, lite })
    }

    /// Compile a rule source into in-memory artifacts.
    ///
    /// Artifacts come in a fixed order: source, offsets, weights, then the
    /// lite offsets when the lite variant is enabled.
    ///
    /// # Examples
    ///
    /// ```
    /// use hqxc::build::Pipeline;
    /// use hqxc::table::Zoom;
    ///
    /// let artifacts = Pipeline::default().compile("case 0\npixel0 = c5;\n", Zoom::X2).unwrap();
    /// let names: Vec<&str> = artifacts.iter().map(|a| a.name.as_str()).collect();
    /// assert_eq!(names, ["hq2x2.c", "hq2x2_offsets.bin", "hq2x2_weights.bin"]);
    /// ```
    pub fn compile(&self, source: &str, zoom: Zoom) -> Result<Artifacts, CompileError> {
        let tables = self.tables(source, zoom)?;
        self.emit(&tables)
    }

    /// Emit the artifacts of already-built tables.
    pub fn emit(&self, tables: &Tables) -> Result<Artifacts, CompileError> {
        let opts = &self.options;
        let stem = tables.stem();
        let mut files = Vec::new();

        let source = emit_source(&tables.table, opts.dialect, &opts.packing)?;
        files.push(Artifact::new(format!("{}.{}", stem, opts.dialect.extension()), source));

        let layout = BinaryLayout::for_table(&tables.table, opts.coord_scale)?;
        let ordered = permute_cases(&tables.table, &opts.bit_order)?;
        files.push(Artifact::new(format!("{}_offsets.bin", stem), emit_offsets(&ordered, &layout)?));
        files.push(Artifact::new(format!("{}_weights.bin", stem), emit_weights(&ordered, &layout)?));

        if let Some(lite) = &tables.lite {
            let ordered = permute_cases(lite, &opts.bit_order)?;
            files.push(Artifact::new(
                format!("{}lite_offsets.bin", stem),
                emit_lite_offsets(&ordered, &layout)?,
            ));
        }

        log::info!("compiled {} into {} artifacts", stem, files.len());
        Ok(Artifacts::new(stem, files))
    }
}
