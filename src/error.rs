//! Error types for every stage of the rule compiler
//!
//! Each stage has its own error type; [`CompileError`] unifies them for the
//! pipeline and maps each class to a process exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::case::format_case;
use crate::weights::Weights;

/// A fatal syntax error in a rule source, with the offending line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}\n    {text}")]
pub struct ParseError {
    /// Line number (1-indexed)
    pub line: usize,
    /// The source line as written
    pub text: String,
    pub kind: ParseErrorKind,
}

/// What went wrong on a rule source line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unrecognized statement")]
    UnrecognizedStatement,
    #[error("case value {0} is out of range 0..4095")]
    CaseOutOfRange(u64),
    #[error("empty case range {start}..{end}")]
    EmptyCaseRange { start: u64, end: u64 },
    #[error("unknown neighbour reference '{0}' (expected c1..c9)")]
    UnknownNeighbour(String),
    #[error("pixel{slot} does not exist at zoom {zoom}")]
    SlotOutOfRange { slot: usize, zoom: u8 },
    #[error("pixel{slot} is the implicit centre at zoom 3 and cannot be assigned")]
    ImplicitCenter { slot: usize },
    #[error("edge({0}) is not a recognized edge; expected edge(c2, c6), edge(c6, c8), edge(c8, c4) or edge(c4, c2)")]
    UnknownEdge(String),
    #[error("interpolate has {factors} factors but {neighbours} neighbours")]
    ArityMismatch { factors: usize, neighbours: usize },
    #[error("interpolate needs 2 or 3 terms, found {0}")]
    TermCount(usize),
    #[error("interpolation factor must be a positive integer, found '{0}'")]
    InvalidFactor(String),
    #[error("interpolation factors add up to {total}; at most 255 allowed")]
    FactorTotal { total: u64 },
    #[error("malformed blend expression '{0}'")]
    MalformedExpression(String),
    #[error("{0} outside of a case group")]
    OutsideGroup(&'static str),
    #[error("'break' without an open case group")]
    StrayBreak,
    #[error("case selector inside a group body; close the group with 'break' first")]
    CaseInsideBody,
    #[error("unbalanced conditional: {0}")]
    UnbalancedConditional(&'static str),
    #[error("unbalanced braces: {0}")]
    UnbalancedBraces(&'static str),
    #[error("nested conditionals are not supported")]
    NestedConditional,
    #[error("conditional branch assigns no sub-pixel")]
    EmptyBranch,
    #[error("unexpected end of input inside a conditional")]
    UnexpectedEof,
}

impl ParseError {
    pub fn new(line: usize, text: impl Into<String>, kind: ParseErrorKind) -> Self {
        Self { line, text: text.into(), kind }
    }
}

/// Which table invariant a weight vector violates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantKind {
    #[error("weights sum to zero")]
    ZeroSum,
    #[error("weight sum overflows")]
    SumOverflow,
    #[error("weight sum {sum} is not a power of two")]
    NotPowerOfTwo { sum: u32 },
    #[error("{count} non-zero weights (at most 3 allowed)")]
    TooManyWeights { count: usize },
    #[error("three non-zero weights but the centre weight is zero")]
    ThirdWeightNotCenter,
    #[error("non-zero weight at c{} outside the sub-pixel's quadrant", .neighbour + 1)]
    OutOfQuadrant { neighbour: usize },
}

/// An authored rule breaks a table invariant. Always an authoring defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("case {case} ({bits}) pixel{sub_pixel} = {weights}: {kind}", bits = format_case(*case))]
pub struct InvariantError {
    pub case: u16,
    pub sub_pixel: usize,
    pub weights: Weights,
    pub kind: InvariantKind,
}

/// Internal-consistency failures in the expander, transformer or emitters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum StructuralError {
    #[error("case-bit permutation {bits:?} is not a bijection on bits 0..11")]
    InvalidBitPermutation { bits: Vec<u8> },
    #[error("case permutation is not bijective: case {case} maps onto the already used case {image}")]
    NotBijective { case: u16, image: u16 },
    #[error("cannot narrow a {axis} axis of length {length}; the length must be a multiple of 2")]
    NarrowingShape { axis: &'static str, length: usize },
    #[error("narrowing case {case} pixel{sub_pixel} yields {weights}: {kind}")]
    NarrowedBlend { case: u16, sub_pixel: usize, weights: Weights, kind: InvariantKind },
    #[error("expected a table with {expected} layout, found {found}")]
    LayoutMismatch { expected: &'static str, found: &'static str },
    #[error("lite preference covers a {expected} grid but the table is {found}")]
    PreferenceShape { expected: String, found: String },
    #[error("case {case} pixel{sub_pixel} = {weights} cannot be encoded: {reason}")]
    Unencodable { case: u16, sub_pixel: usize, weights: Weights, reason: &'static str },
    #[error("record layout expects {expected} sub-pixels per case, table has {found}")]
    RecordCount { expected: usize, found: usize },
    #[error("coordinate scale {0} is out of range 1..127")]
    CoordScale(u8),
    #[error("invalid color packing masks {group_a:#010x}/{group_b:#010x}: {reason}")]
    ColorPacking { group_a: u32, group_b: u32, reason: &'static str },
}

/// Failure while writing artifacts to disk.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OutputError {
    #[error("cannot read '{}': {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("cannot write '{}': {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },
    #[error("cannot serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Any error the compiler pipeline can produce.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError),
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantError),
    #[error("internal consistency error: {0}")]
    Structural(#[from] StructuralError),
    #[error("{0}")]
    Output(#[from] OutputError),
    #[error("unsupported zoom factor {0}; expected 2, 3 or 4")]
    UnsupportedZoom(u8),
}

/// Exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit code for rule, invariant and structural errors.
pub const EXIT_ERROR: u8 = 1;
/// Exit code for invalid arguments or configuration.
pub const EXIT_INVALID_ARGS: u8 = 2;
/// Exit code for I/O failures.
pub const EXIT_IO: u8 = 3;

impl CompileError {
    /// The process exit code this error should produce.
    pub fn exit_code(&self) -> u8 {
        match self {
            CompileError::Parse(_) | CompileError::Invariant(_) | CompileError::Structural(_) => {
                EXIT_ERROR
            }
            CompileError::Output(_) => EXIT_IO,
            CompileError::UnsupportedZoom(_) => EXIT_INVALID_ARGS,
        }
    }
}
