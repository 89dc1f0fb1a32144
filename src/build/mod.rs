//! Build pipeline module for hqxc
//!
//! Turns rule sources into generated tables on disk.
//!
//! # Overview
//!
//! The build consists of:
//! - **Pipeline**: parse, validate, expand and transform one rule source, then
//!   emit its artifacts in memory
//! - **Targets**: one rule source at one zoom factor, compiled in parallel
//! - **Output**: all artifacts plus a checksum manifest, written atomically
//!
//! # Example
//!
//! ```no_run
//! use hqxc::build::{write_artifacts, Pipeline};
//! use hqxc::table::Zoom;
//!
//! let source = std::fs::read_to_string("rules/hq2x.rules")?;
//! let artifacts = Pipeline::default().compile(&source, Zoom::X2)?;
//! let files = artifacts.into_files();
//! write_artifacts("gen".as_ref(), &files)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod manifest;
pub mod parallel;
pub mod pipeline;
pub mod result;
pub mod target;
pub mod writer;

pub use manifest::*;
pub use parallel::*;
pub use pipeline::*;
pub use result::*;
pub use target::*;
pub use writer::*;
