//! Build target definitions.
//!
//! A target is one rule source compiled at one zoom factor with its own
//! options. Targets are independent of each other.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use crate::error::{CompileError, OutputError};
use crate::table::Zoom;

use super::pipeline::{CompileOptions, Pipeline};
use super::result::{Artifacts, TargetResult};

/// A single compile unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Unique target identifier (e.g., "3x:rules/hq3x.rules")
    pub id: String,
    pub zoom: Zoom,
    /// Path of the rule source
    pub rules: PathBuf,
    pub options: CompileOptions,
}

impl BuildTarget {
    pub fn new(zoom: Zoom, rules: PathBuf, options: CompileOptions) -> Self {
        let id = match options.narrow {
            Some(axis) => format!("{}-{}:{}", zoom, axis, rules.display()),
            None => format!("{}:{}", zoom, rules.display()),
        };
        Self { id, zoom, rules, options }
    }

    /// Read the rule source and compile it.
    pub fn compile(&self) -> Result<Artifacts, CompileError> {
        let source = fs::read_to_string(&self.rules)
            .map_err(|source| OutputError::Read { path: self.rules.clone(), source })?;
        Pipeline::new(self.options.clone()).compile(&source, self.zoom)
    }

    /// Compile, recording the outcome and timing.
    pub(crate) fn run(&self) -> (TargetResult, Option<Artifacts>) {
        let start = Instant::now();
        log::info!("building {}", self.id);
        match self.compile() {
            Ok(artifacts) => {
                (TargetResult::success(self.id.clone(), vec![], start.elapsed()), Some(artifacts))
            }
            Err(e) => {
                let result = TargetResult::failed(
                    self.id.clone(),
                    e.to_string(),
                    e.exit_code(),
                    start.elapsed(),
                );
                (result, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variants::Axis;
    use tempfile::TempDir;

    #[test]
    fn test_target_id() {
        let target = BuildTarget::new(Zoom::X3, "rules/hq3x.rules".into(), CompileOptions::default());
        assert_eq!(target.id, "3x:rules/hq3x.rules");
        let narrow = CompileOptions { narrow: Some(Axis::Horizontal), ..Default::default() };
        let target = BuildTarget::new(Zoom::X4, "r".into(), narrow);
        assert_eq!(target.id, "4x-horizontal:r");
    }

    #[test]
    fn test_missing_rules_is_io_error() {
        let dir = TempDir::new().unwrap();
        let target =
            BuildTarget::new(Zoom::X2, dir.path().join("missing.rules"), CompileOptions::default());
        let (result, artifacts) = target.run();
        assert!(artifacts.is_none());
        assert_eq!(result.exit_code, crate::error::EXIT_IO);
    }

    #[test]
    fn test_compile_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hq2x.rules");
        fs::write(&path, "case 0\npixel0 = c5;\n").unwrap();
        let target = BuildTarget::new(Zoom::X2, path, CompileOptions::default());
        let artifacts = target.compile().unwrap();
        assert_eq!(artifacts.stem(), "hq2x2");
    }
}
