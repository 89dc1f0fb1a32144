//! Parallel build execution.
//!
//! Targets share nothing, so they compile concurrently on a rayon pool.
//! Output is only written once every target has compiled: a failing target
//! leaves the output directory untouched.
//!
//! # Example
//!
//! ```no_run
//! use hqxc::build::{BuildTarget, CompileOptions, ParallelBuild};
//! use hqxc::table::Zoom;
//!
//! let targets = vec![
//!     BuildTarget::new(Zoom::X2, "rules/hq2x.rules".into(), CompileOptions::default()),
//!     BuildTarget::new(Zoom::X4, "rules/hq4x.rules".into(), CompileOptions::default()),
//! ];
//! let result = ParallelBuild::new("gen".into()).with_jobs(2).run(&targets)?;
//! println!("Built {} targets in {:?}", result.targets.len(), result.total_duration);
//! # Ok::<(), hqxc::build::BuildError>(())
//! ```

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use crate::error::{OutputError, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_IO};

use super::result::{BuildResult, TargetResult};
use super::target::BuildTarget;
use super::writer::write_artifacts;

/// Errors of a whole build run, as opposed to a single target.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("cannot start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("artifact '{name}' is produced by more than one target")]
    DuplicateArtifact { name: String },
    #[error("{0}")]
    Output(#[from] OutputError),
}

impl BuildError {
    pub fn exit_code(&self) -> u8 {
        match self {
            BuildError::ThreadPool(_) => EXIT_ERROR,
            BuildError::DuplicateArtifact { .. } => EXIT_INVALID_ARGS,
            BuildError::Output(_) => EXIT_IO,
        }
    }
}

/// Default number of parallel jobs (uses available parallelism).
fn default_jobs() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Parallel build executor.
pub struct ParallelBuild {
    /// Directory receiving every artifact and the manifest
    out_dir: PathBuf,
    /// Number of parallel jobs
    jobs: usize,
    /// Compile without writing anything
    dry_run: bool,
}

impl ParallelBuild {
    /// Create a new parallel build.
    pub fn new(out_dir: PathBuf) -> Self {
        Self { out_dir, jobs: default_jobs(), dry_run: false }
    }

    /// Set the number of parallel jobs.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Compile only; skip writing output.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Compile every target, then write all artifacts together.
    ///
    /// Target failures are reported in the result; only problems with the
    /// run itself are returned as errors.
    pub fn run(&self, targets: &[BuildTarget]) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(self.jobs).build()?;
        log::info!("building {} targets with {} workers", targets.len(), self.jobs);

        // collect keeps configuration order regardless of completion order
        let outcomes: Vec<_> = pool.install(|| targets.par_iter().map(BuildTarget::run).collect());

        let mut result = BuildResult::new();
        let mut compiled = Vec::new();
        for (target_result, artifacts) in outcomes {
            compiled.push(artifacts);
            result.add_result(target_result);
        }

        if result.is_success() && !self.dry_run {
            let mut seen = HashSet::new();
            let mut files = Vec::new();
            let mut owners = Vec::new();
            for (idx, artifacts) in compiled.into_iter().enumerate() {
                for artifact in artifacts.into_iter().flat_map(|a| a.into_files()) {
                    if !seen.insert(artifact.name.clone()) {
                        return Err(BuildError::DuplicateArtifact { name: artifact.name });
                    }
                    owners.push(idx);
                    files.push(artifact);
                }
            }

            let written = write_artifacts(&self.out_dir, &files)?;
            // the manifest comes last and belongs to no target
            for (owner, path) in owners.into_iter().zip(written) {
                result.targets[owner].outputs.push(path);
            }
        }

        result.total_duration = start.elapsed();
        Ok(result)
    }
}
