//! Build result types.
//!
//! Contains the in-memory artifacts of a compile and the outcome of each
//! build target.

use std::path::PathBuf;
use std::time::Duration;


/// One generated file, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File name relative to the output directory
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { name: name.into(), bytes: bytes.into() }
    }
}

/// The artifacts of one compiled zoom factor, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    stem: String,
    files: Vec<Artifact>,
}

impl Artifacts {
    pub fn new(stem: String, files: Vec<Artifact>) -> Self {
        Self { stem, files }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn get(&self, name: &str) -> Option<&Artifact> {
        self.files.iter().find(|a| a.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Artifact> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all artifacts in bytes.
    pub fn total_size(&self) -> usize {
        self.files.iter().map(|a| a.bytes.len()).sum()
    }

    pub fn into_files(self) -> Vec<Artifact> {
        self.files
    }
}

/// Status of a single build target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// Build succeeded
    Success,
    /// Build failed with error
    Failed(String),
}

impl BuildStatus {
    /// Check if the status indicates failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, BuildStatus::Failed(_))
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStatus::Success => write!(f, "success"),
            BuildStatus::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// Result of building a single target.
#[derive(Debug, Clone)]
pub struct TargetResult {
    /// Target ID that was built, e.g. `hq3x:rules/hq3x.rules`
    pub target_id: String,
    /// Build status
    pub status: BuildStatus,
    /// Output files produced
    pub outputs: Vec<PathBuf>,
    /// Build duration
    pub duration: Duration,
    /// Process exit code for failures
    pub exit_code: u8,
}

impl TargetResult {
    /// Create a successful result.
    pub fn success(target_id: String, outputs: Vec<PathBuf>, duration: Duration) -> Self {
        Self { target_id, status: BuildStatus::Success, outputs, duration, exit_code: 0 }
    }

    /// Create a failed result.
    pub fn failed(target_id: String, error: String, exit_code: u8, duration: Duration) -> Self {
        Self { target_id, status: BuildStatus::Failed(error), outputs: vec![], duration, exit_code }
    }

    /// Check if this result is successful.
    pub fn is_success(&self) -> bool {
        !self.status.is_failure()
    }
}

/// Result of a complete build run.
#[derive(Debug, Default)]
pub struct BuildResult {
    /// Results for each target, in configuration order
    pub targets: Vec<TargetResult>,
    /// Total build duration
    pub total_duration: Duration,
}

impl BuildResult {
    /// Create a new empty build result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target result.
    pub fn add_result(&mut self, result: TargetResult) {
        self.targets.push(result);
    }

    /// Check if all targets succeeded.
    pub fn is_success(&self) -> bool {
        self.targets.iter().all(|t| t.is_success())
    }

    /// Number of failed targets.
    pub fn failed_count(&self) -> usize {
        self.targets.iter().filter(|t| t.status.is_failure()).count()
    }

    /// The exit code of the first failed target, or success.
    pub fn exit_code(&self) -> u8 {
        self.targets.iter().find(|t| t.status.is_failure()).map_or(0, |t| t.exit_code)
    }
}
