//! Artifact manifest.
//!
//! Records the size and SHA-256 of every artifact written to an output
//! directory. Generated tables are committed build outputs, so the manifest
//! carries no timestamps: rebuilding the same rules reproduces it byte for
//! byte.
//!
//! # Manifest Format
//!
//! Stored as JSON in `hqxc-manifest.json` in the output directory:
//!
//! ```json
//! {
//!   "version": 1,
//!   "generator": "hqxc 0.1.0",
//!   "artifacts": {
//!     "hq2x2.c": { "size": 18211, "sha256": "3b1f..." },
//!     "hq2x2_offsets.bin": { "size": 65536, "sha256": "09ac..." }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::OutputError;

use super::result::Artifact;

/// Current manifest format version.
const MANIFEST_VERSION: u32 = 1;

/// Default manifest filename.
pub const MANIFEST_FILENAME: &str = "hqxc-manifest.json";

/// Size and checksum of one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub size: usize,
    pub sha256: String,
}

/// Manifest of every artifact in an output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest format version
    pub version: u32,
    /// Tool name and version that wrote the artifacts
    pub generator: String,
    /// Entries keyed by file name, sorted
    pub artifacts: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    /// Create a new empty manifest.
    pub fn new() -> Self {
        Self {
            version: MANIFEST_VERSION,
            generator: format!("hqxc {}", env!("CARGO_PKG_VERSION")),
            artifacts: BTreeMap::new(),
        }
    }

    /// Build a manifest describing `artifacts`.
    pub fn from_artifacts<'a>(artifacts: impl IntoIterator<Item = &'a Artifact>) -> Self {
        let mut manifest = Self::new();
        for artifact in artifacts {
            manifest.record(artifact);
        }
        manifest
    }

    /// Record one artifact, replacing any earlier entry of the same name.
    pub fn record(&mut self, artifact: &Artifact) {
        self.artifacts.insert(
            artifact.name.clone(),
            ManifestEntry { size: artifact.bytes.len(), sha256: sha256_hex(&artifact.bytes) },
        );
    }

    /// Load a manifest from a file.
    ///
    /// Returns `Ok(None)` if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Option<Self>, OutputError> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)
            .map_err(|source| OutputError::Read { path: path.to_path_buf(), source })?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Serialize to pretty JSON, ending in a newline.
    pub fn to_json(&self) -> Result<String, OutputError> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Check that a file's contents match its recorded entry.
    pub fn verify(&self, name: &str, bytes: &[u8]) -> bool {
        self.artifacts
            .get(name)
            .is_some_and(|e| e.size == bytes.len() && e.sha256 == sha256_hex(bytes))
    }
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
