//! Atomic artifact output.
//!
//! Every artifact and the manifest are first staged as temporary files in the
//! destination directory. Only once all of them are written are they renamed
//! into place. A file about to be replaced is moved aside first; if a rename
//! fails, the new files are removed and the moved-aside ones restored, so a
//! failed run leaves the previous output as it was.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempPath};

use crate::error::OutputError;

use super::manifest::{Manifest, MANIFEST_FILENAME};
use super::result::Artifact;

/// A file moved into place, and the file it replaced.
struct Placed {
    target: PathBuf,
    previous: Option<TempPath>,
}

/// Write artifacts plus their manifest into `dir`.
///
/// # Returns
///
/// The paths written, manifest last.
pub fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<Vec<PathBuf>, OutputError> {
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| OutputError::Write { path, source }
    };

    fs::create_dir_all(dir).map_err(write_err(dir))?;

    let manifest = Artifact::new(MANIFEST_FILENAME, Manifest::from_artifacts(artifacts).to_json()?);
    let mut staged = Vec::with_capacity(artifacts.len() + 1);
    for artifact in artifacts.iter().chain(std::iter::once(&manifest)) {
        let target = dir.join(&artifact.name);
        let mut file = NamedTempFile::new_in(dir).map_err(write_err(&target))?;
        file.write_all(&artifact.bytes).map_err(write_err(&target))?;
        file.flush().map_err(write_err(&target))?;
        staged.push((file, target));
    }

    let mut placed: Vec<Placed> = Vec::with_capacity(staged.len());
    for (file, target) in staged {
        let previous = match move_aside(dir, &target) {
            Ok(previous) => previous,
            Err(source) => {
                roll_back(placed);
                return Err(OutputError::Write { path: target, source });
            }
        };
        if let Err(err) = file.persist(&target) {
            if let Some(previous) = previous {
                restore(previous, &target);
            }
            roll_back(placed);
            return Err(OutputError::Write { path: target, source: err.error });
        }
        log::debug!("wrote {}", target.display());
        placed.push(Placed { target, previous });
    }
    Ok(placed.into_iter().map(|p| p.target).collect())
}

/// Move an existing file at `target` to a temporary path in `dir`.
///
/// The returned path deletes the old file when dropped.
fn move_aside(dir: &Path, target: &Path) -> std::io::Result<Option<TempPath>> {
    if !target.is_file() {
        return Ok(None);
    }
    let backup = NamedTempFile::new_in(dir)?.into_temp_path();
    fs::rename(target, &backup)?;
    Ok(Some(backup))
}

fn restore(previous: TempPath, target: &Path) {
    if let Err(e) = previous.persist(target) {
        log::warn!("could not restore '{}': {}", target.display(), e.error);
    }
}

/// Undo placed files, newest first.
fn roll_back(placed: Vec<Placed>) {
    for p in placed.into_iter().rev() {
        if let Err(e) = fs::remove_file(&p.target) {
            log::warn!("could not remove '{}': {}", p.target.display(), e);
        }
        if let Some(previous) = p.previous {
            restore(previous, &p.target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_artifacts_and_manifest() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested").join("out");
        let files = vec![Artifact::new("hq2x2.c", "pixel0 = c5;\n"), Artifact::new("t.bin", vec![7u8; 3])];
        let written = write_artifacts(&out, &files).unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(fs::read(out.join("t.bin")).unwrap(), vec![7, 7, 7]);
        let manifest = Manifest::load(&out.join(MANIFEST_FILENAME)).unwrap().unwrap();
        assert!(manifest.verify("hq2x2.c", b"pixel0 = c5;\n"));

        // only the final files remain, no staging leftovers
        assert_eq!(fs::read_dir(&out).unwrap().count(), 3);
    }

    #[test]
    fn test_overwrites_previous_output() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path(), &[Artifact::new("a.bin", vec![1u8])]).unwrap();
        write_artifacts(dir.path(), &[Artifact::new("a.bin", vec![2u8])]).unwrap();
        assert_eq!(fs::read(dir.path().join("a.bin")).unwrap(), vec![2]);
    }

    #[test]
    fn test_failed_rename_removes_placed_files() {
        let dir = TempDir::new().unwrap();
        // a directory in the way of the second artifact makes its rename fail
        fs::create_dir(dir.path().join("b.bin")).unwrap();
        fs::write(dir.path().join("b.bin").join("keep"), "x").unwrap();
        let files = [Artifact::new("a.bin", vec![1u8]), Artifact::new("b.bin", vec![2u8])];

        let err = write_artifacts(dir.path(), &files).unwrap_err();
        assert!(matches!(err, OutputError::Write { .. }));
        assert!(!dir.path().join("a.bin").exists());
        assert!(!dir.path().join(MANIFEST_FILENAME).exists());
    }

    #[test]
    fn test_failed_rename_restores_previous_output() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path(), &[Artifact::new("a.bin", vec![1u8])]).unwrap();
        let manifest_before = fs::read(dir.path().join(MANIFEST_FILENAME)).unwrap();
        fs::create_dir(dir.path().join("b.bin")).unwrap();
        fs::write(dir.path().join("b.bin").join("keep"), "x").unwrap();

        let files = [Artifact::new("a.bin", vec![2u8]), Artifact::new("b.bin", vec![3u8])];
        assert!(write_artifacts(dir.path(), &files).is_err());

        assert_eq!(fs::read(dir.path().join("a.bin")).unwrap(), vec![1]);
        assert_eq!(fs::read(dir.path().join(MANIFEST_FILENAME)).unwrap(), manifest_before);
        // a.bin, the manifest and the directory; no staged or moved-aside files
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }
}
