//! Verify command implementation

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::ExitCode;

use crate::build::{Manifest, MANIFEST_FILENAME};
use crate::config::resolve_path;
use crate::error::OutputError;

use super::{load_project, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS};

/// Execute the verify command
pub fn run_verify(dir: Option<&Path>, config: Option<&Path>) -> ExitCode {
    let out_dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => match load_project(config) {
            Ok(project) => resolve_path(&project.root, &project.config.output.dir),
            Err(code) => return code,
        },
    };

    let manifest = match Manifest::load(&out_dir.join(MANIFEST_FILENAME)) {
        Ok(Some(m)) => m,
        Ok(None) => {
            eprintln!("Error: no {} in {}", MANIFEST_FILENAME, out_dir.display());
            return ExitCode::from(EXIT_IO);
        }
        Err(e @ OutputError::Manifest(_)) => {
            eprintln!("Error: {}: {}", MANIFEST_FILENAME, e);
            return ExitCode::from(EXIT_ERROR);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_IO);
        }
    };

    let mut failed = 0;
    for name in manifest.artifacts.keys() {
        let path = out_dir.join(name);
        let status = match fs::read(&path) {
            Ok(bytes) if manifest.verify(name, &bytes) => "ok",
            Ok(_) => "changed",
            Err(e) if e.kind() == ErrorKind::NotFound => "missing",
            Err(source) => {
                eprintln!("Error: {}", OutputError::Read { path, source });
                return ExitCode::from(EXIT_IO);
            }
        };
        if status != "ok" {
            failed += 1;
        }
        println!("  {} ... {}", name, status);
    }

    let total = manifest.artifacts.len();
    if failed > 0 {
        eprintln!("Verification failed: {} of {} artifacts missing or changed", failed, total);
        return ExitCode::from(EXIT_ERROR);
    }
    println!("{} artifacts match {}", total, MANIFEST_FILENAME);
    ExitCode::from(EXIT_SUCCESS)
}
