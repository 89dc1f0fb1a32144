//! Compile command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::build::{write_artifacts, Pipeline};
use crate::config::{compile_options, merge_cli_overrides, resolve_path, CliOverrides};
use crate::emit::Dialect;
use crate::variants::Axis;

use super::{load_project, read_rules, report, zoom_arg, EXIT_IO, EXIT_SUCCESS};

/// Execute the compile command
pub fn run_compile(
    rules: &Path,
    zoom: u8,
    output: Option<&Path>,
    config: Option<&Path>,
    dialect: Option<Dialect>,
    lite: bool,
    narrow: Option<Axis>,
    prune_contradictions: bool,
    dry_run: bool,
) -> ExitCode {
    let zoom = match zoom_arg(zoom) {
        Ok(z) => z,
        Err(code) => return code,
    };
    let mut project = match load_project(config) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let overrides = CliOverrides {
        out: output.map(|p| p.to_path_buf()),
        dialect,
        lite: lite.then_some(true),
        prune_contradictions: prune_contradictions.then_some(true),
    };
    merge_cli_overrides(&mut project.config, &overrides);

    let options = match compile_options(&project.config, zoom, narrow) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };
    let source = match read_rules(rules) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let artifacts = match Pipeline::new(options).compile(&source, zoom) {
        Ok(a) => a,
        Err(e) => return report(rules, &e),
    };

    // an -o path is taken as given; the config's directory is relative to the config
    let out_dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => resolve_path(&project.root, &project.config.output.dir),
    };

    if dry_run {
        println!("Dry run - would write to {}:", out_dir.display());
        for artifact in artifacts.iter() {
            println!("  {} ({} bytes)", artifact.name, artifact.bytes.len());
        }
        return ExitCode::from(EXIT_SUCCESS);
    }

    let count = artifacts.len();
    let total = artifacts.total_size();
    match write_artifacts(&out_dir, &artifacts.into_files()) {
        Ok(_) => {
            println!("Wrote {} artifacts ({} bytes) to {}", count, total, out_dir.display());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_IO)
        }
    }
}
