//! Build command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::build::ParallelBuild;
use crate::config::{build_targets, merge_cli_overrides, resolve_path, CliOverrides};

use super::{load_project, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Run the build command
pub fn run_build(
    config: Option<&Path>,
    output: Option<&Path>,
    jobs: Option<usize>,
    dry_run: bool,
) -> ExitCode {
    let mut project = match load_project(config) {
        Ok(p) => p,
        Err(code) => return code,
    };
    match &project.path {
        Some(path) => log::info!("using config {}", path.display()),
        None => {
            eprintln!("Error: no hqxc.toml found; create one with [[target]] entries or pass --config");
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }

    let overrides = CliOverrides { out: output.map(|p| p.to_path_buf()), ..Default::default() };
    merge_cli_overrides(&mut project.config, &overrides);

    if project.config.targets.is_empty() {
        eprintln!("Error: hqxc.toml defines no [[target]] entries");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let targets = match build_targets(&project.config, &project.root) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };
    let out_dir = match output {
        Some(dir) => dir.to_path_buf(),
        None => resolve_path(&project.root, &project.config.output.dir),
    };

    let mut builder = ParallelBuild::new(out_dir.clone()).with_dry_run(dry_run);
    if let Some(jobs) = jobs {
        builder = builder.with_jobs(jobs);
    }

    if dry_run {
        println!("Dry run - compiling {} targets without writing", targets.len());
    } else {
        println!("Building {} targets into {}...", targets.len(), out_dir.display());
    }

    let result = match builder.run(&targets) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    for target in &result.targets {
        if target.is_success() {
            println!("  {} ... ok ({} files, {:?})", target.target_id, target.outputs.len(), target.duration);
        } else {
            eprintln!("  {} ... {}", target.target_id, target.status);
        }
    }

    if result.is_success() {
        println!("Build complete in {:?}", result.total_duration);
        ExitCode::from(EXIT_SUCCESS)
    } else {
        eprintln!(
            "Build failed: {} of {} targets failed; nothing was written",
            result.failed_count(),
            result.targets.len()
        );
        ExitCode::from(result.exit_code())
    }
}
