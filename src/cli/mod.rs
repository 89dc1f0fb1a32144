//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod build;
mod check;
mod compile;
mod show;
mod verify;

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, LoadedConfig};
use crate::emit::Dialect;
use crate::error::{CompileError, OutputError};
use crate::table::Zoom;
use crate::variants::Axis;

pub(crate) use crate::error::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_IO, EXIT_SUCCESS};

/// hqxc - Compile HQx pixel interpolation rules into lookup tables and code
#[derive(Parser)]
#[command(name = "hqxc")]
#[command(about = "Compile HQx pixel interpolation rules into dispatch code and binary tables")]
#[command(version)]
pub struct Cli {
    /// Increase log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile one rule source into source and binary tables
    Compile {
        /// Rule source for a single zoom factor
        rules: PathBuf,

        /// Zoom factor of the rule source (2, 3 or 4)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(2..=4))]
        zoom: u8,

        /// Output directory (default: [output].dir from hqxc.toml, or "gen")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to hqxc.toml (default: search upwards from the working directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Language of the generated source
        #[arg(long, value_enum)]
        dialect: Option<Dialect>,

        /// Also emit the lite offsets table
        #[arg(long)]
        lite: bool,

        /// Halve the expanded table along an axis (even zoom factors)
        #[arg(long, value_enum)]
        narrow: Option<Axis>,

        /// Fold contradiction cases into the unreachable fallback
        #[arg(long)]
        prune_contradictions: bool,

        /// Compile and list artifacts without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Compile every [[target]] of hqxc.toml in parallel
    Build {
        /// Path to hqxc.toml (default: search upwards from the working directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory override
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of parallel jobs (default: available cores)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Compile all targets without writing output
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse and validate a rule source without emitting anything
    Check {
        /// Rule source for a single zoom factor
        rules: PathBuf,

        /// Zoom factor of the rule source (2, 3 or 4)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(2..=4))]
        zoom: u8,
    },

    /// Show the compiled blends of one case
    Show {
        /// Rule source for a single zoom factor
        rules: PathBuf,

        /// Zoom factor of the rule source (2, 3 or 4)
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(2..=4))]
        zoom: u8,

        /// Case to show: decimal, 0x hex or 0b binary
        #[arg(short, long)]
        case: String,

        /// Path to hqxc.toml (default: search upwards from the working directory)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Show the lite variant
        #[arg(long)]
        lite: bool,

        /// Show only the authored top-left quadrant
        #[arg(long, conflicts_with = "lite")]
        quadrant: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check written artifacts against their manifest
    Verify {
        /// Output directory (default: [output].dir from hqxc.toml, or "gen")
        dir: Option<PathBuf>,

        /// Path to hqxc.toml (default: search upwards from the working directory)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI
pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Commands::Compile {
            rules,
            zoom,
            output,
            config,
            dialect,
            lite,
            narrow,
            prune_contradictions,
            dry_run,
        } => compile::run_compile(
            &rules,
            zoom,
            output.as_deref(),
            config.as_deref(),
            dialect,
            lite,
            narrow,
            prune_contradictions,
            dry_run,
        ),
        Commands::Build { config, output, jobs, dry_run } => {
            build::run_build(config.as_deref(), output.as_deref(), jobs, dry_run)
        }
        Commands::Check { rules, zoom } => check::run_check(&rules, zoom),
        Commands::Show { rules, zoom, case, config, lite, quadrant, json } => {
            show::run_show(&rules, zoom, &case, config.as_deref(), lite, quadrant, json)
        }
        Commands::Verify { dir, config } => verify::run_verify(dir.as_deref(), config.as_deref()),
    }
}

/// Load the configuration, printing the error on failure.
fn load_project(config: Option<&Path>) -> Result<LoadedConfig, ExitCode> {
    load_config(config).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(e.exit_code())
    })
}

/// Read a rule source, printing the error on failure.
fn read_rules(path: &Path) -> Result<String, ExitCode> {
    std::fs::read_to_string(path).map_err(|source| {
        let err = OutputError::Read { path: path.to_path_buf(), source };
        eprintln!("Error: {}", err);
        ExitCode::from(EXIT_IO)
    })
}

/// Validate a zoom factor accepted by clap.
fn zoom_arg(zoom: u8) -> Result<Zoom, ExitCode> {
    Zoom::new(zoom).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(e.exit_code())
    })
}

/// Print a compile error with its rule-file context.
fn report(rules: &Path, err: &CompileError) -> ExitCode {
    eprintln!("Error: {}: {}", rules.display(), err);
    ExitCode::from(err.exit_code())
}
