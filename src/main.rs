//! hqxc - Command-line compiler for HQx pixel interpolation rules

use std::process::ExitCode;

use clap::Parser;
use hqxc::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();
    cli::run(cli)
}
