//! Check command implementation

use std::collections::HashSet;
use std::path::Path;
use std::process::ExitCode;

use crate::case::is_contradiction;
use crate::parser::parse_rules;
use crate::validate::validate;

use super::{read_rules, report, zoom_arg, EXIT_SUCCESS};

/// Execute the check command
pub fn run_check(rules: &Path, zoom: u8) -> ExitCode {
    let zoom = match zoom_arg(zoom) {
        Ok(z) => z,
        Err(code) => return code,
    };
    let source = match read_rules(rules) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let raw = match parse_rules(&source, zoom) {
        Ok(raw) => raw,
        Err(e) => return report(rules, &e.into()),
    };
    let assigned = raw.entries.iter().flatten().filter(|w| w.is_some()).count();
    let table = match validate(&raw) {
        Ok(t) => t,
        Err(e) => return report(rules, &e.into()),
    };

    let contradictions = table.iter().filter(|(case, _)| is_contradiction(*case)).count();
    let distinct: HashSet<_> = table.iter().filter_map(|(_, e)| e).collect();

    println!("{}: ok", rules.display());
    println!("  Zoom: {}", zoom);
    println!("  Layout: {}", table.layout().name());
    println!("  Assigned sub-pixels: {}", assigned);
    println!("  Contradiction cases: {}", contradictions);
    println!("  Distinct blend sequences: {}", distinct.len());
    ExitCode::from(EXIT_SUCCESS)
}
