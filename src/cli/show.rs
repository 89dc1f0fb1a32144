//! Show command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::build::Pipeline;
use crate::case::{contradiction_rule, format_case, CASE_MASK};
use crate::config::compile_options;
use crate::emit::render_expr;
use crate::expand::extract_quadrant;
use crate::table::PixelTable;

use super::{load_project, read_rules, report, zoom_arg, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Parse a case given as decimal, `0x` hex or `0b` binary.
fn parse_case(text: &str) -> Option<u16> {
    let text = text.trim();
    let value = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u16::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        u16::from_str_radix(bin, 2).ok()?
    } else {
        text.parse().ok()?
    };
    (value <= CASE_MASK).then_some(value)
}

/// Execute the show command
pub fn run_show(
    rules: &Path,
    zoom: u8,
    case: &str,
    config: Option<&Path>,
    lite: bool,
    quadrant: bool,
    json: bool,
) -> ExitCode {
    let Some(case) = parse_case(case) else {
        eprintln!("Error: invalid case '{}'; expected a value in 0..{}", case, CASE_MASK);
        return ExitCode::from(EXIT_INVALID_ARGS);
    };
    let zoom = match zoom_arg(zoom) {
        Ok(z) => z,
        Err(code) => return code,
    };
    let project = match load_project(config) {
        Ok(p) => p,
        Err(code) => return code,
    };
    let mut options = match compile_options(&project.config, zoom, None) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };
    options.lite = lite.then(|| project.config.lite_biases(zoom.size(), zoom.size()));
    let packing = options.packing;

    let source = match read_rules(rules) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let tables = match Pipeline::new(options).tables(&source, zoom) {
        Ok(t) => t,
        Err(e) => return report(rules, &e),
    };

    let table: PixelTable = if quadrant {
        match extract_quadrant(&tables.table) {
            Ok(t) => t,
            Err(e) => return report(rules, &e.into()),
        }
    } else if let Some(lite_table) = tables.lite {
        lite_table
    } else {
        tables.table
    };

    let variant = if quadrant {
        "quadrant"
    } else if lite {
        "lite"
    } else {
        "full"
    };
    let (width, height) = table.stored_dims();
    let contradiction = contradiction_rule(case).map(|rule| rule.name);
    let entry = table.case(case);

    if json {
        let sub_pixels: Vec<_> = entry
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(index, weights)| {
                let (x, y) = table.position(index);
                serde_json::json!({
                    "index": index,
                    "x": x,
                    "y": y,
                    "weights": weights.0,
                    "expr": render_expr(weights, &packing),
                })
            })
            .collect();
        let output = serde_json::json!({
            "case": case,
            "bits": format_case(case),
            "zoom": zoom.factor(),
            "variant": variant,
            "width": width,
            "height": height,
            "contradiction": contradiction,
            "unreachable": entry.is_none(),
            "sub_pixels": sub_pixels,
        });
        println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
        return ExitCode::from(EXIT_SUCCESS);
    }

    println!("Case {} ({}), zoom {}, {} {}x{}", case, format_case(case), zoom, variant, width, height);
    if let Some(name) = contradiction {
        println!("  Contradiction: {}", name);
    }
    match entry {
        Some(weights) => {
            for (index, w) in weights.iter().enumerate() {
                println!("  pixel{:<2} {}  = {}", index, w, render_expr(w, &packing));
            }
        }
        None => println!("  unreachable"),
    }
    ExitCode::from(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_radixes() {
        assert_eq!(parse_case("18"), Some(18));
        assert_eq!(parse_case("0x12"), Some(18));
        assert_eq!(parse_case("0b10010"), Some(18));
        assert_eq!(parse_case("4095"), Some(4095));
    }

    #[test]
    fn test_parse_case_rejects_out_of_range() {
        assert_eq!(parse_case("4096"), None);
        assert_eq!(parse_case("0x1000"), None);
        assert_eq!(parse_case("c5"), None);
    }
}
