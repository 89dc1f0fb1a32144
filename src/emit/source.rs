//! Source emitter
//!
//! Cases with identical weight sequences share one dispatch arm. Sub-pixels
//! whose blend is the same for every reachable case are assigned once before
//! the dispatch instead of inside every arm.

use std::collections::HashMap;

use crate::error::StructuralError;
use crate::parser::NEIGHBOUR_NAMES;
use crate::table::PixelTable;
use crate::weights::Weights;

use super::{require_full, ColorPacking, Dialect};

/// Largest weight sum rendered as a plain weighted average.
const DIRECT_SUM_LIMIT: u32 = 8;

/// Generate the dispatch source for a full table.
///
/// # Arguments
///
/// * `table` - A full-layout table
/// * `dialect` - Target language
/// * `packing` - Channel masks for blends with large weight sums
///
/// # Returns
///
/// The source text, ending in a newline.
pub fn emit_source(
    table: &PixelTable,
    dialect: Dialect,
    packing: &ColorPacking,
) -> Result<String, StructuralError> {
    require_full(table)?;
    packing.validate()?;

    let present: Vec<(u16, &[Weights])> =
        table.iter().filter_map(|(case, e)| e.map(|e| (case, e))).collect();
    let sub_pixels = table.sub_pixels();

    let hoisted: Vec<bool> = (0..sub_pixels)
        .map(|sp| match present.first() {
            Some((_, first)) => present.iter().all(|(_, e)| e[sp] == first[sp]),
            None => false,
        })
        .collect();

    // groups in order of their smallest member
    let mut index: HashMap<&[Weights], usize> = HashMap::new();
    let mut groups: Vec<(Vec<u16>, &[Weights])> = Vec::new();
    for &(case, entry) in &present {
        match index.get(entry) {
            Some(&g) => groups[g].0.push(case),
            None => {
                index.insert(entry, groups.len());
                groups.push((vec![case], entry));
            }
        }
    }

    let mut out = String::new();
    let banner = format!(
        "Generated by hqxc for a {}x{} sub-pixel grid. Do not edit.",
        table.width(),
        table.height()
    );
    match dialect {
        Dialect::C => out.push_str(&format!("/* {} */\n", banner)),
        Dialect::Rust => out.push_str(&format!("// {}\n", banner)),
    }

    if let Some((_, first)) = present.first() {
        for sp in (0..sub_pixels).filter(|&sp| hoisted[sp]) {
            out.push_str(&format!("pixel{} = {};\n", sp, render_expr(&first[sp], packing)));
        }
    }

    if hoisted.iter().all(|&h| h) && !hoisted.is_empty() {
        log::debug!("every sub-pixel is case invariant; no dispatch emitted");
        return Ok(out);
    }

    let arm_body = |entry: &[Weights], indent: &str| {
        let mut body = String::new();
        for sp in (0..sub_pixels).filter(|&sp| !hoisted[sp]) {
            body.push_str(&format!(
                "{}pixel{} = {};\n",
                indent,
                sp,
                render_expr(&entry[sp], packing)
            ));
        }
        body
    };

    match dialect {
        Dialect::C => {
            out.push_str("switch (pattern) {\n");
            for (members, entry) in &groups {
                for case in members {
                    out.push_str(&format!("case {}:\n", case));
                }
                out.push_str(&arm_body(entry, "    "));
                out.push_str("    break;\n");
            }
            out.push_str("default:\n    UNREACHABLE;\n}\n");
        }
        Dialect::Rust => {
            out.push_str("match pattern {\n");
            for (members, entry) in &groups {
                let pattern: Vec<String> = members.iter().map(u16::to_string).collect();
                out.push_str(&format!("    {} => {{\n", pattern.join(" | ")));
                out.push_str(&arm_body(entry, "        "));
                out.push_str("    }\n");
            }
            out.push_str("    _ => unreachable!(),\n}\n");
        }
    }

    log::debug!(
        "emitted {} source: {} arms, {} hoisted sub-pixels",
        dialect.extension(),
        groups.len(),
        hoisted.iter().filter(|&&h| h).count()
    );
    Ok(out)
}

/// Render one weight vector as a blend expression over `c1..c9`.
pub fn render_expr(weights: &Weights, packing: &ColorPacking) -> String {
    let terms: Vec<(usize, u32)> = weights.nonzero().collect();
    let sum = weights.sum();
    if let [(n, _)] = terms.as_slice() {
        return NEIGHBOUR_NAMES[*n].to_string();
    }

    if sum <= DIRECT_SUM_LIMIT {
        let parts: Vec<String> = terms
            .iter()
            .map(|&(n, f)| weighted(NEIGHBOUR_NAMES[n].to_string(), f))
            .collect();
        return format!("(({}) / {})", parts.join(" + "), sum);
    }

    let group = |mask: u32| {
        let parts: Vec<String> = terms
            .iter()
            .map(|&(n, f)| weighted(format!("({} & {:#010X})", NEIGHBOUR_NAMES[n], mask), f))
            .collect();
        format!("((({}) / {}) & {:#010X})", parts.join(" + "), sum, mask)
    };
    format!("({} | {})", group(packing.group_a), group(packing.group_b))
}

fn weighted(operand: String, factor: u32) -> String {
    if factor == 1 {
        operand
    } else {
        format!("{} * {}", operand, factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Layout;

    fn packing() -> ColorPacking {
        ColorPacking::default()
    }

    #[test]
    fn test_render_single_neighbour() {
        assert_eq!(render_expr(&Weights::CENTER_ONLY, &packing()), "c5");
        assert_eq!(render_expr(&Weights::single(8), &packing()), "c9");
    }

    #[test]
    fn test_render_small_sum() {
        let w = Weights([1, 0, 0, 0, 3, 0, 0, 0, 0]);
        assert_eq!(render_expr(&w, &packing()), "((c1 + c5 * 3) / 4)");
        let w = Weights([0, 1, 0, 1, 6, 0, 0, 0, 0]);
        assert_eq!(render_expr(&w, &packing()), "((c2 + c4 + c5 * 6) / 8)");
    }

    #[test]
    fn test_render_large_sum_uses_packing() {
        let w = Weights([0, 0, 0, 1, 15, 0, 0, 0, 0]);
        assert_eq!(
            render_expr(&w, &packing()),
            "(((((c4 & 0x00FF00FF) + (c5 & 0x00FF00FF) * 15) / 16) & 0x00FF00FF) | \
             ((((c4 & 0x0000FF00) + (c5 & 0x0000FF00) * 15) / 16) & 0x0000FF00))"
        );
    }

    #[test]
    fn test_fully_hoisted_has_no_dispatch() {
        let table = PixelTable::from_fn(2, 2, |_, _| Weights::CENTER_ONLY);
        let src = emit_source(&table, Dialect::C, &packing()).unwrap();
        assert!(!src.contains("switch"));
        assert_eq!(src.matches("= c5;").count(), 4);
    }

    #[test]
    fn test_groups_and_hoisting() {
        let table = PixelTable::from_fn(2, 1, |case, sp| match (sp, case % 3) {
            (0, _) => Weights::CENTER_ONLY,
            (_, 0) => Weights::single(5),
            _ => Weights([0, 0, 0, 0, 1, 1, 0, 0, 0]),
        });
        let src = emit_source(&table, Dialect::C, &packing()).unwrap();
        assert!(src.contains("pixel0 = c5;\nswitch (pattern) {\ncase 0:\ncase 3:\n"));
        assert_eq!(src.matches("    break;\n").count(), 2);
        assert!(src.ends_with("default:\n    UNREACHABLE;\n}\n"));
        // first arm is case 0's group, second starts at case 1
        let first = src.find("case 0:").unwrap();
        let second = src.find("case 1:").unwrap();
        assert!(first < second);
        assert!(src[second..].starts_with("case 1:\ncase 2:\ncase 4:"));
    }

    #[test]
    fn test_rust_dialect() {
        let cases = (0..4096u16)
            .map(|c| match c {
                0 => Some(vec![Weights::single(1)]),
                1 => None,
                _ => Some(vec![Weights::CENTER_ONLY]),
            })
            .collect();
        let table = PixelTable::new(1, 1, Layout::Full, cases);
        let src = emit_source(&table, Dialect::Rust, &packing()).unwrap();
        assert!(src.starts_with("// Generated by hqxc"));
        assert!(src.contains("match pattern {\n    0 => {\n        pixel0 = c2;\n    }\n"));
        assert!(src.contains("    2 | 3 | 4 |"));
        assert!(!src.contains(" 1 |"));
        assert!(src.ends_with("    _ => unreachable!(),\n}\n"));
    }

    #[test]
    fn test_rejects_quadrant_table() {
        let cases = vec![Some(vec![Weights::CENTER_ONLY]); 4096];
        let table = PixelTable::new(2, 2, Layout::Quadrant, cases);
        assert!(emit_source(&table, Dialect::C, &packing()).is_err());
    }
}
