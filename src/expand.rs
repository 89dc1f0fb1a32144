//! Symmetry expansion of quadrant tables
//!
//! Rule sources only author the top-left quadrant of the sub-pixel grid. The
//! blend rules are symmetric under horizontal and vertical mirroring of both
//! the sub-pixel grid and the source neighbourhood, so the other three
//! quadrants follow: the sub-pixel at the mirrored position of case `c` uses
//! the quadrant rule of the mirrored case, with its weights moved to the
//! mirrored neighbours.

use crate::case::{Symmetry, CASE_COUNT};
use crate::error::StructuralError;
use crate::table::{Layout, PixelTable};
use crate::weights::Weights;

/// Mirror passes in application order: none, horizontal, vertical, both.
const PASSES: [(bool, bool); 4] = [(false, false), (true, false), (false, true), (true, true)];

/// Expand a quadrant table into a full table.
///
/// In odd grids the middle column and row map onto themselves under the
/// matching mirror; those positions are taken from the unmirrored pass only,
/// so every full-grid position is written exactly once.
pub fn expand(table: &PixelTable) -> Result<PixelTable, StructuralError> {
    if table.layout() != Layout::Quadrant {
        return Err(StructuralError::LayoutMismatch {
            expected: Layout::Quadrant.name(),
            found: table.layout().name(),
        });
    }

    let (w, h) = (table.width(), table.height());
    let (qw, qh) = table.stored_dims();
    let symmetries = PASSES.map(|(mh, mv)| (mh, mv, Symmetry::mirrored(mh, mv)));

    let mut cases = Vec::with_capacity(CASE_COUNT);
    for case in 0..CASE_COUNT as u16 {
        let mut full = vec![Weights::CENTER_ONLY; w * h];
        let mut complete = true;

        'passes: for (mh, mv, sym) in &symmetries {
            let Some(source) = table.case(sym.case_bits.apply(case)) else {
                complete = false;
                break 'passes;
            };
            for qy in 0..qh {
                let fy = if *mv { h - 1 - qy } else { qy };
                if *mv && fy == qy {
                    continue;
                }
                for qx in 0..qw {
                    let fx = if *mh { w - 1 - qx } else { qx };
                    if *mh && fx == qx {
                        continue;
                    }
                    full[fy * w + fx] = source[qy * qw + qx].permuted(&sym.neighbours);
                }
            }
        }

        cases.push(complete.then_some(full));
    }

    log::debug!("expanded {}x{} quadrant table to {} sub-pixels per case", qw, qh, w * h);
    Ok(PixelTable::new(w, h, Layout::Full, cases))
}

/// Re-derive the top-left quadrant table from a full table.
pub fn extract_quadrant(table: &PixelTable) -> Result<PixelTable, StructuralError> {
    if table.layout() != Layout::Full {
        return Err(StructuralError::LayoutMismatch {
            expected: Layout::Full.name(),
            found: table.layout().name(),
        });
    }
    let w = table.width();
    let (qw, qh) = (table.width().div_ceil(2), table.height().div_ceil(2));
    let cases = table
        .iter()
        .map(|(_, entry)| {
            entry.map(|e| {
                (0..qh).flat_map(|y| (0..qw).map(move |x| (x, y))).map(|(x, y)| e[y * w + x]).collect()
            })
        })
        .collect();
    Ok(PixelTable::new(table.width(), table.height(), Layout::Quadrant, cases))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_rules;
    use crate::table::Zoom;
    use crate::validate::validate;

    fn quadrant(source: &str, zoom: Zoom) -> PixelTable {
        validate(&parse_rules(source, zoom).unwrap()).unwrap()
    }

    #[test]
    fn test_expand_mirrors_uniform_case() {
        let table = quadrant("case 0\npixel0 = interpolate<3,1>(c5, c1);\n", Zoom::X2);
        let full = expand(&table).unwrap();
        let case0 = full.case(0).unwrap();
        assert_eq!(case0[0], Weights([1, 0, 0, 0, 3, 0, 0, 0, 0]));
        assert_eq!(case0[1], Weights([0, 0, 1, 0, 3, 0, 0, 0, 0]));
        assert_eq!(case0[2], Weights([0, 0, 0, 0, 3, 0, 1, 0, 0]));
        assert_eq!(case0[3], Weights([0, 0, 0, 0, 3, 0, 0, 0, 1]));
    }

    #[test]
    fn test_expand_uses_mirrored_case() {
        // an edge between c5 and c3 (bit 6) only
        let source = "case 64\npixel0 = interpolate<1,1>(c5, c2);\n";
        let full = expand(&quadrant(source, Zoom::X2)).unwrap();
        // mirrored horizontally, case 64 becomes the c5-c1 edge (bit 4)
        assert_eq!(full.case(16).unwrap()[1], Weights([0, 1, 0, 0, 1, 0, 0, 0, 0]));
        assert_eq!(full.case(16).unwrap()[0], Weights::CENTER_ONLY);
    }

    #[test]
    fn test_expand_odd_grid_writes_middle_once() {
        let source = "case 0\npixel0 = interpolate<3,1>(c5, c1);\npixel1 = interpolate<1,1>(c5, c2);\npixel3 = interpolate<1,1>(c5, c4);\n";
        let full = expand(&quadrant(source, Zoom::X3)).unwrap();
        let e = full.case(0).unwrap();
        assert_eq!(e.len(), 9);
        assert_eq!(e[1], Weights([0, 1, 0, 0, 1, 0, 0, 0, 0]));
        assert_eq!(e[3], Weights([0, 0, 0, 1, 1, 0, 0, 0, 0]));
        assert_eq!(e[4], Weights::CENTER_ONLY);
        assert_eq!(e[5], Weights([0, 0, 0, 0, 1, 1, 0, 0, 0]));
        assert_eq!(e[7], Weights([0, 0, 0, 0, 1, 0, 0, 1, 0]));
        assert_eq!(e[8], Weights([0, 0, 0, 0, 3, 0, 0, 0, 1]));
    }

    #[test]
    fn test_extract_quadrant_round_trip() {
        let source = "case 0..4095\nif (edge(c2, c6)) { pixel0 = c5; pixel1 = interpolate<1,1>(c5, c2); } else { pixel0 = interpolate<1,1>(c5, c1); pixel1 = c5; }\npixel4 = interpolate<3,1>(c5, c4);\n";
        let table = quadrant(source, Zoom::X4);
        let round = extract_quadrant(&expand(&table).unwrap()).unwrap();
        assert_eq!(round, table);
    }

    #[test]
    fn test_expand_rejects_full_table() {
        let table = PixelTable::from_fn(2, 2, |_, _| Weights::CENTER_ONLY);
        assert!(matches!(expand(&table), Err(StructuralError::LayoutMismatch { .. })));
        assert!(extract_quadrant(&table).is_ok());
    }

    #[test]
    fn test_expand_is_deterministic() {
        let table = quadrant("case 7\npixel0 = c2;\n", Zoom::X4);
        assert_eq!(expand(&table).unwrap(), expand(&table).unwrap());
    }
}
