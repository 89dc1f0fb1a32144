//! Axis narrowing
//!
//! Derives a half-width (or half-height) table by merging each pair of
//! adjacent sub-pixels along one axis. The pair is blended 2:1 with
//! [`Weights::blend`], the outer member of the pair counting double: the
//! first one in the left (top) half of the grid, the second one in the right
//! (bottom) half. A pair straddling the middle belongs to the left half.

use crate::error::StructuralError;
use crate::table::{Layout, PixelTable};
use crate::validate::check_counts;
use crate::weights::Weights;

use super::Axis;

/// Grid size after narrowing a `width x height` grid along `axis`.
pub fn narrowed_size(width: usize, height: usize, axis: Axis) -> (usize, usize) {
    match axis {
        Axis::Horizontal => (width / 2, height),
        Axis::Vertical => (width, height / 2),
    }
}

/// Narrow a full table along `axis`.
///
/// The axis length must be even. Every merged blend must still fit the
/// record format: at most three weights, the centre among them if three.
pub fn narrow(table: &PixelTable, axis: Axis) -> Result<PixelTable, StructuralError> {
    if table.layout() != Layout::Full {
        return Err(StructuralError::LayoutMismatch {
            expected: Layout::Full.name(),
            found: table.layout().name(),
        });
    }
    let (w, h) = (table.width(), table.height());
    let length = match axis {
        Axis::Horizontal => w,
        Axis::Vertical => h,
    };
    if length == 0 || length % 2 != 0 {
        return Err(StructuralError::NarrowingShape { axis: axis.name(), length });
    }

    let (nw, nh) = narrowed_size(w, h, axis);
    let cases = table
        .iter()
        .map(|(case, entry)| match entry {
            Some(e) => narrow_entry(case, e, w, nw, nh, axis).map(Some),
            None => Ok(None),
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("narrowed {}x{} table {} to {}x{}", w, h, axis, nw, nh);
    Ok(PixelTable::new(nw, nh, Layout::Full, cases))
}

fn narrow_entry(
    case: u16,
    entry: &[Weights],
    w: usize,
    nw: usize,
    nh: usize,
    axis: Axis,
) -> Result<Vec<Weights>, StructuralError> {
    let pairs = match axis {
        Axis::Horizontal => nw,
        Axis::Vertical => nh,
    };
    let at = |x: usize, y: usize| &entry[y * w + x];
    let mut out = Vec::with_capacity(nw * nh);
    for y in 0..nh {
        for x in 0..nw {
            let pair = match axis {
                Axis::Horizontal => x,
                Axis::Vertical => y,
            };
            let (first, second) = match axis {
                Axis::Horizontal => (at(2 * x, y), at(2 * x + 1, y)),
                Axis::Vertical => (at(x, 2 * y), at(x, 2 * y + 1)),
            };
            let weights = if pair < pairs.div_ceil(2) {
                Weights::blend(first, 2, second, 1)
            } else {
                Weights::blend(first, 1, second, 2)
            };
            check_counts(&weights).map_err(|kind| StructuralError::NarrowedBlend {
                case,
                sub_pixel: out.len(),
                weights,
                kind,
            })?;
            out.push(weights);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InvariantKind;
    use crate::weights::CENTER;

    /// Column x of every row draws from `columns[x]` and the centre.
    fn columns_table(columns: &[usize], height: usize) -> PixelTable {
        let width = columns.len();
        PixelTable::from_fn(width, height, |_, sp| {
            let mut w = Weights::CENTER_ONLY;
            w.0[columns[sp % width]] += 1;
            w
        })
    }

    #[test]
    fn test_narrowed_size() {
        assert_eq!(narrowed_size(4, 4, Axis::Horizontal), (2, 4));
        assert_eq!(narrowed_size(4, 4, Axis::Vertical), (4, 2));
        assert_eq!(narrowed_size(2, 2, Axis::Horizontal), (1, 2));
    }

    #[test]
    fn test_narrow_four_wide_keeps_outer_weight() {
        // c4, c1 on the left and c3, c6 on the right
        let table = columns_table(&[3, 0, 2, 5], 4);
        let narrowed = narrow(&table, Axis::Horizontal).unwrap();
        assert_eq!((narrowed.width(), narrowed.height()), (2, 4));
        let e = narrowed.case(0).unwrap();
        // 2 * (c4 + c5)/2 + 1 * (c1 + c5)/2, scaled to (4,4) + (2,2)
        assert_eq!(e[0], Weights([1, 0, 0, 2, 3, 0, 0, 0, 0]));
        // the outer c6 column counts double on the right
        assert_eq!(e[1], Weights([0, 0, 1, 0, 3, 2, 0, 0, 0]));
        assert_eq!(e[2], e[0]);
    }

    #[test]
    fn test_narrow_vertical_even_grid() {
        let table = PixelTable::from_fn(2, 4, |_, sp| match sp / 2 {
            0 => Weights::single(1),
            3 => Weights::single(7),
            _ => Weights::CENTER_ONLY,
        });
        let narrowed = narrow(&table, Axis::Vertical).unwrap();
        assert_eq!((narrowed.width(), narrowed.height()), (2, 2));
        let e = narrowed.case(9).unwrap();
        assert_eq!(e[0], Weights([0, 2, 0, 0, 1, 0, 0, 0, 0]));
        assert_eq!(e[3], Weights([0, 0, 0, 0, 1, 0, 0, 2, 0]));
    }

    #[test]
    fn test_narrow_single_pair_favours_first() {
        let table = PixelTable::from_fn(2, 1, |_, sp| match sp {
            0 => Weights([1, 0, 0, 0, 3, 0, 0, 0, 0]),
            _ => Weights::single(CENTER),
        });
        let e = narrow(&table, Axis::Horizontal).unwrap().case(0).unwrap().to_vec();
        // 2 * (1,3)/4 + 1 * (1)/1, scaled to (2,6) + (0,4)
        assert_eq!(e, vec![Weights([1, 0, 0, 0, 5, 0, 0, 0, 0])]);
    }

    #[test]
    fn test_narrow_rejects_odd_length() {
        let table = PixelTable::from_fn(3, 3, |_, _| Weights::CENTER_ONLY);
        assert_eq!(
            narrow(&table, Axis::Horizontal),
            Err(StructuralError::NarrowingShape { axis: "horizontal", length: 3 })
        );
    }

    #[test]
    fn test_narrow_rejects_unencodable_blend() {
        // c1 + c5 merged with c2 + c4 + c5 needs four weights
        let table = PixelTable::from_fn(2, 1, |_, sp| match sp {
            0 => Weights([1, 0, 0, 0, 1, 0, 0, 0, 0]),
            _ => Weights([0, 1, 0, 1, 2, 0, 0, 0, 0]),
        });
        match narrow(&table, Axis::Horizontal) {
            Err(StructuralError::NarrowedBlend { case: 0, sub_pixel: 0, kind, .. }) => {
                assert_eq!(kind, InvariantKind::TooManyWeights { count: 4 })
            }
            other => panic!("expected a narrowing error, got {:?}", other),
        }
    }

    #[test]
    fn test_narrow_keeps_unreachable_cases() {
        let cases = (0..4096)
            .map(|c| (c != 5).then(|| vec![Weights::CENTER_ONLY; 4]))
            .collect();
        let table = PixelTable::new(4, 1, Layout::Full, cases);
        let narrowed = narrow(&table, Axis::Horizontal).unwrap();
        assert!(narrowed.case(5).is_none());
        assert_eq!(narrowed.case(4).unwrap().len(), 2);
    }
}
