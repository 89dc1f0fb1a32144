//! Table validation
//!
//! Turns a parsed [`RawTable`] into a [`PixelTable`]:
//! - contradiction cases are neutralized to the centre-only blend, whatever
//!   the rule source assigned them
//! - unset sub-pixels default to the centre-only blend
//! - every other weight vector must satisfy the table invariants; a violation
//!   is an authoring defect and aborts validation
//!
//! The invariants are:
//! 1. the weights sum to a power of two
//! 2. at most three weights are non-zero, and if three are, one of them is
//!    the centre
//! 3. only the four neighbours of the sub-pixel's quadrant carry weight

use crate::case::{is_contradiction, CASE_COUNT};
use crate::error::{InvariantError, InvariantKind};
use crate::table::{PixelTable, RawTable};
use crate::weights::{is_relevant, Weights, CENTER};

/// Check the sum and count invariants of a single weight vector.
pub fn check_shape(weights: &Weights) -> Result<(), InvariantKind> {
    let sum = weights.checked_sum().ok_or(InvariantKind::SumOverflow)?;
    if sum != 0 && !sum.is_power_of_two() {
        return Err(InvariantKind::NotPowerOfTwo { sum });
    }
    check_counts(weights)
}

/// Check the count invariants only.
///
/// Narrowed tables blend sums that are not powers of two, so derived tables
/// that may have been narrowed are held to this weaker check.
pub fn check_counts(weights: &Weights) -> Result<(), InvariantKind> {
    if weights.checked_sum().ok_or(InvariantKind::SumOverflow)? == 0 {
        return Err(InvariantKind::ZeroSum);
    }
    let count = weights.nonzero_count();
    if count > 3 {
        return Err(InvariantKind::TooManyWeights { count });
    }
    if count == 3 && weights.get(CENTER) == 0 {
        return Err(InvariantKind::ThirdWeightNotCenter);
    }
    Ok(())
}

/// Check every invariant of the weight vector at `(x, y)` in a `width x height` grid.
pub fn check_weights(
    weights: &Weights,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
) -> Result<(), InvariantKind> {
    check_shape(weights)?;
    match weights.nonzero().find(|&(n, _)| !is_relevant(n, x, y, width, height)) {
        Some((neighbour, _)) => Err(InvariantKind::OutOfQuadrant { neighbour }),
        None => Ok(()),
    }
}

/// Validate a raw table, producing a fully populated pixel table.
///
/// # Examples
///
/// ```
/// use hqxc::parser::parse_rules;
/// use hqxc::table::Zoom;
/// use hqxc::validate::validate;
/// use hqxc::weights::Weights;
///
/// let raw = parse_rules("case 0\npixel0 = interpolate<3,1>(c5, c1);\n", Zoom::X2).unwrap();
/// let table = validate(&raw).unwrap();
/// assert_eq!(table.case(0).unwrap()[0], Weights([1, 0, 0, 0, 3, 0, 0, 0, 0]));
/// assert_eq!(table.case(1).unwrap()[0], Weights::CENTER_ONLY);
/// ```
pub fn validate(raw: &RawTable) -> Result<PixelTable, InvariantError> {
    let size = raw.zoom.size();
    let (stored_w, _) = raw.stored_dims();
    let mut cases = Vec::with_capacity(CASE_COUNT);
    let mut neutralized = 0usize;
    let mut defaulted = 0usize;

    for (case, entry) in raw.entries.iter().enumerate() {
        let case = case as u16;
        if is_contradiction(case) {
            neutralized += 1;
            cases.push(Some(vec![Weights::CENTER_ONLY; entry.len()]));
            continue;
        }

        let mut row = Vec::with_capacity(entry.len());
        for (sub_pixel, weights) in entry.iter().enumerate() {
            let weights = match weights {
                Some(w) => *w,
                None => {
                    defaulted += 1;
                    Weights::CENTER_ONLY
                }
            };
            let (x, y) = (sub_pixel % stored_w, sub_pixel / stored_w);
            check_weights(&weights, x, y, size, size)
                .map_err(|kind| InvariantError { case, sub_pixel, weights, kind })?;
            row.push(weights);
        }
        cases.push(Some(row));
    }

    log::info!(
        "validated zoom {}: {} contradiction cases neutralized, {} unset sub-pixels defaulted",
        raw.zoom,
        neutralized,
        defaulted
    );
    Ok(PixelTable::new(size, size, raw.layout, cases))
}

/// Re-check the sum and count invariants over a derived table.
///
/// Quadrant relevance is not re-checked: derived tables may legitimately
/// move weight across the middle column of an odd grid.
pub fn check_table_shape(table: &PixelTable) -> Result<(), InvariantError> {
    check_table_with(table, check_shape)
}

/// Re-check the count invariants over a derived table.
pub fn check_table_counts(table: &PixelTable) -> Result<(), InvariantError> {
    check_table_with(table, check_counts)
}

fn check_table_with(
    table: &PixelTable,
    check: fn(&Weights) -> Result<(), InvariantKind>,
) -> Result<(), InvariantError> {
    for (case, entry) in table.iter() {
        let Some(entry) = entry else { continue };
        for (sub_pixel, weights) in entry.iter().enumerate() {
            check(weights).map_err(|kind| InvariantError {
                case,
                sub_pixel,
                weights: *weights,
                kind,
            })?;
        }
    }
    Ok(())
}

/// Mark every contradiction case as unreachable.
///
/// Emitters then fold these cases into their fallback instead of emitting
/// the neutral blend for each of them.
pub fn prune_contradictions(table: &PixelTable) -> PixelTable {
    let cases = table
        .iter()
        .map(|(case, entry)| {
            if is_contradiction(case) {
                None
            } else {
                entry.map(<[Weights]>::to_vec)
            }
        })
        .collect();
    PixelTable::new(table.width(), table.height(), table.layout(), cases)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_rules;
    use crate::table::{Layout, Zoom};

    #[test]
    fn test_check_shape() {
        assert_eq!(check_shape(&Weights::CENTER_ONLY), Ok(()));
        assert_eq!(check_shape(&Weights::default()), Err(InvariantKind::ZeroSum));
        assert_eq!(
            check_shape(&Weights([0, 1, 0, 0, 2, 0, 0, 0, 0])),
            Err(InvariantKind::NotPowerOfTwo { sum: 3 })
        );
        assert_eq!(
            check_shape(&Weights([1, 1, 0, 1, 1, 0, 0, 0, 0])),
            Err(InvariantKind::TooManyWeights { count: 4 })
        );
        assert_eq!(
            check_shape(&Weights([2, 1, 0, 1, 0, 0, 0, 0, 0])),
            Err(InvariantKind::ThirdWeightNotCenter)
        );
        assert_eq!(check_shape(&Weights([0, 1, 0, 1, 2, 0, 0, 0, 0])), Ok(()));
    }

    #[test]
    fn test_check_counts_allows_any_sum() {
        let narrowed = Weights([0, 1, 0, 0, 5, 0, 0, 0, 0]);
        assert_eq!(check_counts(&narrowed), Ok(()));
        assert!(check_shape(&narrowed).is_err());
        assert_eq!(check_counts(&Weights::default()), Err(InvariantKind::ZeroSum));
    }

    #[test]
    fn test_overflowing_sum_rejected() {
        // u32::MAX + 2 would wrap to 1, a power of two
        let w = Weights([u32::MAX, 0, 0, 0, 2, 0, 0, 0, 0]);
        assert_eq!(check_shape(&w), Err(InvariantKind::SumOverflow));
        assert_eq!(check_counts(&w), Err(InvariantKind::SumOverflow));
    }

    #[test]
    fn test_check_weights_relevance() {
        let top_right = Weights([0, 0, 1, 0, 1, 0, 0, 0, 0]);
        assert_eq!(check_weights(&top_right, 1, 0, 2, 2), Ok(()));
        assert_eq!(
            check_weights(&top_right, 0, 0, 2, 2),
            Err(InvariantKind::OutOfQuadrant { neighbour: 2 })
        );
    }

    #[test]
    fn test_contradiction_neutralized() {
        // case 1 has a single ring edge and is a contradiction
        let source = "case 1\npixel0 = interpolate<3,1>(c5, c1);\n";
        let table = validate(&parse_rules(source, Zoom::X2).unwrap()).unwrap();
        assert!(table.case(1).unwrap().iter().all(|w| *w == Weights::CENTER_ONLY));
    }

    #[test]
    fn test_contradiction_neutralized_even_when_invalid() {
        let source = "case 1\npixel0 = interpolate<1,1,1>(c1, c2, c4);\n";
        assert!(validate(&parse_rules(source, Zoom::X2).unwrap()).is_ok());
    }

    #[test]
    fn test_invariant_violation_reported() {
        let source = "case 0\npixel0 = interpolate<2,1>(c5, c1);\n";
        let err = validate(&parse_rules(source, Zoom::X2).unwrap()).unwrap_err();
        assert_eq!(err.case, 0);
        assert_eq!(err.sub_pixel, 0);
        assert_eq!(err.kind, InvariantKind::NotPowerOfTwo { sum: 3 });
    }

    #[test]
    fn test_out_of_quadrant_rejected() {
        let source = "case 0\npixel0 = interpolate<1,1>(c5, c9);\n";
        let err = validate(&parse_rules(source, Zoom::X4).unwrap()).unwrap_err();
        assert_eq!(err.kind, InvariantKind::OutOfQuadrant { neighbour: 8 });
    }

    #[test]
    fn test_fully_populated() {
        let table = validate(&parse_rules("", Zoom::X3).unwrap()).unwrap();
        assert_eq!(table.layout(), Layout::Quadrant);
        assert!(table.iter().all(|(_, e)| e.is_some_and(|e| e.len() == 4)));
    }

    #[test]
    fn test_prune_contradictions() {
        let table = validate(&parse_rules("", Zoom::X2).unwrap()).unwrap();
        let pruned = prune_contradictions(&table);
        assert!(pruned.case(1).is_none());
        assert!(pruned.case(0).is_some());
        assert!(check_table_shape(&pruned).is_ok());
    }
}
