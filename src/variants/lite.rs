//! Lite reduction
//!
//! The lite consumer samples a pre-blended interpolation texture with a single
//! offset per sub-pixel, so each blend may use the centre plus at most one
//! other neighbour. Neighbours not separated by an edge are treated as equal:
//! their weights merge onto one representative chosen by a per-sub-pixel
//! preference order.

use serde::{Deserialize, Serialize};

use crate::case::{has_edge, EDGES};
use crate::error::{CompileError, StructuralError};
use crate::table::{Layout, PixelTable};
use crate::validate::check_table_counts;
use crate::weights::{Weights, CENTER, NEIGHBOURS};

/// Which horizontal side a sub-pixel prefers when picking representatives.
///
/// Odd grids put their middle column in the left half; biasing it to the
/// right keeps the seam between the halves symmetric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    /// Use the side the sub-pixel lies on
    #[default]
    None,
    Left,
    Right,
}

/// Representative preference orders, one per sub-pixel of a full grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LitePreference {
    width: usize,
    height: usize,
    orders: Vec<[usize; NEIGHBOURS]>,
}

impl LitePreference {
    /// Build the preference orders for a `width x height` grid.
    ///
    /// Each order starts with the centre, then the sub-pixel's own vertical,
    /// horizontal and diagonal neighbours, then the two remaining orthogonal
    /// neighbours and finally the three remaining diagonals. `biases` is
    /// indexed by sub-pixel; missing entries mean [`Bias::None`].
    pub fn for_grid(width: usize, height: usize, biases: &[Bias]) -> Self {
        let orders = (0..width * height)
            .map(|sp| {
                let (x, y) = (sp % width, sp / width);
                let col = match biases.get(sp).copied().unwrap_or_default() {
                    Bias::Left => 0,
                    Bias::Right => 2,
                    Bias::None if x < width.div_ceil(2) => 0,
                    Bias::None => 2,
                };
                let row = if y < height.div_ceil(2) { 0 } else { 2 };
                let (ocol, orow) = (2 - col, 2 - row);
                [
                    CENTER,
                    row * 3 + 1,
                    3 + col,
                    row * 3 + col,
                    orow * 3 + 1,
                    3 + ocol,
                    row * 3 + ocol,
                    orow * 3 + col,
                    orow * 3 + ocol,
                ]
            })
            .collect();
        Self { width, height, orders }
    }

    pub fn order(&self, sub_pixel: usize) -> &[usize; NEIGHBOURS] {
        &self.orders[sub_pixel]
    }
}

/// Partition of the nine neighbours into classes of equal pixels.
struct Classes {
    parent: [usize; NEIGHBOURS],
}

impl Classes {
    /// Join every pair of neighbours whose edge bit is unset in `case`.
    fn for_case(case: u16) -> Self {
        let mut classes = Self { parent: std::array::from_fn(|i| i) };
        for (bit, &(a, b)) in EDGES.iter().enumerate() {
            if !has_edge(case, bit) {
                classes.union(a, b);
            }
        }
        classes
    }

    fn find(&self, mut n: usize) -> usize {
        while self.parent[n] != n {
            n = self.parent[n];
        }
        n
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

/// Reduce one weight vector for `case` using a preference order.
pub fn lite_weights(weights: &Weights, case: u16, order: &[usize; NEIGHBOURS]) -> Weights {
    collapse_weights(weights, case, order).reduced()
}

/// Merge equal neighbours and keep a single non-centre representative,
/// without reducing to lowest terms. The total weight is unchanged.
pub fn collapse_weights(weights: &Weights, case: u16, order: &[usize; NEIGHBOURS]) -> Weights {
    let classes = Classes::for_case(case);
    let mut merged = [0u32; NEIGHBOURS];
    for (n, w) in weights.nonzero() {
        let root = classes.find(n);
        let rep = order.iter().copied().find(|&m| classes.find(m) == root).unwrap_or(n);
        merged[rep] += w;
    }

    // strongest non-centre representative; ties go to the earlier preference
    let keep = order
        .iter()
        .copied()
        .filter(|&n| n != CENTER && merged[n] > 0)
        .fold(None, |best: Option<usize>, n| match best {
            Some(b) if merged[b] >= merged[n] => Some(b),
            _ => Some(n),
        });
    for n in 0..NEIGHBOURS {
        if n != CENTER && Some(n) != keep && merged[n] > 0 {
            merged[CENTER] += merged[n];
            merged[n] = 0;
        }
    }
    Weights(merged)
}

/// Derive the lite variant of a full table.
///
/// # Examples
///
/// ```
/// use hqxc::table::PixelTable;
/// use hqxc::variants::{lite, LitePreference};
/// use hqxc::weights::Weights;
///
/// let table = PixelTable::from_fn(2, 2, |_, _| Weights([0, 1, 0, 1, 2, 0, 0, 0, 0]));
/// let pref = LitePreference::for_grid(2, 2, &[]);
/// let reduced = lite(&table, &pref).unwrap();
/// // case 0 has no edges: every neighbour equals the centre
/// assert_eq!(reduced.case(0).unwrap()[0], Weights::CENTER_ONLY);
/// ```
pub fn lite(table: &PixelTable, pref: &LitePreference) -> Result<PixelTable, CompileError> {
    if table.layout() != Layout::Full {
        return Err(StructuralError::LayoutMismatch {
            expected: Layout::Full.name(),
            found: table.layout().name(),
        }
        .into());
    }
    if (pref.width, pref.height) != (table.width(), table.height()) {
        return Err(StructuralError::PreferenceShape {
            expected: format!("{}x{}", pref.width, pref.height),
            found: format!("{}x{}", table.width(), table.height()),
        }
        .into());
    }

    let cases = table
        .iter()
        .map(|(case, entry)| {
            entry.map(|e| {
                e.iter()
                    .enumerate()
                    .map(|(sp, w)| lite_weights(w, case, pref.order(sp)))
                    .collect()
            })
        })
        .collect();
    let reduced = PixelTable::new(table.width(), table.height(), Layout::Full, cases);
    check_table_counts(&reduced)?;
    Ok(reduced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{edge_bit, CASE_MASK};

    fn order_top_left() -> [usize; NEIGHBOURS] {
        *LitePreference::for_grid(2, 2, &[]).order(0)
    }

    /// A case with every edge set except the listed neighbour pairs.
    fn case_without(pairs: &[(usize, usize)]) -> u16 {
        pairs.iter().fold(CASE_MASK, |case, &(a, b)| {
            case & !(1 << edge_bit(a, b).unwrap())
        })
    }

    #[test]
    fn test_preference_orders_are_permutations() {
        let pref = LitePreference::for_grid(3, 3, &[Bias::None, Bias::Right, Bias::Left]);
        for sp in 0..9 {
            let mut order = *pref.order(sp);
            order.sort_unstable();
            assert_eq!(order, [0, 1, 2, 3, 4, 5, 6, 7, 8]);
        }
    }

    #[test]
    fn test_preference_positional_side() {
        let pref = LitePreference::for_grid(2, 2, &[]);
        assert_eq!(pref.order(0)[..4], [4, 1, 3, 0]);
        assert_eq!(pref.order(1)[..4], [4, 1, 5, 2]);
        assert_eq!(pref.order(3)[..4], [4, 7, 5, 8]);
        assert_eq!(pref.order(3)[4..], [1, 3, 6, 2, 0]);
    }

    #[test]
    fn test_preference_bias_overrides_side() {
        // middle column of a 3x3 grid belongs to the left half unless biased
        let pref = LitePreference::for_grid(3, 3, &[Bias::None, Bias::Right]);
        assert_eq!(pref.order(1)[..4], [4, 1, 5, 2]);
        assert_eq!(pref.order(2)[..4], [4, 1, 5, 2]);
        let unbiased = LitePreference::for_grid(3, 3, &[]);
        assert_eq!(unbiased.order(1)[..4], [4, 1, 3, 0]);
    }

    #[test]
    fn test_no_edges_collapses_to_center() {
        let w = Weights([1, 1, 0, 0, 2, 0, 0, 0, 0]);
        assert_eq!(lite_weights(&w, 0, &order_top_left()), Weights::CENTER_ONLY);
    }

    #[test]
    fn test_all_edges_keeps_strongest() {
        let w = Weights([1, 2, 0, 1, 4, 0, 0, 0, 0]);
        // nothing merges; c2 keeps its weight and c1/c4 move onto the centre
        assert_eq!(
            lite_weights(&w, CASE_MASK, &order_top_left()),
            Weights([0, 2, 0, 0, 6, 0, 0, 0, 0]).reduced()
        );
    }

    #[test]
    fn test_tie_goes_to_preferred_neighbour() {
        let w = Weights([0, 1, 0, 1, 2, 0, 0, 0, 0]);
        assert_eq!(
            lite_weights(&w, CASE_MASK, &order_top_left()),
            Weights([0, 1, 0, 0, 3, 0, 0, 0, 0])
        );
    }

    #[test]
    fn test_merges_top_and_bottom_through_ring() {
        // c2-c6 and c6-c8 unset: c2, c6 and c8 are one class, the centre is separate
        let case = case_without(&[(1, 5), (5, 7)]);
        let w = Weights([0, 1, 0, 0, 2, 0, 0, 1, 0]);
        let out = lite_weights(&w, case, &order_top_left());
        assert_eq!(out.get(CENTER), 1);
        assert_eq!(out.get(1), 1);
        assert_eq!(out.get(7), 0);
        assert_eq!(out.nonzero_count(), 2);
    }

    #[test]
    fn test_collapse_conserves_total() {
        let w = Weights([1, 2, 0, 1, 4, 0, 0, 0, 0]);
        let collapsed = collapse_weights(&w, CASE_MASK, &order_top_left());
        assert_eq!(collapsed, Weights([0, 2, 0, 0, 6, 0, 0, 0, 0]));
        assert_eq!(collapsed.sum(), w.sum());
    }

    #[test]
    fn test_lite_table_rejects_wrong_preference() {
        let table = PixelTable::from_fn(2, 2, |_, _| Weights::CENTER_ONLY);
        let pref = LitePreference::for_grid(3, 3, &[]);
        assert!(matches!(
            lite(&table, &pref),
            Err(CompileError::Structural(StructuralError::PreferenceShape { .. }))
        ));
    }

    #[test]
    fn test_lite_table_at_most_one_neighbour() {
        let table = PixelTable::from_fn(2, 2, |case, _| {
            if case % 2 == 0 {
                Weights([1, 1, 0, 0, 2, 0, 0, 0, 0])
            } else {
                Weights([0, 1, 0, 1, 2, 0, 0, 0, 0])
            }
        });
        let reduced = lite(&table, &LitePreference::for_grid(2, 2, &[])).unwrap();
        for (_, entry) in reduced.iter() {
            for w in entry.unwrap() {
                assert!(w.nonzero().filter(|&(n, _)| n != CENTER).count() <= 1);
            }
        }
    }
}
