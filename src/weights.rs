//! Blend weight vectors over the 3x3 neighbourhood

use std::fmt;

/// Number of pixels in the source neighbourhood.
pub const NEIGHBOURS: usize = 9;

/// Index of the centre pixel (c5).
pub const CENTER: usize = 4;

/// Largest factor total an authored blend may have, the fixed-point scale of
/// weight records.
pub const MAX_FACTOR_TOTAL: u32 = 255;

/// Unnormalized blend coefficients, one per neighbour index.
///
/// The rendered color is the weighted average of the neighbours: the sum of
/// every `weight * color` divided by the sum of the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Weights(pub [u32; NEIGHBOURS]);

impl Weights {
    /// The default blend: the centre pixel unchanged.
    pub const CENTER_ONLY: Weights = Weights([0, 0, 0, 0, 1, 0, 0, 0, 0]);

    /// A blend that copies a single neighbour.
    pub fn single(neighbour: usize) -> Self {
        let mut w = [0; NEIGHBOURS];
        w[neighbour] = 1;
        Weights(w)
    }

    /// Build a blend from `(neighbour, factor)` pairs. Repeated neighbours add up.
    ///
    /// Returns `None` if a weight overflows.
    pub fn from_terms(terms: &[(usize, u32)]) -> Option<Self> {
        let mut w = [0u32; NEIGHBOURS];
        for &(n, f) in terms {
            w[n] = w[n].checked_add(f)?;
        }
        Some(Weights(w))
    }

    pub fn get(&self, neighbour: usize) -> u32 {
        self.0[neighbour]
    }

    /// Total weight, or `None` if it does not fit in a `u32`.
    pub fn checked_sum(&self) -> Option<u32> {
        self.0.iter().try_fold(0u32, |acc, &w| acc.checked_add(w))
    }

    /// Total weight, saturating at `u32::MAX`.
    pub fn sum(&self) -> u32 {
        self.checked_sum().unwrap_or(u32::MAX)
    }

    /// Number of neighbours with a non-zero weight.
    pub fn nonzero_count(&self) -> usize {
        self.0.iter().filter(|&&w| w != 0).count()
    }

    /// `(neighbour, weight)` for every non-zero weight, in neighbour order.
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.0.iter().enumerate().filter(|(_, &w)| w != 0).map(|(n, &w)| (n, w))
    }

    /// Move every weight to the neighbour `perm` assigns it to.
    pub fn permuted(&self, perm: &[usize; NEIGHBOURS]) -> Self {
        let mut w = [0; NEIGHBOURS];
        for (src, &dst) in perm.iter().enumerate() {
            w[dst] = self.0[src];
        }
        Weights(w)
    }

    pub fn scaled(&self, factor: u32) -> Self {
        Weights(self.0.map(|w| w * factor))
    }

    /// Divide out common factors of 2 and 3 until none is left.
    ///
    /// ```
    /// use hqxc::weights::Weights;
    ///
    /// let w = Weights([0, 6, 0, 0, 12, 0, 0, 0, 0]).reduced();
    /// assert_eq!(w, Weights([0, 1, 0, 0, 2, 0, 0, 0, 0]));
    /// ```
    pub fn reduced(&self) -> Self {
        let mut w = self.0;
        if w.iter().all(|&x| x == 0) {
            return *self;
        }
        loop {
            if w.iter().all(|x| x % 2 == 0) {
                w = w.map(|x| x / 2);
            } else if w.iter().all(|x| x % 3 == 0) {
                w = w.map(|x| x / 3);
            } else {
                break;
            }
        }
        Weights(w)
    }

    /// Weighted blend of two vectors with integer multipliers.
    ///
    /// `a` is scaled by `ma * sum(b)` and `b` by `mb * sum(a)` so that both
    /// contribute in proportion to their multipliers regardless of their own
    /// weight sums; the result is reduced to lowest terms.
    pub fn blend(a: &Weights, ma: u32, b: &Weights, mb: u32) -> Self {
        let sa = a.scaled(ma * b.sum());
        let sb = b.scaled(mb * a.sum());
        let mut w = [0; NEIGHBOURS];
        for n in 0..NEIGHBOURS {
            w[n] = sa.0[n] + sb.0[n];
        }
        Weights(w).reduced()
    }
}

impl fmt::Display for Weights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, w) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", w)?;
        }
        write!(f, ")")
    }
}

/// The four neighbours a sub-pixel may draw from.
///
/// A sub-pixel belongs to the left half of its grid when `x < ceil(width / 2)`
/// and to the top half when `y < ceil(height / 2)`; odd grids put the middle
/// column and row in the left and top halves. The result is
/// `[centre, vertical, horizontal, diagonal]`.
pub fn quadrant_neighbours(x: usize, y: usize, width: usize, height: usize) -> [usize; 4] {
    let col = if x < width.div_ceil(2) { 0 } else { 2 };
    let row = if y < height.div_ceil(2) { 0 } else { 2 };
    [CENTER, row * 3 + 1, 3 + col, row * 3 + col]
}

/// Check whether a neighbour may carry weight for the sub-pixel at `(x, y)`.
pub fn is_relevant(neighbour: usize, x: usize, y: usize, width: usize, height: usize) -> bool {
    quadrant_neighbours(x, y, width, height).contains(&neighbour)
}
