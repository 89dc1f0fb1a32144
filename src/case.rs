//! Edge patterns ("cases") and the permutations that act on them
//!
//! A case is a 12-bit value. Each bit records whether an edge (a color
//! discontinuity) was detected between two pixels of the 3x3 source
//! neighbourhood:
//!
//! ```text
//! c1 c2 c3      0 1 2
//! c4 c5 c6  ->  3 4 5
//! c7 c8 c9      6 7 8
//! ```
//!
//! Bits 0-3 form the ring around the centre (c2-c6, c6-c8, c8-c4, c4-c2) and
//! are the bits tested by conditionals in rule sources. Bits 4-11 are the
//! edges from the centre to each of its eight neighbours.

use crate::error::StructuralError;

/// Number of edge bits in a case.
pub const EDGE_COUNT: usize = 12;

/// Number of distinct cases.
pub const CASE_COUNT: usize = 1 << EDGE_COUNT;

/// Mask of all valid case bits.
pub const CASE_MASK: u16 = (CASE_COUNT - 1) as u16;

/// The neighbour pair of every edge bit, indexed by bit.
pub const EDGES: [(usize, usize); EDGE_COUNT] = [
    (1, 5), // c2-c6
    (5, 7), // c6-c8
    (7, 3), // c8-c4
    (3, 1), // c4-c2
    (4, 0), // c5-c1
    (4, 1), // c5-c2
    (4, 2), // c5-c3
    (4, 3), // c5-c4
    (4, 5), // c5-c6
    (4, 6), // c5-c7
    (4, 7), // c5-c8
    (4, 8), // c5-c9
];

/// Find the bit recording the edge between two neighbours, in either order.
pub fn edge_bit(a: usize, b: usize) -> Option<usize> {
    EDGES.iter().position(|&(x, y)| (x, y) == (a, b) || (x, y) == (b, a))
}

/// Check whether the edge with the given bit is present in a case.
pub fn has_edge(case: u16, bit: usize) -> bool {
    case & (1 << bit) != 0
}

/// A rule flagging edge patterns no real neighbourhood can produce.
///
/// Matches when `(case ^ 0xFFF) & mask` is one of `values`. A set bit in the
/// inverted case means "these two pixels are equal", so every rule describes
/// a cycle of equalities that is closed on all but one side.
#[derive(Debug, Clone, Copy)]
pub struct ContradictionRule {
    pub name: &'static str,
    pub mask: u16,
    pub values: &'static [u16],
}

impl ContradictionRule {
    pub fn matches(&self, case: u16) -> bool {
        let inv = (case ^ CASE_MASK) & self.mask;
        self.values.contains(&inv)
    }
}

/// The fixed set of contradiction rules.
pub const CONTRADICTION_RULES: [ContradictionRule; 5] = [
    ContradictionRule { name: "triangle c2-c5-c6", mask: 0x121, values: &[0x120, 0x101, 0x021] },
    ContradictionRule { name: "triangle c6-c5-c8", mask: 0x502, values: &[0x500, 0x402, 0x102] },
    ContradictionRule { name: "triangle c8-c5-c4", mask: 0x484, values: &[0x480, 0x404, 0x084] },
    ContradictionRule { name: "triangle c4-c5-c2", mask: 0x0A8, values: &[0x0A0, 0x088, 0x028] },
    ContradictionRule { name: "ring c2-c6-c8-c4", mask: 0x00F, values: &[0x00E, 0x00D, 0x00B, 0x007] },
];

/// Check whether a case is geometrically impossible.
///
/// # Examples
///
/// ```
/// use hqxc::case::is_contradiction;
///
/// assert!(!is_contradiction(0));
/// // c2=c6, c6=c8 and c8=c4 but c4!=c2
/// assert!(is_contradiction(0b1000));
/// ```
pub fn is_contradiction(case: u16) -> bool {
    contradiction_rule(case).is_some()
}

/// The first rule a contradiction case violates, if any.
pub fn contradiction_rule(case: u16) -> Option<&'static ContradictionRule> {
    CONTRADICTION_RULES.iter().find(|rule| rule.matches(case))
}

/// A bijection on the 12 case bits.
///
/// Source bit `i` moves to destination bit `bits[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CasePermutation {
    bits: [u8; EDGE_COUNT],
}

impl CasePermutation {
    /// The permutation that leaves every bit in place.
    pub const IDENTITY: CasePermutation =
        CasePermutation { bits: [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11] };

    /// Build a permutation, rejecting anything that is not a bijection on 0..12.
    pub fn new(bits: [u8; EDGE_COUNT]) -> Result<Self, StructuralError> {
        let mut seen = [false; EDGE_COUNT];
        for &b in &bits {
            let b = b as usize;
            if b >= EDGE_COUNT || seen[b] {
                return Err(StructuralError::InvalidBitPermutation { bits: bits.to_vec() });
            }
            seen[b] = true;
        }
        Ok(Self { bits })
    }

    /// Build a permutation from a slice, e.g. one read from a config file.
    pub fn from_slice(bits: &[u8]) -> Result<Self, StructuralError> {
        let arr: [u8; EDGE_COUNT] = bits
            .try_into()
            .map_err(|_| StructuralError::InvalidBitPermutation { bits: bits.to_vec() })?;
        Self::new(arr)
    }

    pub fn bits(&self) -> &[u8; EDGE_COUNT] {
        &self.bits
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Move every bit of `case` to its destination position.
    pub fn apply(&self, case: u16) -> u16 {
        let mut out = 0u16;
        for (src, &dst) in self.bits.iter().enumerate() {
            if has_edge(case, src) {
                out |= 1 << dst;
            }
        }
        out
    }

    /// The permutation that undoes this one.
    pub fn inverse(&self) -> Self {
        let mut bits = [0u8; EDGE_COUNT];
        for (src, &dst) in self.bits.iter().enumerate() {
            bits[dst as usize] = src as u8;
        }
        Self { bits }
    }

    /// Apply `self` first, then `then`.
    pub fn then(&self, then: &CasePermutation) -> Self {
        let mut bits = [0u8; EDGE_COUNT];
        for (src, &mid) in self.bits.iter().enumerate() {
            bits[src] = then.bits[mid as usize];
        }
        Self { bits }
    }

    /// Build the full case mapping and verify it is a bijection on 0..4096.
    pub fn case_map(&self) -> Result<Vec<u16>, StructuralError> {
        let mut map = Vec::with_capacity(CASE_COUNT);
        let mut hit = vec![false; CASE_COUNT];
        for case in 0..CASE_COUNT as u16 {
            let image = self.apply(case);
            let slot = &mut hit[image as usize];
            if *slot {
                return Err(StructuralError::NotBijective { case, image });
            }
            *slot = true;
            map.push(image);
        }
        Ok(map)
    }
}

impl Default for CasePermutation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Mirror axis of the sub-pixel grid and the source neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirror {
    /// Swap left and right.
    Horizontal,
    /// Swap top and bottom.
    Vertical,
}

/// Everything needed to mirror a table along one axis.
#[derive(Debug, Clone, Copy)]
pub struct MirrorDescriptor {
    pub axis: Mirror,
    /// Destination of every neighbour index.
    pub neighbours: [usize; 9],
    /// Destination of every case bit.
    pub case_bits: CasePermutation,
}

/// The static mirror descriptors, horizontal first.
pub const MIRRORS: [MirrorDescriptor; 2] = [
    MirrorDescriptor {
        axis: Mirror::Horizontal,
        neighbours: [2, 1, 0, 5, 4, 3, 8, 7, 6],
        case_bits: CasePermutation { bits: [3, 2, 1, 0, 6, 5, 4, 8, 7, 11, 10, 9] },
    },
    MirrorDescriptor {
        axis: Mirror::Vertical,
        neighbours: [6, 7, 8, 3, 4, 5, 0, 1, 2],
        case_bits: CasePermutation { bits: [1, 0, 3, 2, 9, 10, 11, 7, 8, 4, 5, 6] },
    },
];

impl Mirror {
    pub fn descriptor(self) -> &'static MirrorDescriptor {
        match self {
            Mirror::Horizontal => &MIRRORS[0],
            Mirror::Vertical => &MIRRORS[1],
        }
    }
}

/// Combined neighbour and case-bit permutation for a set of mirrors.
#[derive(Debug, Clone, Copy)]
pub struct Symmetry {
    pub neighbours: [usize; 9],
    pub case_bits: CasePermutation,
}

impl Symmetry {
    pub const IDENTITY: Symmetry =
        Symmetry { neighbours: [0, 1, 2, 3, 4, 5, 6, 7, 8], case_bits: CasePermutation::IDENTITY };

    /// Compose the mirrors selected by the two flags.
    pub fn mirrored(horizontal: bool, vertical: bool) -> Self {
        let mut sym = Self::IDENTITY;
        if horizontal {
            sym = sym.then(Mirror::Horizontal.descriptor());
        }
        if vertical {
            sym = sym.then(Mirror::Vertical.descriptor());
        }
        sym
    }

    fn then(&self, mirror: &MirrorDescriptor) -> Self {
        let mut neighbours = [0usize; 9];
        for (src, &mid) in self.neighbours.iter().enumerate() {
            neighbours[src] = mirror.neighbours[mid];
        }
        Self { neighbours, case_bits: self.case_bits.then(&mirror.case_bits) }
    }
}

/// Render a case as a 12-digit binary string, most significant bit first.
pub fn format_case(case: u16) -> String {
    format!("{:012b}", case & CASE_MASK)
}
