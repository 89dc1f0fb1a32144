//! Pixel expression tables
//!
//! A table maps each of the 4096 cases to one weight vector per sub-pixel of
//! the magnified output, in row-major order. The parser produces a
//! [`RawTable`] whose sub-pixels may be unset; the validator turns it into a
//! [`PixelTable`], which is never mutated afterwards. Every later stage
//! derives new tables from it.

use serde::{Deserialize, Serialize};

use crate::case::CASE_COUNT;
use crate::error::CompileError;
use crate::weights::Weights;

/// A supported magnification factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Zoom(u8);

impl Zoom {
    pub const X2: Zoom = Zoom(2);
    pub const X3: Zoom = Zoom(3);
    pub const X4: Zoom = Zoom(4);

    pub const ALL: [Zoom; 3] = [Zoom::X2, Zoom::X3, Zoom::X4];

    pub fn new(factor: u8) -> Result<Self, CompileError> {
        match factor {
            2..=4 => Ok(Zoom(factor)),
            other => Err(CompileError::UnsupportedZoom(other)),
        }
    }

    pub fn factor(self) -> u8 {
        self.0
    }

    /// Edge length of the sub-pixel grid.
    pub fn size(self) -> usize {
        self.0 as usize
    }

    /// Edge length of the authored top-left quadrant.
    pub fn quadrant_size(self) -> usize {
        self.size().div_ceil(2)
    }

    /// The sub-pixel fixed to the centre pixel and never authored, if any.
    pub fn implicit_center(self) -> Option<usize> {
        (self.0 == 3).then_some(4)
    }
}

impl TryFrom<u8> for Zoom {
    type Error = CompileError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Zoom::new(value)
    }
}

impl From<Zoom> for u8 {
    fn from(zoom: Zoom) -> u8 {
        zoom.0
    }
}

impl std::fmt::Display for Zoom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x", self.0)
    }
}

/// Which sub-pixels a table stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Only the top-left `ceil(w/2) x ceil(h/2)` sub-pixels; the rest are mirror images.
    Quadrant,
    /// Every sub-pixel.
    Full,
}

impl Layout {
    pub fn name(self) -> &'static str {
        match self {
            Layout::Quadrant => "quadrant",
            Layout::Full => "full",
        }
    }
}

/// Dimensions of the stored sub-pixel grid for a full grid and layout.
pub fn stored_dims(width: usize, height: usize, layout: Layout) -> (usize, usize) {
    match layout {
        Layout::Quadrant => (width.div_ceil(2), height.div_ceil(2)),
        Layout::Full => (width, height),
    }
}

/// Parser output: possibly-unset weight vectors for every case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub zoom: Zoom,
    pub layout: Layout,
    /// `CASE_COUNT` rows of stored sub-pixels
    pub entries: Vec<Vec<Option<Weights>>>,
}

impl RawTable {
    /// An empty table where nothing is assigned yet.
    pub fn empty(zoom: Zoom, layout: Layout) -> Self {
        let (w, h) = stored_dims(zoom.size(), zoom.size(), layout);
        Self { zoom, layout, entries: vec![vec![None; w * h]; CASE_COUNT] }
    }

    /// Dimensions of the stored sub-pixel grid.
    pub fn stored_dims(&self) -> (usize, usize) {
        stored_dims(self.zoom.size(), self.zoom.size(), self.layout)
    }

    pub fn get(&self, case: u16, sub_pixel: usize) -> Option<Weights> {
        self.entries[case as usize][sub_pixel]
    }
}

/// A validated table of weight vectors.
///
/// A case entry of `None` marks a pattern that is unreachable; emitters
/// produce their fallback for it. Entries are never partially set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelTable {
    width: usize,
    height: usize,
    layout: Layout,
    cases: Vec<Option<Vec<Weights>>>,
}

impl PixelTable {
    /// Build a table from per-case entries.
    ///
    /// `width`/`height` describe the full sub-pixel grid; each present entry
    /// must hold exactly as many vectors as `layout` stores.
    pub fn new(
        width: usize,
        height: usize,
        layout: Layout,
        cases: Vec<Option<Vec<Weights>>>,
    ) -> Self {
        let (sw, sh) = stored_dims(width, height, layout);
        debug_assert_eq!(cases.len(), CASE_COUNT);
        debug_assert!(cases.iter().flatten().all(|e| e.len() == sw * sh));
        Self { width, height, layout, cases }
    }

    /// Build a full-layout table by evaluating `f` for every case and sub-pixel.
    pub fn from_fn(
        width: usize,
        height: usize,
        mut f: impl FnMut(u16, usize) -> Weights,
    ) -> Self {
        let cases = (0..CASE_COUNT as u16)
            .map(|case| Some((0..width * height).map(|sp| f(case, sp)).collect()))
            .collect();
        Self::new(width, height, Layout::Full, cases)
    }

    /// Width of the full sub-pixel grid.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the full sub-pixel grid.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn stored_dims(&self) -> (usize, usize) {
        stored_dims(self.width, self.height, self.layout)
    }

    /// Number of stored sub-pixels per case.
    pub fn sub_pixels(&self) -> usize {
        let (w, h) = self.stored_dims();
        w * h
    }

    /// Grid position `(x, y)` of a stored sub-pixel.
    pub fn position(&self, sub_pixel: usize) -> (usize, usize) {
        let (w, _) = self.stored_dims();
        (sub_pixel % w, sub_pixel / w)
    }

    pub fn case(&self, case: u16) -> Option<&[Weights]> {
        self.cases[case as usize].as_deref()
    }

    /// Iterate over `(case, entry)` pairs in case order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, Option<&[Weights]>)> + '_ {
        self.cases.iter().enumerate().map(|(case, e)| (case as u16, e.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_bounds() {
        assert!(Zoom::new(1).is_err());
        assert!(Zoom::new(5).is_err());
        assert_eq!(Zoom::new(3).unwrap().quadrant_size(), 2);
        assert_eq!(Zoom::X4.quadrant_size(), 2);
        assert_eq!(Zoom::X2.quadrant_size(), 1);
        assert_eq!(Zoom::X3.implicit_center(), Some(4));
        assert_eq!(Zoom::X4.implicit_center(), None);
    }

    #[test]
    fn test_zoom_serde() {
        let zoom: Zoom = serde_json::from_str("3").unwrap();
        assert_eq!(zoom, Zoom::X3);
        assert!(serde_json::from_str::<Zoom>("7").is_err());
        assert_eq!(serde_json::to_string(&Zoom::X2).unwrap(), "2");
    }

    #[test]
    fn test_stored_dims() {
        assert_eq!(stored_dims(3, 3, Layout::Quadrant), (2, 2));
        assert_eq!(stored_dims(4, 4, Layout::Quadrant), (2, 2));
        assert_eq!(stored_dims(2, 3, Layout::Full), (2, 3));
    }

    #[test]
    fn test_from_fn_and_position() {
        let table = PixelTable::from_fn(3, 2, |_, sp| Weights::single(sp % 9));
        assert_eq!(table.sub_pixels(), 6);
        assert_eq!(table.position(4), (1, 1));
        assert_eq!(table.case(7).unwrap()[5], Weights::single(5));
    }

    #[test]
    fn test_raw_table_empty() {
        let raw = RawTable::empty(Zoom::X4, Layout::Quadrant);
        assert_eq!(raw.entries.len(), CASE_COUNT);
        assert_eq!(raw.entries[0].len(), 4);
        assert_eq!(raw.get(4095, 3), None);
    }
}
