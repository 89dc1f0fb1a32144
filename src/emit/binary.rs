//! Binary table emitter
//!
//! Writes one fixed-size record per case and sub-pixel, cases in table order
//! and sub-pixels row-major. Tables are expected to already be in the
//! consumer's case-bit order.
//!
//! Neighbour cells are addressed in texture coordinates: neighbour `(col, row)`
//! of the 3x3 neighbourhood sits at `(col * scale, row * scale)`, so the
//! centre is `(scale, scale)`.
//!
//! | Table         | Bytes | Layout                         |
//! |---------------|-------|--------------------------------|
//! | offsets       | 4     | `x0 y0 x1 y1`                  |
//! | weights       | 3     | `slot0 slot1 centre`, sum 255  |
//! | lite offsets  | 2     | `x y` of one sample point      |

use crate::error::StructuralError;
use crate::table::PixelTable;
use crate::weights::{Weights, CENTER};

use super::require_full;

/// Bytes per full offsets record.
pub const OFFSET_RECORD: usize = 4;
/// Bytes per weights record.
pub const WEIGHT_RECORD: usize = 3;
/// Bytes per lite offsets record.
pub const LITE_RECORD: usize = 2;

/// Fixed-point total of a weights record.
const WEIGHT_ONE: u32 = 255;

/// Record layout parameters shared by all binary tables of one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryLayout {
    sub_pixels: usize,
    coord_scale: u8,
}

impl BinaryLayout {
    pub const DEFAULT_COORD_SCALE: u8 = 64;

    /// Create a layout; `coord_scale` must lie in `1..=127` so that
    /// `2 * coord_scale` fits a byte.
    pub fn new(sub_pixels: usize, coord_scale: u8) -> Result<Self, StructuralError> {
        if !(1..=127).contains(&coord_scale) {
            return Err(StructuralError::CoordScale(coord_scale));
        }
        Ok(Self { sub_pixels, coord_scale })
    }

    /// Layout for every sub-pixel of `table`.
    pub fn for_table(table: &PixelTable, coord_scale: u8) -> Result<Self, StructuralError> {
        Self::new(table.sub_pixels(), coord_scale)
    }

    pub fn sub_pixels(&self) -> usize {
        self.sub_pixels
    }

    pub fn coord_scale(&self) -> u8 {
        self.coord_scale
    }

    fn cell(&self, neighbour: usize) -> [u8; 2] {
        let s = self.coord_scale;
        [(neighbour % 3) as u8 * s, (neighbour / 3) as u8 * s]
    }

    fn check_table(&self, table: &PixelTable) -> Result<(), StructuralError> {
        require_full(table)?;
        if table.sub_pixels() != self.sub_pixels {
            return Err(StructuralError::RecordCount {
                expected: self.sub_pixels,
                found: table.sub_pixels(),
            });
        }
        Ok(())
    }
}

/// Non-centre neighbours by descending weight, then ascending index.
///
/// Fails when the vector cannot be expressed as at most two neighbours plus
/// the centre.
fn slots(
    weights: &Weights,
    case: u16,
    sub_pixel: usize,
) -> Result<Vec<(usize, u32)>, StructuralError> {
    let unencodable = |reason| StructuralError::Unencodable {
        case,
        sub_pixel,
        weights: *weights,
        reason,
    };
    if weights.nonzero_count() > 3 {
        return Err(unencodable("more than three non-zero weights"));
    }
    let mut slots: Vec<(usize, u32)> = weights.nonzero().filter(|&(n, _)| n != CENTER).collect();
    if slots.len() > 2 {
        return Err(unencodable("more than two neighbours besides the centre"));
    }
    slots.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    Ok(slots)
}

fn emit_records(
    table: &PixelTable,
    layout: &BinaryLayout,
    record: usize,
    fallback: &[u8],
    mut encode: impl FnMut(&Weights, u16, usize) -> Result<Vec<u8>, StructuralError>,
) -> Result<Vec<u8>, StructuralError> {
    layout.check_table(table)?;
    let mut out = Vec::with_capacity(table.iter().count() * layout.sub_pixels * record);
    for (case, entry) in table.iter() {
        match entry {
            Some(entry) => {
                for (sp, w) in entry.iter().enumerate() {
                    out.extend(encode(w, case, sp)?);
                }
            }
            None => {
                for _ in 0..layout.sub_pixels {
                    out.extend_from_slice(fallback);
                }
            }
        }
    }
    Ok(out)
}

/// Encode the offsets table: up to two sample cells per sub-pixel.
pub fn emit_offsets(table: &PixelTable, layout: &BinaryLayout) -> Result<Vec<u8>, StructuralError> {
    let center = layout.cell(CENTER);
    let fallback = [center[0], center[1], center[0], center[1]];
    emit_records(table, layout, OFFSET_RECORD, &fallback, |w, case, sp| {
        let slots = slots(w, case, sp)?;
        let mut record = Vec::with_capacity(OFFSET_RECORD);
        for k in 0..2 {
            let cell = slots.get(k).map_or(center, |&(n, _)| layout.cell(n));
            record.extend_from_slice(&cell);
        }
        Ok(record)
    })
}

/// Encode the weights table matching [`emit_offsets`].
///
/// Each weight is scaled to a fraction of 255 and floored; the rounding
/// remainder goes to the largest weight so every record sums to 255.
pub fn emit_weights(table: &PixelTable, layout: &BinaryLayout) -> Result<Vec<u8>, StructuralError> {
    emit_records(table, layout, WEIGHT_RECORD, &[0, 0, WEIGHT_ONE as u8], |w, case, sp| {
        let slots = slots(w, case, sp)?;
        let sum = w.sum();
        let raw = [
            slots.first().map_or(0, |s| s.1),
            slots.get(1).map_or(0, |s| s.1),
            w.get(CENTER),
        ];
        let mut fixed = raw.map(|v| v * WEIGHT_ONE / sum);
        let remainder = WEIGHT_ONE - fixed.iter().sum::<u32>();
        let largest = (0..3).fold(0, |best, i| if raw[i] > raw[best] { i } else { best });
        fixed[largest] += remainder;
        Ok(fixed.iter().map(|&v| v as u8).collect())
    })
}

/// Encode the lite offsets table: one sample point per sub-pixel.
///
/// The point lies on the line from the centre cell towards the single
/// non-centre neighbour, at the neighbour's share of the total weight.
pub fn emit_lite_offsets(
    table: &PixelTable,
    layout: &BinaryLayout,
) -> Result<Vec<u8>, StructuralError> {
    let center = layout.cell(CENTER);
    let scale = layout.coord_scale as i64;
    emit_records(table, layout, LITE_RECORD, &center, |w, case, sp| {
        let slots = slots(w, case, sp)?;
        let (n, weight) = match slots.as_slice() {
            [] => return Ok(center.to_vec()),
            [single] => *single,
            _ => {
                return Err(StructuralError::Unencodable {
                    case,
                    sub_pixel: sp,
                    weights: *w,
                    reason: "lite records sample at most one neighbour besides the centre",
                })
            }
        };
        let sum = w.sum() as i64;
        let axis = |delta: i64| {
            let num = delta * scale * weight as i64;
            let offset = (2 * num + num.signum() * sum) / (2 * sum);
            (scale + offset) as u8
        };
        Ok(vec![axis((n % 3) as i64 - 1), axis((n / 3) as i64 - 1)])
    })
}
