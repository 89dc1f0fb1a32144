//! Case-bit permutation of whole tables

use crate::case::{CasePermutation, CASE_COUNT};
use crate::error::StructuralError;
use crate::table::PixelTable;

/// Re-index a table so that the entry for case `c` moves to `perm.apply(c)`.
///
/// The mapping is checked for bijectivity over all 4096 cases first.
pub fn permute_cases(
    table: &PixelTable,
    perm: &CasePermutation,
) -> Result<PixelTable, StructuralError> {
    let map = perm.case_map()?;
    if perm.is_identity() {
        return Ok(table.clone());
    }
    let mut cases = vec![None; CASE_COUNT];
    for (case, entry) in table.iter() {
        cases[map[case as usize] as usize] = entry.map(<[_]>::to_vec);
    }
    Ok(PixelTable::new(table.width(), table.height(), table.layout(), cases))
}
