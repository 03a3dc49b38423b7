use sheetgrid_core::CellRange;

use crate::value::FormulaValue;

/// VLOOKUP - Scan the first column of `range` top to bottom for an exact
/// text match and return the cell `offset` columns to its right.
///
/// Not found, or an offset landing on a missing cell, gives empty text.
/// The caller clips `range` to the grid.
pub fn vlookup<'a>(
    search: &str,
    range: &CellRange,
    offset: usize,
    get: impl Fn(usize, usize) -> Option<&'a str>,
) -> FormulaValue {
    let found = (range.r1..=range.r2)
        .find(|&row| get(row, range.c1) == Some(search))
        .and_then(|row| get(row, range.c1.checked_add(offset)?));

    FormulaValue::Text(found.unwrap_or_default().to_string())
}
