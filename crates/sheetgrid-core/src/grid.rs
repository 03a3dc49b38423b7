use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::SheetError;
use crate::range::{CellPosition, CellRange};

/// Rectangular 2D array of cell strings.
///
/// Rows are reference counted and copied on write, so cloning a grid for
/// a history snapshot only copies row pointers; a later edit duplicates
/// just the row it touches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct Grid {
    rows: Vec<Arc<Vec<String>>>,
    cols: usize,
}

impl Grid {
    /// Create an empty grid; both dimensions are raised to at least 1
    pub fn new(rows: usize, cols: usize) -> Self {
        let cols = cols.max(1);
        let row = Arc::new(vec![String::new(); cols]);
        Self {
            rows: vec![row; rows.max(1)],
            cols,
        }
    }

    /// Build from rows that must already be rectangular
    pub fn from_rows(rows: Vec<Vec<String>>) -> Result<Self, SheetError> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if cols == 0 || rows.iter().any(|r| r.len() != cols) {
            return Err(SheetError::InvalidShape);
        }

        Ok(Self {
            rows: rows.into_iter().map(Arc::new).collect(),
            cols,
        })
    }

    /// Build from possibly ragged rows, padding every row with empty strings
    /// to the widest observed row. Returns `None` when there is no cell at all.
    pub fn from_ragged(rows: Vec<Vec<String>>) -> Option<Self> {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        if cols == 0 {
            return None;
        }

        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(cols, String::new());
                Arc::new(row)
            })
            .collect();

        Some(Self { rows, cols })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, pos: CellPosition) -> bool {
        pos.is_valid(self.row_count(), self.cols)
    }

    /// Range covering the whole grid
    pub fn full_range(&self) -> CellRange {
        CellRange::new(0, 0, self.row_count() - 1, self.cols - 1)
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row)?.get(col).map(String::as_str)
    }

    pub fn row(&self, row: usize) -> Option<&[String]> {
        self.rows.get(row).map(|r| r.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Replace the value at `(row, col)`
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<(), SheetError> {
        if col >= self.cols {
            return Err(SheetError::OutOfBounds { row, col });
        }
        let cells = self
            .rows
            .get_mut(row)
            .ok_or(SheetError::OutOfBounds { row, col })?;

        let value = value.into();
        if cells[col] != value {
            Arc::make_mut(cells)[col] = value;
        }
        Ok(())
    }

    /// Take the value at `(row, col)`, leaving an empty string behind
    pub fn take(&mut self, row: usize, col: usize) -> Option<String> {
        let cells = self.rows.get_mut(row)?;
        if cells.get(col)?.is_empty() {
            return Some(String::new());
        }
        Some(std::mem::take(&mut Arc::make_mut(cells)[col]))
    }

    pub fn push_row(&mut self) {
        self.rows.push(Arc::new(vec![String::new(); self.cols]));
    }

    pub fn push_col(&mut self) {
        for row in &mut self.rows {
            Arc::make_mut(row).push(String::new());
        }
        self.cols += 1;
    }

    /// Grow (never shrink) to at least the given size
    pub fn ensure_size(&mut self, rows: usize, cols: usize) {
        while self.cols < cols {
            self.push_col();
        }
        while self.rows.len() < rows {
            self.push_row();
        }
    }

    pub fn remove_row(&mut self, index: usize) -> Result<Vec<String>, SheetError> {
        if index >= self.rows.len() {
            return Err(SheetError::RowOutOfBounds(index));
        }
        if self.rows.len() == 1 {
            return Err(SheetError::LastRow);
        }

        let row = self.rows.remove(index);
        Ok(Arc::try_unwrap(row).unwrap_or_else(|shared| (*shared).clone()))
    }

    pub fn remove_col(&mut self, index: usize) -> Result<(), SheetError> {
        if index >= self.cols {
            return Err(SheetError::ColumnOutOfBounds(index));
        }
        if self.cols == 1 {
            return Err(SheetError::LastColumn);
        }

        for row in &mut self.rows {
            Arc::make_mut(row).remove(index);
        }
        self.cols -= 1;
        Ok(())
    }

    /// Blank every cell inside `range` (clipped to the grid)
    pub fn clear_range(&mut self, range: &CellRange) {
        let last_col = self.cols - 1;
        for row in range.r1..=range.r2.min(self.rows.len() - 1) {
            let cells = &mut self.rows[row];
            let c2 = range.c2.min(last_col);
            if range.c1 > c2 || cells[range.c1..=c2].iter().all(String::is_empty) {
                continue;
            }
            for cell in &mut Arc::make_mut(cells)[range.c1..=c2] {
                cell.clear();
            }
        }
    }

    /// Reorder the rows `start..start + order.len()` so that the new row `i`
    /// is the old row `start + order[i]`.
    pub fn permute_rows(&mut self, start: usize, order: &[usize]) {
        let block: Vec<_> = order
            .iter()
            .map(|&i| Arc::clone(&self.rows[start + i]))
            .collect();
        for (offset, row) in block.into_iter().enumerate() {
            self.rows[start + offset] = row;
        }
    }

    pub fn to_rows(&self) -> Vec<Vec<String>> {
        self.rows.iter().map(|r| r.as_ref().clone()).collect()
    }

    /// Whether row `row` of both grids points at the same storage
    pub fn shares_row_with(&self, other: &Grid, row: usize) -> bool {
        match (self.rows.get(row), other.rows.get(row)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl TryFrom<Vec<Vec<String>>> for Grid {
    type Error = SheetError;

    fn try_from(rows: Vec<Vec<String>>) -> Result<Self, Self::Error> {
        Grid::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<String>> {
    fn from(grid: Grid) -> Self {
        grid.rows
            .into_iter()
            .map(|r| Arc::try_unwrap(r).unwrap_or_else(|shared| (*shared).clone()))
            .collect()
    }
}
