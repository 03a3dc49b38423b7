//! Shapes exchanged with the file import/export adapters.

use serde::{Deserialize, Serialize};

use crate::merge::Merge;
use crate::range::{CellPosition, CellRange};

/// A merge region as reported by a file reader, with inclusive corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedMerge {
    pub start_row: usize,
    pub start_col: usize,
    pub end_row: usize,
    pub end_col: usize,
}

impl ImportedMerge {
    pub fn new(start_row: usize, start_col: usize, end_row: usize, end_col: usize) -> Self {
        Self {
            start_row,
            start_col,
            end_row,
            end_col,
        }
    }

    /// Corners given in either order are normalized
    pub fn to_merge(self) -> Merge {
        let range = CellRange::new(self.start_row, self.start_col, self.end_row, self.end_col);
        Merge::from_range(&range)
    }
}

/// A merge as handed to a file writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeCorners {
    pub start: CellPosition,
    pub end: CellPosition,
}

impl From<&Merge> for MergeCorners {
    fn from(merge: &Merge) -> Self {
        let range = merge.range();
        Self {
            start: range.top_left(),
            end: range.bottom_right(),
        }
    }
}

/// Everything a file writer needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetExport {
    pub rows: Vec<Vec<String>>,
    pub merges: Vec<MergeCorners>,
}
