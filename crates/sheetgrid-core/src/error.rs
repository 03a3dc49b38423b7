use thiserror::Error;

use crate::range::CellRange;

/// Errors produced by grid, merge and persistence operations.
///
/// Most of these are swallowed by the editor facade: a refused structural
/// request leaves the sheet untouched and is only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SheetError {
    #[error("cell ({row}, {col}) is outside the grid")]
    OutOfBounds { row: usize, col: usize },

    #[error("row {0} does not exist")]
    RowOutOfBounds(usize),

    #[error("column {0} does not exist")]
    ColumnOutOfBounds(usize),

    #[error("cannot delete the last remaining row")]
    LastRow,

    #[error("cannot delete the last remaining column")]
    LastColumn,

    #[error("grid rows must be non-empty and of equal length")]
    InvalidShape,

    #[error("merge {0} overlaps an existing merge")]
    MergeOverlap(String),

    #[error("a merge must span more than one cell")]
    DegenerateMerge,

    #[error("range {} intersects a merged region", .0.to_a1())]
    MergeInRange(CellRange),

    #[error("invalid search pattern: {0}")]
    InvalidPattern(String),

    #[error("persisted state is malformed: {0}")]
    Persistence(String),

    #[error("storage unavailable: {0}")]
    Storage(String),
}

impl SheetError {
    /// Stable identifier used by the JavaScript bridge.
    pub fn code(&self) -> &'static str {
        match self {
            SheetError::OutOfBounds { .. }
            | SheetError::RowOutOfBounds(_)
            | SheetError::ColumnOutOfBounds(_) => "OUT_OF_BOUNDS",
            SheetError::LastRow | SheetError::LastColumn => "LAST_LINE",
            SheetError::InvalidShape => "INVALID_SHAPE",
            SheetError::MergeOverlap(_) => "MERGE_OVERLAP",
            SheetError::DegenerateMerge => "DEGENERATE_MERGE",
            SheetError::MergeInRange(_) => "MERGE_IN_RANGE",
            SheetError::InvalidPattern(_) => "INVALID_PATTERN",
            SheetError::Persistence(_) => "PERSISTENCE",
            SheetError::Storage(_) => "STORAGE",
        }
    }
}

impl From<serde_json::Error> for SheetError {
    fn from(err: serde_json::Error) -> Self {
        SheetError::Persistence(err.to_string())
    }
}
