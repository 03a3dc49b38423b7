use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell position (0-indexed internally)
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPosition {
    pub row: usize,
    pub col: usize,
}

impl CellPosition {
    pub const fn new(row: usize, col: usize) -> Self {
        CellPosition { row, col }
    }

    pub const fn origin() -> Self {
        CellPosition { row: 0, col: 0 }
    }

    /// Create from A1 notation (e.g., "A1" -> (0, 0), "B2" -> (1, 1))
    pub fn from_a1(notation: &str) -> Option<Self> {
        let notation = notation.trim();
        let split = notation
            .find(|c: char| c.is_ascii_digit())
            .filter(|&idx| idx > 0)?;
        let (letters, digits) = notation.split_at(split);

        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }

        let col = col_from_label(letters)?;
        let row: usize = digits.parse().ok()?;

        if row == 0 {
            return None; // Rows are 1-indexed in A1 notation
        }

        Some(CellPosition { row: row - 1, col })
    }

    /// Convert to A1 notation (e.g., (0, 0) -> "A1")
    pub fn to_a1(&self) -> String {
        format!("{}{}", col_to_label(self.col), self.row + 1)
    }

    /// Check if this position is within a grid of the given size
    pub fn is_valid(&self, rows: usize, cols: usize) -> bool {
        self.row < rows && self.col < cols
    }

    /// Clamp into a grid of the given size (both dimensions must be >= 1)
    pub fn clamped(&self, rows: usize, cols: usize) -> Self {
        CellPosition {
            row: self.row.min(rows.saturating_sub(1)),
            col: self.col.min(cols.saturating_sub(1)),
        }
    }
}

impl fmt::Display for CellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: usize) -> String {
    let mut label = String::new();
    let mut n = col + 1; // 1-indexed for calculation

    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }

    label
}

/// Convert column label (A, B, ..., Z, AA, AB, ...) to index (0-indexed)
pub fn col_from_label(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }

    let mut col: usize = 0;
    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as usize - 'A' as usize + 1)?;
    }

    Some(col - 1)
}

/// An inclusive rectangular range of cells.
///
/// Constructors normalize the corners so that `r1 <= r2` and `c1 <= c2`.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub r1: usize,
    pub c1: usize,
    pub r2: usize,
    pub c2: usize,
}

impl CellRange {
    pub fn new(r1: usize, c1: usize, r2: usize, c2: usize) -> Self {
        CellRange {
            r1: r1.min(r2),
            c1: c1.min(c2),
            r2: r1.max(r2),
            c2: c1.max(c2),
        }
    }

    /// Build a range from two corners given in any order
    pub fn from_corners(a: CellPosition, b: CellPosition) -> Self {
        Self::new(a.row, a.col, b.row, b.col)
    }

    pub fn single(pos: CellPosition) -> Self {
        Self::new(pos.row, pos.col, pos.row, pos.col)
    }

    /// Re-normalize a range that may have been deserialized with swapped corners
    pub fn normalized(&self) -> Self {
        Self::new(self.r1, self.c1, self.r2, self.c2)
    }

    /// Create from A1:B1 notation
    pub fn from_a1(notation: &str) -> Option<Self> {
        match notation.split_once(':') {
            None => CellPosition::from_a1(notation).map(Self::single),
            Some((start, end)) => {
                let start = CellPosition::from_a1(start)?;
                let end = CellPosition::from_a1(end)?;
                Some(Self::from_corners(start, end))
            }
        }
    }

    /// Convert to A1:B1 notation
    pub fn to_a1(&self) -> String {
        if self.is_single_cell() {
            self.top_left().to_a1()
        } else {
            format!("{}:{}", self.top_left().to_a1(), self.bottom_right().to_a1())
        }
    }

    pub fn top_left(&self) -> CellPosition {
        CellPosition::new(self.r1, self.c1)
    }

    pub fn bottom_right(&self) -> CellPosition {
        CellPosition::new(self.r2, self.c2)
    }

    pub fn row_count(&self) -> usize {
        self.r2 - self.r1 + 1
    }

    pub fn col_count(&self) -> usize {
        self.c2 - self.c1 + 1
    }

    pub fn cell_count(&self) -> usize {
        self.row_count() * self.col_count()
    }

    pub fn is_single_cell(&self) -> bool {
        self.r1 == self.r2 && self.c1 == self.c2
    }

    pub fn contains(&self, pos: CellPosition) -> bool {
        pos.row >= self.r1 && pos.row <= self.r2 && pos.col >= self.c1 && pos.col <= self.c2
    }

    /// Check if `other` lies entirely inside this range
    pub fn contains_range(&self, other: &CellRange) -> bool {
        other.r1 >= self.r1 && other.r2 <= self.r2 && other.c1 >= self.c1 && other.c2 <= self.c2
    }

    /// Check if this range intersects with another range
    pub fn intersects(&self, other: &CellRange) -> bool {
        !(self.r2 < other.r1 || self.r1 > other.r2 || self.c2 < other.c1 || self.c1 > other.c2)
    }

    /// Smallest range covering both ranges
    pub fn union(&self, other: &CellRange) -> Self {
        CellRange {
            r1: self.r1.min(other.r1),
            c1: self.c1.min(other.c1),
            r2: self.r2.max(other.r2),
            c2: self.c2.max(other.c2),
        }
    }

    /// Bounding box of a set of ranges, `None` when the set is empty
    pub fn bounding_box<'a>(ranges: impl IntoIterator<Item = &'a CellRange>) -> Option<Self> {
        ranges
            .into_iter()
            .fold(None, |acc: Option<CellRange>, r| {
                Some(acc.map_or(*r, |a| a.union(r)))
            })
    }

    /// Clamp both corners into a grid of the given size
    pub fn clamped(&self, rows: usize, cols: usize) -> Self {
        let tl = self.top_left().clamped(rows, cols);
        let br = self.bottom_right().clamped(rows, cols);
        Self::from_corners(tl, br)
    }

    /// Part of the range that lies inside a grid of the given size, `None`
    /// when they do not overlap
    pub fn within(&self, rows: usize, cols: usize) -> Option<Self> {
        if self.r1 >= rows || self.c1 >= cols {
            return None;
        }
        Some(CellRange {
            r1: self.r1,
            c1: self.c1,
            r2: self.r2.min(rows - 1),
            c2: self.c2.min(cols - 1),
        })
    }

    /// Iterate over all positions in the range (row by row)
    pub fn cells(&self) -> impl Iterator<Item = CellPosition> {
        let (r1, r2, c1, c2) = (self.r1, self.r2, self.c1, self.c2);
        (r1..=r2).flat_map(move |row| (c1..=c2).map(move |col| CellPosition::new(row, col)))
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}
