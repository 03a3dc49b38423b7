use serde::{Deserialize, Serialize};

use crate::error::SheetError;
use crate::range::{CellPosition, CellRange};

/// A rectangular block of cells treated as one logical cell.
///
/// The value lives at the anchor `(r, c)`; every other cell of the block is
/// a blank placeholder.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merge {
    pub r: usize,
    pub c: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Merge {
    pub fn new(r: usize, c: usize, rows: usize, cols: usize) -> Self {
        Self { r, c, rows, cols }
    }

    pub fn from_range(range: &CellRange) -> Self {
        Self {
            r: range.r1,
            c: range.c1,
            rows: range.row_count(),
            cols: range.col_count(),
        }
    }

    pub fn range(&self) -> CellRange {
        CellRange::new(self.r, self.c, self.r + self.rows - 1, self.c + self.cols - 1)
    }

    pub fn anchor(&self) -> CellPosition {
        CellPosition::new(self.r, self.c)
    }

    pub fn contains(&self, pos: CellPosition) -> bool {
        pos.row >= self.r
            && pos.row < self.r + self.rows
            && pos.col >= self.c
            && pos.col < self.c + self.cols
    }

    pub fn intersects(&self, range: &CellRange) -> bool {
        self.range().intersects(range)
    }

    fn is_degenerate(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

/// How a single grid cell takes part in merging, for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CellSpan {
    /// Not part of any merge
    Single,
    /// Top-left cell of a merge; rendered spanning the whole block
    Anchor { rows: usize, cols: usize },
    /// Hidden placeholder inside a merge
    Covered { anchor: CellPosition },
}

/// The set of merges of a sheet. Merges never overlap each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergeList {
    merges: Vec<Merge>,
}

impl MergeList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from untrusted merges (imported files, persisted state).
    ///
    /// Merges that fall outside the grid, cover a single cell, or overlap an
    /// earlier accepted merge are dropped.
    pub fn from_untrusted(merges: impl IntoIterator<Item = Merge>, rows: usize, cols: usize) -> Self {
        let mut list = Self::new();
        for merge in merges {
            if merge.is_degenerate() || merge.r + merge.rows > rows || merge.c + merge.cols > cols {
                tracing::debug!(?merge, "dropping merge outside the grid");
                continue;
            }
            if let Err(err) = list.insert(merge) {
                tracing::debug!(?merge, %err, "dropping merge");
            }
        }
        list
    }

    pub fn len(&self) -> usize {
        self.merges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Merge> {
        self.merges.iter()
    }

    pub fn as_slice(&self) -> &[Merge] {
        &self.merges
    }

    pub fn clear(&mut self) {
        self.merges.clear();
    }

    /// The merge covering `pos`, if any
    pub fn find_containing(&self, pos: CellPosition) -> Option<&Merge> {
        self.merges.iter().find(|m| m.contains(pos))
    }

    pub fn span_at(&self, pos: CellPosition) -> CellSpan {
        match self.find_containing(pos) {
            Some(m) if m.anchor() == pos => CellSpan::Anchor {
                rows: m.rows,
                cols: m.cols,
            },
            Some(m) => CellSpan::Covered { anchor: m.anchor() },
            None => CellSpan::Single,
        }
    }

    pub fn intersects(&self, range: &CellRange) -> bool {
        self.merges.iter().any(|m| m.intersects(range))
    }

    /// Add a merge, keeping the list free of overlaps and 1x1 blocks
    pub fn insert(&mut self, merge: Merge) -> Result<(), SheetError> {
        if merge.rows * merge.cols <= 1 {
            return Err(SheetError::DegenerateMerge);
        }
        let range = merge.range();
        if self.intersects(&range) {
            return Err(SheetError::MergeOverlap(range.to_a1()));
        }
        self.merges.push(merge);
        Ok(())
    }

    /// Grow `range` until it fully contains every merge it touches.
    ///
    /// Absorbing one merge can bring the range into contact with another,
    /// so this repeats until nothing partially overlaps.
    pub fn expand_to_absorb(&self, range: CellRange) -> CellRange {
        let mut expanded = range;
        loop {
            let grown = self
                .merges
                .iter()
                .map(Merge::range)
                .filter(|m| m.intersects(&expanded) && !expanded.contains_range(m))
                .fold(expanded, |acc, m| acc.union(&m));

            if grown == expanded {
                return expanded;
            }
            expanded = grown;
        }
    }

    /// Remove every merge that touches `range`, returning what was removed
    pub fn remove_intersecting(&mut self, range: &CellRange) -> Vec<Merge> {
        let (removed, kept): (Vec<Merge>, Vec<Merge>) = std::mem::take(&mut self.merges)
            .into_iter()
            .partition(|m| m.intersects(range));
        self.merges = kept;
        removed
    }

    /// Remove the merge covering `pos`, if any
    pub fn remove_containing(&mut self, pos: CellPosition) -> Option<Merge> {
        let idx = self.merges.iter().position(|m| m.contains(pos))?;
        Some(self.merges.remove(idx))
    }

    /// Shift and shrink merges after row `index` was deleted
    pub fn repair_on_row_delete(&mut self, index: usize) {
        for m in &mut self.merges {
            if m.r > index {
                m.r -= 1;
            } else if index < m.r + m.rows {
                m.rows -= 1;
            }
        }
        self.merges.retain(|m| !m.is_degenerate());
    }

    /// Shift and shrink merges after column `index` was deleted
    pub fn repair_on_col_delete(&mut self, index: usize) {
        for m in &mut self.merges {
            if m.c > index {
                m.c -= 1;
            } else if index < m.c + m.cols {
                m.cols -= 1;
            }
        }
        self.merges.retain(|m| !m.is_degenerate());
    }
}
