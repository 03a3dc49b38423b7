use crate::cell::is_blank;
use crate::config::EditorConfig;
use crate::error::SheetError;
use crate::exchange::{ImportedMerge, MergeCorners, SheetExport};
use crate::grid::Grid;
use crate::merge::{CellSpan, Merge, MergeList};
use crate::range::{CellPosition, CellRange};
use crate::search::Matcher;
use crate::sort::{sorted_order, SortOrder};

/// Column sizing rules applied by a sheet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnDefaults {
    pub width: f64,
    pub min_width: f64,
}

impl From<&EditorConfig> for ColumnDefaults {
    fn from(config: &EditorConfig) -> Self {
        Self {
            width: config.default_col_width,
            min_width: config.min_col_width,
        }
    }
}

impl Default for ColumnDefaults {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

/// The grid store: cell values, column widths and merges.
///
/// `col_widths` always has one entry per grid column and every merge lies
/// inside the grid without overlapping another.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    grid: Grid,
    col_widths: Vec<f64>,
    merges: MergeList,
    defaults: ColumnDefaults,
}

impl Sheet {
    /// Blank sheet of the configured initial size
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_size(config.initial_rows, config.initial_cols, ColumnDefaults::from(config))
    }

    pub fn with_size(rows: usize, cols: usize, defaults: ColumnDefaults) -> Self {
        let grid = Grid::new(rows, cols);
        let col_widths = vec![defaults.width; grid.col_count()];
        Self {
            grid,
            col_widths,
            merges: MergeList::new(),
            defaults,
        }
    }

    /// Assemble a sheet from untrusted parts, repairing widths and merges
    pub fn from_parts(
        grid: Grid,
        widths: &[f64],
        merges: impl IntoIterator<Item = Merge>,
        defaults: ColumnDefaults,
    ) -> Self {
        let col_widths = (0..grid.col_count())
            .map(|i| match widths.get(i) {
                Some(&w) if w.is_finite() => w.max(defaults.min_width),
                _ => defaults.width,
            })
            .collect();
        let merges = MergeList::from_untrusted(merges, grid.row_count(), grid.col_count());
        Self {
            grid,
            col_widths,
            merges,
            defaults,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn merges(&self) -> &MergeList {
        &self.merges
    }

    pub fn col_widths(&self) -> &[f64] {
        &self.col_widths
    }

    pub fn defaults(&self) -> ColumnDefaults {
        self.defaults
    }

    pub fn row_count(&self) -> usize {
        self.grid.row_count()
    }

    pub fn col_count(&self) -> usize {
        self.grid.col_count()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.grid.get(row, col)
    }

    pub fn span_at(&self, pos: CellPosition) -> CellSpan {
        self.merges.span_at(pos)
    }

    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<(), SheetError> {
        self.grid.set(row, col, value)
    }

    pub fn add_row(&mut self) {
        self.grid.push_row();
    }

    pub fn add_column(&mut self) {
        self.grid.push_col();
        self.col_widths.push(self.defaults.width);
    }

    pub fn delete_row(&mut self, index: usize) -> Result<(), SheetError> {
        self.grid.remove_row(index)?;
        self.merges.repair_on_row_delete(index);
        tracing::debug!(index, rows = self.row_count(), "deleted row");
        Ok(())
    }

    pub fn delete_column(&mut self, index: usize) -> Result<(), SheetError> {
        self.grid.remove_col(index)?;
        self.col_widths.remove(index);
        self.merges.repair_on_col_delete(index);
        tracing::debug!(index, cols = self.col_count(), "deleted column");
        Ok(())
    }

    /// Set a column width, clamped to the minimum. Returns the applied width.
    pub fn resize_column(&mut self, index: usize, width: f64) -> Result<f64, SheetError> {
        let slot = self
            .col_widths
            .get_mut(index)
            .ok_or(SheetError::ColumnOutOfBounds(index))?;
        let width = if width.is_finite() {
            width.max(self.defaults.min_width)
        } else {
            self.defaults.min_width
        };
        *slot = width;
        Ok(width)
    }

    /// Merge the cells of `range` into one.
    ///
    /// The range first grows to absorb every merge it touches. Non-blank
    /// values are joined with single spaces (row-major) into the top-left
    /// cell and the rest of the block is blanked. Returns `None` when the
    /// final block is a single cell.
    pub fn combine(&mut self, range: CellRange) -> Option<Merge> {
        let range = range
            .normalized()
            .clamped(self.row_count(), self.col_count());
        let range = self.merges.expand_to_absorb(range);
        if range.is_single_cell() {
            return None;
        }

        let joined = range
            .cells()
            .filter_map(|pos| self.grid.get(pos.row, pos.col))
            .filter(|text| !is_blank(text))
            .map(str::trim)
            .collect::<Vec<_>>()
            .join(" ");

        self.grid.clear_range(&range);
        let anchor = range.top_left();
        self.grid.set(anchor.row, anchor.col, joined).ok()?;

        let absorbed = self.merges.remove_intersecting(&range);
        let merge = Merge::from_range(&range);
        self.merges.insert(merge).ok()?;
        tracing::debug!(range = %range, absorbed = absorbed.len(), "combined cells");
        Some(merge)
    }

    /// Remove every merge touching any of `ranges`; cell values are kept
    pub fn separate(&mut self, ranges: &[CellRange]) -> Vec<Merge> {
        let removed: Vec<Merge> = ranges
            .iter()
            .flat_map(|range| self.merges.remove_intersecting(&range.normalized()))
            .collect();
        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "separated merges");
        }
        removed
    }

    /// Remove the merge containing `pos`
    pub fn separate_at(&mut self, pos: CellPosition) -> Option<Merge> {
        self.merges.remove_containing(pos)
    }

    /// Write a block of values with its top-left at `at`, growing the grid
    /// as needed. Merges overlapping the written area are removed.
    pub fn paste_block(&mut self, at: CellPosition, block: &[Vec<String>]) -> Option<CellRange> {
        let height = block.len();
        let width = block.iter().map(Vec::len).max().unwrap_or(0);
        if height == 0 || width == 0 {
            return None;
        }

        let target = CellRange::new(at.row, at.col, at.row + height - 1, at.col + width - 1);
        while self.col_count() <= target.c2 {
            self.add_column();
        }
        while self.row_count() <= target.r2 {
            self.add_row();
        }
        self.merges.remove_intersecting(&target);

        for (dr, row) in block.iter().enumerate() {
            for (dc, value) in row.iter().enumerate() {
                self.grid.set(at.row + dr, at.col + dc, value.as_str()).ok()?;
            }
        }
        Some(target)
    }

    /// Values of `range` (clipped to the grid) as a 2D block
    pub fn copy_block(&self, range: &CellRange) -> Vec<Vec<String>> {
        let range = range.clamped(self.row_count(), self.col_count());
        (range.r1..=range.r2)
            .map(|row| {
                (range.c1..=range.c2)
                    .map(|col| self.grid.get(row, col).unwrap_or_default().to_string())
                    .collect()
            })
            .collect()
    }

    pub fn clear_range(&mut self, range: &CellRange) {
        self.grid.clear_range(&range.normalized());
    }

    /// Blank every cell and drop all merges; dimensions are kept
    pub fn clear_all(&mut self) {
        self.grid.clear_range(&self.grid.full_range());
        self.merges.clear();
    }

    /// Reorder the rows `range.r1..=range.r2` by the value in `key_col`.
    ///
    /// Whole rows move together, so the request is refused if any merge
    /// intersects those rows.
    pub fn sort_rows(
        &mut self,
        range: CellRange,
        key_col: usize,
        order: SortOrder,
    ) -> Result<(), SheetError> {
        if key_col >= self.col_count() {
            return Err(SheetError::ColumnOutOfBounds(key_col));
        }
        let range = range.normalized();
        if range.r2 >= self.row_count() {
            return Err(SheetError::RowOutOfBounds(range.r2));
        }

        let rows = CellRange::new(range.r1, 0, range.r2, self.col_count() - 1);
        if self.merges.intersects(&rows) {
            return Err(SheetError::MergeInRange(rows));
        }

        let keys: Vec<&str> = (range.r1..=range.r2)
            .map(|row| self.grid.get(row, key_col).unwrap_or_default())
            .collect();
        let order = sorted_order(&keys, order);
        self.grid.permute_rows(range.r1, &order);
        Ok(())
    }

    /// Replace every match in every cell, returning the number of cells changed
    pub fn replace_all(&mut self, matcher: &Matcher, replacement: &str) -> usize {
        let changes: Vec<(usize, usize, String)> = self
            .grid
            .rows()
            .enumerate()
            .flat_map(|(row, cells)| {
                cells.iter().enumerate().filter_map(move |(col, text)| {
                    matcher
                        .replace_all(text, replacement)
                        .filter(|replaced| replaced != text)
                        .map(|replaced| (row, col, replaced))
                })
            })
            .collect();

        let count = changes.len();
        for (row, col, value) in changes {
            // positions come from the grid itself
            let _ = self.grid.set(row, col, value);
        }
        count
    }

    /// Replace contents with imported rows and merges.
    ///
    /// Ragged rows are padded; an empty import yields a blank grid of
    /// `fallback` size. Known column widths are kept by index.
    pub fn import(&mut self, rows: Vec<Vec<String>>, merges: Vec<ImportedMerge>, fallback: (usize, usize)) {
        let grid = Grid::from_ragged(rows).unwrap_or_else(|| Grid::new(fallback.0, fallback.1));
        let widths = std::mem::take(&mut self.col_widths);
        *self = Sheet::from_parts(
            grid,
            &widths,
            merges.into_iter().map(ImportedMerge::to_merge),
            self.defaults,
        );
        tracing::debug!(
            rows = self.row_count(),
            cols = self.col_count(),
            merges = self.merges.len(),
            "imported sheet"
        );
    }

    pub fn export(&self) -> SheetExport {
        SheetExport {
            rows: self.grid.to_rows(),
            merges: self.merges.iter().map(MergeCorners::from).collect(),
        }
    }
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: usize, cols: usize) -> Sheet {
        Sheet::with_size(rows, cols, ColumnDefaults::default())
    }

    fn fill(sheet: &mut Sheet, values: &[&[&str]]) {
        for (r, row) in values.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                sheet.set_cell(r, c, *v).unwrap();
            }
        }
    }

    #[test]
    fn test_default_size() {
        let sheet = Sheet::default();
        assert_eq!(sheet.row_count(), 46);
        assert_eq!(sheet.col_count(), 22);
        assert_eq!(sheet.col_widths().len(), 22);
    }

    #[test]
    fn test_set_cell_changes_only_target() {
        let mut sheet = sheet(3, 3);
        sheet.set_cell(1, 1, "x").unwrap();
        for pos in sheet.grid().full_range().cells() {
            let expected = if pos == CellPosition::new(1, 1) { "x" } else { "" };
            assert_eq!(sheet.get(pos.row, pos.col), Some(expected));
        }
        assert!(sheet.set_cell(3, 0, "y").is_err());
    }

    #[test]
    fn test_add_then_delete_row_restores() {
        let mut sheet = sheet(2, 2);
        fill(&mut sheet, &[&["a", "b"], &["c", "d"]]);
        let before = sheet.clone();

        sheet.add_row();
        assert_eq!(sheet.row_count(), 3);
        sheet.delete_row(2).unwrap();
        assert_eq!(sheet, before);
    }

    #[test]
    fn test_add_and_delete_column_keeps_widths_parallel() {
        let mut sheet = sheet(2, 2);
        sheet.resize_column(1, 200.0).unwrap();
        sheet.add_column();
        assert_eq!(sheet.col_widths(), &[96.0, 200.0, 96.0]);

        sheet.delete_column(0).unwrap();
        assert_eq!(sheet.col_widths(), &[200.0, 96.0]);
        assert_eq!(sheet.grid().col_count(), 2);
    }

    #[test]
    fn test_delete_refuses_last_line() {
        let mut sheet = sheet(1, 1);
        assert_eq!(sheet.delete_row(0), Err(SheetError::LastRow));
        assert_eq!(sheet.delete_column(0), Err(SheetError::LastColumn));
        assert_eq!(sheet.col_widths().len(), 1);
    }

    #[test]
    fn test_resize_clamps_to_minimum() {
        let mut sheet = sheet(1, 2);
        assert_eq!(sheet.resize_column(0, 10.0), Ok(40.0));
        assert_eq!(sheet.resize_column(1, 150.0), Ok(150.0));
        assert_eq!(sheet.resize_column(2, 150.0), Err(SheetError::ColumnOutOfBounds(2)));
    }

    #[test]
    fn test_combine_joins_values() {
        let mut sheet = sheet(3, 3);
        fill(&mut sheet, &[&["A", "B"], &["C", "D"]]);

        let merge = sheet.combine(CellRange::new(0, 0, 1, 1)).unwrap();

        assert_eq!(merge, Merge::new(0, 0, 2, 2));
        assert_eq!(sheet.get(0, 0), Some("A B C D"));
        assert_eq!(sheet.get(0, 1), Some(""));
        assert_eq!(sheet.get(1, 0), Some(""));
        assert_eq!(sheet.get(1, 1), Some(""));
        assert_eq!(sheet.merges().as_slice(), &[merge]);
    }

    #[test]
    fn test_combine_skips_blanks() {
        let mut sheet = sheet(2, 3);
        fill(&mut sheet, &[&["x", "", " y "]]);
        sheet.combine(CellRange::new(0, 0, 0, 2)).unwrap();
        assert_eq!(sheet.get(0, 0), Some("x y"));
    }

    #[test]
    fn test_combine_single_cell_is_noop() {
        let mut sheet = sheet(2, 2);
        sheet.set_cell(0, 0, "a").unwrap();
        assert!(sheet.combine(CellRange::new(0, 0, 0, 0)).is_none());
        assert!(sheet.merges().is_empty());
        assert_eq!(sheet.get(0, 0), Some("a"));
    }

    #[test]
    fn test_combine_inside_merge_absorbs_it() {
        let mut sheet = sheet(4, 4);
        let outer = sheet.combine(CellRange::new(0, 0, 2, 2)).unwrap();
        let again = sheet.combine(CellRange::new(1, 1, 1, 2)).unwrap();
        assert_eq!(again, outer);
        assert_eq!(sheet.merges().len(), 1);
    }

    #[test]
    fn test_combine_partial_overlap_expands() {
        let mut sheet = sheet(4, 4);
        sheet.combine(CellRange::new(0, 1, 1, 2)).unwrap();
        let merge = sheet.combine(CellRange::new(1, 0, 2, 1)).unwrap();
        assert_eq!(merge.range(), CellRange::new(0, 0, 2, 2));
        assert_eq!(sheet.merges().as_slice(), &[merge]);
    }

    #[test]
    fn test_separate_keeps_values() {
        let mut sheet = sheet(3, 3);
        fill(&mut sheet, &[&["A", "B"], &["C", "D"]]);
        sheet.combine(CellRange::new(0, 0, 1, 1)).unwrap();

        let removed = sheet.separate(&[CellRange::new(0, 0, 1, 1)]);
        assert_eq!(removed.len(), 1);
        assert!(sheet.merges().is_empty());
        assert_eq!(sheet.get(0, 0), Some("A B C D"));
    }

    #[test]
    fn test_separate_at_position() {
        let mut sheet = sheet(3, 3);
        sheet.combine(CellRange::new(1, 1, 2, 2)).unwrap();
        assert!(sheet.separate_at(CellPosition::new(0, 0)).is_none());
        assert!(sheet.separate_at(CellPosition::new(2, 2)).is_some());
        assert!(sheet.merges().is_empty());
    }

    #[test]
    fn test_delete_column_repairs_merge() {
        let mut sheet = sheet(3, 6);
        sheet.combine(CellRange::new(0, 1, 0, 3)).unwrap();
        sheet.combine(CellRange::new(1, 4, 2, 5)).unwrap();

        sheet.delete_column(2).unwrap();

        assert_eq!(
            sheet.merges().as_slice(),
            &[Merge::new(0, 1, 1, 2), Merge::new(1, 3, 2, 2)]
        );
    }

    #[test]
    fn test_paste_block_grows_grid() {
        let mut sheet = sheet(2, 2);
        let block = vec![
            vec!["1".to_string(), "2".to_string(), "3".to_string()],
            vec!["4".to_string()],
        ];
        let target = sheet.paste_block(CellPosition::new(1, 1), &block).unwrap();

        assert_eq!(target, CellRange::new(1, 1, 2, 3));
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.col_count(), 4);
        assert_eq!(sheet.col_widths().len(), 4);
        assert_eq!(sheet.get(1, 3), Some("3"));
        assert_eq!(sheet.get(2, 1), Some("4"));
        assert_eq!(sheet.get(2, 2), Some(""));
    }

    #[test]
    fn test_copy_block() {
        let mut sheet = sheet(3, 3);
        fill(&mut sheet, &[&["a", "b", "c"], &["d", "e", "f"]]);
        assert_eq!(
            sheet.copy_block(&CellRange::new(0, 1, 1, 2)),
            vec![vec!["b", "c"], vec!["e", "f"]]
        );
    }

    #[test]
    fn test_clear_all_drops_merges() {
        let mut sheet = sheet(2, 2);
        fill(&mut sheet, &[&["a", "b"]]);
        sheet.combine(CellRange::new(0, 0, 0, 1)).unwrap();
        sheet.clear_all();
        assert!(sheet.merges().is_empty());
        assert!(sheet.grid().rows().all(|r| r.iter().all(String::is_empty)));
        assert_eq!(sheet.row_count(), 2);
    }

    #[test]
    fn test_sort_rows_moves_whole_rows() {
        let mut sheet = sheet(4, 2);
        fill(&mut sheet, &[&["h", "x"], &["b", "10"], &["a", "2"], &["", "1"]]);

        sheet.sort_rows(CellRange::new(1, 1, 3, 1), 1, SortOrder::Asc).unwrap();

        assert_eq!(
            sheet.grid().to_rows(),
            vec![vec!["h", "x"], vec!["", "1"], vec!["a", "2"], vec!["b", "10"]]
        );
    }

    #[test]
    fn test_sort_refused_with_merge() {
        let mut sheet = sheet(4, 3);
        sheet.combine(CellRange::new(2, 1, 2, 2)).unwrap();
        let before = sheet.clone();
        assert!(matches!(
            sheet.sort_rows(CellRange::new(0, 0, 3, 0), 0, SortOrder::Asc),
            Err(SheetError::MergeInRange(_))
        ));
        assert_eq!(sheet, before);
    }

    #[test]
    fn test_replace_all_counts_cells() {
        use crate::search::SearchOptions;

        let mut sheet = sheet(2, 2);
        fill(&mut sheet, &[&["cat cat", "dog"], &["Cat", ""]]);
        let matcher = Matcher::new(&SearchOptions::literal("cat")).unwrap();

        assert_eq!(sheet.replace_all(&matcher, "bird"), 2);
        assert_eq!(sheet.get(0, 0), Some("bird bird"));
        assert_eq!(sheet.get(1, 0), Some("bird"));
        assert_eq!(sheet.get(0, 1), Some("dog"));
    }

    #[test]
    fn test_import_pads_and_filters() {
        let mut sheet = sheet(2, 2);
        sheet.resize_column(0, 150.0).unwrap();
        let rows = vec![vec!["a".to_string()], vec!["b".to_string(), "c".to_string(), "d".to_string()]];
        let merges = vec![
            ImportedMerge::new(0, 1, 1, 2),
            ImportedMerge::new(0, 0, 0, 0),
            ImportedMerge::new(1, 0, 5, 0),
        ];

        sheet.import(rows, merges, (46, 22));

        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.col_count(), 3);
        assert_eq!(sheet.get(0, 2), Some(""));
        assert_eq!(sheet.col_widths(), &[150.0, 96.0, 96.0]);
        assert_eq!(sheet.merges().as_slice(), &[Merge::new(0, 1, 2, 2)]);
    }

    #[test]
    fn test_import_empty_uses_fallback() {
        let mut sheet = sheet(2, 2);
        sheet.import(vec![], vec![], (5, 4));
        assert_eq!(sheet.row_count(), 5);
        assert_eq!(sheet.col_count(), 4);
    }

    #[test]
    fn test_export_corners() {
        let mut sheet = sheet(3, 3);
        sheet.combine(CellRange::new(0, 0, 1, 2)).unwrap();
        let export = sheet.export();
        assert_eq!(export.rows.len(), 3);
        assert_eq!(
            export.merges,
            vec![MergeCorners {
                start: CellPosition::new(0, 0),
                end: CellPosition::new(1, 2),
            }]
        );
    }
}
