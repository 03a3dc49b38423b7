use serde::{Deserialize, Serialize};

use crate::conditional_format::ConditionalFormats;
use crate::merge::CellSpan;
use crate::range::{col_to_label, CellPosition};
use crate::search::Matcher;
use crate::sheet::Sheet;
use crate::state::SelectionEngine;

/// Number of leading rows and columns pinned while scrolling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreezePanes {
    pub rows: usize,
    pub cols: usize,
}

impl FreezePanes {
    pub fn clamped(self, rows: usize, cols: usize) -> Self {
        Self {
            rows: self.rows.min(rows),
            cols: self.cols.min(cols),
        }
    }

    pub fn contains(&self, pos: CellPosition) -> bool {
        pos.row < self.rows || pos.col < self.cols
    }
}

/// Everything the presentation layer needs to draw one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellView {
    pub row: usize,
    pub col: usize,
    pub value: String,
    pub span: CellSpan,
    pub is_anchor: bool,
    pub is_selected: bool,
    pub is_multi_selected: bool,
    pub is_dragging: bool,
    pub is_search_match: bool,
    pub is_frozen: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

/// Borrowed view of editor state used to build [`CellView`]s
pub struct RenderContext<'a> {
    pub sheet: &'a Sheet,
    pub selection: &'a SelectionEngine,
    pub formats: &'a ConditionalFormats,
    pub search: Option<&'a Matcher>,
    pub freeze: FreezePanes,
}

impl RenderContext<'_> {
    pub fn cell(&self, pos: CellPosition) -> Option<CellView> {
        let value = self.sheet.get(pos.row, pos.col)?;
        let state = self.selection.state();
        let style = self.formats.style_for(pos, value);

        Some(CellView {
            row: pos.row,
            col: pos.col,
            value: value.to_string(),
            span: self.sheet.span_at(pos),
            is_anchor: state.is_anchor(pos),
            is_selected: state.is_selected(pos),
            is_multi_selected: state.is_multi_selected(pos),
            is_dragging: self.selection.is_dragging(pos),
            is_search_match: self.search.map_or(false, |m| m.is_match(value)),
            is_frozen: self.freeze.contains(pos),
            background_color: style.as_ref().map(|s| s.background_color.to_string()),
            text_color: style.and_then(|s| s.text_color.map(str::to_string)),
        })
    }

    /// Views for every cell that is drawn, row by row. Cells hidden under a
    /// merge are left out; the merge anchor carries the span instead.
    pub fn render_cells(&self) -> Vec<CellView> {
        self.sheet
            .grid()
            .full_range()
            .cells()
            .filter(|&pos| !matches!(self.sheet.span_at(pos), CellSpan::Covered { .. }))
            .filter_map(|pos| self.cell(pos))
            .collect()
    }
}

/// Column header labels (A, B, ... AA)
pub fn column_headers(cols: usize) -> Vec<String> {
    (0..cols).map(col_to_label).collect()
}

/// 1-based row header labels
pub fn row_headers(rows: usize) -> Vec<String> {
    (1..=rows).map(|r| r.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditional_format::{ConditionalFormatRule, RuleKind};
    use crate::range::CellRange;
    use crate::search::SearchOptions;
    use crate::sheet::ColumnDefaults;
    use crate::state::SelectionModifiers;

    fn setup() -> (Sheet, SelectionEngine, ConditionalFormats) {
        let mut sheet = Sheet::with_size(3, 3, ColumnDefaults::default());
        sheet.set_cell(0, 0, "10").unwrap();
        sheet.set_cell(2, 2, "apple").unwrap();
        sheet.combine(CellRange::new(1, 0, 1, 1));
        (sheet, SelectionEngine::new(), ConditionalFormats::new())
    }

    #[test]
    fn test_render_skips_covered_cells() {
        let (sheet, selection, formats) = setup();
        let ctx = RenderContext {
            sheet: &sheet,
            selection: &selection,
            formats: &formats,
            search: None,
            freeze: FreezePanes::default(),
        };
        let cells = ctx.render_cells();

        assert_eq!(cells.len(), 8);
        let anchor = cells.iter().find(|c| c.row == 1 && c.col == 0).unwrap();
        assert_eq!(anchor.span, CellSpan::Anchor { rows: 1, cols: 2 });
        assert!(!cells.iter().any(|c| c.row == 1 && c.col == 1));
    }

    #[test]
    fn test_flags_and_styles() {
        let (sheet, mut selection, mut formats) = setup();
        selection.click(CellPosition::new(0, 0), SelectionModifiers::NONE);
        selection.click(CellPosition::new(2, 2), SelectionModifiers::ADDITIVE);
        formats.add_rule(ConditionalFormatRule::new(RuleKind::Gt, "5", "#ff0").with_text_color("#000"));
        let matcher = Matcher::new(&SearchOptions::literal("APP")).unwrap();

        let ctx = RenderContext {
            sheet: &sheet,
            selection: &selection,
            formats: &formats,
            search: Some(&matcher),
            freeze: FreezePanes { rows: 1, cols: 0 },
        };

        let a1 = ctx.cell(CellPosition::new(0, 0)).unwrap();
        assert!(a1.is_anchor);
        assert!(a1.is_frozen);
        assert_eq!(a1.background_color.as_deref(), Some("#ff0"));
        assert_eq!(a1.text_color.as_deref(), Some("#000"));

        let c3 = ctx.cell(CellPosition::new(2, 2)).unwrap();
        assert!(c3.is_selected);
        assert!(c3.is_multi_selected);
        assert!(c3.is_search_match);
        assert!(!c3.is_frozen);
        assert!(c3.background_color.is_none());
    }

    #[test]
    fn test_headers() {
        assert_eq!(column_headers(3), vec!["A", "B", "C"]);
        assert_eq!(column_headers(28)[27], "AB");
        assert_eq!(row_headers(2), vec!["1", "2"]);
    }

    #[test]
    fn test_freeze_clamp() {
        let freeze = FreezePanes { rows: 10, cols: 2 }.clamped(4, 5);
        assert_eq!(freeze, FreezePanes { rows: 4, cols: 2 });
    }
}
