use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::merge::MergeList;
use crate::range::{CellPosition, CellRange};

/// Modifier keys relevant to selection, passed with every pointer event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionModifiers {
    /// Extend from the anchor (shift)
    pub range: bool,
    /// Toggle additional cells (ctrl / meta)
    pub additive: bool,
}

impl SelectionModifiers {
    pub const NONE: Self = Self {
        range: false,
        additive: false,
    };
    pub const RANGE: Self = Self {
        range: true,
        additive: false,
    };
    pub const ADDITIVE: Self = Self {
        range: false,
        additive: true,
    };
}

/// The primary rectangular selection. `start` is the fixed end and `end`
/// follows the pointer; the two may be in any order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragRange {
    pub start: CellPosition,
    pub end: CellPosition,
}

impl DragRange {
    pub fn new(start: CellPosition, end: CellPosition) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> CellRange {
        CellRange::from_corners(self.start, self.end)
    }
}

/// Which cells are selected. Captured by history snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    /// The anchor cell
    pub selected: Option<CellPosition>,
    /// The primary range, if any
    pub drag: Option<DragRange>,
    /// Ranges added with the additive modifier
    pub extra_selections: Vec<CellRange>,
}

/// Rectangle a combine request should merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineTarget {
    Range(CellRange),
    /// The additive selections leave gaps in their bounding box
    NeedsConfirmation(CellRange),
    Nothing,
}

impl SelectionState {
    pub fn drag_range(&self) -> Option<CellRange> {
        self.drag.map(|d| d.range())
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none() && self.drag.is_none() && self.extra_selections.is_empty()
    }

    pub fn is_anchor(&self, pos: CellPosition) -> bool {
        self.selected == Some(pos)
    }

    /// Inside the drag range or any additive range
    pub fn is_selected(&self, pos: CellPosition) -> bool {
        self.drag_range().map_or(false, |r| r.contains(pos)) || self.is_multi_selected(pos)
    }

    pub fn is_multi_selected(&self, pos: CellPosition) -> bool {
        self.extra_selections.iter().any(|r| r.contains(pos))
    }

    /// The drag range together with every additive range; just the anchor
    /// cell when neither exists
    pub fn target_ranges(&self) -> Vec<CellRange> {
        let ranges: Vec<CellRange> = self
            .drag_range()
            .into_iter()
            .chain(self.extra_selections.iter().copied())
            .collect();
        if ranges.is_empty() {
            self.selected.map(CellRange::single).into_iter().collect()
        } else {
            ranges
        }
    }

    /// Top-left of the drag range, or the anchor
    pub fn origin(&self) -> Option<CellPosition> {
        self.drag_range().map(|r| r.top_left()).or(self.selected)
    }

    /// Rectangle for a combine request: the drag range if present, else the
    /// bounding box of the additive ranges. A bounding box the additive
    /// ranges don't fully cover needs the user's confirmation.
    pub fn combine_target(&self) -> CombineTarget {
        if let Some(range) = self.drag_range() {
            return CombineTarget::Range(range);
        }

        let Some(bbox) = CellRange::bounding_box(&self.extra_selections) else {
            return CombineTarget::Nothing;
        };
        let covered: HashSet<CellPosition> = self
            .extra_selections
            .iter()
            .flat_map(|r| r.cells())
            .collect();

        if covered.len() == bbox.cell_count() {
            CombineTarget::Range(bbox)
        } else {
            CombineTarget::NeedsConfirmation(bbox)
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Pull every position back inside a grid of the given size
    pub fn clamp(&mut self, rows: usize, cols: usize) {
        if let Some(pos) = &mut self.selected {
            *pos = pos.clamped(rows, cols);
        }
        if let Some(drag) = &mut self.drag {
            drag.start = drag.start.clamped(rows, cols);
            drag.end = drag.end.clamped(rows, cols);
        }
        for range in &mut self.extra_selections {
            *range = range.clamped(rows, cols);
        }
    }
}

/// Row or column gutter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "camelCase")]
pub enum Header {
    Row(usize),
    Column(usize),
}

impl Header {
    fn span_to(self, other: Header, rows: usize, cols: usize) -> Option<CellRange> {
        match (self, other) {
            (Header::Row(a), Header::Row(b)) => Some(CellRange::new(a, 0, b, cols.saturating_sub(1))),
            (Header::Column(a), Header::Column(b)) => Some(CellRange::new(0, a, rows.saturating_sub(1), b)),
            _ => None,
        }
    }
}

/// Turns pointer and keyboard events into [`SelectionState`] updates.
///
/// Modifier keys arrive with each event instead of being tracked globally.
#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    state: SelectionState,
    button_held: bool,
    dragging: bool,
    suppress_click: bool,
    header_drag: Option<Header>,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn button_held(&self) -> bool {
        self.button_held
    }

    /// Whether the pointer moved across cells during the current press
    pub fn dragging(&self) -> bool {
        self.dragging
    }

    /// Cell is part of a drag that is still in progress
    pub fn is_dragging(&self, pos: CellPosition) -> bool {
        self.button_held && self.state.drag_range().map_or(false, |r| r.contains(pos))
    }

    pub fn click(&mut self, pos: CellPosition, modifiers: SelectionModifiers) {
        if self.suppress_click {
            self.suppress_click = false;
            return;
        }

        if modifiers.additive {
            let single = CellRange::single(pos);
            match self.state.extra_selections.iter().position(|r| *r == single) {
                Some(idx) => {
                    self.state.extra_selections.remove(idx);
                }
                None => self.state.extra_selections.push(single),
            }
            return;
        }

        self.state.extra_selections.clear();
        match (modifiers.range, self.state.selected) {
            (true, Some(anchor)) => self.state.drag = Some(DragRange::new(anchor, pos)),
            _ => {
                self.state.selected = Some(pos);
                self.state.drag = None;
            }
        }
    }

    pub fn pointer_down(&mut self, pos: CellPosition, modifiers: SelectionModifiers) {
        self.suppress_click = false;
        self.dragging = false;
        // an additive click must leave the drag range alone
        if modifiers.additive {
            return;
        }

        self.button_held = true;
        match (modifiers.range, self.state.selected) {
            (true, Some(anchor)) => self.state.drag = Some(DragRange::new(anchor, pos)),
            _ => {
                self.state.drag = Some(DragRange::new(pos, pos));
                self.state.selected = Some(pos);
            }
        }
    }

    /// Pointer moved onto `pos`. Entering a merged block selects exactly
    /// that block, so a drag never splits a merge.
    pub fn pointer_enter(&mut self, pos: CellPosition, merges: &MergeList) {
        if !self.button_held || self.header_drag.is_some() {
            return;
        }
        let Some(drag) = &mut self.state.drag else {
            return;
        };

        match merges.find_containing(pos) {
            Some(merge) => {
                let range = merge.range();
                drag.start = range.top_left();
                drag.end = range.bottom_right();
                if !self.state.selected.map_or(false, |s| range.contains(s)) {
                    self.state.selected = Some(range.top_left());
                }
            }
            None => drag.end = pos,
        }
        self.dragging = true;
        self.suppress_click = true;
    }

    pub fn pointer_up(&mut self) {
        self.button_held = false;
        self.header_drag = None;
    }

    /// Release from anywhere in the document
    pub fn release_all(&mut self) {
        self.button_held = false;
        self.dragging = false;
        self.header_drag = None;
    }

    /// Press on a row or column header selects the whole line
    pub fn header_down(&mut self, header: Header, rows: usize, cols: usize) {
        let Some(range) = header.span_to(header, rows, cols) else {
            return;
        };
        self.state.extra_selections.clear();
        self.state.drag = Some(DragRange::new(range.top_left(), range.bottom_right()));
        self.state.selected = Some(range.top_left());
        self.button_held = true;
        self.header_drag = Some(header);
    }

    /// Dragging across headers spans from the pressed header to `header`
    pub fn header_enter(&mut self, header: Header, rows: usize, cols: usize) {
        let Some(start) = self.header_drag.filter(|_| self.button_held) else {
            return;
        };
        let from = start.span_to(start, rows, cols);
        let to = start.span_to(header, rows, cols);
        let (Some(from), Some(to)) = (from, to) else {
            return;
        };
        let range = from.union(&to);
        // keep the pressed header at the fixed end
        let reversed = match start {
            Header::Row(r) => r > range.r1,
            Header::Column(c) => c > range.c1,
        };
        let (start_pos, end_pos) = if reversed {
            (range.bottom_right(), range.top_left())
        } else {
            (range.top_left(), range.bottom_right())
        };
        self.state.drag = Some(DragRange::new(start_pos, end_pos));
        self.dragging = true;
    }

    pub fn select_all(&mut self, rows: usize, cols: usize) {
        let range = CellRange::new(0, 0, rows.saturating_sub(1), cols.saturating_sub(1));
        self.state.extra_selections.clear();
        self.state.drag = Some(DragRange::new(range.top_left(), range.bottom_right()));
        self.state.selected = Some(CellPosition::origin());
    }

    /// Move the anchor by an offset, clamped to the grid; ranges are dropped
    pub fn move_anchor(&mut self, d_row: isize, d_col: isize, rows: usize, cols: usize) {
        let from = self.state.selected.unwrap_or_else(CellPosition::origin);
        let to = offset(from, d_row, d_col, rows, cols);
        self.set_anchor(to);
    }

    /// Move the free end of the drag range, keeping the anchor
    pub fn extend(&mut self, d_row: isize, d_col: isize, rows: usize, cols: usize) {
        let anchor = self.state.selected.unwrap_or_else(CellPosition::origin);
        let end = self.state.drag.map_or(anchor, |d| d.end);
        let end = offset(end, d_row, d_col, rows, cols);
        self.state.selected = Some(anchor);
        self.state.drag = Some(DragRange::new(anchor, end));
        self.state.extra_selections.clear();
    }

    /// Select a single cell, dropping every range
    pub fn set_anchor(&mut self, pos: CellPosition) {
        self.state.selected = Some(pos);
        self.state.drag = None;
        self.state.extra_selections.clear();
    }

    /// Drop ranges but keep the anchor
    pub fn collapse(&mut self) {
        self.state.drag = None;
        self.state.extra_selections.clear();
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn clamp(&mut self, rows: usize, cols: usize) {
        self.state.clamp(rows, cols);
    }

    /// Replace the whole state (undo / redo)
    pub fn restore(&mut self, state: SelectionState) {
        self.state = state;
        self.release_all();
    }
}

fn offset(pos: CellPosition, d_row: isize, d_col: isize, rows: usize, cols: usize) -> CellPosition {
    let row = pos.row.saturating_add_signed(d_row);
    let col = pos.col.saturating_add_signed(d_col);
    CellPosition::new(row, col).clamped(rows, cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::Merge;

    fn pos(row: usize, col: usize) -> CellPosition {
        CellPosition::new(row, col)
    }

    #[test]
    fn test_plain_click_sets_anchor() {
        let mut engine = SelectionEngine::new();
        engine.click(pos(1, 2), SelectionModifiers::NONE);
        assert_eq!(engine.state().selected, Some(pos(1, 2)));
        assert!(engine.state().drag.is_none());
    }

    #[test]
    fn test_range_click_extends_from_anchor() {
        let mut engine = SelectionEngine::new();
        engine.click(pos(1, 1), SelectionModifiers::NONE);
        engine.click(pos(3, 0), SelectionModifiers::RANGE);

        let state = engine.state();
        assert_eq!(state.selected, Some(pos(1, 1)));
        assert_eq!(state.drag_range(), Some(CellRange::new(1, 0, 3, 1)));
        assert!(state.is_selected(pos(2, 0)));
    }

    #[test]
    fn test_range_click_without_anchor() {
        let mut engine = SelectionEngine::new();
        engine.click(pos(2, 2), SelectionModifiers::RANGE);
        assert_eq!(engine.state().selected, Some(pos(2, 2)));
        assert!(engine.state().drag.is_none());
    }

    #[test]
    fn test_plain_click_clears_drag_range() {
        let mut engine = SelectionEngine::new();
        engine.click(pos(0, 0), SelectionModifiers::NONE);
        engine.click(pos(2, 2), SelectionModifiers::RANGE);
        engine.click(pos(1, 1), SelectionModifiers::NONE);
        assert_eq!(engine.state().selected, Some(pos(1, 1)));
        assert!(engine.state().drag.is_none());
    }

    #[test]
    fn test_additive_click_toggles() {
        let mut engine = SelectionEngine::new();
        engine.click(pos(0, 0), SelectionModifiers::NONE);
        engine.click(pos(2, 2), SelectionModifiers::ADDITIVE);
        engine.click(pos(3, 3), SelectionModifiers::ADDITIVE);

        let state = engine.state();
        assert_eq!(state.selected, Some(pos(0, 0)));
        assert!(state.is_multi_selected(pos(2, 2)));
        assert!(state.is_selected(pos(3, 3)));
        assert_eq!(state.extra_selections.len(), 2);

        engine.click(pos(2, 2), SelectionModifiers::ADDITIVE);
        assert_eq!(engine.state().extra_selections, vec![CellRange::new(3, 3, 3, 3)]);

        engine.click(pos(1, 1), SelectionModifiers::NONE);
        assert!(engine.state().extra_selections.is_empty());
    }

    #[test]
    fn test_drag_then_click_is_suppressed() {
        let mut engine = SelectionEngine::new();
        let merges = MergeList::new();
        engine.pointer_down(pos(0, 0), SelectionModifiers::NONE);
        engine.pointer_enter(pos(2, 3), &merges);
        engine.pointer_up();
        engine.click(pos(2, 3), SelectionModifiers::NONE);

        let state = engine.state();
        assert_eq!(state.selected, Some(pos(0, 0)));
        assert_eq!(state.drag_range(), Some(CellRange::new(0, 0, 2, 3)));

        // the next click behaves normally
        engine.click(pos(1, 1), SelectionModifiers::NONE);
        assert!(engine.state().drag.is_none());
    }

    #[test]
    fn test_pointer_enter_without_button_is_ignored() {
        let mut engine = SelectionEngine::new();
        engine.pointer_down(pos(0, 0), SelectionModifiers::NONE);
        engine.pointer_up();
        engine.pointer_enter(pos(3, 3), &MergeList::new());
        assert_eq!(engine.state().drag_range(), Some(CellRange::new(0, 0, 0, 0)));
    }

    #[test]
    fn test_shift_pointer_down_keeps_anchor() {
        let mut engine = SelectionEngine::new();
        engine.click(pos(1, 1), SelectionModifiers::NONE);
        engine.pointer_down(pos(3, 3), SelectionModifiers::RANGE);
        assert_eq!(engine.state().selected, Some(pos(1, 1)));
        assert_eq!(engine.state().drag_range(), Some(CellRange::new(1, 1, 3, 3)));
    }

    #[test]
    fn test_drag_into_merge_snaps_to_merge() {
        let mut merges = MergeList::new();
        merges.insert(Merge::new(2, 2, 3, 2)).unwrap();

        for entry in [pos(2, 2), pos(3, 3), pos(4, 2)] {
            let mut engine = SelectionEngine::new();
            engine.pointer_down(pos(0, 0), SelectionModifiers::NONE);
            engine.pointer_enter(entry, &merges);

            let state = engine.state();
            assert_eq!(state.drag_range(), Some(CellRange::new(2, 2, 4, 3)));
            let anchor = state.selected.unwrap();
            assert!(state.drag_range().unwrap().contains(anchor));
        }
    }

    #[test]
    fn test_global_release() {
        let mut engine = SelectionEngine::new();
        engine.pointer_down(pos(0, 0), SelectionModifiers::NONE);
        engine.pointer_enter(pos(1, 1), &MergeList::new());
        assert!(engine.is_dragging(pos(1, 0)));

        engine.release_all();
        assert!(!engine.button_held());
        assert!(!engine.dragging());
        assert!(!engine.is_dragging(pos(1, 0)));
        assert_eq!(engine.state().drag_range(), Some(CellRange::new(0, 0, 1, 1)));
    }

    #[test]
    fn test_header_selection_and_drag() {
        let mut engine = SelectionEngine::new();
        engine.header_down(Header::Row(3), 10, 5);
        assert_eq!(engine.state().drag_range(), Some(CellRange::new(3, 0, 3, 4)));

        engine.header_enter(Header::Row(1), 10, 5);
        assert_eq!(engine.state().drag_range(), Some(CellRange::new(1, 0, 3, 4)));
        assert!(engine.state().drag_range().unwrap().contains(engine.state().selected.unwrap()));

        engine.pointer_up();
        engine.header_down(Header::Column(2), 10, 5);
        engine.header_enter(Header::Column(4), 10, 5);
        assert_eq!(engine.state().drag_range(), Some(CellRange::new(0, 2, 9, 4)));
        assert_eq!(engine.state().selected, Some(pos(0, 2)));
    }

    #[test]
    fn test_keyboard_movement() {
        let mut engine = SelectionEngine::new();
        engine.move_anchor(-1, -1, 5, 5);
        assert_eq!(engine.state().selected, Some(pos(0, 0)));

        engine.move_anchor(2, 1, 5, 5);
        engine.extend(1, 1, 5, 5);
        engine.extend(10, 0, 5, 5);
        assert_eq!(engine.state().selected, Some(pos(2, 1)));
        assert_eq!(engine.state().drag_range(), Some(CellRange::new(2, 1, 4, 2)));

        engine.move_anchor(0, 1, 5, 5);
        assert_eq!(engine.state().selected, Some(pos(2, 2)));
        assert!(engine.state().drag.is_none());
    }

    #[test]
    fn test_target_ranges() {
        let mut state = SelectionState::default();
        assert!(state.target_ranges().is_empty());

        state.selected = Some(pos(1, 1));
        assert_eq!(state.target_ranges(), vec![CellRange::new(1, 1, 1, 1)]);

        state.drag = Some(DragRange::new(pos(0, 0), pos(1, 1)));
        state.extra_selections.push(CellRange::new(4, 4, 4, 4));
        assert_eq!(
            state.target_ranges(),
            vec![CellRange::new(0, 0, 1, 1), CellRange::new(4, 4, 4, 4)]
        );
    }

    #[test]
    fn test_combine_target() {
        let mut state = SelectionState::default();
        assert_eq!(state.combine_target(), CombineTarget::Nothing);

        state.extra_selections = vec![CellRange::new(0, 0, 0, 0), CellRange::new(0, 1, 0, 1)];
        assert_eq!(state.combine_target(), CombineTarget::Range(CellRange::new(0, 0, 0, 1)));

        state.extra_selections = vec![CellRange::new(0, 0, 0, 0), CellRange::new(1, 1, 1, 1)];
        assert_eq!(
            state.combine_target(),
            CombineTarget::NeedsConfirmation(CellRange::new(0, 0, 1, 1))
        );

        state.drag = Some(DragRange::new(pos(3, 3), pos(2, 2)));
        assert_eq!(state.combine_target(), CombineTarget::Range(CellRange::new(2, 2, 3, 3)));
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut state = SelectionState {
            selected: Some(pos(9, 9)),
            drag: Some(DragRange::new(pos(2, 2), pos(9, 9))),
            extra_selections: vec![CellRange::new(8, 8, 9, 9)],
        };
        state.clamp(5, 4);
        assert_eq!(state.selected, Some(pos(4, 3)));
        assert_eq!(state.drag_range(), Some(CellRange::new(2, 2, 4, 3)));
        assert_eq!(state.extra_selections, vec![CellRange::new(4, 3, 4, 3)]);
    }
}
