//! The editing session: sheet, selection, history and the rest of the
//! editor state behind one API.
//!
//! Every mutating request is wrapped in an undo snapshot. Requests that
//! cannot apply (out of range, last row, 1x1 combine, ...) leave the state
//! untouched and are only logged.

use serde::Serialize;
use sheetgrid_core::{
    column_headers, find_all, find_next, is_blank, key_to_action, load_state, parse_tsv,
    row_headers, save_state, CellPosition, CellRange, CellSpan, CellView, ClipboardState,
    CombineTarget, ConditionalFormatRule, ConditionalFormats, EditSessions, EditorAction,
    EditorConfig, FreezePanes, Header, ImportedMerge, Key, Matcher, Merge, Modifiers,
    PendingCommit, PersistedState, RenderContext, SearchOptions, SelectionEngine,
    SelectionModifiers, SelectionState, Sheet, SheetError, SheetExport, SnapshotStore, SortOrder,
};
use sheetgrid_formula::{evaluate, quick_formula, FormulaResult};
use sheetgrid_history::{HistoryManager, Snapshot};

/// Result of a combine request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "camelCase")]
pub enum CombineOutcome {
    Combined(Merge),
    /// The additive selection has gaps; combining would take in the whole
    /// bounding box. Call [`GridEditor::combine_confirmed`] to go ahead.
    NeedsConfirmation(CellRange),
    Unchanged,
}

/// Result of a clear request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ClearOutcome {
    Cleared,
    /// Nothing is selected; clearing would blank the whole sheet. Call
    /// [`GridEditor::clear_sheet_confirmed`] to go ahead.
    NeedsConfirmation,
}

/// What a key press did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "camelCase")]
pub enum KeyOutcome {
    Handled(EditorAction),
    /// Copy or cut; the text belongs on the system clipboard
    Copied(String),
    NeedsClearConfirmation,
    Ignored,
}

pub struct GridEditor {
    config: EditorConfig,
    sheet: Sheet,
    selection: SelectionEngine,
    history: HistoryManager,
    edits: EditSessions,
    clipboard: ClipboardState,
    formats: ConditionalFormats,
    search: Option<Matcher>,
    freeze: FreezePanes,
    dark_mode: bool,
    formula_input: String,
}

impl GridEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            sheet: Sheet::new(&config),
            selection: SelectionEngine::new(),
            history: HistoryManager::new(config.history_limit),
            edits: EditSessions::new(config.commit_debounce_ms),
            clipboard: ClipboardState::new(),
            formats: ConditionalFormats::new(),
            search: None,
            freeze: FreezePanes::default(),
            dark_mode: false,
            formula_input: String::new(),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn selection_engine(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn clipboard(&self) -> &ClipboardState {
        &self.clipboard
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.sheet.get(row, col)
    }

    // --- Mutation plumbing ---

    /// Apply a sheet mutation with undo support. Pending typed text is
    /// committed first so it lands in its own undo step, and open edit
    /// sessions end.
    fn mutate<T>(
        &mut self,
        label: &'static str,
        apply: impl FnOnce(&mut Sheet) -> Result<T, SheetError>,
    ) -> Option<T> {
        self.end_edits();
        self.mutate_now(label, apply)
    }

    /// Commit pending typed text and close every edit session
    fn end_edits(&mut self) {
        self.flush_edits();
        self.edits.dispose_all();
    }

    /// The snapshot is kept only when the mutation succeeds and actually
    /// changes the sheet.
    fn mutate_now<T>(
        &mut self,
        label: &'static str,
        apply: impl FnOnce(&mut Sheet) -> Result<T, SheetError>,
    ) -> Option<T> {
        let before = Snapshot::capture(&self.sheet, self.selection.state(), label);
        match apply(&mut self.sheet) {
            Ok(value) => {
                if self.sheet != before.sheet {
                    self.history.push(before);
                }
                Some(value)
            }
            Err(err) => {
                tracing::debug!(%err, code = err.code(), label, "request ignored");
                None
            }
        }
    }

    /// Bring selection, freeze panes and edit sessions in line with new
    /// grid dimensions
    fn after_reshape(&mut self) {
        let (rows, cols) = (self.sheet.row_count(), self.sheet.col_count());
        self.edits.dispose_all();
        self.selection.clamp(rows, cols);
        self.freeze = self.freeze.clamped(rows, cols);
    }

    fn restore_snapshot(&mut self, snapshot: Snapshot) {
        self.sheet = snapshot.sheet;
        self.selection.restore(snapshot.selection);
        self.after_reshape();
    }

    // --- Cell edits ---

    /// Write a value straight away (one undo step)
    pub fn set_cell(&mut self, row: usize, col: usize, value: &str) -> bool {
        self.edits.dispose(CellPosition::new(row, col));
        self.mutate("edit", |sheet| sheet.set_cell(row, col, value)).is_some()
    }

    /// Text typed into a cell. It is committed once `commit_debounce_ms`
    /// pass without further typing (see [`tick`](Self::tick)) or when the
    /// cell loses focus.
    pub fn type_in_cell(&mut self, row: usize, col: usize, content: &str, now_ms: u64) -> bool {
        let pos = CellPosition::new(row, col);
        let Some(current) = self.sheet.get(row, col) else {
            return false;
        };
        self.edits.input(pos, current, content, now_ms);
        true
    }

    /// Text shown in a cell: the text being typed, else the stored value
    pub fn cell_display(&self, row: usize, col: usize) -> Option<&str> {
        let pos = CellPosition::new(row, col);
        match self.edits.get(pos) {
            Some(session) => Some(session.content()),
            None => self.sheet.get(row, col),
        }
    }

    /// When the host should next call [`tick`](Self::tick)
    pub fn next_commit_deadline(&self) -> Option<u64> {
        self.edits.next_deadline()
    }

    /// Commit typed text whose debounce window has passed. Returns the
    /// number of cells committed.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        let commits = self.edits.poll(now_ms);
        let count = commits.len();
        for commit in commits {
            self.apply_commit(commit);
        }
        count
    }

    /// Blur: commit the cell's typed text now
    pub fn finish_edit(&mut self, row: usize, col: usize) -> bool {
        match self.edits.finish(CellPosition::new(row, col)) {
            Some(commit) => {
                self.apply_commit(commit);
                true
            }
            None => false,
        }
    }

    /// The cell view went away; its pending text is dropped
    pub fn dispose_edit(&mut self, row: usize, col: usize) {
        self.edits.dispose(CellPosition::new(row, col));
    }

    /// Commit every pending edit regardless of its timer
    pub fn flush_edits(&mut self) {
        for commit in self.edits.flush() {
            self.apply_commit(commit);
        }
    }

    fn apply_commit(&mut self, commit: PendingCommit) {
        let PendingCommit { position, value } = commit;
        self.mutate_now("edit", |sheet| sheet.set_cell(position.row, position.col, value));
    }

    // --- Structure ---

    pub fn add_row(&mut self) {
        self.mutate("add row", |sheet| {
            sheet.add_row();
            Ok(())
        });
    }

    pub fn add_column(&mut self) {
        self.mutate("add column", |sheet| {
            sheet.add_column();
            Ok(())
        });
    }

    /// Refused for the last remaining row or an index out of range
    pub fn delete_row(&mut self, index: usize) -> bool {
        let deleted = self.mutate("delete row", |sheet| sheet.delete_row(index)).is_some();
        if deleted {
            self.after_reshape();
        }
        deleted
    }

    /// Refused for the last remaining column or an index out of range
    pub fn delete_column(&mut self, index: usize) -> bool {
        let deleted = self
            .mutate("delete column", |sheet| sheet.delete_column(index))
            .is_some();
        if deleted {
            self.after_reshape();
        }
        deleted
    }

    /// Returns the width actually applied (clamped to the minimum)
    pub fn resize_column(&mut self, index: usize, width: f64) -> Option<f64> {
        match self.sheet.resize_column(index, width) {
            Ok(width) => Some(width),
            Err(err) => {
                tracing::debug!(%err, "resize ignored");
                None
            }
        }
    }

    // --- Selection events ---

    fn in_grid(&self, row: usize, col: usize) -> Option<CellPosition> {
        let pos = CellPosition::new(row, col);
        self.sheet.grid().contains(pos).then_some(pos)
    }

    pub fn click(&mut self, row: usize, col: usize, modifiers: SelectionModifiers) {
        if let Some(pos) = self.in_grid(row, col) {
            self.selection.click(pos, modifiers);
        }
    }

    pub fn pointer_down(&mut self, row: usize, col: usize, modifiers: SelectionModifiers) {
        if let Some(pos) = self.in_grid(row, col) {
            self.selection.pointer_down(pos, modifiers);
        }
    }

    pub fn pointer_enter(&mut self, row: usize, col: usize) {
        if let Some(pos) = self.in_grid(row, col) {
            self.selection.pointer_enter(pos, self.sheet.merges());
        }
    }

    pub fn pointer_up(&mut self) {
        self.selection.pointer_up();
    }

    /// Pointer released anywhere in the document
    pub fn release_all(&mut self) {
        self.selection.release_all();
    }

    pub fn header_down(&mut self, header: Header) {
        let (rows, cols) = (self.sheet.row_count(), self.sheet.col_count());
        self.selection.header_down(header, rows, cols);
    }

    pub fn header_enter(&mut self, header: Header) {
        let (rows, cols) = (self.sheet.row_count(), self.sheet.col_count());
        self.selection.header_enter(header, rows, cols);
    }

    pub fn select_all(&mut self) {
        let (rows, cols) = (self.sheet.row_count(), self.sheet.col_count());
        self.selection.select_all(rows, cols);
    }

    pub fn reset_selection(&mut self) {
        self.selection.reset();
    }

    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> KeyOutcome {
        let action = key_to_action(key, modifiers);
        let (rows, cols) = (self.sheet.row_count(), self.sheet.col_count());

        if let Some((d_row, d_col)) = action.direction() {
            if action.is_extend() {
                self.selection.extend(d_row, d_col, rows, cols);
            } else {
                self.selection.move_anchor(d_row, d_col, rows, cols);
            }
            return KeyOutcome::Handled(action);
        }

        match action {
            EditorAction::SelectAll => self.selection.select_all(rows, cols),
            EditorAction::Collapse => self.selection.collapse(),
            EditorAction::ClearSelection => {
                if self.clear_selection_values() == ClearOutcome::NeedsConfirmation {
                    return KeyOutcome::NeedsClearConfirmation;
                }
            }
            EditorAction::Copy => {
                return self.copy().map_or(KeyOutcome::Ignored, KeyOutcome::Copied);
            }
            EditorAction::Cut => {
                return self.cut().map_or(KeyOutcome::Ignored, KeyOutcome::Copied);
            }
            EditorAction::Paste => {
                self.paste(None);
            }
            EditorAction::Undo => {
                self.undo();
            }
            EditorAction::Redo => {
                self.redo();
            }
            EditorAction::None => return KeyOutcome::Ignored,
            // directions were handled above
            _ => {}
        }
        KeyOutcome::Handled(action)
    }

    // --- Merges ---

    /// Combine the drag range, or the additive selection when it tiles its
    /// bounding box
    pub fn combine(&mut self) -> CombineOutcome {
        match self.selection.state().combine_target() {
            CombineTarget::Range(range) => self.combine_range(range),
            CombineTarget::NeedsConfirmation(bbox) => CombineOutcome::NeedsConfirmation(bbox),
            CombineTarget::Nothing => CombineOutcome::Unchanged,
        }
    }

    /// Combine a range the user confirmed
    pub fn combine_confirmed(&mut self, range: CellRange) -> CombineOutcome {
        self.combine_range(range)
    }

    fn combine_range(&mut self, range: CellRange) -> CombineOutcome {
        let merged = self.mutate("combine", |sheet| {
            sheet.combine(range).ok_or(SheetError::DegenerateMerge)
        });
        match merged {
            Some(merge) => {
                self.selection.reset();
                CombineOutcome::Combined(merge)
            }
            None => CombineOutcome::Unchanged,
        }
    }

    /// Remove merges touching the selection; values stay where they are.
    /// Returns the number of merges removed.
    pub fn separate(&mut self) -> usize {
        let ranges = self.selection.state().target_ranges();
        if ranges.is_empty() {
            return 0;
        }
        self.mutate("separate", |sheet| Ok(sheet.separate(&ranges).len()))
            .unwrap_or(0)
    }

    // --- Clipboard ---

    fn copy_range(&self) -> Option<CellRange> {
        let state = self.selection.state();
        state.drag_range().or_else(|| state.selected.map(CellRange::single))
    }

    /// Copy the drag range (or anchor cell); returns TSV for the system
    /// clipboard
    pub fn copy(&mut self) -> Option<String> {
        self.flush_edits();
        let range = self.copy_range()?;
        let values = self.sheet.copy_block(&range);
        Some(self.clipboard.copy(values))
    }

    pub fn cut(&mut self) -> Option<String> {
        self.end_edits();
        let range = self.copy_range()?;
        let values = self.sheet.copy_block(&range);
        let text = self.clipboard.cut(values);
        self.mutate_now("cut", |sheet| {
            sheet.clear_range(&range);
            Ok(())
        });
        Some(text)
    }

    /// Paste system clipboard text when the host could read it, else the
    /// in-memory block. Returns the area written.
    pub fn paste(&mut self, text: Option<&str>) -> Option<CellRange> {
        let block = match text {
            Some(text) => parse_tsv(text),
            None => self.clipboard.data()?.values.clone(),
        };
        let at = self.selection.state().origin()?;

        let pasted = self.mutate("paste", |sheet| {
            sheet.paste_block(at, &block).ok_or(SheetError::InvalidShape)
        })?;
        self.clipboard.clear_if_cut();
        self.selection.reset();
        Some(pasted)
    }

    // --- Clear ---

    /// Blank the selected cells. With nothing selected the whole sheet
    /// would be affected, so the caller must confirm first.
    pub fn clear_selection_values(&mut self) -> ClearOutcome {
        let ranges = self.selection.state().target_ranges();
        if ranges.is_empty() {
            return ClearOutcome::NeedsConfirmation;
        }
        self.mutate("clear", |sheet| {
            for range in &ranges {
                sheet.clear_range(range);
            }
            Ok(())
        });
        self.selection.reset();
        ClearOutcome::Cleared
    }

    /// Blank every cell and remove every merge
    pub fn clear_sheet_confirmed(&mut self) {
        self.mutate("clear sheet", |sheet| {
            sheet.clear_all();
            Ok(())
        });
        self.selection.reset();
    }

    // --- Find / replace ---

    /// Set the active query; returns the number of matching cells. An
    /// invalid pattern matches nothing.
    pub fn set_search(&mut self, options: &SearchOptions) -> usize {
        self.search = match Matcher::new(options) {
            Ok(matcher) => Some(matcher),
            Err(err) => {
                tracing::debug!(%err, "search disabled");
                None
            }
        };
        self.find_all().len()
    }

    pub fn clear_search(&mut self) {
        self.search = None;
    }

    /// Matching cells in row-major order
    pub fn find_all(&self) -> Vec<CellPosition> {
        self.search
            .as_ref()
            .map(|matcher| find_all(self.sheet.grid(), matcher))
            .unwrap_or_default()
    }

    /// Move the anchor to the next match after it, wrapping around
    pub fn find_next(&mut self) -> Option<CellPosition> {
        let matcher = self.search.as_ref()?;
        let found = find_next(self.sheet.grid(), matcher, self.selection.state().selected)?;
        self.selection.set_anchor(found);
        Some(found)
    }

    /// Replace every match of the active query; returns cells changed
    pub fn replace_all(&mut self, replacement: &str) -> usize {
        let Some(matcher) = self.search.clone() else {
            return 0;
        };
        self.mutate("replace", |sheet| Ok(sheet.replace_all(&matcher, replacement)))
            .unwrap_or(0)
    }

    // --- Sort ---

    /// Sort the rows of the drag range (all rows without one) by `key_col`
    pub fn sort_rows(&mut self, key_col: usize, order: SortOrder) -> bool {
        let range = self
            .selection
            .state()
            .drag_range()
            .unwrap_or_else(|| self.sheet.grid().full_range());
        self.mutate("sort", |sheet| sheet.sort_rows(range, key_col, order))
            .is_some()
    }

    // --- Conditional formatting ---

    pub fn add_rule(&mut self, rule: ConditionalFormatRule) -> String {
        self.formats.add_rule(rule)
    }

    pub fn remove_rule(&mut self, id: &str) -> bool {
        self.formats.remove_rule(id)
    }

    pub fn clear_rules(&mut self) {
        self.formats.clear_rules();
    }

    pub fn rules(&self) -> &[ConditionalFormatRule] {
        self.formats.rules()
    }

    // --- View flags ---

    pub fn set_freeze(&mut self, rows: usize, cols: usize) {
        let (row_count, col_count) = (self.sheet.row_count(), self.sheet.col_count());
        self.freeze = FreezePanes { rows, cols }.clamped(row_count, col_count);
    }

    pub fn freeze(&self) -> FreezePanes {
        self.freeze
    }

    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.dark_mode = dark_mode;
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    // --- Formulas ---

    pub fn set_formula_input(&mut self, text: impl Into<String>) {
        self.formula_input = text.into();
    }

    pub fn formula_input(&self) -> &str {
        &self.formula_input
    }

    /// Live result of the formula box (SUM of the drag range when empty)
    pub fn formula_preview(&self) -> Option<FormulaResult> {
        evaluate(
            &self.formula_input,
            self.selection.state().drag_range(),
            self.sheet.grid(),
        )
    }

    /// Write the formula result into the first free cell of the selection's
    /// row: right of the drag range, or from the anchor itself. A column is
    /// added when the row is full.
    pub fn commit_formula(&mut self) -> Option<CellPosition> {
        self.end_edits();
        let result = self.formula_preview()?;

        let state = self.selection.state();
        let (row, start_col) = match state.drag_range() {
            Some(range) => (range.r1, range.c2 + 1),
            None => {
                let anchor = state.selected?;
                (anchor.row, anchor.col)
            }
        };
        let value = result.value.to_string();

        self.mutate_now("formula", |sheet| {
            let free = (start_col..sheet.col_count()).find(|&col| {
                matches!(sheet.span_at(CellPosition::new(row, col)), CellSpan::Single)
                    && sheet.get(row, col).map_or(false, is_blank)
            });
            let col = match free {
                Some(col) => col,
                None => {
                    sheet.add_column();
                    sheet.col_count() - 1
                }
            };
            sheet.set_cell(row, col, value)?;
            Ok(CellPosition::new(row, col))
        })
    }

    /// One-click function over the drag range: shows the formula, and
    /// writes its result into the range's top-left cell when there is one
    pub fn apply_quick_function(&mut self, name: &str) -> Option<FormulaResult> {
        self.end_edits();
        let range = self.selection.state().drag_range()?;
        self.formula_input = quick_formula(name, &range);
        let result = evaluate(&self.formula_input, Some(range), self.sheet.grid())?;

        let top_left = range.top_left();
        let value = result.value.to_string();
        self.mutate_now("quick function", |sheet| {
            sheet.set_cell(top_left.row, top_left.col, value)
        })?;
        self.selection.set_anchor(top_left);
        Some(result)
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        self.flush_edits();
        let current = Snapshot::new(self.sheet.clone(), self.selection.state().clone());
        match self.history.undo(current) {
            Some(snapshot) => {
                self.restore_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.flush_edits();
        let current = Snapshot::new(self.sheet.clone(), self.selection.state().clone());
        match self.history.redo(current) {
            Some(snapshot) => {
                self.restore_snapshot(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- Import / export / persistence ---

    /// Replace the sheet with imported rows and merges
    pub fn import_sheet(&mut self, rows: Vec<Vec<String>>, merges: Vec<ImportedMerge>) {
        let fallback = (self.config.initial_rows, self.config.initial_cols);
        self.mutate("import", |sheet| {
            sheet.import(rows, merges, fallback);
            Ok(())
        });
        self.selection.reset();
        self.after_reshape();
    }

    pub fn export_sheet(&self) -> SheetExport {
        self.sheet.export()
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            data: self.sheet.grid().to_rows(),
            merges: self.sheet.merges().as_slice().to_vec(),
            col_widths: self.sheet.col_widths().to_vec(),
            dark_mode: self.dark_mode,
            conditional_format_rules: self.formats.rules().to_vec(),
            freeze_row_count: self.freeze.rows,
            freeze_col_count: self.freeze.cols,
        }
    }

    /// Rehydrate from saved state. Invalid state is logged and the current
    /// state kept. History starts over.
    pub fn restore_state(&mut self, state: &PersistedState) -> bool {
        let sheet = match state.to_sheet(self.sheet.defaults()) {
            Ok(sheet) => sheet,
            Err(err) => {
                tracing::warn!(%err, "ignoring saved state");
                return false;
            }
        };

        self.sheet = sheet;
        self.formats = ConditionalFormats::from_rules(state.conditional_format_rules.clone());
        self.dark_mode = state.dark_mode;
        self.freeze = FreezePanes {
            rows: state.freeze_row_count,
            cols: state.freeze_col_count,
        };
        self.selection.reset();
        self.history.clear();
        self.after_reshape();
        true
    }

    pub fn save(&self, store: &mut dyn SnapshotStore) -> bool {
        save_state(store, &self.persisted_state())
    }

    pub fn load(&mut self, store: &dyn SnapshotStore) -> bool {
        match load_state(store) {
            Some(state) => self.restore_state(&state),
            None => false,
        }
    }

    // --- Rendering ---

    pub fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            sheet: &self.sheet,
            selection: &self.selection,
            formats: &self.formats,
            search: self.search.as_ref(),
            freeze: self.freeze,
        }
    }

    pub fn render_cells(&self) -> Vec<CellView> {
        self.render_context().render_cells()
    }

    pub fn column_headers(&self) -> Vec<String> {
        column_headers(self.sheet.col_count())
    }

    pub fn row_headers(&self) -> Vec<String> {
        row_headers(self.sheet.row_count())
    }
}

impl Default for GridEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for GridEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridEditor")
            .field("rows", &self.sheet.row_count())
            .field("cols", &self.sheet.col_count())
            .field("merges", &self.sheet.merges().len())
            .field("history", &self.history)
            .finish()
    }
}
