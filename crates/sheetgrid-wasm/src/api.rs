use serde::{Deserialize, Serialize};
use sheetgrid_core::{
    CellRange, ConditionalFormatRule, EditorConfig, Header, ImportedMerge, Key, Modifiers,
    PersistedState, SearchOptions, SelectionModifiers, SheetError, SortOrder,
};
use wasm_bindgen::prelude::*;

use crate::editor::GridEditor;
use crate::storage::LocalStorage;

/// Main spreadsheet engine exposed to JavaScript
#[wasm_bindgen]
pub struct SpreadsheetEngine {
    editor: GridEditor,
    storage: LocalStorage,
}

/// Structured error object for JavaScript
#[derive(Serialize)]
pub struct JsSheetError {
    code: String,
    message: String,
}

impl From<SheetError> for JsSheetError {
    fn from(err: SheetError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl JsSheetError {
    fn from_error<E: std::fmt::Display>(err: E) -> JsValue {
        let error = Self {
            code: "ERROR".to_string(),
            message: err.to_string(),
        };
        serde_wasm_bindgen::to_value(&error).unwrap_or(JsValue::NULL)
    }
}

fn to_js_error(err: SheetError) -> JsValue {
    let js_error = JsSheetError::from(err);
    serde_wasm_bindgen::to_value(&js_error).unwrap_or(JsValue::NULL)
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

/// Payload of an imported file
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportPayload {
    rows: Vec<Vec<String>>,
    #[serde(default)]
    merges: Vec<ImportedMerge>,
}

fn selection_modifiers(shift: bool, ctrl: bool) -> SelectionModifiers {
    SelectionModifiers {
        range: shift,
        additive: ctrl,
    }
}

fn header(is_row: bool, index: u32) -> Header {
    if is_row {
        Header::Row(index as usize)
    } else {
        Header::Column(index as usize)
    }
}

#[wasm_bindgen]
impl SpreadsheetEngine {
    /// Create an engine. `config_json` may override any `EditorConfig`
    /// field; invalid config falls back to the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Self {
        let config = match config_json.as_deref().map(EditorConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(err)) => {
                web_sys::console::warn_1(&format!("invalid editor config: {}", err).into());
                EditorConfig::default()
            }
            None => EditorConfig::default(),
        };

        Self {
            storage: LocalStorage::new(config.storage_key.clone()),
            editor: GridEditor::new(config),
        }
    }

    // --- Cells ---

    #[wasm_bindgen(js_name = getRowCount)]
    pub fn get_row_count(&self) -> u32 {
        self.editor.sheet().row_count() as u32
    }

    #[wasm_bindgen(js_name = getColCount)]
    pub fn get_col_count(&self) -> u32 {
        self.editor.sheet().col_count() as u32
    }

    /// Value shown in a cell, including text still being typed
    #[wasm_bindgen(js_name = getCellValue)]
    pub fn get_cell_value(&self, row: u32, col: u32) -> Option<String> {
        self.editor
            .cell_display(row as usize, col as usize)
            .map(str::to_string)
    }

    /// Commit a value immediately
    #[wasm_bindgen(js_name = setCellValue)]
    pub fn set_cell_value(&mut self, row: u32, col: u32, value: &str) -> bool {
        self.editor.set_cell(row as usize, col as usize, value)
    }

    /// Keystroke in a cell; committed after the debounce window
    #[wasm_bindgen(js_name = typeInCell)]
    pub fn type_in_cell(&mut self, row: u32, col: u32, content: &str, now_ms: f64) -> bool {
        self.editor
            .type_in_cell(row as usize, col as usize, content, now_ms as u64)
    }

    /// Commit expired edits; returns how many cells changed
    #[wasm_bindgen]
    pub fn tick(&mut self, now_ms: f64) -> u32 {
        self.editor.tick(now_ms as u64) as u32
    }

    /// `tick` against the browser clock
    #[wasm_bindgen(js_name = commitDue)]
    pub fn commit_due(&mut self) -> u32 {
        self.tick(js_sys::Date::now())
    }

    #[wasm_bindgen(js_name = nextCommitDeadline)]
    pub fn next_commit_deadline(&self) -> Option<f64> {
        self.editor.next_commit_deadline().map(|ms| ms as f64)
    }

    #[wasm_bindgen(js_name = finishEdit)]
    pub fn finish_edit(&mut self, row: u32, col: u32) -> bool {
        self.editor.finish_edit(row as usize, col as usize)
    }

    #[wasm_bindgen(js_name = disposeEdit)]
    pub fn dispose_edit(&mut self, row: u32, col: u32) {
        self.editor.dispose_edit(row as usize, col as usize);
    }

    // --- Structure ---

    #[wasm_bindgen(js_name = addRow)]
    pub fn add_row(&mut self) {
        self.editor.add_row();
    }

    #[wasm_bindgen(js_name = addColumn)]
    pub fn add_column(&mut self) {
        self.editor.add_column();
    }

    #[wasm_bindgen(js_name = deleteRow)]
    pub fn delete_row(&mut self, index: u32) -> bool {
        self.editor.delete_row(index as usize)
    }

    #[wasm_bindgen(js_name = deleteColumn)]
    pub fn delete_column(&mut self, index: u32) -> bool {
        self.editor.delete_column(index as usize)
    }

    /// Returns the applied width, or nothing for an unknown column
    #[wasm_bindgen(js_name = resizeColumn)]
    pub fn resize_column(&mut self, index: u32, width: f64) -> Option<f64> {
        self.editor.resize_column(index as usize, width)
    }

    #[wasm_bindgen(js_name = getColWidths)]
    pub fn get_col_widths(&self) -> Vec<f64> {
        self.editor.sheet().col_widths().to_vec()
    }

    // --- Selection ---

    #[wasm_bindgen]
    pub fn click(&mut self, row: u32, col: u32, shift: bool, ctrl: bool) {
        self.editor
            .click(row as usize, col as usize, selection_modifiers(shift, ctrl));
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, row: u32, col: u32, shift: bool, ctrl: bool) {
        self.editor
            .pointer_down(row as usize, col as usize, selection_modifiers(shift, ctrl));
    }

    #[wasm_bindgen(js_name = pointerEnter)]
    pub fn pointer_enter(&mut self, row: u32, col: u32) {
        self.editor.pointer_enter(row as usize, col as usize);
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.editor.pointer_up();
    }

    /// Document-level pointer release
    #[wasm_bindgen(js_name = releaseAll)]
    pub fn release_all(&mut self) {
        self.editor.release_all();
    }

    #[wasm_bindgen(js_name = headerDown)]
    pub fn header_down(&mut self, is_row: bool, index: u32) {
        self.editor.header_down(header(is_row, index));
    }

    #[wasm_bindgen(js_name = headerEnter)]
    pub fn header_enter(&mut self, is_row: bool, index: u32) {
        self.editor.header_enter(header(is_row, index));
    }

    #[wasm_bindgen(js_name = selectAll)]
    pub fn select_all(&mut self) {
        self.editor.select_all();
    }

    #[wasm_bindgen(js_name = getSelection)]
    pub fn get_selection(&self) -> JsValue {
        to_js(self.editor.selection())
    }

    /// Keyboard shortcut. `key` is a DOM `KeyboardEvent.key` name.
    #[wasm_bindgen(js_name = handleKey)]
    pub fn handle_key(
        &mut self,
        key: &str,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> JsValue {
        let modifiers = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        to_js(&self.editor.handle_key(Key::from_name(key), modifiers))
    }

    // --- Merges ---

    #[wasm_bindgen]
    pub fn combine(&mut self) -> JsValue {
        to_js(&self.editor.combine())
    }

    /// Combine the bounding box returned by a `needsConfirmation` outcome
    #[wasm_bindgen(js_name = combineConfirmed)]
    pub fn combine_confirmed(&mut self, range_json: &str) -> Result<JsValue, JsValue> {
        let range: CellRange =
            serde_json::from_str(range_json).map_err(JsSheetError::from_error)?;
        Ok(to_js(&self.editor.combine_confirmed(range)))
    }

    #[wasm_bindgen]
    pub fn separate(&mut self) -> u32 {
        self.editor.separate() as u32
    }

    #[wasm_bindgen(js_name = getMerges)]
    pub fn get_merges(&self) -> String {
        serde_json::to_string(self.editor.sheet().merges()).unwrap_or_else(|_| "[]".to_string())
    }

    // --- Clipboard ---

    /// Copy the selection; the returned TSV goes to the system clipboard
    #[wasm_bindgen]
    pub fn copy(&mut self) -> Option<String> {
        self.editor.copy()
    }

    #[wasm_bindgen]
    pub fn cut(&mut self) -> Option<String> {
        self.editor.cut()
    }

    /// Paste `text` read from the system clipboard, or the in-memory
    /// clipboard when reading was denied
    #[wasm_bindgen]
    pub fn paste(&mut self, text: Option<String>) -> bool {
        self.editor.paste(text.as_deref()).is_some()
    }

    // --- Clear ---

    /// Returns `"cleared"` or `"needsConfirmation"`
    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) -> JsValue {
        to_js(&self.editor.clear_selection_values())
    }

    #[wasm_bindgen(js_name = clearSheetConfirmed)]
    pub fn clear_sheet_confirmed(&mut self) {
        self.editor.clear_sheet_confirmed();
    }

    // --- Search ---

    /// Set the active search
    ///
    /// options_json format:
    /// {
    ///   "query": "search text",
    ///   "matchCase": false,
    ///   "matchEntireCell": false,
    ///   "useRegex": false
    /// }
    ///
    /// Returns the number of matching cells
    #[wasm_bindgen]
    pub fn search(&mut self, options_json: &str) -> Result<u32, JsValue> {
        let options: SearchOptions =
            serde_json::from_str(options_json).map_err(JsSheetError::from_error)?;
        Ok(self.editor.set_search(&options) as u32)
    }

    #[wasm_bindgen(js_name = clearSearch)]
    pub fn clear_search(&mut self) {
        self.editor.clear_search();
    }

    /// JSON array of `{row, col}`
    #[wasm_bindgen(js_name = findAll)]
    pub fn find_all(&self) -> String {
        serde_json::to_string(&self.editor.find_all()).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen(js_name = findNext)]
    pub fn find_next(&mut self) -> JsValue {
        to_js(&self.editor.find_next())
    }

    #[wasm_bindgen(js_name = replaceAll)]
    pub fn replace_all(&mut self, replacement: &str) -> u32 {
        self.editor.replace_all(replacement) as u32
    }

    // --- Sort ---

    /// `order` is `"asc"` or `"desc"`
    #[wasm_bindgen(js_name = sortRows)]
    pub fn sort_rows(&mut self, key_col: u32, order: &str) -> bool {
        let order = if order.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        self.editor.sort_rows(key_col as usize, order)
    }

    // --- Conditional Formatting ---

    /// Add a conditional formatting rule
    ///
    /// rule_json format:
    /// {
    ///   "type": "gt",
    ///   "value": "50",
    ///   "backgroundColor": "#fdd",
    ///   "textColor": "#900",
    ///   "scope": { "r1": 0, "c1": 0, "r2": 10, "c2": 5 }
    /// }
    ///
    /// Returns the rule ID
    #[wasm_bindgen(js_name = addConditionalFormat)]
    pub fn add_conditional_format(&mut self, rule_json: &str) -> Result<String, JsValue> {
        let mut rule: ConditionalFormatRule =
            serde_json::from_str(rule_json).map_err(JsSheetError::from_error)?;
        if rule.id.is_empty() {
            rule.id = uuid::Uuid::new_v4().to_string();
        }
        Ok(self.editor.add_rule(rule))
    }

    #[wasm_bindgen(js_name = removeConditionalFormat)]
    pub fn remove_conditional_format(&mut self, rule_id: &str) -> bool {
        self.editor.remove_rule(rule_id)
    }

    #[wasm_bindgen(js_name = getConditionalFormats)]
    pub fn get_conditional_formats(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.editor.rules()).map_err(JsSheetError::from_error)
    }

    #[wasm_bindgen(js_name = clearConditionalFormats)]
    pub fn clear_conditional_formats(&mut self) {
        self.editor.clear_rules();
    }

    // --- View flags ---

    #[wasm_bindgen(js_name = setFreeze)]
    pub fn set_freeze(&mut self, rows: u32, cols: u32) {
        self.editor.set_freeze(rows as usize, cols as usize);
    }

    #[wasm_bindgen(js_name = getFreeze)]
    pub fn get_freeze(&self) -> JsValue {
        to_js(&self.editor.freeze())
    }

    #[wasm_bindgen(js_name = setDarkMode)]
    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        self.editor.set_dark_mode(dark_mode);
    }

    #[wasm_bindgen(js_name = isDarkMode)]
    pub fn is_dark_mode(&self) -> bool {
        self.editor.dark_mode()
    }

    // --- Formulas ---

    #[wasm_bindgen(js_name = setFormulaInput)]
    pub fn set_formula_input(&mut self, text: &str) {
        self.editor.set_formula_input(text);
    }

    #[wasm_bindgen(js_name = getFormulaInput)]
    pub fn get_formula_input(&self) -> String {
        self.editor.formula_input().to_string()
    }

    /// `{value, functionName}` or null when the input has no result
    #[wasm_bindgen(js_name = formulaPreview)]
    pub fn formula_preview(&self) -> JsValue {
        to_js(&self.editor.formula_preview())
    }

    /// Returns the `{row, col}` written, or null
    #[wasm_bindgen(js_name = commitFormula)]
    pub fn commit_formula(&mut self) -> JsValue {
        to_js(&self.editor.commit_formula())
    }

    #[wasm_bindgen(js_name = applyQuickFunction)]
    pub fn apply_quick_function(&mut self, name: &str) -> JsValue {
        to_js(&self.editor.apply_quick_function(name))
    }

    // --- Undo/Redo ---

    #[wasm_bindgen]
    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    #[wasm_bindgen]
    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    // --- Import / Export ---

    /// Load rows and merges parsed from a spreadsheet file
    ///
    /// json format:
    /// {
    ///   "rows": [["a", "b"], ["c"]],
    ///   "merges": [{ "startRow": 0, "startCol": 0, "endRow": 0, "endCol": 1 }]
    /// }
    #[wasm_bindgen(js_name = importSheet)]
    pub fn import_sheet(&mut self, json: &str) -> Result<(), JsValue> {
        let payload: ImportPayload = serde_json::from_str(json).map_err(JsSheetError::from_error)?;
        self.editor.import_sheet(payload.rows, payload.merges);
        Ok(())
    }

    /// `{rows, merges: [{start, end}]}` for a file writer
    #[wasm_bindgen(js_name = exportSheet)]
    pub fn export_sheet(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.editor.export_sheet()).map_err(JsSheetError::from_error)
    }

    // --- Persistence ---

    /// Serialize the persisted state to JSON
    #[wasm_bindgen]
    pub fn serialize(&self) -> Result<String, JsValue> {
        self.editor.persisted_state().to_json().map_err(to_js_error)
    }

    /// Restore persisted state from JSON
    #[wasm_bindgen]
    pub fn deserialize(&mut self, json: &str) -> bool {
        match PersistedState::from_json(json) {
            Ok(state) => self.editor.restore_state(&state),
            Err(_) => false,
        }
    }

    #[wasm_bindgen(js_name = saveToStorage)]
    pub fn save_to_storage(&mut self) -> bool {
        let saved = self.editor.save(&mut self.storage);
        if !saved {
            web_sys::console::warn_1(&"could not save to localStorage".into());
        }
        saved
    }

    #[wasm_bindgen(js_name = loadFromStorage)]
    pub fn load_from_storage(&mut self) -> bool {
        self.editor.load(&self.storage)
    }

    // --- Rendering ---

    /// JSON array of cell views for every drawn cell
    #[wasm_bindgen(js_name = renderCells)]
    pub fn render_cells(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.editor.render_cells()).map_err(JsSheetError::from_error)
    }

    #[wasm_bindgen(js_name = getColumnHeaders)]
    pub fn get_column_headers(&self) -> Vec<String> {
        self.editor.column_headers()
    }

    #[wasm_bindgen(js_name = getRowHeaders)]
    pub fn get_row_headers(&self) -> Vec<String> {
        self.editor.row_headers()
    }
}

impl Default for SpreadsheetEngine {
    fn default() -> Self {
        Self::new(None)
    }
}
