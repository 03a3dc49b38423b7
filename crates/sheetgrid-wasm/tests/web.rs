#![cfg(target_arch = "wasm32")]

use sheetgrid_wasm::SpreadsheetEngine;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_engine_from_partial_config() {
    let engine = SpreadsheetEngine::new(Some(r#"{"initialRows": 4, "initialCols": 3}"#.to_string()));
    assert_eq!(engine.get_row_count(), 4);
    assert_eq!(engine.get_col_count(), 3);
    assert_eq!(engine.get_column_headers(), vec!["A", "B", "C"]);
}

#[wasm_bindgen_test]
fn test_edit_and_undo() {
    let mut engine = SpreadsheetEngine::new(None);
    assert!(engine.set_cell_value(0, 0, "42"));
    assert_eq!(engine.get_cell_value(0, 0).as_deref(), Some("42"));
    assert!(engine.undo());
    assert_eq!(engine.get_cell_value(0, 0).as_deref(), Some(""));
}

#[wasm_bindgen_test]
fn test_import_export() {
    let mut engine = SpreadsheetEngine::new(None);
    engine
        .import_sheet(r#"{"rows":[["a","b"],["c"]],"merges":[{"startRow":0,"startCol":0,"endRow":0,"endCol":1}]}"#)
        .unwrap();
    assert_eq!(engine.get_row_count(), 2);
    assert_eq!(engine.get_col_count(), 2);

    let exported = engine.export_sheet().unwrap();
    assert!(exported.contains(r#""rows":[["a","b"],["c",""]]"#));
    assert!(exported.contains(r#""end":{"row":0,"col":1}"#));
}

#[wasm_bindgen_test]
fn test_storage_round() {
    let mut engine = SpreadsheetEngine::new(Some(r#"{"storageKey":"sheetgrid_test"}"#.to_string()));
    engine.set_cell_value(1, 1, "saved");
    assert!(engine.save_to_storage());

    let mut other = SpreadsheetEngine::new(Some(r#"{"storageKey":"sheetgrid_test"}"#.to_string()));
    assert!(other.load_from_storage());
    assert_eq!(other.get_cell_value(1, 1).as_deref(), Some("saved"));
}

#[wasm_bindgen_test]
fn test_conditional_format_gets_id() {
    let mut engine = SpreadsheetEngine::new(None);
    let id = engine
        .add_conditional_format(r##"{"type":"gt","value":"5","backgroundColor":"#fdd"}"##)
        .unwrap();
    assert!(!id.is_empty());
    assert!(engine.remove_conditional_format(&id));
}
