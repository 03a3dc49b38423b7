mod api;
pub mod editor;
pub mod storage;

pub use api::SpreadsheetEngine;
pub use editor::{ClearOutcome, CombineOutcome, GridEditor, KeyOutcome};
pub use storage::LocalStorage;

use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}
