use sheetgrid_core::{SheetError, SnapshotStore};
use wasm_bindgen::JsValue;

/// Browser `localStorage` under a fixed key
#[derive(Debug, Clone)]
pub struct LocalStorage {
    key: String,
}

impl LocalStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn storage() -> Result<web_sys::Storage, SheetError> {
        web_sys::window()
            .ok_or_else(|| SheetError::Storage("no window".to_string()))?
            .local_storage()
            .map_err(storage_error)?
            .ok_or_else(|| SheetError::Storage("localStorage unavailable".to_string()))
    }
}

fn storage_error(err: JsValue) -> SheetError {
    SheetError::Storage(format!("{:?}", err))
}

impl SnapshotStore for LocalStorage {
    fn load(&self) -> Result<Option<String>, SheetError> {
        Self::storage()?.get_item(&self.key).map_err(storage_error)
    }

    fn save(&mut self, payload: &str) -> Result<(), SheetError> {
        Self::storage()?
            .set_item(&self.key, payload)
            .map_err(storage_error)
    }
}
