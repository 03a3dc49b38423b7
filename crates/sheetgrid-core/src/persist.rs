use serde::{Deserialize, Serialize};

use crate::conditional_format::ConditionalFormatRule;
use crate::error::SheetError;
use crate::grid::Grid;
use crate::merge::Merge;
use crate::sheet::{ColumnDefaults, Sheet};

/// State saved between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub data: Vec<Vec<String>>,
    #[serde(default)]
    pub merges: Vec<Merge>,
    #[serde(default)]
    pub col_widths: Vec<f64>,
    #[serde(default)]
    pub dark_mode: bool,
    #[serde(default)]
    pub conditional_format_rules: Vec<ConditionalFormatRule>,
    #[serde(default)]
    pub freeze_row_count: usize,
    #[serde(default)]
    pub freeze_col_count: usize,
}

impl PersistedState {
    pub fn from_json(json: &str) -> Result<Self, SheetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SheetError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuild the sheet. The grid must be rectangular; widths and merges
    /// are repaired.
    pub fn to_sheet(&self, defaults: ColumnDefaults) -> Result<Sheet, SheetError> {
        let grid = Grid::from_rows(self.data.clone())?;
        Ok(Sheet::from_parts(
            grid,
            &self.col_widths,
            self.merges.iter().copied(),
            defaults,
        ))
    }
}

/// Where persisted state lives (browser storage, a file, memory)
pub trait SnapshotStore {
    /// The saved payload, if any
    fn load(&self) -> Result<Option<String>, SheetError>;
    fn save(&mut self, payload: &str) -> Result<(), SheetError>;
}

/// Load and parse the saved state. Any failure is logged and treated as
/// "nothing saved".
pub fn load_state(store: &dyn SnapshotStore) -> Option<PersistedState> {
    let payload = match store.load() {
        Ok(Some(payload)) => payload,
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(%err, "could not read saved state");
            return None;
        }
    };

    match PersistedState::from_json(&payload) {
        Ok(state) => Some(state),
        Err(err) => {
            tracing::warn!(%err, "ignoring invalid saved state");
            None
        }
    }
}

/// Serialize and save, logging failures
pub fn save_state(store: &mut dyn SnapshotStore, state: &PersistedState) -> bool {
    let result = state.to_json().and_then(|json| store.save(&json));
    if let Err(err) = &result {
        tracing::warn!(%err, "could not save state");
    }
    result.is_ok()
}

/// Store kept in memory, for tests and hosts without storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    payload: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
        }
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, SheetError> {
        Ok(self.payload.clone())
    }

    fn save(&mut self, payload: &str) -> Result<(), SheetError> {
        self.payload = Some(payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl SnapshotStore for BrokenStore {
        fn load(&self) -> Result<Option<String>, SheetError> {
            Err(SheetError::Storage("denied".into()))
        }

        fn save(&mut self, _payload: &str) -> Result<(), SheetError> {
            Err(SheetError::Storage("denied".into()))
        }
    }

    fn sample() -> PersistedState {
        PersistedState {
            data: vec![vec!["a".into(), "b".into()], vec!["".into(), "c".into()]],
            merges: vec![Merge::new(0, 0, 1, 2)],
            col_widths: vec![120.0],
            dark_mode: true,
            conditional_format_rules: vec![],
            freeze_row_count: 1,
            freeze_col_count: 0,
        }
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        assert!(load_state(&store).is_none());
        assert!(save_state(&mut store, &sample()));
        assert_eq!(load_state(&store), Some(sample()));
        assert!(store.payload().unwrap().contains("\"colWidths\""));
    }

    #[test]
    fn test_invalid_payload_is_ignored() {
        assert!(load_state(&MemoryStore::with_payload("not json")).is_none());
        assert!(load_state(&BrokenStore).is_none());
        assert!(!save_state(&mut BrokenStore, &sample()));
    }

    #[test]
    fn test_to_sheet_repairs_parts() {
        let sheet = sample().to_sheet(ColumnDefaults::default()).unwrap();
        assert_eq!(sheet.col_widths(), &[120.0, 96.0]);
        assert_eq!(sheet.merges().as_slice(), &[Merge::new(0, 0, 1, 2)]);
    }

    #[test]
    fn test_to_sheet_rejects_ragged() {
        let mut state = sample();
        state.data[1].pop();
        assert_eq!(
            state.to_sheet(ColumnDefaults::default()),
            Err(SheetError::InvalidShape)
        );
    }

    #[test]
    fn test_minimal_json() {
        let state = PersistedState::from_json(r#"{"data":[["x"]]}"#).unwrap();
        assert!(state.merges.is_empty());
        assert!(!state.dark_mode);
    }
}
