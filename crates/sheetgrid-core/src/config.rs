use serde::{Deserialize, Serialize};

/// Editor configuration.
///
/// Every field has a default, so a partial JSON object from the host page
/// only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Rows of a freshly created (or reset) grid
    pub initial_rows: usize,
    /// Columns of a freshly created (or reset) grid
    pub initial_cols: usize,
    /// Width given to new columns
    pub default_col_width: f64,
    /// Narrowest width a column can be resized to
    pub min_col_width: f64,
    /// Maximum number of undo steps kept
    pub history_limit: usize,
    /// Inactivity window before typed text is committed to the grid
    pub commit_debounce_ms: u64,
    /// Key used by the persistence adapter
    pub storage_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            initial_rows: 46,
            initial_cols: 22,
            default_col_width: 96.0,
            min_col_width: 40.0,
            history_limit: 50,
            commit_debounce_ms: 300,
            storage_key: "sheetgrid_v1".to_string(),
        }
    }
}

impl EditorConfig {
    /// Parse a JSON configuration object, falling back to defaults for
    /// missing fields
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.initial_rows, 46);
        assert_eq!(config.initial_cols, 22);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.commit_debounce_ms, 300);
    }

    #[test]
    fn test_partial_json() {
        let config = EditorConfig::from_json(r#"{"initialRows": 3, "historyLimit": 5}"#).unwrap();
        assert_eq!(config.initial_rows, 3);
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.initial_cols, 22);
        assert_eq!(config.min_col_width, 40.0);
    }
}
