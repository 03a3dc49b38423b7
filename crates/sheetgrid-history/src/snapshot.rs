use sheetgrid_core::{Sheet, SelectionState};

/// Editor state captured before a mutation.
///
/// Cloning a `Sheet` shares unchanged grid rows with the original, so a
/// snapshot costs the rows later edited, not the whole grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub sheet: Sheet,
    pub selection: SelectionState,
    /// What the mutation that followed this snapshot was
    pub label: String,
}

impl Snapshot {
    pub fn new(sheet: Sheet, selection: SelectionState) -> Self {
        Self {
            sheet,
            selection,
            label: String::new(),
        }
    }

    pub fn capture(sheet: &Sheet, selection: &SelectionState, label: impl Into<String>) -> Self {
        Self {
            sheet: sheet.clone(),
            selection: selection.clone(),
            label: label.into(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetgrid_core::ColumnDefaults;

    #[test]
    fn test_capture_is_independent() {
        let mut sheet = Sheet::with_size(3, 3, ColumnDefaults::default());
        sheet.set_cell(0, 0, "before").unwrap();

        let snapshot = Snapshot::capture(&sheet, &SelectionState::default(), "edit");
        sheet.set_cell(0, 0, "after").unwrap();

        assert_eq!(snapshot.sheet.get(0, 0), Some("before"));
        assert_eq!(snapshot.label, "edit");
        assert!(!sheet.grid().shares_row_with(snapshot.sheet.grid(), 0));
        assert!(sheet.grid().shares_row_with(snapshot.sheet.grid(), 1));

        sheet.add_column();
        assert_eq!(snapshot.sheet.col_count(), 3);
        assert_eq!(snapshot.sheet.col_widths().len(), 3);
    }
}
