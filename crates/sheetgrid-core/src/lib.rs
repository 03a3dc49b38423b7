pub mod cell;
pub mod conditional_format;
pub mod config;
pub mod error;
pub mod exchange;
pub mod grid;
pub mod merge;
pub mod persist;
pub mod range;
pub mod render;
pub mod search;
pub mod sheet;
pub mod sort;
pub mod state;

pub use cell::{format_number, is_blank, parse_bool, parse_number};
pub use conditional_format::{CellStyle, ConditionalFormatRule, ConditionalFormats, RuleKind};
pub use config::EditorConfig;
pub use error::SheetError;
pub use exchange::{ImportedMerge, MergeCorners, SheetExport};
pub use grid::Grid;
pub use merge::{CellSpan, Merge, MergeList};
pub use persist::{load_state, save_state, MemoryStore, PersistedState, SnapshotStore};
pub use range::{col_from_label, col_to_label, CellPosition, CellRange};
pub use render::{column_headers, row_headers, CellView, FreezePanes, RenderContext};
pub use search::{find_all, find_next, Matcher, SearchOptions};
pub use sheet::{ColumnDefaults, Sheet};
pub use sort::{compare_cells, SortOrder};
pub use state::{
    key_to_action, parse_tsv, to_tsv, CellEditSession, ClipboardMode, ClipboardState,
    CombineTarget, DragRange, EditSessions, EditorAction, Header, Key, Modifiers, PendingCommit,
    SelectionEngine, SelectionModifiers, SelectionState,
};
