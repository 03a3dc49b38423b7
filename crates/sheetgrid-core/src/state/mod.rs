pub mod clipboard;
pub mod edit;
pub mod input;
pub mod selection;

pub use clipboard::{parse_tsv, to_tsv, ClipboardData, ClipboardMode, ClipboardState};
pub use edit::{CellEditSession, EditSessions, PendingCommit};
pub use input::{key_to_action, EditorAction, Key, Modifiers};
pub use selection::{
    CombineTarget, DragRange, Header, SelectionEngine, SelectionModifiers, SelectionState,
};
