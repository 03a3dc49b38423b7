use serde::{Deserialize, Serialize};

use super::selection::SelectionModifiers;

/// What a key press asks the editor to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditorAction {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,

    // Selection
    ExtendUp,
    ExtendDown,
    ExtendLeft,
    ExtendRight,
    SelectAll,
    Collapse,

    // Editing
    ClearSelection,

    // Clipboard
    Copy,
    Cut,
    Paste,

    // History
    Undo,
    Redo,

    None,
}

impl EditorAction {
    /// Row/column step of a move or extend action
    pub fn direction(self) -> Option<(isize, isize)> {
        match self {
            EditorAction::MoveUp | EditorAction::ExtendUp => Some((-1, 0)),
            EditorAction::MoveDown | EditorAction::ExtendDown => Some((1, 0)),
            EditorAction::MoveLeft | EditorAction::ExtendLeft => Some((0, -1)),
            EditorAction::MoveRight | EditorAction::ExtendRight => Some((0, 1)),
            _ => None,
        }
    }

    pub fn is_extend(self) -> bool {
        matches!(
            self,
            EditorAction::ExtendUp
                | EditorAction::ExtendDown
                | EditorAction::ExtendLeft
                | EditorAction::ExtendRight
        )
    }
}

/// Key codes the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Escape,
    Backspace,
    Delete,
    Char(char),
    Unknown,
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` value
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Escape" | "Esc" => Key::Escape,
            "Backspace" => Key::Backspace,
            "Delete" | "Del" => Key::Delete,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                    _ => Key::Unknown,
                }
            }
        }
    }
}

/// Modifier keys state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_ctrl(mut self, ctrl: bool) -> Self {
        self.ctrl = ctrl;
        self
    }

    pub fn with_meta(mut self, meta: bool) -> Self {
        self.meta = meta;
        self
    }

    pub fn none_pressed(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt && !self.meta
    }

    pub fn only_shift(&self) -> bool {
        self.shift && !self.ctrl && !self.alt && !self.meta
    }

    pub fn ctrl_or_meta(&self) -> bool {
        self.ctrl || self.meta
    }
}

impl From<Modifiers> for SelectionModifiers {
    fn from(m: Modifiers) -> Self {
        SelectionModifiers {
            range: m.shift,
            additive: m.ctrl_or_meta(),
        }
    }
}

/// Maps a key and modifiers to an EditorAction
pub fn key_to_action(key: Key, modifiers: Modifiers) -> EditorAction {
    match key {
        Key::ArrowUp if modifiers.none_pressed() => EditorAction::MoveUp,
        Key::ArrowDown if modifiers.none_pressed() => EditorAction::MoveDown,
        Key::ArrowLeft if modifiers.none_pressed() => EditorAction::MoveLeft,
        Key::ArrowRight if modifiers.none_pressed() => EditorAction::MoveRight,

        Key::ArrowUp if modifiers.only_shift() => EditorAction::ExtendUp,
        Key::ArrowDown if modifiers.only_shift() => EditorAction::ExtendDown,
        Key::ArrowLeft if modifiers.only_shift() => EditorAction::ExtendLeft,
        Key::ArrowRight if modifiers.only_shift() => EditorAction::ExtendRight,

        Key::Escape => EditorAction::Collapse,
        Key::Delete | Key::Backspace if modifiers.none_pressed() => EditorAction::ClearSelection,

        Key::Char('a') if modifiers.ctrl_or_meta() => EditorAction::SelectAll,
        Key::Char('c') if modifiers.ctrl_or_meta() => EditorAction::Copy,
        Key::Char('x') if modifiers.ctrl_or_meta() => EditorAction::Cut,
        Key::Char('v') if modifiers.ctrl_or_meta() => EditorAction::Paste,
        Key::Char('z') if modifiers.ctrl_or_meta() && !modifiers.shift => EditorAction::Undo,
        Key::Char('z') if modifiers.ctrl_or_meta() && modifiers.shift => EditorAction::Redo,
        Key::Char('y') if modifiers.ctrl_or_meta() => EditorAction::Redo,

        _ => EditorAction::None,
    }
}
