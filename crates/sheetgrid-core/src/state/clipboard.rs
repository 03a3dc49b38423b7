use serde::{Deserialize, Serialize};

/// Clipboard mode determines what operation was last performed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipboardMode {
    /// Clipboard is empty
    #[default]
    Empty,
    /// Content was copied
    Copy,
    /// Content was cut
    Cut,
}

/// Copied cell values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardData {
    pub values: Vec<Vec<String>>,
    pub mode: ClipboardMode,
}

/// In-memory clipboard, used whenever the system clipboard is unavailable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardState {
    data: Option<ClipboardData>,
}

impl ClipboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a block, returning its TSV form for the system clipboard
    pub fn copy(&mut self, values: Vec<Vec<String>>) -> String {
        self.store(values, ClipboardMode::Copy)
    }

    pub fn cut(&mut self, values: Vec<Vec<String>>) -> String {
        self.store(values, ClipboardMode::Cut)
    }

    fn store(&mut self, values: Vec<Vec<String>>, mode: ClipboardMode) -> String {
        let text = to_tsv(&values);
        self.data = Some(ClipboardData { values, mode });
        text
    }

    pub fn data(&self) -> Option<&ClipboardData> {
        self.data.as_ref()
    }

    pub fn clear(&mut self) {
        self.data = None;
    }

    pub fn mode(&self) -> ClipboardMode {
        self.data
            .as_ref()
            .map(|d| d.mode)
            .unwrap_or(ClipboardMode::Empty)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Cut content is only pasted once
    pub fn clear_if_cut(&mut self) {
        if self.mode() == ClipboardMode::Cut {
            self.clear();
        }
    }
}

/// Tab-separated rows joined by newlines
pub fn to_tsv(values: &[Vec<String>]) -> String {
    values
        .iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse tab-separated text. `\r\n` line endings are accepted and a single
/// trailing newline is ignored.
pub fn parse_tsv(text: &str) -> Vec<Vec<String>> {
    let text = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }

    text.split('\n')
        .map(|line| {
            line.strip_suffix('\r')
                .unwrap_or(line)
                .split('\t')
                .map(str::to_string)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_clipboard_mode_default() {
        assert_eq!(ClipboardMode::default(), ClipboardMode::Empty);
        assert!(ClipboardState::new().is_empty());
    }

    #[test]
    fn test_copy_returns_tsv() {
        let mut clipboard = ClipboardState::new();
        let text = clipboard.copy(block(&[&["a", "b"], &["c", ""]]));
        assert_eq!(text, "a\tb\nc\t");
        assert_eq!(clipboard.mode(), ClipboardMode::Copy);
    }

    #[test]
    fn test_clear_if_cut() {
        let mut clipboard = ClipboardState::new();
        clipboard.copy(block(&[&["a"]]));
        clipboard.clear_if_cut();
        assert!(!clipboard.is_empty());

        clipboard.cut(block(&[&["a"]]));
        clipboard.clear_if_cut();
        assert!(clipboard.is_empty());
    }

    #[test]
    fn test_parse_tsv() {
        assert_eq!(parse_tsv("a\tb\r\nc\td\r\n"), block(&[&["a", "b"], &["c", "d"]]));
        assert_eq!(parse_tsv("x"), block(&[&["x"]]));
        assert_eq!(parse_tsv("a\t\tb"), block(&[&["a", "", "b"]]));
        assert!(parse_tsv("").is_empty());
    }

    #[test]
    fn test_tsv_roundtrip_keeps_shape() {
        let values = block(&[&["1", "", "3"], &["", "", ""]]);
        assert_eq!(parse_tsv(&to_tsv(&values)), values);
    }
}
