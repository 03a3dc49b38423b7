use std::collections::HashMap;

use crate::range::CellPosition;

/// A value an edit session wants written to the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCommit {
    pub position: CellPosition,
    pub value: String,
}

/// Typing in one cell.
///
/// Each keystroke restarts the debounce window; the text is committed once
/// the window passes without input, or when the editor loses focus. Time is
/// supplied by the caller in milliseconds. Dropping the session cancels its
/// timer.
#[derive(Debug)]
pub struct CellEditSession {
    position: CellPosition,
    committed: String,
    content: String,
    deadline: Option<u64>,
    debounce_ms: u64,
}

impl CellEditSession {
    pub fn new(position: CellPosition, current: impl Into<String>, debounce_ms: u64) -> Self {
        let current = current.into();
        Self {
            position,
            content: current.clone(),
            committed: current,
            deadline: None,
            debounce_ms,
        }
    }

    pub fn position(&self) -> CellPosition {
        self.position
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn deadline(&self) -> Option<u64> {
        self.deadline
    }

    pub fn is_dirty(&self) -> bool {
        self.content != self.committed
    }

    /// New text typed; restarts the timer
    pub fn input(&mut self, content: impl Into<String>, now_ms: u64) {
        self.content = content.into();
        self.deadline = Some(now_ms.saturating_add(self.debounce_ms));
    }

    /// Fire the timer if it has expired
    pub fn poll(&mut self, now_ms: u64) -> Option<PendingCommit> {
        match self.deadline {
            Some(deadline) if deadline <= now_ms => self.commit_now(),
            _ => None,
        }
    }

    /// Commit immediately, cancelling the timer
    pub fn commit_now(&mut self) -> Option<PendingCommit> {
        self.deadline = None;
        if !self.is_dirty() {
            return None;
        }
        self.committed = self.content.clone();
        Some(PendingCommit {
            position: self.position,
            value: self.content.clone(),
        })
    }

    /// Focus left the cell
    pub fn finish(mut self) -> Option<PendingCommit> {
        self.commit_now()
    }
}

impl Drop for CellEditSession {
    fn drop(&mut self) {
        if self.deadline.take().is_some() {
            tracing::debug!(cell = %self.position, "edit session dropped with a pending commit");
        }
    }
}

/// Edit sessions of every cell currently being typed in.
///
/// A session leaves the map once its text is committed or its timer is
/// cancelled, so the next keystroke starts again from the grid value.
#[derive(Debug, Default)]
pub struct EditSessions {
    sessions: HashMap<CellPosition, CellEditSession>,
    debounce_ms: u64,
}

impl EditSessions {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            sessions: HashMap::new(),
            debounce_ms,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, pos: CellPosition) -> Option<&CellEditSession> {
        self.sessions.get(&pos)
    }

    /// Text typed into `pos`; `current` is the cell value when no session
    /// exists yet
    pub fn input(&mut self, pos: CellPosition, current: &str, content: impl Into<String>, now_ms: u64) {
        let debounce_ms = self.debounce_ms;
        self.sessions
            .entry(pos)
            .or_insert_with(|| CellEditSession::new(pos, current, debounce_ms))
            .input(content, now_ms);
    }

    /// Earliest pending deadline, for the host to schedule its timer
    pub fn next_deadline(&self) -> Option<u64> {
        self.sessions.values().filter_map(CellEditSession::deadline).min()
    }

    /// Commits whose timers have expired, in row-major order
    pub fn poll(&mut self, now_ms: u64) -> Vec<PendingCommit> {
        let mut commits: Vec<_> = self
            .sessions
            .values_mut()
            .filter_map(|s| s.poll(now_ms))
            .collect();
        self.retain_pending();
        commits.sort_by_key(|c| c.position);
        commits
    }

    /// Commit every dirty session now, regardless of its timer
    pub fn flush(&mut self) -> Vec<PendingCommit> {
        let mut commits: Vec<_> = self
            .sessions
            .values_mut()
            .filter_map(CellEditSession::commit_now)
            .collect();
        self.retain_pending();
        commits.sort_by_key(|c| c.position);
        commits
    }

    fn retain_pending(&mut self) {
        self.sessions.retain(|_, s| s.deadline().is_some());
    }

    /// Blur: end the session of `pos`, committing changed text
    pub fn finish(&mut self, pos: CellPosition) -> Option<PendingCommit> {
        self.sessions.remove(&pos)?.finish()
    }

    /// The cell view went away; its pending commit is discarded
    pub fn dispose(&mut self, pos: CellPosition) {
        self.sessions.remove(&pos);
    }

    pub fn dispose_all(&mut self) {
        self.sessions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: usize, col: usize) -> CellPosition {
        CellPosition::new(row, col)
    }

    #[test]
    fn test_debounce_coalesces_keystrokes() {
        let mut session = CellEditSession::new(pos(0, 0), "", 300);
        session.input("1", 0);
        session.input("12", 100);
        session.input("123", 250);

        assert_eq!(session.poll(500), None);
        assert_eq!(
            session.poll(550),
            Some(PendingCommit {
                position: pos(0, 0),
                value: "123".into()
            })
        );
        assert_eq!(session.poll(10_000), None);
    }

    #[test]
    fn test_unchanged_text_is_not_committed() {
        let mut session = CellEditSession::new(pos(0, 0), "abc", 300);
        session.input("abcd", 0);
        session.input("abc", 10);
        assert_eq!(session.poll(400), None);
        assert_eq!(session.deadline(), None);
    }

    #[test]
    fn test_finish_commits_pending() {
        let mut session = CellEditSession::new(pos(1, 1), "", 300);
        session.input("x", 0);
        let commit = session.finish().unwrap();
        assert_eq!(commit.value, "x");
    }

    #[test]
    fn test_sessions_poll_and_finish() {
        let mut sessions = EditSessions::new(300);
        sessions.input(pos(2, 0), "", "b", 0);
        sessions.input(pos(0, 1), "", "a", 100);
        assert_eq!(sessions.next_deadline(), Some(300));

        let fired = sessions.poll(300);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].position, pos(2, 0));

        let fired = sessions.finish(pos(0, 1)).unwrap();
        assert_eq!(fired.value, "a");
        assert!(sessions.get(pos(0, 1)).is_none());
    }

    #[test]
    fn test_committed_session_leaves_the_map() {
        let mut sessions = EditSessions::new(300);
        sessions.input(pos(0, 0), "", "5", 0);
        sessions.input(pos(1, 0), "", "6", 200);

        assert_eq!(sessions.poll(300).len(), 1);
        assert!(sessions.get(pos(0, 0)).is_none());
        assert!(sessions.get(pos(1, 0)).is_some());

        // Someone else rewrote the cell; the old text counts as new input again
        sessions.input(pos(0, 0), "20", "5", 1_000);
        let fired = sessions.poll(1_300);
        assert_eq!(fired.len(), 2);
        assert_eq!(fired[0].value, "5");
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_flush_ignores_timers() {
        let mut sessions = EditSessions::new(300);
        sessions.input(pos(1, 0), "", "late", 0);
        sessions.input(pos(0, 0), "", "early", 0);
        let flushed = sessions.flush();
        assert_eq!(
            flushed.iter().map(|c| c.value.as_str()).collect::<Vec<_>>(),
            vec!["early", "late"]
        );
        assert!(sessions.poll(1_000).is_empty());
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_dispose_cancels_timer() {
        let mut sessions = EditSessions::new(300);
        sessions.input(pos(0, 0), "", "x", 0);
        sessions.dispose(pos(0, 0));
        assert!(sessions.is_empty());
        assert!(sessions.poll(1_000).is_empty());
        assert_eq!(sessions.next_deadline(), None);
    }
}
