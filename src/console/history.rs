/// Submitted commands with an Up/Down recall cursor.
///
/// The cursor ranges over `0..=len`; `len` means "past the newest entry",
/// where the user's unsent draft lives.
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: Vec<String>,
    cursor: usize,
    draft: String,
    limit: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(500)
    }
}

impl CommandHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            draft: String::new(),
            limit: limit.max(1),
        }
    }

    /// Record a submitted command and reset the cursor past the newest entry.
    /// Consecutive duplicates are kept.
    pub fn push(&mut self, command: impl Into<String>) {
        self.entries.push(command.into());
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        self.reset_cursor();
    }

    /// Step to the previous entry. `current` is what the input holds right
    /// now; it is kept as the draft when leaving the bottom of the history.
    pub fn recall_up(&mut self, current: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        if self.cursor >= self.entries.len() {
            self.draft = current.to_string();
        }
        self.cursor = self.cursor.saturating_sub(1).min(self.entries.len() - 1);
        self.entries.get(self.cursor).map(String::as_str)
    }

    /// Step to the next entry, ending on the preserved draft.
    pub fn recall_down(&mut self) -> Option<&str> {
        if self.cursor >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        if self.cursor == self.entries.len() {
            Some(self.draft.as_str())
        } else {
            self.entries.get(self.cursor).map(String::as_str)
        }
    }

    fn reset_cursor(&mut self) {
        self.cursor = self.entries.len();
        self.draft.clear();
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(commands: &[&str]) -> CommandHistory {
        let mut history = CommandHistory::default();
        for command in commands {
            history.push(*command);
        }
        history
    }

    #[test]
    fn up_walks_back_and_stops_at_oldest() {
        let mut h = history(&["a", "b", "c"]);
        assert_eq!(h.recall_up(""), Some("c"));
        assert_eq!(h.recall_up("c"), Some("b"));
        assert_eq!(h.recall_up("b"), Some("a"));
        assert_eq!(h.recall_up("a"), Some("a"));
        assert_eq!(h.cursor(), 0);
    }

    #[test]
    fn down_past_newest_restores_draft() {
        let mut h = history(&["a", "b"]);
        assert_eq!(h.recall_up("half typed"), Some("b"));
        assert_eq!(h.recall_down(), Some("half typed"));
        assert_eq!(h.recall_down(), None);
        assert_eq!(h.cursor(), 2);
    }

    #[test]
    fn empty_history_recalls_nothing() {
        let mut h = CommandHistory::default();
        assert_eq!(h.recall_up("x"), None);
        assert_eq!(h.recall_down(), None);
    }

    #[test]
    fn push_resets_cursor() {
        let mut h = history(&["a", "b"]);
        h.recall_up("");
        h.recall_up("");
        h.push("c");
        assert_eq!(h.cursor(), 3);
        assert_eq!(h.recall_up(""), Some("c"));
    }

    #[test]
    fn duplicates_are_kept() {
        let h = history(&["ls", "ls"]);
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn limit_drops_oldest() {
        let mut h = CommandHistory::new(2);
        h.push("a");
        h.push("b");
        h.push("c");
        assert_eq!(h.len(), 2);
        assert_eq!(h.recall_up(""), Some("c"));
        assert_eq!(h.recall_up(""), Some("b"));
        assert_eq!(h.recall_up(""), Some("b"));
    }
}
