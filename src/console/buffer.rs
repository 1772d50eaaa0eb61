//! Prompt-protected text buffer mirroring the shell's I/O.

/// Append-mostly transcript with one editable input region at its tail.
///
/// ```text
/// ...earlier output\n
/// PS> make all\n
/// output line\n
/// PS> ls -l█          ← prompt, then the editable input
///     ^input_start
/// ```
///
/// Invariants:
/// - the caret never moves before `input_start`, so the prompt (and all
///   earlier output) can't be edited or deleted;
/// - when the last appended output ended in a line terminator, the last
///   line starts with exactly one prompt;
/// - the input region never contains a line break.
///
/// Output that stops mid-line (`Continue? `) gets no prompt. The input then
/// starts right after that text, so the caret column can be smaller than
/// the prompt length; the floor is still `input_start`. The next output
/// ending in a line terminator restores the prompt.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    text: String,
    prompt: String,
    /// Byte offset where the editable input begins.
    input_start: usize,
    /// Whether our prompt sits directly before `input_start`.
    prompt_shown: bool,
    caret: usize,
    newlines: usize,
    max_lines: usize,
    revision: u64,
}

impl LineBuffer {
    /// A buffer holding just the prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        let len = prompt.len();
        Self {
            text: prompt.clone(),
            prompt,
            input_start: len,
            prompt_shown: true,
            caret: len,
            newlines: 0,
            max_lines: usize::MAX,
            revision: 0,
        }
    }

    /// Keep at most `max_lines` lines; older ones are dropped from the front.
    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines.max(1);
        self.trim_scrollback();
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// What the user has typed after the prompt.
    pub fn input(&self) -> &str {
        &self.text[self.input_start..]
    }

    /// Caret as a byte offset into [`text`](Self::text).
    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn input_start(&self) -> usize {
        self.input_start
    }

    pub fn prompt_shown(&self) -> bool {
        self.prompt_shown
    }

    /// Incremented on every change; renderers redraw when it moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn line_count(&self) -> usize {
        self.newlines + 1
    }

    pub fn last_line(&self) -> &str {
        &self.text[self.last_line_start()..]
    }

    /// Caret column within the last line, in characters.
    pub fn caret_column(&self) -> usize {
        self.text[self.last_line_start()..self.caret].chars().count()
    }

    /// True when appended text would begin a fresh line.
    pub fn at_line_start(&self) -> bool {
        self.prompt_shown || self.input_start == 0 || self.text[..self.input_start].ends_with('\n')
    }

    /// Append process output.
    ///
    /// The trailing prompt and the in-progress input are lifted off, the
    /// output is appended verbatim, a fresh prompt is added when the output
    /// ends a line, and the input is put back after it.
    pub fn append_output(&mut self, output: &str) {
        if output.is_empty() {
            return;
        }
        let caret_in_input = self.caret - self.input_start;
        let input = self.text.split_off(self.input_start);
        if self.prompt_shown {
            self.text.truncate(self.input_start - self.prompt.len());
        }

        self.text.push_str(output);
        self.newlines += count_newlines(output);
        self.prompt_shown = output.ends_with('\n');
        if self.prompt_shown {
            self.text.push_str(&self.prompt);
        }

        self.input_start = self.text.len();
        self.text.push_str(&input);
        self.caret = self.input_start + caret_in_input;
        self.trim_scrollback();
        self.touch();
    }

    /// Append `line` as a line of its own, starting a new line first if needed.
    pub fn append_line(&mut self, line: &str) {
        let prefix = if self.at_line_start() { "" } else { "\n" };
        self.append_output(&format!("{}{}\n", prefix, line));
    }

    /// Show a programmatically dispatched command as if it had been typed
    /// at the prompt. The user's own draft moves down to the next prompt.
    pub fn echo_command(&mut self, command: &str) {
        if !self.prompt_shown {
            self.append_line(command);
            return;
        }
        let caret_in_input = self.caret - self.input_start;
        let draft = self.text.split_off(self.input_start);
        let command = flatten_line_breaks(command);

        self.text.push_str(&command);
        self.text.push('\n');
        self.newlines += 1;
        self.text.push_str(&self.prompt);
        self.input_start = self.text.len();
        self.text.push_str(&draft);
        self.caret = self.input_start + caret_in_input;
        self.trim_scrollback();
        self.touch();
    }

    /// Commit the current input to the transcript and open a new prompt.
    /// Returns the raw (untrimmed) input.
    pub fn submit(&mut self) -> String {
        let input = self.input().to_string();
        self.input_start = self.text.len();
        self.caret = self.input_start;
        // The prompt now belongs to the committed line.
        self.prompt_shown = false;
        self.append_output("\n");
        input
    }

    /// Insert typed, pasted or dropped text at the caret. Line breaks are
    /// flattened to spaces and other control characters dropped.
    pub fn insert(&mut self, text: &str) -> bool {
        let text = flatten_line_breaks(text);
        if text.is_empty() {
            return false;
        }
        self.text.insert_str(self.caret, &text);
        self.caret += text.len();
        self.touch();
        true
    }

    /// Replace the whole input (history recall).
    pub fn replace_input(&mut self, text: &str) {
        self.text.truncate(self.input_start);
        self.text.push_str(&flatten_line_breaks(text));
        self.caret = self.text.len();
        self.touch();
    }

    pub fn backspace(&mut self) -> bool {
        let Some(prev) = self.prev_boundary() else {
            return false;
        };
        self.text.replace_range(prev..self.caret, "");
        self.caret = prev;
        self.touch();
        true
    }

    pub fn delete(&mut self) -> bool {
        let Some(next) = self.next_boundary() else {
            return false;
        };
        self.text.replace_range(self.caret..next, "");
        self.touch();
        true
    }

    pub fn move_left(&mut self) -> bool {
        match self.prev_boundary() {
            Some(prev) => self.move_caret(prev),
            None => false,
        }
    }

    pub fn move_right(&mut self) -> bool {
        match self.next_boundary() {
            Some(next) => self.move_caret(next),
            None => false,
        }
    }

    pub fn move_home(&mut self) -> bool {
        self.move_caret(self.input_start)
    }

    pub fn move_end(&mut self) -> bool {
        self.move_caret(self.text.len())
    }

    /// Drop the transcript, keeping only the current prompt line.
    pub fn clear(&mut self) {
        let caret_in_input = self.caret - self.input_start;
        let input = self.text.split_off(self.input_start);
        self.text.clear();
        if self.prompt_shown {
            self.text.push_str(&self.prompt);
        }
        self.input_start = self.text.len();
        self.text.push_str(&input);
        self.caret = self.input_start + caret_in_input;
        self.newlines = 0;
        self.touch();
    }

    fn move_caret(&mut self, offset: usize) -> bool {
        if offset == self.caret {
            return false;
        }
        self.caret = offset;
        self.touch();
        true
    }

    fn prev_boundary(&self) -> Option<usize> {
        if self.caret <= self.input_start {
            return None;
        }
        self.text[..self.caret]
            .chars()
            .next_back()
            .map(|c| self.caret - c.len_utf8())
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.caret..]
            .chars()
            .next()
            .map(|c| self.caret + c.len_utf8())
    }

    fn last_line_start(&self) -> usize {
        self.text.rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn trim_scrollback(&mut self) {
        let lines = self.line_count();
        if lines <= self.max_lines {
            return;
        }
        let excess = lines - self.max_lines;
        let Some((index, _)) = self.text.match_indices('\n').nth(excess - 1) else {
            return;
        };
        let cut = index + 1;
        self.text.drain(..cut);
        self.input_start -= cut;
        self.caret -= cut;
        self.newlines -= excess;
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

fn flatten_line_breaks(text: &str) -> String {
    text.replace("\r\n", " ")
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .filter(|c| !c.is_control() || *c == '\t')
        .collect()
}
