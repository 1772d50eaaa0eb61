use super::{CommandHistory, LineBuffer};
use crate::config::ConsoleConfig;
use crate::shell::ShellEvent;

/// Editing request coming from the keyboard or a paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    Insert(String),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    HistoryUp,
    HistoryDown,
    Submit,
    Clear,
}

/// What the caller has to do after an action was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEffect {
    /// Buffer changed (or nothing to do).
    None,
    /// The edit would have touched the protected region; the buffer is untouched.
    Rejected,
    /// Write this line to the shell. May be empty (bare Enter).
    Send(String),
}

/// The line buffer plus command history, fed by shell events.
#[derive(Debug, Clone)]
pub struct Console {
    buffer: LineBuffer,
    history: CommandHistory,
}

impl Console {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            buffer: LineBuffer::new(config.prompt.clone()).with_max_lines(config.scrollback_lines),
            history: CommandHistory::new(config.history_limit),
        }
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn apply(&mut self, action: ConsoleAction) -> ConsoleEffect {
        let changed = match action {
            ConsoleAction::Insert(text) => self.buffer.insert(&text),
            ConsoleAction::Backspace => self.buffer.backspace(),
            ConsoleAction::Delete => self.buffer.delete(),
            ConsoleAction::Left => self.buffer.move_left(),
            ConsoleAction::Right => self.buffer.move_right(),
            ConsoleAction::Home => self.buffer.move_home(),
            ConsoleAction::End => self.buffer.move_end(),
            ConsoleAction::HistoryUp => {
                if let Some(entry) = self.history.recall_up(self.buffer.input()) {
                    self.buffer.replace_input(entry);
                }
                return ConsoleEffect::None;
            }
            ConsoleAction::HistoryDown => {
                if let Some(entry) = self.history.recall_down() {
                    self.buffer.replace_input(entry);
                }
                return ConsoleEffect::None;
            }
            ConsoleAction::Submit => return self.submit(),
            ConsoleAction::Clear => {
                self.buffer.clear();
                return ConsoleEffect::None;
            }
        };
        if changed {
            ConsoleEffect::None
        } else {
            ConsoleEffect::Rejected
        }
    }

    /// Mirror a session event into the buffer.
    pub fn on_shell_event(&mut self, event: &ShellEvent) {
        match event {
            ShellEvent::StateChanged(_) => {}
            ShellEvent::Started { program, cwd, .. } => {
                self.buffer.append_line(&format!("{} started", program));
                self.buffer
                    .append_line(&format!("Working directory: {}", cwd.display()));
            }
            ShellEvent::Output { text, .. } => self.buffer.append_output(text),
            ShellEvent::Echo(command) => self.buffer.echo_command(command),
            ShellEvent::Exited { code: Some(code) } => {
                self.buffer
                    .append_line(&format!("[shell exited with code {}]", code));
            }
            ShellEvent::Exited { code: None } => {
                self.buffer.append_line("[shell terminated by signal]");
            }
            ShellEvent::Error(message) => {
                self.buffer.append_line(&format!("[error] {}", message));
            }
        }
    }

    /// Print a one-line notice (build results, key help) into the transcript.
    pub fn notice(&mut self, message: &str) {
        self.buffer.append_line(message);
    }

    fn submit(&mut self) -> ConsoleEffect {
        let raw = self.buffer.submit();
        let command = raw.trim();
        if !command.is_empty() {
            self.history.push(command);
        }
        ConsoleEffect::Send(command.to_string())
    }
}
