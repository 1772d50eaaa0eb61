use crate::shell::state::SessionState;
use std::path::PathBuf;

/// Which stream a chunk of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    Stdout,
    Stderr,
    /// Produced by the session itself (e.g. the `^C` echo).
    System,
}

/// Everything a session reports to whoever renders it.
///
/// Events are sent in the order they happen; output from one stream keeps
/// the byte order of the process.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    StateChanged(SessionState),
    Started {
        program: String,
        cwd: PathBuf,
        pid: Option<u32>,
    },
    Output {
        source: OutputSource,
        text: String,
    },
    /// A command dispatched programmatically, to be shown as if typed.
    Echo(String),
    Exited {
        code: Option<i32>,
    },
    Error(String),
}
