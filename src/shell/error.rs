use thiserror::Error;

use crate::shell::state::SessionState;

/// Errors reported by [`ShellSession`](super::ShellSession).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to spawn shell '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to resolve working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("Shell session is not running (state: {state})")]
    NotRunning { state: SessionState },

    #[error("Shell stdin is closed")]
    InputClosed,

    #[error("Shell exited before command {id} completed")]
    CompletionLost { id: u64 },

    #[error("Failed to interrupt shell: {0}")]
    Interrupt(String),
}
