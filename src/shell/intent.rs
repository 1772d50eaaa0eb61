//! Intents for the shell session lifecycle.

use crate::mvi::Intent;

/// Lifecycle events dispatched to [`SessionReducer`](super::SessionReducer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionIntent {
    /// A start (or restart) was requested.
    Start,

    /// The shell process was spawned successfully.
    Spawned,

    /// Spawning the shell failed.
    SpawnFailed,

    /// The shell process exited on its own or after a kill.
    ProcessExited,

    /// The user stopped the session.
    Stop,
}

impl Intent for SessionIntent {}
