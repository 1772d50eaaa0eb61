//! Lifecycle state of the shell session.

use crate::mvi::State;
use std::fmt;

/// Shell session state machine.
///
/// ```text
/// Stopped ──start──→ Starting ──spawned──→ Running ──exit/stop──→ Exited
///                       ↑   └──spawn failed──────────────────────→ │
///                       └──────────────────start───────────────────┘
/// ```
///
/// A start while Running passes through Starting again; the old process is
/// killed by the caller before the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Never started.
    #[default]
    Stopped,
    /// Spawn in progress.
    Starting,
    /// Process alive, stdin accepting lines.
    Running,
    /// Process gone (exited, killed, or failed to spawn).
    Exited,
}

impl State for SessionState {}

impl SessionState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Exited => "exited",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
