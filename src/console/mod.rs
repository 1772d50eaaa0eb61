//! Console surface: the prompt-protected line buffer and command history.
//!
//! Everything here is synchronous and I/O free; the UI feeds it key
//! actions and [`ShellEvent`](crate::shell::ShellEvent)s and forwards
//! [`ConsoleEffect::Send`] lines to the session.

mod buffer;
mod history;
mod surface;

pub use buffer::LineBuffer;
pub use history::CommandHistory;
pub use surface::{Console, ConsoleAction, ConsoleEffect};
