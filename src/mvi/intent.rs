//! Intents: lifecycle events fed to a reducer.

/// Marker trait for intent objects.
///
/// Intents describe something that happened (a spawn succeeded, a process
/// exited, the user asked for a stop), never what to do about it.
pub trait Intent: Send + 'static {}
