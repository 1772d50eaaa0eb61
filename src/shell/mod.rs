//! Interactive shell session.
//!
//! One child shell per console, driven over plain pipes (no pseudo-tty).
//!
//! # Architecture
//!
//! - `state.rs` / `intent.rs` / `reducer.rs` - lifecycle state machine
//!   (Stopped → Starting → Running → Exited), pure
//! - `session.rs` - the process handle, its stdin writer and output pumps
//! - `decoder.rs` - byte stream → text
//! - `marker.rs` - readiness and exit-status marker lines
//! - `spawn_config.rs` - program, arguments, working directory, timing

mod decoder;
mod error;
mod event;
mod intent;
pub mod marker;
mod reducer;
mod session;
mod spawn_config;
mod state;

pub use decoder::Utf8Decoder;
pub use error::SessionError;
pub use event::{OutputSource, ShellEvent};
pub use intent::SessionIntent;
pub use reducer::SessionReducer;
pub use session::{Completion, Readiness, ShellSession};
pub use spawn_config::ShellSpawnConfig;
pub use state::SessionState;
