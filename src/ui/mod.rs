//! Interactive console (ratatui + crossterm).
//!
//! Single UI thread: it owns the [`App`](app::App), drains [`AppEvent`]s
//! from the input thread, the session forwarder and finished builds, and
//! redraws after each batch.

pub mod app;
pub mod events;
pub mod footer;
pub mod header;
pub mod input;
pub mod layout;
pub mod render;
pub mod runtime;
pub mod terminal_guard;
pub mod theme;

pub use events::AppEvent;
pub use runtime::run;
