//! Interactive shell console and build-pipeline runner for a
//! C → assembly → serial-image toolchain.
//!
//! - [`shell`] - one long-lived shell process driven over pipes
//! - [`console`] - prompt-protected line buffer and command history
//! - [`toolchain`] - tool command lines and the build orchestrator
//! - [`ui`] - terminal front end
//! - [`headless`] - run one build without a UI

pub mod cli;
pub mod clipboard;
pub mod config;
pub mod console;
pub mod headless;
pub mod logging;
pub mod mvi;
pub mod shell;
pub mod toolchain;
pub mod ui;
