//! Configuration: TOML file, defaults, validation and a shared store.

mod loader;
mod store;
mod types;

pub use loader::ConfigError;
pub use store::ConfigStore;
pub use types::{Config, ConsoleConfig, ShellConfig, ToolchainConfig};
