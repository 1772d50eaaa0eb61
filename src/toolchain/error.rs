use std::path::PathBuf;

use thiserror::Error;

use crate::shell::SessionError;
use crate::toolchain::ToolKind;

/// Why a single tool invocation could not be dispatched.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("The {tool} is not configured: {reason}")]
    Configuration { tool: ToolKind, reason: String },

    #[error("The {tool} expects a .{expected} file, got '{}'", path.display())]
    ExtensionMismatch {
        tool: ToolKind,
        expected: &'static str,
        path: PathBuf,
    },

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to launch the {tool} '{}': {source}", program.display())]
    Launch {
        tool: ToolKind,
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a build run stopped.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("No file is open; open a .{expected} file first")]
    NoOpenFile { expected: &'static str },

    #[error("No workspace is open; open a workspace folder first")]
    NoWorkspace,

    #[error("Failed to create output directory '{}': {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} step: {source}")]
    Step {
        tool: ToolKind,
        #[source]
        source: ToolchainError,
    },

    #[error("The {tool} exited with code {exit_code}")]
    StepFailed { tool: ToolKind, exit_code: i32 },

    #[error(transparent)]
    Session(#[from] SessionError),
}
