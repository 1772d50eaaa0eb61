//! Compiler, assembler and programmer invocation.
//!
//! - `tool.rs` - tool kinds and the step description
//! - `adapter.rs` - validation and command lines, dispatch through the session
//! - `launcher.rs` - direct process launch for the programmer
//! - `pipeline.rs` - build actions and the orchestrator running them

mod adapter;
mod error;
mod launcher;
mod pipeline;
mod tool;

pub use adapter::{
    assembler_command, compiler_command, normalize_path, Dispatched, InvocationStatus,
    PreparedCommand, ToolAdapter,
};
pub use error::{PipelineError, ToolchainError};
pub use launcher::{ProcessLauncher, SystemLauncher};
pub use pipeline::{
    BuildAction, BuildContext, Orchestrator, PipelineRun, RunReport, StepReport, SERIAL_IMAGE,
};
pub use tool::{PipelineStep, ToolKind};
