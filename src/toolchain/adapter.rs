//! Turns a [`PipelineStep`] into a shell command line (or a direct launch)
//! and hands it to the shared session.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{ConfigStore, ToolchainConfig};
use crate::shell::{Completion, ShellSession};
use crate::toolchain::error::ToolchainError;
use crate::toolchain::launcher::{ProcessLauncher, SystemLauncher};
use crate::toolchain::tool::{PipelineStep, ToolKind};

/// Where an invocation stands when [`ToolAdapter::invoke`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStatus {
    /// Handed to the shell (or launched); nothing is known about the outcome.
    Dispatched,
    /// The shell reported the tool's exit status.
    Completed { exit_code: i32 },
}

/// A validated invocation, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreparedCommand {
    /// A line for the interactive shell.
    Shell(String),
    /// A process started directly, outside the shell.
    Launch { program: PathBuf, args: Vec<String> },
}

impl PreparedCommand {
    /// Human-readable form, as echoed or logged.
    pub fn display(&self) -> String {
        match self {
            Self::Shell(line) => line.clone(),
            Self::Launch { program, args } => {
                let mut line = quote(&normalize_path(program));
                for arg in args {
                    line.push(' ');
                    line.push_str(&quote(arg));
                }
                line
            }
        }
    }
}

/// Result of a successful [`ToolAdapter::invoke`].
#[derive(Debug)]
pub struct Dispatched {
    pub tool: ToolKind,
    pub command_line: String,
    /// Present when completion tracking is on and the step ran in the shell.
    pub completion: Option<Completion>,
}

/// Builds tool command lines from the current config and dispatches them.
#[derive(Clone)]
pub struct ToolAdapter {
    config: ConfigStore,
    session: ShellSession,
    launcher: Arc<dyn ProcessLauncher>,
}

impl ToolAdapter {
    pub fn new(config: ConfigStore, session: ShellSession) -> Self {
        Self {
            config,
            session,
            launcher: Arc::new(SystemLauncher),
        }
    }

    /// Replace how direct launches (the programmer) are started.
    pub fn with_launcher(mut self, launcher: Arc<dyn ProcessLauncher>) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn session(&self) -> &ShellSession {
        &self.session
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Validate `step` against the current config and build its command.
    /// Touches neither the session nor the file system beyond a metadata
    /// lookup of the tool path.
    pub fn prepare(&self, step: &PipelineStep) -> Result<PreparedCommand, ToolchainError> {
        prepare_with(&self.config.get().toolchain, step)
    }

    /// Validate, make sure the shell is running, then dispatch.
    ///
    /// Returns once the command is queued for the shell; with completion
    /// tracking on, the returned [`Dispatched::completion`] resolves when
    /// the tool exits.
    pub async fn invoke(&self, step: &PipelineStep) -> Result<Dispatched, ToolchainError> {
        let toolchain = self.config.get().toolchain;
        let prepared = prepare_with(&toolchain, step)?;
        let command_line = prepared.display();

        match prepared {
            PreparedCommand::Shell(line) => {
                let readiness = self.session.ensure_running().await?;
                debug!(tool = %step.tool, ?readiness, "Session ready for dispatch");
                let completion = if toolchain.track_completion {
                    Some(self.session.dispatch_tracked(&line)?)
                } else {
                    self.session.dispatch(&line)?;
                    None
                };
                info!(tool = %step.tool, command = %line, "Tool dispatched");
                Ok(Dispatched {
                    tool: step.tool,
                    command_line,
                    completion,
                })
            }
            PreparedCommand::Launch { program, args } => {
                self.launcher
                    .launch(&program, &args)
                    .map_err(|source| ToolchainError::Launch {
                        tool: step.tool,
                        program: program.clone(),
                        source,
                    })?;
                info!(tool = %step.tool, command = %command_line, "Tool launched");
                Ok(Dispatched {
                    tool: step.tool,
                    command_line,
                    completion: None,
                })
            }
        }
    }
}

fn prepare_with(
    toolchain: &ToolchainConfig,
    step: &PipelineStep,
) -> Result<PreparedCommand, ToolchainError> {
    let tool = step.tool;
    if !tool.accepts(&step.source) {
        return Err(ToolchainError::ExtensionMismatch {
            tool,
            expected: tool.expected_extension(),
            path: step.source.clone(),
        });
    }

    let executable = resolve_tool(toolchain, tool)?;
    let launcher = toolchain.launcher.as_deref().filter(|l| !l.trim().is_empty());

    let command = match tool {
        ToolKind::Compiler => PreparedCommand::Shell(compiler_command(
            launcher,
            executable,
            &step.source,
            output_dir(step, tool)?,
        )),
        ToolKind::Assembler => PreparedCommand::Shell(assembler_command(
            launcher,
            executable,
            &step.source,
            output_dir(step, tool)?,
            step.link,
        )),
        ToolKind::Programmer => PreparedCommand::Launch {
            program: executable.to_path_buf(),
            args: vec![normalize_path(&step.source)],
        },
    };
    Ok(command)
}

fn resolve_tool(toolchain: &ToolchainConfig, tool: ToolKind) -> Result<&Path, ToolchainError> {
    let path = tool
        .configured_path(toolchain)
        .ok_or_else(|| ToolchainError::Configuration {
            tool,
            reason: "no path set".to_string(),
        })?;
    let metadata = std::fs::metadata(path).map_err(|err| ToolchainError::Configuration {
        tool,
        reason: format!("'{}': {}", path.display(), err),
    })?;
    if !metadata.is_file() {
        return Err(ToolchainError::Configuration {
            tool,
            reason: format!("'{}' is not a file", path.display()),
        });
    }
    Ok(path)
}

fn output_dir(step: &PipelineStep, tool: ToolKind) -> Result<&Path, ToolchainError> {
    step.output_dir
        .as_deref()
        .ok_or_else(|| ToolchainError::Configuration {
            tool,
            reason: "no output directory given".to_string(),
        })
}

/// `[launcher ]"<tool>" "<source>" -v -i -o "<output>"`
pub fn compiler_command(launcher: Option<&str>, tool: &Path, source: &Path, output: &Path) -> String {
    format!(
        "{}{} {} -v -i -o {}",
        launcher_prefix(launcher),
        quote(&normalize_path(tool)),
        quote(&normalize_path(source)),
        quote(&normalize_path(output)),
    )
}

/// `[launcher ]"<tool>" "<source>" -o "<output>" -f coe [-l] --no-report`
pub fn assembler_command(
    launcher: Option<&str>,
    tool: &Path,
    source: &Path,
    output: &Path,
    link: bool,
) -> String {
    format!(
        "{}{} {} -o {} -f coe{} --no-report",
        launcher_prefix(launcher),
        quote(&normalize_path(tool)),
        quote(&normalize_path(source)),
        quote(&normalize_path(output)),
        if link { " -l" } else { "" },
    )
}

/// Path as text with `\` separators turned into `/`.
pub fn normalize_path(path: impl AsRef<Path>) -> String {
    path.as_ref().to_string_lossy().replace('\\', "/")
}

fn launcher_prefix(launcher: Option<&str>) -> String {
    launcher.map(|l| format!("{} ", l.trim())).unwrap_or_default()
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compiler_line_matches_template() {
        let line = compiler_command(
            None,
            Path::new("/opt/tc/cc"),
            Path::new("/ws/foo.c"),
            Path::new("/ws/out/foo.c/"),
        );
        assert_eq!(line, r#""/opt/tc/cc" "/ws/foo.c" -v -i -o "/ws/out/foo.c/""#);
    }

    #[test]
    fn assembler_line_with_launcher_and_link() {
        let line = assembler_command(
            Some("node"),
            Path::new("/opt/tc/asm.js"),
            Path::new("/ws/out/foo.c/foo.asm"),
            Path::new("/ws/out/foo.asm/"),
            true,
        );
        assert_eq!(
            line,
            r#"node "/opt/tc/asm.js" "/ws/out/foo.c/foo.asm" -o "/ws/out/foo.asm/" -f coe -l --no-report"#
        );
    }

    #[test]
    fn assembler_line_without_link() {
        let line = assembler_command(None, Path::new("a"), Path::new("b.asm"), Path::new("o"), false);
        assert_eq!(line, r#""a" "b.asm" -o "o" -f coe --no-report"#);
    }

    #[test]
    fn backslashes_become_forward_slashes() {
        assert_eq!(normalize_path(r"C:\ws\out\foo.c\"), "C:/ws/out/foo.c/");
    }

    #[test]
    fn extension_is_checked_before_tool_path() {
        let step = PipelineStep::assemble("/ws/foo.c", "/ws/out/foo.c/", false);
        let err = prepare_with(&ToolchainConfig::default(), &step).unwrap_err();
        assert!(matches!(
            err,
            ToolchainError::ExtensionMismatch { expected: "asm", .. }
        ));
    }

    #[test]
    fn missing_tool_path_is_configuration_error() {
        let step = PipelineStep::compile("/ws/foo.c", "/ws/out/foo.c/");
        let err = prepare_with(&ToolchainConfig::default(), &step).unwrap_err();
        assert!(matches!(
            err,
            ToolchainError::Configuration {
                tool: ToolKind::Compiler,
                ..
            }
        ));
    }

    #[test]
    fn launch_display_quotes_arguments() {
        let command = PreparedCommand::Launch {
            program: PathBuf::from("/opt/prog"),
            args: vec!["/ws/out/foo.asm/serial.txt".to_string()],
        };
        assert_eq!(command.display(), r#""/opt/prog" "/ws/out/foo.asm/serial.txt""#);
    }
}
