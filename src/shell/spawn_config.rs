use crate::config::ShellConfig;
use crate::shell::marker;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Configuration for spawning the interactive shell.
///
/// Owns the session-lifetime constants: program, arguments, line
/// terminator and readiness timing. The shell runs in the application's
/// working directory.
#[derive(Debug, Clone)]
pub struct ShellSpawnConfig {
    program: String,
    args: Vec<String>,
    startup_commands: Vec<String>,
    line_terminator: String,
    settle_delay: Duration,
    readiness_probe: bool,
    exit_status_var: String,
}

impl ShellSpawnConfig {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        let defaults = ShellConfig::default();
        Self {
            program: program.into(),
            args,
            startup_commands: defaults.startup_commands,
            line_terminator: defaults.line_terminator,
            settle_delay: Duration::from_millis(defaults.settle_delay_ms),
            readiness_probe: defaults.readiness_probe,
            exit_status_var: defaults.exit_status_var,
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            startup_commands: config.startup_commands.clone(),
            line_terminator: config.line_terminator.clone(),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            readiness_probe: config.readiness_probe,
            exit_status_var: config.exit_status_var.clone(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    pub fn readiness_probe(&self) -> bool {
        self.readiness_probe
    }

    pub fn working_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    /// Lines written before anything else once the shell is up.
    pub fn startup_commands(&self) -> &[String] {
        &self.startup_commands
    }

    /// Build the spawn command with all three standard streams piped.
    ///
    /// On unix the shell leads its own process group, so an interrupt
    /// reaches the shell and whatever tool it is running, and nothing
    /// else in the caller's terminal.
    pub fn command(&self, cwd: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        command
    }

    /// Bytes written to stdin for one line of input.
    pub fn encode_line(&self, line: &str) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(line.len() + self.line_terminator.len());
        bytes.extend_from_slice(line.as_bytes());
        bytes.extend_from_slice(self.line_terminator.as_bytes());
        bytes
    }

    /// Command echoing the completion marker for dispatch `id`.
    pub fn completion_command(&self, id: u64) -> String {
        marker::completion_command(id, &self.exit_status_var)
    }
}
