use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration container.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub shell: ShellConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub toolchain: ToolchainConfig,
}

/// How the interactive shell process is spawned and driven.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Shell executable (default: `powershell.exe` on Windows, `/bin/bash` elsewhere).
    #[serde(default = "default_shell_program")]
    pub program: String,
    /// Arguments passed to the shell.
    #[serde(default = "default_shell_args")]
    pub args: Vec<String>,
    /// Lines sent once the shell is up, before any readiness probe. The unix
    /// default traps SIGINT so an interrupt stops the running tool, not the shell.
    #[serde(default = "default_startup_commands")]
    pub startup_commands: Vec<String>,
    /// Terminator appended to every line written to stdin.
    #[serde(default = "default_line_terminator")]
    pub line_terminator: String,
    /// Upper bound on waiting for a freshly started shell (default: 500).
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Detect readiness with a probe echo instead of always sleeping the
    /// full settle delay (default: true).
    #[serde(default = "default_true")]
    pub readiness_probe: bool,
    /// Shell expression expanding to the last command's exit status.
    #[serde(default = "default_exit_status_var")]
    pub exit_status_var: String,
}

/// Console surface settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Prompt marker that begins every fresh input line.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Lines kept in the buffer before the oldest are dropped (default: 10000).
    #[serde(default = "default_scrollback_lines")]
    pub scrollback_lines: usize,
    /// Submitted commands remembered for recall (default: 500).
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

/// External toolchain locations and build flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Interpreter placed in front of the compiler/assembler paths (e.g. `node`).
    #[serde(default)]
    pub launcher: Option<String>,
    #[serde(default)]
    pub compiler_path: Option<PathBuf>,
    #[serde(default)]
    pub assembler_path: Option<PathBuf>,
    /// Serial programmer executable, launched directly rather than through the shell.
    #[serde(default)]
    pub programmer_path: Option<PathBuf>,
    /// Pass `-l` to the assembler in the one-shot build (default: true).
    #[serde(default = "default_true")]
    pub link: bool,
    /// Build output directory name, relative to the workspace (default: "out").
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Follow every tool dispatch with an exit-status marker and stop the
    /// pipeline when a step fails (default: false).
    #[serde(default)]
    pub track_completion: bool,
}

fn default_shell_program() -> String {
    if cfg!(windows) {
        "powershell.exe".to_string()
    } else {
        "/bin/bash".to_string()
    }
}

fn default_shell_args() -> Vec<String> {
    if cfg!(windows) {
        vec!["-NoExit".to_string(), "-Command".to_string(), "-".to_string()]
    } else {
        Vec::new()
    }
}

fn default_startup_commands() -> Vec<String> {
    if cfg!(unix) {
        vec!["trap ':' INT".to_string()]
    } else {
        Vec::new()
    }
}

fn default_line_terminator() -> String {
    if cfg!(windows) {
        "\r\n".to_string()
    } else {
        "\n".to_string()
    }
}

fn default_exit_status_var() -> String {
    if cfg!(windows) {
        "$LASTEXITCODE".to_string()
    } else {
        "$?".to_string()
    }
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

fn default_prompt() -> String {
    "PS> ".to_string()
}

fn default_scrollback_lines() -> usize {
    10_000
}

fn default_history_limit() -> usize {
    500
}

fn default_output_dir() -> String {
    "out".to_string()
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: default_shell_program(),
            args: default_shell_args(),
            startup_commands: default_startup_commands(),
            line_terminator: default_line_terminator(),
            settle_delay_ms: default_settle_delay_ms(),
            readiness_probe: true,
            exit_status_var: default_exit_status_var(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            scrollback_lines: default_scrollback_lines(),
            history_limit: default_history_limit(),
        }
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            launcher: None,
            compiler_path: None,
            assembler_path: None,
            programmer_path: None,
            link: true,
            output_dir: default_output_dir(),
            track_completion: false,
        }
    }
}
