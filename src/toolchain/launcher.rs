use std::io;
use std::path::Path;
use std::process::Stdio;

use tracing::info;

/// Starts a detached process that runs alongside the shell.
pub trait ProcessLauncher: Send + Sync {
    fn launch(&self, program: &Path, args: &[String]) -> io::Result<()>;
}

/// Spawns through tokio so the runtime reaps the child once it exits.
///
/// Must be called from within a tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl ProcessLauncher for SystemLauncher {
    fn launch(&self, program: &Path, args: &[String]) -> io::Result<()> {
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        info!(program = %program.display(), pid = ?child.id(), "Launched detached process");
        Ok(())
    }
}
