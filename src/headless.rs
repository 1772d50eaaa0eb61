//! One build action without the console: shell output streams to the
//! process's stdout/stderr, then the shell is asked to exit.

use std::io::Write;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::ConfigStore;
use crate::shell::{OutputSource, ShellEvent, ShellSession, ShellSpawnConfig};
use crate::toolchain::{BuildAction, BuildContext, Orchestrator, ToolAdapter};

/// Run `action` and return the exit code to leave with: the shell's own
/// exit status (its last command) when it ran, 0 otherwise.
pub async fn run_build(
    config: ConfigStore,
    context: BuildContext,
    action: BuildAction,
) -> anyhow::Result<i32> {
    let snapshot = config.get();
    let (session, events) = ShellSession::with_channel(ShellSpawnConfig::from_config(&snapshot.shell));
    let printer = tokio::spawn(print_events(events, snapshot.console.prompt.clone()));

    let orchestrator = Orchestrator::new(ToolAdapter::new(config, session.clone()));
    let outcome = tokio::select! {
        result = orchestrator.run_action(action, &context) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    drop(orchestrator);

    let Some(result) = outcome else {
        warn!("Interrupted, stopping shell");
        session.stop();
        drop(session);
        let _ = printer.await;
        return Ok(130);
    };

    if let Err(err) = result {
        session.stop();
        drop(session);
        let _ = printer.await;
        return Err(err).with_context(|| format!("{} failed", action));
    }

    if session.is_running() {
        info!("Build dispatched, waiting for the shell to finish");
        session
            .dispatch("exit")
            .context("asking the shell to exit")?;
    }
    drop(session);

    let code = printer.await.context("output printer panicked")?;
    Ok(code.unwrap_or(0))
}

/// Print session output until the shell exits or the channel closes.
/// Returns the shell's exit code, if it exited.
async fn print_events(mut events: mpsc::UnboundedReceiver<ShellEvent>, prompt: String) -> Option<i32> {
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    while let Some(event) = events.recv().await {
        match event {
            ShellEvent::Output {
                source: OutputSource::Stderr,
                text,
            } => {
                let _ = stderr.write_all(text.as_bytes());
                let _ = stderr.flush();
            }
            ShellEvent::Output { text, .. } => {
                let _ = stdout.write_all(text.as_bytes());
                let _ = stdout.flush();
            }
            ShellEvent::Echo(command) => {
                let _ = writeln!(stdout, "{}{}", prompt, command);
            }
            ShellEvent::Error(message) => {
                let _ = writeln!(stderr, "error: {}", message);
            }
            ShellEvent::Exited { code } => return code,
            ShellEvent::StateChanged(_) | ShellEvent::Started { .. } => {}
        }
    }
    None
}
