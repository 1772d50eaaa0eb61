//! Shared test utilities: config builders, tool stubs and event helpers.

#![allow(dead_code, unused_imports)]

use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;
use toolshell::config::{Config, ConfigStore, ShellConfig, ToolchainConfig};
use toolshell::shell::{OutputSource, ShellEvent, ShellSession, ShellSpawnConfig};
use toolshell::toolchain::ProcessLauncher;

/// Upper bound for anything a test waits on.
pub const WAIT: Duration = Duration::from_secs(10);

pub fn sh_shell_config() -> ShellConfig {
    ShellConfig {
        program: "/bin/sh".to_string(),
        args: Vec::new(),
        startup_commands: vec!["trap ':' INT".to_string()],
        line_terminator: "\n".to_string(),
        settle_delay_ms: 5_000,
        readiness_probe: true,
        exit_status_var: "$?".to_string(),
    }
}

pub fn sh_spawn_config() -> ShellSpawnConfig {
    ShellSpawnConfig::from_config(&sh_shell_config())
}

pub fn sh_session() -> (ShellSession, UnboundedReceiver<ShellEvent>) {
    ShellSession::with_channel(sh_spawn_config())
}

/// Config store running `/bin/sh` with the given toolchain section.
pub fn store_with(toolchain: ToolchainConfig) -> ConfigStore {
    let config = Config {
        shell: sh_shell_config(),
        toolchain,
        ..Config::default()
    };
    ConfigStore::new(config, PathBuf::from("/nonexistent/toolshell/config.toml"))
}

/// Write a shell script stub; run it through `/bin/sh` via the launcher setting.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write stub");
    path
}

/// Temp workspace containing `foo.c` and a `tools/` folder of stubs.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("foo.c"), "int main(void) { return 0; }\n")
            .expect("write foo.c");
        std::fs::create_dir(dir.path().join("tools")).expect("tools dir");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(&self) -> PathBuf {
        self.root().join("foo.c")
    }

    pub fn tool(&self, name: &str, body: &str) -> PathBuf {
        write_script(&self.root().join("tools"), name, body)
    }

    /// Toolchain with all three tools stubbed, run through `/bin/sh`.
    pub fn toolchain(&self, compiler: &str, assembler: &str) -> ToolchainConfig {
        ToolchainConfig {
            launcher: Some("/bin/sh".to_string()),
            compiler_path: Some(self.tool("cc.sh", compiler)),
            assembler_path: Some(self.tool("as.sh", assembler)),
            programmer_path: Some(self.tool("prog.sh", "exit 0")),
            ..ToolchainConfig::default()
        }
    }
}

/// Records direct launches instead of running them.
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    launches: Arc<Mutex<Vec<(PathBuf, Vec<String>)>>>,
}

impl RecordingLauncher {
    pub fn launches(&self) -> Vec<(PathBuf, Vec<String>)> {
        self.launches.lock().clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&self, program: &Path, args: &[String]) -> io::Result<()> {
        self.launches
            .lock()
            .push((program.to_path_buf(), args.to_vec()));
        Ok(())
    }
}

/// Receive events until `done` matches one (inclusive). Panics on timeout.
pub async fn events_until<F>(rx: &mut UnboundedReceiver<ShellEvent>, mut done: F) -> Vec<ShellEvent>
where
    F: FnMut(&ShellEvent) -> bool,
{
    let mut seen = Vec::new();
    let result = tokio::time::timeout(WAIT, async {
        while let Some(event) = rx.recv().await {
            let stop = done(&event);
            seen.push(event);
            if stop {
                return true;
            }
        }
        false
    })
    .await;
    match result {
        Ok(true) => seen,
        Ok(false) => panic!("event channel closed; saw {:?}", seen),
        Err(_) => panic!("timed out waiting for event; saw {:?}", seen),
    }
}

/// Receive events until the concatenated stdout contains `needle`.
pub async fn stdout_until(rx: &mut UnboundedReceiver<ShellEvent>, needle: &str) -> Vec<ShellEvent> {
    let mut text = String::new();
    events_until(rx, |event| {
        if let ShellEvent::Output {
            source: OutputSource::Stdout,
            text: chunk,
        } = event
        {
            text.push_str(chunk);
        }
        text.contains(needle)
    })
    .await
}

/// Concatenated text of all output events from `source`.
pub fn output_of(events: &[ShellEvent], source: OutputSource) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            ShellEvent::Output { source: s, text } if *s == source => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

pub fn echoes(events: &[ShellEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            ShellEvent::Echo(command) => Some(command.clone()),
            _ => None,
        })
        .collect()
}

/// Drain whatever is queued right now.
pub fn drain(rx: &mut UnboundedReceiver<ShellEvent>) -> Vec<ShellEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
