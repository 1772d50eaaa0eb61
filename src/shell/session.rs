use crate::dispatch_mvi;
use crate::shell::decoder::Utf8Decoder;
use crate::shell::error::SessionError;
use crate::shell::event::{OutputSource, ShellEvent};
use crate::shell::intent::SessionIntent;
use crate::shell::marker::{self, Marker, MarkerScanner};
use crate::shell::reducer::SessionReducer;
use crate::shell::spawn_config::ShellSpawnConfig;
use crate::shell::state::SessionState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

type PendingCompletions = Arc<Mutex<HashMap<u64, oneshot::Sender<i32>>>>;

/// How a wait for shell readiness ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The shell was already running; nothing was waited for.
    AlreadyRunning,
    /// The shell answered the readiness probe.
    Ready,
    /// The settle delay elapsed without a probe answer.
    Settled,
}

/// Resolves when the shell prints the exit-status marker that followed a
/// tracked dispatch.
#[derive(Debug)]
pub struct Completion {
    id: u64,
    receiver: oneshot::Receiver<i32>,
}

impl Completion {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Exit status of the tracked command.
    pub async fn wait(self) -> Result<i32, SessionError> {
        self.receiver
            .await
            .map_err(|_| SessionError::CompletionLost { id: self.id })
    }
}

/// Handle to the single interactive shell of a console.
///
/// Cloning is cheap and every clone drives the same process. All process
/// I/O runs on background tasks; results come back as [`ShellEvent`]s on
/// the channel passed to [`ShellSession::new`], so whoever owns the
/// console buffer is the only one mutating it.
#[derive(Clone)]
pub struct ShellSession {
    inner: Arc<Mutex<SessionInner>>,
    config: Arc<ShellSpawnConfig>,
    events: mpsc::UnboundedSender<ShellEvent>,
}

struct SessionInner {
    state: SessionState,
    /// Bumped on every start; tasks of a replaced process compare against it.
    generation: u64,
    process: Option<ShellProcess>,
    next_completion_id: u64,
}

struct ShellProcess {
    pid: Option<u32>,
    stdin: mpsc::UnboundedSender<Vec<u8>>,
    kill: Option<oneshot::Sender<()>>,
    ready: watch::Receiver<bool>,
    completions: PendingCompletions,
}

impl ShellProcess {
    fn kill(mut self) {
        if let Some(kill) = self.kill.take() {
            let _ = kill.send(());
        }
    }
}

/// Where the stdout pump reports marker lines.
struct MarkerSink {
    ready: watch::Sender<bool>,
    completions: PendingCompletions,
}

impl MarkerSink {
    fn resolve(&self, marker: Marker) {
        match marker {
            Marker::Ready => {
                self.ready.send_replace(true);
            }
            Marker::Done { id, exit_code } => {
                if let Some(waiter) = self.completions.lock().remove(&id) {
                    let _ = waiter.send(exit_code);
                }
            }
        }
    }
}

impl ShellSession {
    pub fn new(config: ShellSpawnConfig, events: mpsc::UnboundedSender<ShellEvent>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SessionInner {
                state: SessionState::default(),
                generation: 0,
                process: None,
                next_completion_id: 0,
            })),
            config: Arc::new(config),
            events,
        }
    }

    /// Create a session together with the receiving end of its event channel.
    pub fn with_channel(config: ShellSpawnConfig) -> (Self, mpsc::UnboundedReceiver<ShellEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(config, tx), rx)
    }

    pub fn config(&self) -> &ShellSpawnConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    pub fn pid(&self) -> Option<u32> {
        self.inner.lock().process.as_ref().and_then(|p| p.pid)
    }

    /// Spawn the shell, killing the current one first if there is one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();
        if let Some(process) = inner.process.take() {
            info!(generation = inner.generation, "Restarting shell, killing current process");
            process.kill();
        }
        inner.generation += 1;
        let generation = inner.generation;
        self.transition(&mut inner, SessionIntent::Start);

        let cwd = match self.config.working_dir() {
            Ok(cwd) => cwd,
            Err(err) => {
                self.fail_start(&mut inner, &err.to_string());
                return Err(SessionError::WorkingDirectory(err));
            }
        };

        let mut child = match self.config.command(&cwd).spawn() {
            Ok(child) => child,
            Err(source) => {
                let program = self.config.program().to_string();
                self.fail_start(&mut inner, &format!("failed to start '{}': {}", program, source));
                return Err(SessionError::Spawn { program, source });
            }
        };

        let pid = child.id();
        let (Some(stdin), Some(stdout), Some(stderr)) =
            (child.stdin.take(), child.stdout.take(), child.stderr.take())
        else {
            let program = self.config.program().to_string();
            self.fail_start(&mut inner, "shell streams were not piped");
            return Err(SessionError::Spawn {
                program,
                source: std::io::Error::other("shell streams were not piped"),
            });
        };

        let (stdin_tx, stdin_rx) = mpsc::unbounded_channel();
        let (kill_tx, kill_rx) = oneshot::channel();
        let (ready_tx, ready_rx) = watch::channel(false);
        let completions = PendingCompletions::default();

        tokio::spawn(write_stdin(stdin, stdin_rx));
        tokio::spawn(self.clone().pump_output(
            generation,
            stdout,
            OutputSource::Stdout,
            Some(MarkerSink {
                ready: ready_tx,
                completions: Arc::clone(&completions),
            }),
        ));
        tokio::spawn(
            self.clone()
                .pump_output(generation, stderr, OutputSource::Stderr, None),
        );
        tokio::spawn(self.clone().wait_for_exit(generation, child, kill_rx));

        for line in self.config.startup_commands() {
            let _ = stdin_tx.send(self.config.encode_line(line));
        }
        if self.config.readiness_probe() {
            let _ = stdin_tx.send(self.config.encode_line(&marker::ready_probe_command()));
        }

        inner.process = Some(ShellProcess {
            pid,
            stdin: stdin_tx,
            kill: Some(kill_tx),
            ready: ready_rx,
            completions,
        });
        self.transition(&mut inner, SessionIntent::Spawned);
        info!(program = self.config.program(), cwd = %cwd.display(), ?pid, "Shell started");
        self.emit(ShellEvent::Started {
            program: self.config.program().to_string(),
            cwd,
            pid,
        });
        Ok(())
    }

    /// Kill the shell and its process group if present. Never blocks; the
    /// exit is reported later through [`ShellEvent::Exited`].
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        if let Some(process) = inner.process.take() {
            info!(generation = inner.generation, "Stopping shell");
            process.kill();
        }
        self.transition(&mut inner, SessionIntent::Stop);
    }

    /// Echo `command` and write it to the shell's stdin.
    ///
    /// Returns once the line is queued for the shell; it says nothing about
    /// when (or whether) the command finishes. Lines are written in call order.
    pub fn dispatch(&self, command: &str) -> Result<(), SessionError> {
        let inner = self.inner.lock();
        let process = running_process(&inner)?;
        self.emit(ShellEvent::Echo(command.to_string()));
        process
            .stdin
            .send(self.config.encode_line(command))
            .map_err(|_| SessionError::InputClosed)?;
        debug!(command, "Dispatched");
        Ok(())
    }

    /// Like [`dispatch`](Self::dispatch), followed by an exit-status marker
    /// whose arrival resolves the returned [`Completion`].
    pub fn dispatch_tracked(&self, command: &str) -> Result<Completion, SessionError> {
        let mut inner = self.inner.lock();
        inner.next_completion_id += 1;
        let id = inner.next_completion_id;
        let process = running_process(&inner)?;

        let (tx, receiver) = oneshot::channel();
        process.completions.lock().insert(id, tx);

        self.emit(ShellEvent::Echo(command.to_string()));
        let mut bytes = self.config.encode_line(command);
        bytes.extend(self.config.encode_line(&self.config.completion_command(id)));
        process
            .stdin
            .send(bytes)
            .map_err(|_| SessionError::InputClosed)?;
        debug!(command, id, "Dispatched with completion tracking");
        Ok(Completion { id, receiver })
    }

    /// Write a line the user already typed into the console (no echo).
    pub fn send_line(&self, line: &str) -> Result<(), SessionError> {
        let inner = self.inner.lock();
        let process = running_process(&inner)?;
        process
            .stdin
            .send(self.config.encode_line(line))
            .map_err(|_| SessionError::InputClosed)
    }

    /// Send SIGINT to the shell's process group without tearing down the
    /// session.
    ///
    /// The foreground tool dies from it; the shell survives as long as its
    /// startup commands trap the signal.
    pub fn interrupt(&self) -> Result<(), SessionError> {
        let inner = self.inner.lock();
        let process = running_process(&inner)?;
        let pid = process
            .pid
            .ok_or_else(|| SessionError::Interrupt("process id unavailable".to_string()))?;
        send_interrupt(pid).map_err(|err| SessionError::Interrupt(err.to_string()))?;
        info!(pid, "Interrupt sent");
        self.emit(ShellEvent::Output {
            source: OutputSource::System,
            text: "^C\n".to_string(),
        });
        Ok(())
    }

    /// Wait until a freshly started shell can take input.
    ///
    /// With the readiness probe enabled this returns as soon as the shell
    /// echoes the probe marker, bounded by the settle delay. Without it (or
    /// without a process) it sleeps the full settle delay.
    pub async fn wait_ready(&self) -> Readiness {
        let settle = self.config.settle_delay();
        let ready = {
            let inner = self.inner.lock();
            match &inner.process {
                Some(process) if self.config.readiness_probe() => Some(process.ready.clone()),
                _ => None,
            }
        };

        match ready {
            Some(mut ready) => {
                let answered = async move { ready.wait_for(|ready| *ready).await.is_ok() };
                match tokio::time::timeout(settle, answered).await {
                    Ok(true) => Readiness::Ready,
                    _ => {
                        warn!(?settle, "No readiness marker within settle delay, continuing");
                        Readiness::Settled
                    }
                }
            }
            None => {
                tokio::time::sleep(settle).await;
                Readiness::Settled
            }
        }
    }

    /// Start the shell unless it is running, then wait for readiness.
    pub async fn ensure_running(&self) -> Result<Readiness, SessionError> {
        if self.is_running() {
            return Ok(Readiness::AlreadyRunning);
        }
        self.start()?;
        Ok(self.wait_ready().await)
    }

    fn transition(&self, inner: &mut SessionInner, intent: SessionIntent) {
        let before = inner.state;
        dispatch_mvi!(inner.state, SessionReducer, intent);
        if inner.state != before {
            debug!(from = %before, to = %inner.state, ?intent, "Session state changed");
            self.emit(ShellEvent::StateChanged(inner.state));
        }
    }

    fn fail_start(&self, inner: &mut SessionInner, message: &str) {
        warn!(message, "Shell failed to start");
        self.transition(inner, SessionIntent::SpawnFailed);
        self.emit(ShellEvent::Error(message.to_string()));
    }

    fn emit(&self, event: ShellEvent) {
        // A closed channel means nobody renders any more; the process still
        // runs until stopped.
        let _ = self.events.send(event);
    }

    /// Emit `event` unless the process that produced it has been replaced.
    fn emit_if_current(&self, generation: u64, event: ShellEvent) -> bool {
        let inner = self.inner.lock();
        if inner.generation != generation {
            return false;
        }
        self.emit(event);
        true
    }

    async fn pump_output<R>(
        self,
        generation: u64,
        mut reader: R,
        source: OutputSource,
        markers: Option<MarkerSink>,
    ) where
        R: AsyncRead + Unpin,
    {
        let mut decoder = Utf8Decoder::new();
        let mut scanner = MarkerScanner::new();
        let mut buffer = [0u8; 8192];

        loop {
            let count = match reader.read(&mut buffer).await {
                Ok(0) => break,
                Ok(count) => count,
                Err(err) => {
                    warn!(?source, %err, "Shell output read failed");
                    break;
                }
            };
            let text = decoder.decode(&buffer[..count]);
            let text = scan(&mut scanner, markers.as_ref(), &text);
            if text.is_empty() {
                continue;
            }
            if !self.emit_if_current(generation, ShellEvent::Output { source, text }) {
                return;
            }
        }

        let mut tail = scan(&mut scanner, markers.as_ref(), &decoder.finish());
        tail.push_str(&scanner.finish());
        if !tail.is_empty() {
            self.emit_if_current(generation, ShellEvent::Output { source, text: tail });
        }
    }

    async fn wait_for_exit(self, generation: u64, mut child: Child, kill: oneshot::Receiver<()>) {
        let pid = child.id();
        let status = tokio::select! {
            status = child.wait() => status,
            _ = kill => {
                // Take down tools still running under the shell as well.
                if let Some(pid) = pid {
                    let _ = kill_group(pid);
                }
                if let Err(err) = child.start_kill() {
                    warn!(%err, "Failed to kill shell");
                }
                child.wait().await
            }
        };
        let code = match status {
            Ok(status) => status.code(),
            Err(err) => {
                warn!(%err, "Failed to collect shell exit status");
                None
            }
        };

        let mut inner = self.inner.lock();
        if inner.generation != generation {
            debug!(generation, ?code, "Ignoring exit of replaced shell");
            return;
        }
        inner.process = None;
        info!(?code, "Shell exited");
        self.transition(&mut inner, SessionIntent::ProcessExited);
        self.emit(ShellEvent::Exited { code });
    }
}

fn running_process(inner: &SessionInner) -> Result<&ShellProcess, SessionError> {
    match (&inner.state, &inner.process) {
        (SessionState::Running, Some(process)) => Ok(process),
        (state, _) => Err(SessionError::NotRunning { state: *state }),
    }
}

fn scan(scanner: &mut MarkerScanner, markers: Option<&MarkerSink>, text: &str) -> String {
    let Some(sink) = markers else {
        return text.to_string();
    };
    let scanned = scanner.feed(text);
    for marker in scanned.markers {
        sink.resolve(marker);
    }
    scanned.text
}

async fn write_stdin(mut stdin: ChildStdin, mut lines: mpsc::UnboundedReceiver<Vec<u8>>) {
    while let Some(bytes) = lines.recv().await {
        if let Err(err) = stdin.write_all(&bytes).await {
            warn!(%err, "Shell stdin write failed");
            break;
        }
        if let Err(err) = stdin.flush().await {
            warn!(%err, "Shell stdin flush failed");
            break;
        }
    }
}

#[cfg(unix)]
fn send_interrupt(pid: u32) -> std::io::Result<()> {
    signal_group(pid, libc::SIGINT)
}

#[cfg(unix)]
fn kill_group(pid: u32) -> std::io::Result<()> {
    signal_group(pid, libc::SIGKILL)
}

/// Signal the process group led by `pid`.
#[cfg(unix)]
fn signal_group(pid: u32, signal: libc::c_int) -> std::io::Result<()> {
    let pgid = libc::pid_t::try_from(pid).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("pid {} out of range", pid))
    })?;
    // SAFETY: kill(2) takes plain integers and touches no memory of ours.
    if unsafe { libc::kill(-pgid, signal) } == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn send_interrupt(_pid: u32) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "interrupt is only supported on unix",
    ))
}

#[cfg(not(unix))]
fn kill_group(_pid: u32) -> std::io::Result<()> {
    Ok(())
}
