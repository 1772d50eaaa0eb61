use crate::clipboard::ClipboardHandler;
use crate::config::ConfigStore;
use crate::console::{Console, ConsoleAction, ConsoleEffect};
use crate::shell::{SessionState, ShellEvent, ShellSession};
use crate::toolchain::{BuildAction, BuildContext, Orchestrator, RunReport};
use crate::ui::events::AppEvent;
use crate::ui::input::{map_key, InputAction};
use crossterm::event::KeyEvent;
use std::sync::mpsc;
use tracing::{info, warn};

pub struct App {
    should_quit: bool,
    size: Option<(u16, u16)>,
    console: Console,
    session: ShellSession,
    /// Mirrors the session state as reported on the event channel.
    session_state: SessionState,
    orchestrator: Orchestrator,
    context: BuildContext,
    config: ConfigStore,
    build_running: bool,
    last_error: Option<String>,
    events: mpsc::Sender<AppEvent>,
}

impl App {
    pub fn new(
        config: ConfigStore,
        session: ShellSession,
        orchestrator: Orchestrator,
        context: BuildContext,
        events: mpsc::Sender<AppEvent>,
    ) -> Self {
        let console = Console::new(&config.get().console);
        Self {
            should_quit: false,
            size: None,
            console,
            session_state: session.state(),
            session,
            orchestrator,
            context,
            config,
            build_running: false,
            last_error: None,
            events,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.session.stop();
        self.should_quit = true;
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn session_state(&self) -> SessionState {
        self.session_state
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn build_running(&self) -> bool {
        self.build_running
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn size(&self) -> Option<(u16, u16)> {
        self.size
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn on_resize(&mut self, cols: u16, rows: u16) {
        self.size = Some((cols, rows));
    }

    pub fn on_tick(&mut self) {}

    /// Start the shell for the first time (or again after an exit).
    pub fn start_session(&mut self) {
        if let Err(err) = self.session.start() {
            // The session already put the failure on its event channel.
            warn!(%err, "Shell start failed");
        }
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Paste(text) => self.on_paste(&text),
            AppEvent::Tick => self.on_tick(),
            AppEvent::Resize(cols, rows) => self.on_resize(cols, rows),
            AppEvent::Shell(event) => self.on_shell_event(event),
            AppEvent::BuildFinished(result) => self.on_build_finished(result),
            AppEvent::Notice(message) => self.report_error(message),
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        match map_key(key) {
            InputAction::None => {}
            InputAction::Console(action) => self.apply_console(action),
            InputAction::Interrupt => {
                if let Err(err) = self.session.interrupt() {
                    self.report_error(err.to_string());
                }
            }
            InputAction::RestartShell => self.start_session(),
            InputAction::PasteClipboard => self.paste_clipboard(),
            InputAction::Build(action) => self.start_build(action),
            InputAction::Quit => self.request_quit(),
        }
    }

    pub fn on_paste(&mut self, text: &str) {
        self.apply_console(ConsoleAction::Insert(text.to_string()));
    }

    pub fn on_shell_event(&mut self, event: ShellEvent) {
        match &event {
            ShellEvent::StateChanged(state) => self.session_state = *state,
            ShellEvent::Started { .. } => self.last_error = None,
            ShellEvent::Error(message) => self.last_error = Some(message.clone()),
            _ => {}
        }
        self.console.on_shell_event(&event);
    }

    fn apply_console(&mut self, action: ConsoleAction) {
        if let ConsoleEffect::Send(line) = self.console.apply(action) {
            self.send_line(line);
        }
    }

    /// Hand a submitted line to the shell, starting it first if needed.
    fn send_line(&mut self, line: String) {
        if self.session.is_running() {
            if let Err(err) = self.session.send_line(&line) {
                self.report_error(err.to_string());
            }
            return;
        }

        let session = self.session.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = match session.ensure_running().await {
                Ok(_) => session.send_line(&line),
                Err(err) => Err(err),
            };
            if let Err(err) = result {
                let _ = events.send(AppEvent::Notice(err.to_string()));
            }
        });
    }

    fn paste_clipboard(&mut self) {
        let text = ClipboardHandler::new()
            .map_err(|err| format!("Clipboard unavailable: {}", err))
            .and_then(|mut clipboard| clipboard.get_text());
        match text {
            Ok(text) => self.on_paste(&text),
            Err(message) => self.report_error(message),
        }
    }

    /// Plan and validate on the UI thread, then run in the background.
    pub fn start_build(&mut self, action: BuildAction) {
        if self.build_running {
            self.report_error(format!("A build is already running; {} ignored", action));
            return;
        }
        let run = match self
            .orchestrator
            .plan(action, &self.context)
            .and_then(|run| self.orchestrator.validate(&run).map(|()| run))
        {
            Ok(run) => run,
            Err(err) => {
                self.report_error(err.to_string());
                return;
            }
        };

        info!(run_id = %run.id(), %action, "Starting build");
        self.build_running = true;
        self.last_error = None;
        let orchestrator = self.orchestrator.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = orchestrator.run(run).await.map_err(|err| err.to_string());
            let _ = events.send(AppEvent::BuildFinished(result));
        });
    }

    fn on_build_finished(&mut self, result: Result<RunReport, String>) {
        self.build_running = false;
        match result {
            Ok(report) => info!(run_id = %report.run_id, steps = report.steps.len(), "Build dispatched"),
            Err(message) => self.report_error(message),
        }
    }

    fn report_error(&mut self, message: String) {
        warn!(%message, "Reported to user");
        self.console.notice(&format!("[error] {}", message));
        self.last_error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::shell::ShellSpawnConfig;
    use crate::toolchain::ToolAdapter;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::path::PathBuf;

    fn make_app(context: BuildContext) -> (App, mpsc::Receiver<AppEvent>) {
        let config = ConfigStore::new(Config::default(), PathBuf::from("/nonexistent/config.toml"));
        let (session, _shell_events) =
            ShellSession::with_channel(ShellSpawnConfig::new("/bin/sh", vec![]));
        let orchestrator = Orchestrator::new(ToolAdapter::new(config.clone(), session.clone()));
        let (tx, rx) = mpsc::channel();
        (App::new(config, session, orchestrator, context, tx), rx)
    }

    #[test]
    fn typing_goes_into_console() {
        let (mut app, _rx) = make_app(BuildContext::default());
        app.on_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::NONE));
        app.on_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE));
        assert_eq!(app.console().buffer().input(), "ls");
    }

    #[test]
    fn build_without_file_reports_error_without_dispatch() {
        let (mut app, _rx) = make_app(BuildContext::new(Some(PathBuf::from("/ws")), None));
        app.start_build(BuildAction::Compile);
        assert!(!app.build_running());
        assert!(app.last_error().is_some_and(|e| e.contains("No file is open")));
        assert_eq!(app.session_state(), SessionState::Stopped);
    }

    #[test]
    fn interrupt_on_stopped_session_is_reported() {
        let (mut app, _rx) = make_app(BuildContext::default());
        app.on_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.last_error().is_some_and(|e| e.contains("not running")));
    }

    #[test]
    fn shell_state_changes_are_mirrored() {
        let (mut app, _rx) = make_app(BuildContext::default());
        app.on_shell_event(ShellEvent::StateChanged(SessionState::Running));
        assert_eq!(app.session_state(), SessionState::Running);
        app.on_shell_event(ShellEvent::Error("boom".into()));
        assert_eq!(app.last_error(), Some("boom"));
    }
}
