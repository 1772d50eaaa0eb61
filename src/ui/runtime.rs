use crate::config::ConfigStore;
use crate::shell::{ShellSession, ShellSpawnConfig};
use crate::toolchain::{BuildContext, Orchestrator, ToolAdapter};
use crate::ui::app::App;
use crate::ui::events::EventHandler;
use crate::ui::render::draw;
use crate::ui::terminal_guard::setup_terminal;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Run the interactive console until the user quits.
///
/// Blocks the calling thread; must be called with a tokio runtime entered
/// (session and build tasks are spawned onto it).
pub fn run(config: ConfigStore, context: BuildContext) -> io::Result<()> {
    let (mut terminal, guard) = setup_terminal()?;
    let tick_rate = Duration::from_millis(250);
    let events = EventHandler::new(tick_rate);

    let (shell_tx, shell_rx) = mpsc::unbounded_channel();
    let session = ShellSession::new(ShellSpawnConfig::from_config(&config.get().shell), shell_tx);
    events.forward_shell_events(shell_rx);

    let orchestrator = Orchestrator::new(ToolAdapter::new(config.clone(), session.clone()));
    let mut app = App::new(config, session, orchestrator, context, events.sender());
    if let Ok((cols, rows)) = crossterm::terminal::size() {
        app.on_resize(cols, rows);
    }
    info!("Console started");
    app.start_session();

    loop {
        terminal.draw(|frame| draw(frame, &app))?;
        if app.should_quit() {
            break;
        }

        match events.next(tick_rate) {
            Ok(event) => app.handle_event(event),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
        // Drain whatever queued up during the last draw before drawing again.
        while let Some(event) = events.try_next() {
            app.handle_event(event);
        }
    }

    info!("Console closed");
    drop(guard);
    Ok(())
}

