use crate::console::ConsoleAction;
use crate::toolchain::BuildAction;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    None,
    Console(ConsoleAction),
    Interrupt,
    RestartShell,
    PasteClipboard,
    Build(BuildAction),
    Quit,
}

pub fn map_key(key: KeyEvent) -> InputAction {
    if key.kind != KeyEventKind::Press {
        return InputAction::None;
    }

    if is_ctrl_char(key, 'q') {
        return InputAction::Quit;
    }
    if is_ctrl_char(key, 'c') {
        return InputAction::Interrupt;
    }
    if is_ctrl_char(key, 'r') {
        return InputAction::RestartShell;
    }
    if is_ctrl_char(key, 'v') || is_ctrl_shift_char(key, 'v') {
        return InputAction::PasteClipboard;
    }
    if is_ctrl_char(key, 'l') {
        return InputAction::Console(ConsoleAction::Clear);
    }

    let action = match key.code {
        KeyCode::F(5) => return InputAction::Build(BuildAction::Compile),
        KeyCode::F(6) => return InputAction::Build(BuildAction::Assemble),
        KeyCode::F(7) => return InputAction::Build(BuildAction::AssembleAndLink),
        KeyCode::F(8) => return InputAction::Build(BuildAction::Program),
        KeyCode::F(9) => return InputAction::Build(BuildAction::BuildAndProgram),
        KeyCode::Enter => ConsoleAction::Submit,
        KeyCode::Up => ConsoleAction::HistoryUp,
        KeyCode::Down => ConsoleAction::HistoryDown,
        KeyCode::Left => ConsoleAction::Left,
        KeyCode::Right => ConsoleAction::Right,
        KeyCode::Home => ConsoleAction::Home,
        KeyCode::End => ConsoleAction::End,
        KeyCode::Backspace => ConsoleAction::Backspace,
        KeyCode::Delete => ConsoleAction::Delete,
        KeyCode::Tab => ConsoleAction::Insert("\t".to_string()),
        KeyCode::Char(ch)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            ConsoleAction::Insert(ch.to_string())
        }
        _ => return InputAction::None,
    };
    InputAction::Console(action)
}

fn is_ctrl_char(key: KeyEvent, needle: char) -> bool {
    matches!(key.code, KeyCode::Char(ch) if ch.eq_ignore_ascii_case(&needle))
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && !key.modifiers.contains(KeyModifiers::SHIFT)
}

fn is_ctrl_shift_char(key: KeyEvent, needle: char) -> bool {
    matches!(key.code, KeyCode::Char(ch) if ch.eq_ignore_ascii_case(&needle))
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && key.modifiers.contains(KeyModifiers::SHIFT)
}
