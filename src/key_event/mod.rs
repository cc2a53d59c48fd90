use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::App;
use crate::status_line::InputMode;

pub mod command;
pub mod normal;

pub use command::handle_command_event;
pub use normal::handle_normal_event;

/// Result of handling a key or paste event
pub enum KeyFlow {
    Continue,
    Quit,
}

/// Keys after translation through the binding table of the current mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    SelectNext,
    SelectPrevious,
    EnterDirectory,
    LeaveDirectory,
    StartDownload,
    StartFind,
    NextMatch,
    PreviousMatch,
    Insert(char),
    DeleteBackward,
    Confirm,
    Cancel,
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

/// Normal and Waiting mode bindings
fn translate_normal(key: &KeyEvent) -> Option<InputEvent> {
    if is_ctrl(key, 'c') {
        return Some(InputEvent::Quit);
    }
    if is_ctrl(key, 'n') {
        return Some(InputEvent::SelectNext);
    }
    if is_ctrl(key, 'p') {
        return Some(InputEvent::SelectPrevious);
    }
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }

    let event = match key.code {
        KeyCode::Char('q') => InputEvent::Quit,
        KeyCode::Char('j') | KeyCode::Down => InputEvent::SelectNext,
        KeyCode::Char('k') | KeyCode::Up => InputEvent::SelectPrevious,
        KeyCode::Char('l') | KeyCode::Enter | KeyCode::Right => InputEvent::EnterDirectory,
        KeyCode::Char('h') | KeyCode::Backspace | KeyCode::Left => InputEvent::LeaveDirectory,
        KeyCode::Char('y') => InputEvent::StartDownload,
        KeyCode::Char('/') => InputEvent::StartFind,
        KeyCode::Char('n') => InputEvent::NextMatch,
        KeyCode::Char('N') => InputEvent::PreviousMatch,
        _ => return None,
    };
    Some(event)
}

/// Command mode bindings: everything printable is input
fn translate_command(key: &KeyEvent) -> Option<InputEvent> {
    if is_ctrl(key, 'c') {
        return Some(InputEvent::Quit);
    }

    match key.code {
        KeyCode::Esc => Some(InputEvent::Cancel),
        KeyCode::Enter => Some(InputEvent::Confirm),
        KeyCode::Backspace => Some(InputEvent::DeleteBackward),
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(InputEvent::Insert(c))
        }
        _ => None,
    }
}

pub fn translate(mode: InputMode, key: &KeyEvent) -> Option<InputEvent> {
    match mode {
        InputMode::Normal | InputMode::Waiting => translate_normal(key),
        InputMode::Command => translate_command(key),
    }
}

/// Route a translated event to the handler for the current mode
pub fn dispatch(app: &mut App, event: InputEvent) -> KeyFlow {
    if event == InputEvent::Quit {
        return KeyFlow::Quit;
    }

    match app.mode() {
        InputMode::Normal => handle_normal_event(app, event),
        InputMode::Command => handle_command_event(app, event),
        InputMode::Waiting => app.reject_busy(),
    }
    app.mark_redraw();
    KeyFlow::Continue
}

/// Top-level key event handler
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> KeyFlow {
    // Only handle actual key presses (ignore repeats/releases)
    if key.kind != KeyEventKind::Press {
        return KeyFlow::Continue;
    }

    match translate(app.mode(), &key) {
        Some(event) => dispatch(app, event),
        None => KeyFlow::Continue,
    }
}

/// Paste event handler; only an open prompt accepts pasted text
pub fn handle_paste_event(app: &mut App, data: &str) {
    if app.mode() != InputMode::Command {
        return;
    }
    let text: String = data.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    app.command_insert_str(&text);
}
