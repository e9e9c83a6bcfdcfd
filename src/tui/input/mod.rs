mod auth;
mod modal;
mod table;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode, Screen};
use super::line_edit::LineEdit;

/// Handle a key event for the current screen and mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.status_message = None;

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    // Help overlay swallows the next key
    if app.show_help {
        app.show_help = false;
        return;
    }

    match app.screen {
        Screen::Auth => auth::handle_auth(app, key),
        Screen::Tasks => match app.mode {
            Mode::Navigate => table::handle_navigate(app, key),
            Mode::Edit => table::handle_edit(app, key),
            Mode::Modal => modal::handle_modal(app, key),
        },
    }
}

/// Apply a text-editing key to `input`. Returns false if the key is not an
/// editing key.
fn edit_line(input: &mut LineEdit, key: KeyEvent) -> bool {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => input.insert(c),
        (_, KeyCode::Backspace) => input.backspace(),
        (_, KeyCode::Delete) => input.delete(),
        (_, KeyCode::Left) => input.left(),
        (_, KeyCode::Right) => input.right(),
        (_, KeyCode::Home) | (KeyModifiers::CONTROL, KeyCode::Char('a')) => input.home(),
        (_, KeyCode::End) | (KeyModifiers::CONTROL, KeyCode::Char('e')) => input.end(),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => input.clear(),
        _ => return false,
    }
    true
}
