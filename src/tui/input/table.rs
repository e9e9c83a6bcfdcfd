use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::tui::table::Column;

use super::edit_line;

/// Navigate mode on the task table
pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    let len = app.tasks().len();
    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) => app.should_quit = true,
        (_, KeyCode::Char('?')) => app.show_help = true,

        (_, KeyCode::Down | KeyCode::Char('j')) => app.table.move_row(1, len),
        (_, KeyCode::Up | KeyCode::Char('k')) => app.table.move_row(-1, len),
        (_, KeyCode::Char('g') | KeyCode::Home) => app.table.row = 0,
        (_, KeyCode::Char('G') | KeyCode::End) => app.table.move_row(len as isize, len),
        (_, KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab) => {
            app.table.column = app.table.column.next()
        }
        (_, KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab) => {
            app.table.column = app.table.column.prev()
        }

        (KeyModifiers::NONE, KeyCode::Enter) => match app.table.column {
            Column::Title | Column::Created => app.begin_edit(),
            Column::Done => app.toggle_selected(),
            Column::Delete => app.delete_selected(),
        },
        (_, KeyCode::Char('e')) => app.begin_edit(),
        (_, KeyCode::Char(' ')) => app.toggle_selected(),
        (_, KeyCode::Char('x') | KeyCode::Char('d') | KeyCode::Delete) => app.delete_selected(),
        (_, KeyCode::Char('a')) => app.open_modal(),
        _ => {}
    }
}

/// Edit mode: one cell has a live buffer
pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        // Leaving the cell commits it
        KeyCode::Enter | KeyCode::Tab | KeyCode::BackTab => app.commit_edit(),
        KeyCode::Up | KeyCode::Down => {
            app.commit_edit();
            let len = app.tasks().len();
            let delta = if key.code == KeyCode::Up { -1 } else { 1 };
            app.table.move_row(delta, len);
        }
        _ => {
            if let Some(input) = app.table.edit.input_mut() {
                edit_line(input, key);
            }
        }
    }
}
