use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::App;

use super::edit_line;

/// Add-task overlay: Tab switches inputs, Enter confirms, Esc closes
pub(super) fn handle_modal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_modal(),
        KeyCode::Enter => app.confirm_modal(),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            if let Some(modal) = app.modal.as_mut() {
                modal.toggle_focus();
            }
        }
        _ => {
            if let Some(modal) = app.modal.as_mut() {
                modal.error = None;
                edit_line(modal.focused_input(), key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::tui::app::Mode;
    use crate::tui::input::handle_key;
    use crate::tui::modal::TITLE_REQUIRED;
    use crate::tui::render::test_helpers::*;
    use crossterm::event::KeyCode;

    #[test]
    fn add_task_through_modal() {
        let mut app = seeded_app();
        handle_key(&mut app, press(KeyCode::Char('a')));
        assert_eq!(app.mode, Mode::Modal);
        type_str(&mut app, "Новая");
        handle_key(&mut app, press(KeyCode::Tab));
        handle_key(&mut app, ctrl('u'));
        type_str(&mut app, "01.12.2024");
        handle_key(&mut app, press(KeyCode::Enter));

        assert_eq!(app.mode, Mode::Navigate);
        let last = app.tasks().last().unwrap();
        assert_eq!(last.title, "Новая");
        assert_eq!(last.created, "01.12.2024");
        assert!(!last.completed);
        assert_eq!(stored_titles(&app).len(), 4);
    }

    #[test]
    fn esc_closes_without_adding() {
        let mut app = seeded_app();
        handle_key(&mut app, press(KeyCode::Char('a')));
        type_str(&mut app, "Черновик");
        handle_key(&mut app, press(KeyCode::Esc));
        assert!(app.modal.is_none());
        assert_eq!(app.tasks().len(), 3);
    }

    #[test]
    fn empty_title_shows_error_until_typing() {
        let mut app = seeded_app();
        handle_key(&mut app, press(KeyCode::Char('a')));
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.modal.as_ref().unwrap().error, Some(TITLE_REQUIRED));

        handle_key(&mut app, press(KeyCode::Char('x')));
        assert!(app.modal.as_ref().unwrap().error.is_none());
    }
}
