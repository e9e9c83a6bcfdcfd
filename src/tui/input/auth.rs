use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::tui::line_edit::LineEdit;

use super::edit_line;

/// Auth screen: typing edits the focused field, Enter submits
pub(super) fn handle_auth(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => app.should_quit = true,
        (_, KeyCode::F(1)) => app.show_help = true,
        (_, KeyCode::Enter) => app.submit_auth(),
        (KeyModifiers::CONTROL, KeyCode::Char('t')) => app.auth.switch_form(),
        (_, KeyCode::Tab | KeyCode::Down) => app.auth.move_focus(1),
        (_, KeyCode::BackTab | KeyCode::Up) => app.auth.move_focus(-1),
        _ => {
            let field = app.auth.focused_field();
            let form = app.auth.form_mut();
            let mut input = LineEdit::new(form.value(field));
            if edit_line(&mut input, key) {
                form.set_value(field, input.into_text());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::auth::{AuthField, FormKind};
    use crate::tui::app::Screen;
    use crate::tui::input::handle_key;
    use crate::tui::render::test_helpers::*;
    use crossterm::event::KeyCode;

    fn auth_app() -> crate::tui::app::App {
        let mut app = seeded_app();
        app.screen = Screen::Auth;
        app
    }

    #[test]
    fn short_username_error_appears_after_blur() {
        let mut app = auth_app();
        type_str(&mut app, "ab");
        let form = &app.auth.register;
        assert!(form.errors.contains_key(&AuthField::Username));
        assert_eq!(form.visible_error(AuthField::Username), None);

        handle_key(&mut app, press(KeyCode::Tab));
        assert_eq!(
            app.auth.register.visible_error(AuthField::Username),
            Some("Имя пользователя должно содержать минимум 3 символа")
        );
    }

    #[test]
    fn enter_with_invalid_form_stays_on_auth() {
        let mut app = auth_app();
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Auth);
        assert_eq!(app.auth.register.errors.len(), 3);
    }

    #[test]
    fn login_flow_reaches_tasks() {
        let mut app = auth_app();
        handle_key(&mut app, ctrl('t'));
        assert_eq!(app.auth.active, FormKind::Login);
        type_str(&mut app, "me@mail.ru");
        handle_key(&mut app, press(KeyCode::Tab));
        type_str(&mut app, "secret1");
        handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(app.screen, Screen::Tasks);
    }

    #[test]
    fn f1_opens_help_without_typing() {
        let mut app = auth_app();
        handle_key(&mut app, press(KeyCode::F(1)));
        assert!(app.show_help);
        assert_eq!(app.auth.register.value(AuthField::Username), "");
    }

    #[test]
    fn backspace_edits_focused_field() {
        let mut app = auth_app();
        type_str(&mut app, "bob");
        handle_key(&mut app, press(KeyCode::Backspace));
        assert_eq!(app.auth.register.value(AuthField::Username), "bo");
    }
}
