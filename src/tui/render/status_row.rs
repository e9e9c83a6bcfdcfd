use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode, Screen};
use crate::util::unicode;

/// Key hints for the current screen and mode
fn hint(app: &App) -> &'static str {
    match (app.screen, app.mode) {
        (Screen::Auth, _) => "Tab next  Enter submit  Ctrl-T switch  F1 help  Esc quit",
        (Screen::Tasks, Mode::Navigate) => "Enter edit  Space done  a add  x delete  ? help",
        (Screen::Tasks, Mode::Edit) => "Enter save  Esc cancel",
        (Screen::Tasks, Mode::Modal) => "Tab next field  Enter add  Esc cancel",
    }
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let mut spans = Vec::new();
    if let Some(message) = &app.status_message {
        let color = if message.starts_with("error") {
            app.theme.red
        } else {
            app.theme.text_bright
        };
        spans.push(Span::styled(
            format!(" {}", unicode::truncate_to_width(message, width.saturating_sub(1))),
            Style::default().fg(color).bg(bg),
        ));
    }

    let show_hint = app.show_key_hints || app.mode != Mode::Navigate;
    if show_hint {
        let hint = hint(app);
        let content_width: usize = spans.iter().map(|s| unicode::display_width(&s.content)).sum();
        let hint_width = unicode::display_width(hint);
        if content_width + hint_width < width {
            let padding = width - content_width - hint_width;
            spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
            spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn shows_error_message() {
        let mut app = seeded_app();
        app.status_message = Some("error: project index 3 out of range (1 projects)".into());
        let output = render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert!(output.contains("out of range"));
    }

    #[test]
    fn edit_mode_always_shows_hint() {
        let mut app = seeded_app();
        app.show_key_hints = false;
        let navigate = render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert!(navigate.is_empty());

        app.begin_edit();
        let editing = render_to_string(TERM_W, 1, |frame, area| {
            render_status_row(frame, &app, area);
        });
        assert!(editing.contains("Esc cancel"));
    }
}
