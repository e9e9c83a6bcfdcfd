use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::model::task::TaskField;
use crate::tui::app::App;
use crate::tui::modal::MODAL_TITLE;
use crate::util::unicode;

use super::centered_fixed;

/// Render the add-task overlay
pub fn render_modal(frame: &mut Frame, app: &App, area: Rect) {
    let Some(modal) = &app.modal else {
        return;
    };
    let popup = centered_fixed(50, 9, area);
    frame.render_widget(Clear, popup);

    let bg = app.theme.background;
    let label_style = Style::default().fg(app.theme.dim).bg(bg);
    let inner_width = popup.width.saturating_sub(4) as usize;

    let mut lines = Vec::new();
    for (field, label, input) in [
        (TaskField::Title, "Название", &modal.title),
        (TaskField::Created, "Дата создания", &modal.created),
    ] {
        lines.push(Line::from(Span::styled(format!(" {}", label), label_style)));
        let focused = modal.focus == field;
        let style = if focused {
            Style::default().fg(app.theme.text_bright).bg(app.theme.edit_bg)
        } else {
            Style::default().fg(app.theme.text).bg(bg)
        };
        let mut text = input.text().to_string();
        if focused {
            text.insert(input.cursor(), '\u{258C}');
        }
        let text = unicode::fit_to_width(&text, inner_width);
        lines.push(Line::from(vec![
            Span::styled(" ", Style::default().bg(bg)),
            Span::styled(text, style),
        ]));
        lines.push(Line::from(""));
    }

    let hint = match modal.error {
        Some(message) => Span::styled(
            format!(" {}", message),
            Style::default().fg(app.theme.red).bg(bg),
        ),
        None => Span::styled(" Enter добавить  Esc отмена", label_style),
    };
    lines.push(Line::from(hint));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", MODAL_TITLE),
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::modal::TITLE_REQUIRED;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn modal_shows_title_and_prefilled_date() {
        let mut app = seeded_app();
        app.open_modal();
        let today = crate::model::task::today_label();
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_modal(frame, &app, area);
        });
        assert!(output.contains(MODAL_TITLE));
        assert!(output.contains("Название"));
        assert!(output.contains(&today));
        assert!(output.contains("Esc"));
    }

    #[test]
    fn modal_shows_missing_title_error() {
        let mut app = seeded_app();
        app.open_modal();
        app.confirm_modal();
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_modal(frame, &app, area);
        });
        assert!(output.contains(TITLE_REQUIRED));
    }

    #[test]
    fn closed_modal_renders_nothing() {
        let app = seeded_app();
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_modal(frame, &app, area);
        });
        assert!(output.is_empty());
    }
}
