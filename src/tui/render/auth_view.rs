use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::auth::{AuthField, FormKind};
use crate::tui::app::App;
use crate::util::unicode;

use super::centered_fixed;

fn form_title(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Register => "Регистрация",
        FormKind::Login => "Вход",
    }
}

fn button_label(kind: FormKind) -> &'static str {
    match kind {
        FormKind::Register => "Зарегистрироваться",
        FormKind::Login => "Войти",
    }
}

/// Render the active auth form
pub fn render_auth_view(frame: &mut Frame, app: &App, area: Rect) {
    let page = &app.auth;
    let form = page.form();
    let kind = page.active;
    let bg = app.theme.background;

    let rows = kind.fields().len() as u16 * 3 + 6;
    let popup = centered_fixed(48, rows, area);
    let inner_width = popup.width.saturating_sub(4) as usize;

    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let error_style = Style::default().fg(app.theme.red).bg(bg);

    let mut lines = Vec::new();
    for &field in kind.fields() {
        let focused = page.focused_field() == field;
        let value = form.value(field);
        let shown = if field == AuthField::Password {
            "\u{2022}".repeat(value.chars().count())
        } else {
            value.to_string()
        };

        let (text, style) = if shown.is_empty() && !focused {
            (field.placeholder().to_string(), dim)
        } else if focused {
            (
                format!("{}\u{258C}", shown),
                Style::default().fg(app.theme.text_bright).bg(app.theme.edit_bg),
            )
        } else {
            (shown, Style::default().fg(app.theme.text).bg(bg))
        };
        let label_style = if focused {
            Style::default().fg(app.theme.highlight).bg(bg)
        } else {
            dim
        };
        lines.push(Line::from(Span::styled(
            format!(" {}", field.placeholder()),
            label_style,
        )));
        lines.push(Line::from(vec![
            Span::styled(" ", Style::default().bg(bg)),
            Span::styled(unicode::fit_to_width(&text, inner_width), style),
        ]));
        match form.visible_error(field) {
            Some(message) => lines.push(Line::from(Span::styled(
                format!(" {}", unicode::truncate_to_width(message, inner_width)),
                error_style,
            ))),
            None => lines.push(Line::from("")),
        }
    }

    if let Some(message) = &form.submit_error {
        lines.push(Line::from(Span::styled(format!(" {}", message), error_style)));
    } else {
        lines.push(Line::from(""));
    }

    let button_style = if form.is_loading {
        dim
    } else {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    };
    lines.push(Line::from(vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(format!("[ {} ]", button_label(kind)), button_style),
    ]));

    let other = match kind {
        FormKind::Register => FormKind::Login,
        FormKind::Login => FormKind::Register,
    };
    lines.push(Line::from(Span::styled(
        format!(" Ctrl-T {}", form_title(other)),
        dim,
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            format!(" {} ", form_title(kind)),
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    frame.render_widget(Paragraph::new(lines).block(block), popup);
}
