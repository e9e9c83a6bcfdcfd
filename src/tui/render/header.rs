use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Screen};
use crate::util::unicode;

/// Title row plus a separator line
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let title_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut spans = Vec::new();
    match app.screen {
        Screen::Auth => {
            spans.push(Span::styled(" taskdesk", title_style));
        }
        Screen::Tasks => {
            let project = app.store.project();
            let title = unicode::truncate_to_width(&project.title, width.saturating_sub(12));
            spans.push(Span::styled(format!(" {}", title), title_style));
            spans.push(Span::styled(
                format!(
                    "  {}/{}",
                    project.completed_count(),
                    project.tasks.len()
                ),
                dim_style,
            ));
        }
    }

    let separator = Line::from(Span::styled("\u{2500}".repeat(width), dim_style));
    let paragraph = Paragraph::new(vec![Line::from(spans), separator]).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn shows_project_title_and_progress() {
        let app = seeded_app();
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_header(frame, &app, area);
        });
        let first = output.lines().next().unwrap();
        assert!(first.contains("Мой проект"));
        assert!(first.contains("2/3"));
    }
}
