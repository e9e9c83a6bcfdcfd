use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, Screen};

use super::centered_rect;

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let overlay_area = centered_rect(60, 80, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));
    lines.push(Line::from(""));

    match app.screen {
        Screen::Tasks => {
            lines.push(Line::from(Span::styled(" Table", header_style)));
            add_binding(&mut lines, " \u{2191}\u{2193}/jk", "Move between rows", key_style, desc_style);
            add_binding(&mut lines, " \u{2190}\u{2192}/hl Tab", "Move between columns", key_style, desc_style);
            add_binding(&mut lines, " g/G", "Jump to top/bottom", key_style, desc_style);
            add_binding(&mut lines, " Enter/e", "Edit cell / activate", key_style, desc_style);
            add_binding(&mut lines, " Space", "Toggle done", key_style, desc_style);
            add_binding(&mut lines, " x/d", "Delete task", key_style, desc_style);
            add_binding(&mut lines, " a", "Add task", key_style, desc_style);
            add_binding(&mut lines, " ?", "Toggle this help", key_style, desc_style);
            add_binding(&mut lines, " q", "Quit", key_style, desc_style);
            lines.push(Line::from(""));

            lines.push(Line::from(Span::styled(" Editing", header_style)));
            add_binding(&mut lines, " Enter/Tab", "Save cell", key_style, desc_style);
            add_binding(&mut lines, " \u{2191}\u{2193}", "Save and move row", key_style, desc_style);
            add_binding(&mut lines, " Esc", "Discard changes", key_style, desc_style);
            lines.push(Line::from(""));
        }
        Screen::Auth => {
            lines.push(Line::from(Span::styled(" Sign in", header_style)));
            add_binding(&mut lines, " Tab/\u{2191}\u{2193}", "Next / previous field", key_style, desc_style);
            add_binding(&mut lines, " Enter", "Submit form", key_style, desc_style);
            add_binding(&mut lines, " Ctrl+T", "Register / login", key_style, desc_style);
            add_binding(&mut lines, " F1", "Toggle this help", key_style, desc_style);
            add_binding(&mut lines, " Esc", "Quit", key_style, desc_style);
            lines.push(Line::from(""));
        }
    }

    // Global keys
    lines.push(Line::from(Span::styled(" Global", header_style)));
    add_binding(&mut lines, " Ctrl+C", "Quit (immediate)", key_style, desc_style);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 16;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}
