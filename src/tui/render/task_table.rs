use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_segmentation::UnicodeSegmentation;

use crate::model::task::Task;
use crate::tui::app::App;
use crate::tui::line_edit::LineEdit;
use crate::tui::table::Column;
use crate::util::unicode;

pub const TITLE_HEADER: &str = "Описание";
pub const CREATED_HEADER: &str = "Дата создания";
pub const DONE_HEADER: &str = "Выполнено";

const CREATED_WIDTH: usize = 14;
const DONE_WIDTH: usize = 10;
const DELETE_WIDTH: usize = 3;
/// Space before each column
const GAP: usize = 1;

/// Column widths for a table `width` cells wide
fn column_widths(width: usize) -> [usize; 4] {
    let fixed = CREATED_WIDTH + DONE_WIDTH + DELETE_WIDTH + 4 * GAP;
    let title = width.saturating_sub(fixed).max(8);
    [title, CREATED_WIDTH, DONE_WIDTH, DELETE_WIDTH]
}

/// Render the active project's tasks as a four-column table
pub fn render_task_table(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let widths = column_widths(area.width as usize);

    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(app.theme.dim).bg(bg);

    let mut lines: Vec<Line> = Vec::new();
    let headers = [TITLE_HEADER, CREATED_HEADER, DONE_HEADER, ""];
    let mut header_spans = Vec::new();
    for (text, w) in headers.iter().zip(widths) {
        header_spans.push(Span::styled(" ".repeat(GAP), header_style));
        header_spans.push(Span::styled(unicode::fit_to_width(text, w), header_style));
    }
    lines.push(Line::from(header_spans));

    let tasks = app.store.project().tasks.clone();
    if tasks.is_empty() {
        lines.push(Line::from(Span::styled(
            " Нет задач. Нажмите a, чтобы добавить",
            dim_style,
        )));
        frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
        return;
    }

    let body_height = (area.height as usize).saturating_sub(1);
    app.table.clamp(tasks.len());
    app.table.ensure_visible(body_height);

    for (row, task) in tasks
        .iter()
        .enumerate()
        .skip(app.table.scroll_offset)
        .take(body_height)
    {
        lines.push(task_line(app, row, task, &widths));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

fn task_line(app: &App, row: usize, task: &Task, widths: &[usize; 4]) -> Line<'static> {
    let theme = &app.theme;
    let selected = row == app.table.row;
    let row_bg = if selected {
        theme.selection_bg
    } else {
        theme.background
    };

    let mut text_style = Style::default().fg(theme.task_color(task.completed)).bg(row_bg);
    if task.completed {
        text_style = text_style.add_modifier(Modifier::CROSSED_OUT);
    }
    let gap_style = Style::default().bg(row_bg);

    let mut spans = Vec::new();
    for (column, w) in Column::ALL.iter().zip(widths.iter()) {
        spans.push(Span::styled(" ".repeat(GAP), gap_style));

        let focused = selected && app.table.column == *column;
        let cell_style = if focused {
            text_style.fg(theme.highlight).add_modifier(Modifier::BOLD)
        } else {
            text_style
        };

        match column.field() {
            Some(field) => match app.table.edit.edit() {
                Some(edit) if edit.task_id == task.id && edit.field == field => {
                    let style = Style::default().fg(theme.text_bright).bg(theme.edit_bg);
                    spans.extend(edit_spans(&edit.input, *w, style));
                }
                _ => spans.push(Span::styled(
                    unicode::fit_to_width(task.field(field), *w),
                    cell_style,
                )),
            },
            None => {
                let (symbol, style) = match column {
                    Column::Done if task.completed => {
                        ("[x]", cell_style.fg(theme.green).remove_modifier(Modifier::CROSSED_OUT))
                    }
                    Column::Done => ("[ ]", cell_style),
                    _ => (
                        "\u{2715}",
                        cell_style
                            .fg(if focused { theme.red } else { theme.dim })
                            .remove_modifier(Modifier::CROSSED_OUT),
                    ),
                };
                spans.push(Span::styled(unicode::fit_to_width(symbol, *w), style));
            }
        }
    }
    Line::from(spans)
}

/// Spans for a cell in edit mode: the buffer scrolled so the cursor is
/// visible, with the cursor drawn reversed.
fn edit_spans(input: &LineEdit, width: usize, style: Style) -> Vec<Span<'static>> {
    if width == 0 {
        return Vec::new();
    }
    let text = input.text();
    let (before, after) = text.split_at(input.cursor());

    // Drop leading graphemes until the cursor fits
    let mut before_graphemes: Vec<&str> = before.graphemes(true).collect();
    while unicode::display_width(&before_graphemes.concat()) + 1 > width
        && !before_graphemes.is_empty()
    {
        before_graphemes.remove(0);
    }
    let before = before_graphemes.concat();

    let mut after_graphemes = after.graphemes(true);
    let cursor_glyph = after_graphemes.next().unwrap_or(" ").to_string();
    let rest: String = after_graphemes.collect();

    let used = unicode::display_width(&before) + unicode::display_width(&cursor_glyph);
    let remaining = width.saturating_sub(used);

    let mut spans = vec![
        Span::styled(before, style),
        Span::styled(cursor_glyph, style.add_modifier(Modifier::REVERSED)),
    ];
    let mut tail = unicode::truncate_to_width(&rest, remaining);
    let tail_width = unicode::display_width(&tail);
    tail.push_str(&" ".repeat(remaining - tail_width));
    spans.push(Span::styled(tail, style));
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    fn render(app: &mut App) -> String {
        render_to_string(TERM_W, TERM_H, |frame, area| {
            render_task_table(frame, app, area);
        })
    }

    #[test]
    fn seed_table_shows_headers_and_rows() {
        let mut app = seeded_app();
        let output = render(&mut app);
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].contains(TITLE_HEADER));
        assert!(lines[0].contains(CREATED_HEADER));
        assert!(lines[0].contains(DONE_HEADER));
        assert!(lines[1].contains("Выполнить план по тз"));
        assert!(lines[1].contains("21.11.2024"));
        assert!(lines[1].contains("[x]"));
        assert!(lines[2].contains("[ ]"));
        assert!(lines[3].contains("Добавить фильтры для проектов"));
    }

    #[test]
    fn completed_rows_are_struck_through() {
        let mut app = seeded_app();
        let buf = render_to_buffer(TERM_W, TERM_H, |frame, area| {
            render_task_table(frame, &mut app, area);
        });
        // Row 1 is completed, row 2 is not; column 1 is the first title cell
        assert!(buf[(1, 1)].modifier.contains(Modifier::CROSSED_OUT));
        assert!(!buf[(1, 2)].modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn editing_cell_shows_buffer() {
        let mut app = seeded_app();
        app.table.row = 1;
        app.begin_edit();
        if let Some(input) = app.table.edit.input_mut() {
            input.insert_str(" v2");
        }
        let output = render(&mut app);
        assert!(output.contains("Сделать реконструкцию функции v2"));
    }

    #[test]
    fn empty_project_shows_hint() {
        let mut app = app_with_tasks(vec![]);
        let output = render(&mut app);
        assert!(output.contains("Нет задач"));
    }

    #[test]
    fn long_list_scrolls_to_cursor() {
        let tasks = (0..30)
            .map(|i| Task::new(format!("task {}", i), "01.01.2025", false))
            .collect();
        let mut app = app_with_tasks(tasks);
        app.table.row = 29;
        let output = render(&mut app);
        assert!(output.contains("task 29"));
        assert!(!output.contains("task 0 "));
        assert_eq!(app.table.scroll_offset, 30 - (TERM_H as usize - 1));
    }

    #[test]
    fn edit_spans_keep_cursor_visible() {
        let input = LineEdit::new("abcdefghij");
        let spans = edit_spans(&input, 5, Style::default());
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "ghij ");
    }
}
