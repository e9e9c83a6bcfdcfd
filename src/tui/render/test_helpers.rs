use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::io::storage::{MemoryStorage, Storage};
use crate::model::auth::{AuthFields, FormKind};
use crate::model::config::Config;
use crate::model::project::{Project, ProjectList};
use crate::model::task::Task;
use crate::ops::auth_ops::AuthSubmitter;
use crate::ops::project_ops::ProjectStore;
use crate::tui::app::App;
use crate::tui::input::handle_key;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;
pub const KEY: &str = "projects";

/// Render into an in-memory buffer and return it.
pub fn render_to_buffer<F>(w: u16, h: u16, f: F) -> Buffer
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();
    terminal.backend().buffer().clone()
}

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let buf = render_to_buffer(w, h, f);
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Submitter that accepts every form
pub struct AcceptAll;

impl AuthSubmitter for AcceptAll {
    fn submit(&mut self, _fields: &AuthFields, _kind: FormKind) -> Result<(), String> {
        Ok(())
    }
}

fn app_on(storage: MemoryStorage) -> App {
    let storage: Box<dyn Storage> = Box::new(storage);
    let store = ProjectStore::load(storage, KEY, 0).unwrap();
    App::new(store, Box::new(AcceptAll), &Config::default())
}

/// App over empty storage, showing the seed project.
pub fn seeded_app() -> App {
    app_on(MemoryStorage::new())
}

/// App with a single project holding `tasks`.
pub fn app_with_tasks(tasks: Vec<Task>) -> App {
    let mut project = Project::new("Тест");
    project.tasks = tasks;
    let json = serde_json::to_string(&ProjectList(vec![project])).unwrap();
    app_on(MemoryStorage::with_value(KEY, &json))
}

/// Task titles of the first project as persisted, empty if nothing was written.
pub fn stored_titles(app: &App) -> Vec<String> {
    let Some(raw) = app.store.storage().get(KEY).unwrap() else {
        return Vec::new();
    };
    let list: ProjectList = serde_json::from_str(&raw).unwrap();
    list.get(app.store.project_index())
        .map(|p| p.tasks.iter().map(|t| t.title.clone()).collect())
        .unwrap_or_default()
}

pub fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

pub fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

/// Feed each character of `s` as a key press.
pub fn type_str(app: &mut App, s: &str) {
    for c in s.chars() {
        handle_key(app, press(KeyCode::Char(c)));
    }
}
