use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::{error, info};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::accounts::LocalAccounts;
use crate::io::logging::{effective_level, init_logging, log_dir};
use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::io::state::{read_ui_state, write_ui_state};
use crate::io::storage::Storage;
use crate::io::workspace::{discover_workspace, load_workspace};
use crate::model::auth::{AuthField, FormKind};
use crate::model::config::Config;
use crate::model::task::{Task, TaskPatch, today_label};
use crate::ops::auth_ops::{AuthForm, AuthSubmitter, SubmitOutcome};
use crate::ops::project_ops::{ProjectStore, StoreError};

use super::input;
use super::modal::AddTaskModal;
use super::render;
use super::table::TaskTableState;
use super::theme::Theme;

/// Top-level screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Register / login forms
    Auth,
    /// Task table of the active project
    Tasks,
}

/// Current interaction mode of the task screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// A table cell is in edit mode
    Edit,
    /// The add-task overlay has input
    Modal,
}

/// Both auth forms and which one has the keyboard
#[derive(Debug, Clone)]
pub struct AuthPage {
    pub register: AuthForm,
    pub login: AuthForm,
    pub active: FormKind,
    /// Index into the active form's fields
    pub focused: usize,
}

impl Default for AuthPage {
    fn default() -> Self {
        let mut page = AuthPage {
            register: AuthForm::new(FormKind::Register),
            login: AuthForm::new(FormKind::Login),
            active: FormKind::Register,
            focused: 0,
        };
        let field = page.focused_field();
        page.form_mut().focus(field);
        page
    }
}

impl AuthPage {
    pub fn form(&self) -> &AuthForm {
        match self.active {
            FormKind::Register => &self.register,
            FormKind::Login => &self.login,
        }
    }

    pub fn form_mut(&mut self) -> &mut AuthForm {
        match self.active {
            FormKind::Register => &mut self.register,
            FormKind::Login => &mut self.login,
        }
    }

    pub fn focused_field(&self) -> AuthField {
        let fields = self.active.fields();
        fields[self.focused.min(fields.len() - 1)]
    }

    /// Blur the focused field and focus the one `delta` steps away (wrapping)
    pub fn move_focus(&mut self, delta: isize) {
        let len = self.active.fields().len() as isize;
        let old = self.focused_field();
        self.form_mut().blur(old);
        self.focused = (self.focused as isize + delta).rem_euclid(len) as usize;
        let new = self.focused_field();
        self.form_mut().focus(new);
    }

    /// Switch between the register and login forms
    pub fn switch_form(&mut self) {
        let old = self.focused_field();
        self.form_mut().blur(old);
        self.active = match self.active {
            FormKind::Register => FormKind::Login,
            FormKind::Login => FormKind::Register,
        };
        self.focused = 0;
        let new = self.focused_field();
        self.form_mut().focus(new);
    }
}

/// Main application state
pub struct App {
    pub store: ProjectStore<Box<dyn Storage>>,
    /// Data dir for the recovery log; `None` in tests
    pub data_dir: Option<PathBuf>,
    pub submitter: Box<dyn AuthSubmitter>,
    pub screen: Screen,
    pub mode: Mode,
    pub table: TaskTableState,
    pub modal: Option<AddTaskModal>,
    pub auth: AuthPage,
    pub theme: Theme,
    pub show_help: bool,
    pub show_key_hints: bool,
    /// One-line message for the status row, cleared on the next key
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        store: ProjectStore<Box<dyn Storage>>,
        submitter: Box<dyn AuthSubmitter>,
        config: &Config,
    ) -> Self {
        App {
            store,
            data_dir: None,
            submitter,
            screen: Screen::Tasks,
            mode: Mode::Navigate,
            table: TaskTableState::default(),
            modal: None,
            auth: AuthPage::default(),
            theme: Theme::from_config(&config.ui),
            show_help: false,
            show_key_hints: config.ui.show_key_hints,
            status_message: None,
            should_quit: false,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.store.project().tasks
    }

    /// Show a store failure in the status row. Text the user typed is kept
    /// in the recovery log when the write itself failed.
    fn report(&mut self, action: &str, err: StoreError, unsaved: Option<String>) {
        error!("event=tui_{} status=error error={}", action, err);
        if let StoreError::Storage(_) = err
            && let (Some(dir), Some(text)) = (&self.data_dir, unsaved)
        {
            log_recovery(
                dir,
                RecoveryEntry::now(RecoveryCategory::Write, "write failed, input not saved")
                    .field("Project", self.store.project().title.as_str())
                    .field("Action", action)
                    .field("Error", err.to_string())
                    .body(text),
            );
        }
        self.status_message = Some(format!("error: {}", err));
    }

    // -----------------------------------------------------------------------
    // Table actions
    // -----------------------------------------------------------------------

    /// Put the selected cell into edit mode, if its column is editable
    pub fn begin_edit(&mut self) {
        let Some(field) = self.table.column.field() else {
            return;
        };
        let Some(task) = self.tasks().get(self.table.row).cloned() else {
            return;
        };
        self.table.edit.begin(&task, field);
        self.mode = Mode::Edit;
    }

    /// Leave edit mode and persist the buffer
    pub fn commit_edit(&mut self) {
        self.mode = Mode::Navigate;
        let Some((id, field, value)) = self.table.edit.commit() else {
            return;
        };
        if self.store.task(id).is_some_and(|t| t.field(field) == value) {
            return;
        }
        if let Err(e) = self.store.update_task(id, &TaskPatch::field(field, value.clone())) {
            self.report("edit", e, Some(value));
        }
    }

    /// Leave edit mode without writing
    pub fn cancel_edit(&mut self) {
        self.table.edit.cancel();
        self.mode = Mode::Navigate;
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.store.task_id_at(self.table.row) else {
            return;
        };
        if let Err(e) = self.store.toggle_completed(id) {
            self.report("toggle", e, None);
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.store.task_id_at(self.table.row) else {
            return;
        };
        match self.store.delete_task(id) {
            Ok(task) => {
                if let Some(dir) = &self.data_dir {
                    log_recovery(
                        dir,
                        RecoveryEntry::now(RecoveryCategory::Delete, "task deleted from table")
                            .field("Project", self.store.project().title.as_str())
                            .field("Id", task.id.to_string())
                            .field("Created", task.created.as_str())
                            .body(task.title.as_str()),
                    );
                }
                let len = self.tasks().len();
                self.table.clamp(len);
                self.status_message = Some(format!("Удалено: {}", task.title));
            }
            Err(e) => self.report("delete", e, None),
        }
    }

    // -----------------------------------------------------------------------
    // Add-task modal
    // -----------------------------------------------------------------------

    pub fn open_modal(&mut self) {
        self.modal = Some(AddTaskModal::new(today_label()));
        self.mode = Mode::Modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.mode = Mode::Navigate;
    }

    /// Add the modal's task; the modal stays open if the title is missing
    pub fn confirm_modal(&mut self) {
        let Some(task) = self.modal.as_mut().and_then(AddTaskModal::confirm) else {
            return;
        };
        let title = task.title.clone();
        match self.store.add_task(task) {
            Ok(_) => {
                self.close_modal();
                self.table.row = self.tasks().len().saturating_sub(1);
            }
            Err(e) => self.report("add", e, Some(title)),
        }
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    /// Submit the active auth form; success opens the task screen
    pub fn submit_auth(&mut self) {
        let outcome = match self.auth.active {
            FormKind::Register => self.auth.register.submit(self.submitter.as_mut()),
            FormKind::Login => self.auth.login.submit(self.submitter.as_mut()),
        };
        if outcome == SubmitOutcome::Accepted {
            info!("event=tui_auth type={} status=ok", self.auth.active);
            self.screen = Screen::Tasks;
            self.mode = Mode::Navigate;
        }
    }
}

/// Restore cursor and last email from .state.json
pub fn restore_ui_state(app: &mut App, data_dir: &Path) {
    let Some(state) = read_ui_state(data_dir) else {
        return;
    };
    if let Some(row) = state.cursors.get(&app.store.project_index()) {
        let len = app.tasks().len();
        app.table.row = *row;
        app.table.clamp(len);
    }
    if let Some(email) = state.last_email {
        app.auth.login.set_value(AuthField::Email, email);
    }
}

/// Save UI state to .state.json
pub fn save_ui_state(app: &App, data_dir: &Path) {
    let mut state = read_ui_state(data_dir).unwrap_or_default();
    state.project = Some(app.store.project_index());
    state.cursors.insert(app.store.project_index(), app.table.row);
    let email = app.auth.form().value(AuthField::Email);
    if !email.is_empty() {
        state.last_email = Some(email.to_string());
    }
    if let Err(e) = write_ui_state(data_dir, &state) {
        error!("event=ui_state_write status=error error={}", e);
    }
}

/// Run the TUI application
pub fn run(
    start_dir: Option<&Path>,
    project: Option<usize>,
    screen: Screen,
) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = match start_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let root = discover_workspace(&cwd)?;
    let workspace = load_workspace(&root)?;
    init_logging(
        &effective_level(&workspace.config.log.level),
        &log_dir(&workspace.data_dir),
    )?;

    let index = project.unwrap_or(workspace.config.ui.default_project);
    let storage: Box<dyn Storage> = Box::new(workspace.storage());
    let store = workspace.open_store_with(storage, index)?;
    let submitter = Box::new(LocalAccounts::open(&workspace.data_dir));

    let mut app = App::new(store, submitter, &workspace.config);
    app.data_dir = Some(workspace.data_dir.clone());
    app.screen = screen;
    restore_ui_state(&mut app, &workspace.data_dir);
    info!(
        "event=tui_start project={} tasks={}",
        index,
        app.tasks().len()
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    save_ui_state(&app, &workspace.data_dir);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
