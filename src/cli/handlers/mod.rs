mod init;

pub use init::cmd_init;

use std::path::{Path, PathBuf};

use log::info;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::accounts::LocalAccounts;
use crate::io::config_io;
use crate::io::logging::{effective_level, init_logging, log_dir};
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::storage::{FileStorage, read_project_list};
use crate::io::workspace::{Workspace, discover_workspace, load_workspace};
use crate::model::auth::{AuthField, FormKind};
use crate::model::task::{Task, TaskPatch, today_label};
use crate::ops::auth_ops::{AuthForm, SubmitOutcome};
use crate::ops::project_ops::{ProjectStore, StoreError};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Shared context for commands that run inside a workspace
struct Ctx {
    workspace: Workspace,
    json: bool,
    /// `--project`, falling back to `[ui] default_project`
    project: usize,
}

impl Ctx {
    fn open_store(&self) -> Result<ProjectStore<FileStorage>, StoreError> {
        self.workspace.open_store(self.project)
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let start = start_dir(cli.project_dir.as_deref())?;

    let Some(cmd) = cli.command else {
        return crate::tui::run(Some(start.as_path()), cli.project, crate::tui::Screen::Tasks);
    };

    match cmd {
        // Init runs before a workspace exists
        Commands::Init(args) => cmd_init(args, Some(start.as_path())),
        Commands::Auth => crate::tui::run(Some(start.as_path()), cli.project, crate::tui::Screen::Auth),
        cmd => {
            let ctx = open_ctx(&start, cli.json, cli.project)?;
            match cmd {
                Commands::Projects => cmd_projects(&ctx),
                Commands::List => cmd_list(&ctx),
                Commands::Add(args) => cmd_add(&ctx, args),
                Commands::Toggle(args) => cmd_toggle(&ctx, args),
                Commands::Edit(args) => cmd_edit(&ctx, args),
                Commands::Delete(args) => cmd_delete(&ctx, args),
                Commands::Use(args) => cmd_use(&ctx, args),
                Commands::Register(args) => cmd_register(&ctx, args),
                Commands::Login(args) => cmd_login(&ctx, args),
                Commands::Recovery(args) => cmd_recovery(&ctx, args),
                Commands::Init(_) | Commands::Auth => unreachable!("handled above"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Directory workspace discovery starts from: `-C` or the cwd
fn start_dir(project_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match project_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

fn open_ctx(
    start: &Path,
    json: bool,
    project: Option<usize>,
) -> Result<Ctx, Box<dyn std::error::Error>> {
    let root = discover_workspace(start)?;
    let workspace = load_workspace(&root)?;
    init_logging(
        &effective_level(&workspace.config.log.level),
        &log_dir(&workspace.data_dir),
    )?;
    let project = project.unwrap_or(workspace.config.ui.default_project);
    Ok(Ctx {
        workspace,
        json,
        project,
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_projects(ctx: &Ctx) -> CmdResult {
    let storage = ctx.workspace.storage();
    let (projects, _source) = read_project_list(&storage, ctx.workspace.storage_key())?;

    if ctx.json {
        let out: Vec<ProjectJson> = projects
            .iter()
            .enumerate()
            .map(|(i, p)| project_to_json(i, p, ctx.project))
            .collect();
        return print_json(&out);
    }
    for (i, project) in projects.iter().enumerate() {
        println!("{}", format_project_line(i, project, ctx.project));
    }
    Ok(())
}

fn cmd_list(ctx: &Ctx) -> CmdResult {
    let store = ctx.open_store()?;
    let project = store.project();

    if ctx.json {
        return print_json(&TaskListJson {
            project: store.project_index(),
            title: project.title.clone(),
            tasks: project
                .tasks
                .iter()
                .enumerate()
                .map(|(row, t)| task_to_json(row, t))
                .collect(),
        });
    }
    println!("{}", project.title);
    for task in &project.tasks {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Ctx, args: AddArgs) -> CmdResult {
    let title = args.title.trim();
    if title.is_empty() {
        return Err("task title cannot be empty".into());
    }
    let mut store = ctx.open_store()?;
    let created = args.created.unwrap_or_else(today_label);
    let id = store.add_task(Task::new(title, created, args.done))?;
    println!("{}", id);
    Ok(())
}

fn cmd_toggle(ctx: &Ctx, args: IdArgs) -> CmdResult {
    let mut store = ctx.open_store()?;
    let id = store.resolve(&args.id)?;
    store.toggle_completed(id)?;
    if let Some(task) = store.task(id) {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

fn cmd_edit(ctx: &Ctx, args: EditArgs) -> CmdResult {
    let patch = TaskPatch {
        title: args.title,
        created: args.created,
        completed: None,
    };
    if patch.is_empty() {
        return Err("nothing to change: pass --title and/or --created".into());
    }
    if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err("task title cannot be empty".into());
    }
    let mut store = ctx.open_store()?;
    let id = store.resolve(&args.id)?;
    store.update_task(id, &patch)?;
    if let Some(task) = store.task(id) {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

fn cmd_delete(ctx: &Ctx, args: IdArgs) -> CmdResult {
    let mut store = ctx.open_store()?;
    let id = store.resolve(&args.id)?;
    let task = store.delete_task(id)?;
    recovery::log_recovery(
        &ctx.workspace.data_dir,
        RecoveryEntry::now(RecoveryCategory::Delete, "task deleted from command line")
            .field("Project", store.project().title.as_str())
            .field("Id", task.id.to_string())
            .field("Created", task.created.as_str())
            .body(task.title.as_str()),
    );
    println!("deleted: {}", task.title);
    Ok(())
}

fn cmd_use(ctx: &Ctx, args: UseArgs) -> CmdResult {
    let storage = ctx.workspace.storage();
    let (projects, _source) = read_project_list(&storage, ctx.workspace.storage_key())?;
    if args.index >= projects.len() {
        return Err(StoreError::ProjectIndexOutOfRange {
            index: args.index,
            len: projects.len(),
        }
        .into());
    }
    let (_config, mut doc) = config_io::read_config(&ctx.workspace.data_dir)?;
    config_io::set_default_project(&mut doc, args.index);
    config_io::write_config(&ctx.workspace.data_dir, &doc)?;
    info!("event=default_project index={}", args.index);
    if let Some(project) = projects.get(args.index) {
        println!("default project: {} {}", args.index, project.title);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Auth commands
// ---------------------------------------------------------------------------

/// Validate and submit `form`; invalid fields are printed and fail the command.
fn submit_form(ctx: &Ctx, mut form: AuthForm) -> CmdResult {
    let mut accounts = LocalAccounts::open(&ctx.workspace.data_dir);
    match form.submit(&mut accounts) {
        SubmitOutcome::Accepted => {
            let email = form.value(AuthField::Email);
            match form.kind {
                FormKind::Register => println!("registered: {}", email),
                FormKind::Login => println!("logged in: {}", email),
            }
            Ok(())
        }
        SubmitOutcome::Rejected(message) => Err(message.into()),
        SubmitOutcome::Invalid => {
            if ctx.json {
                print_json(&FieldErrorsJson {
                    errors: &form.errors,
                })?;
            } else {
                for line in format_field_errors(&form.errors) {
                    eprintln!("{}", line);
                }
            }
            Err(format!("{} form is invalid", form.kind).into())
        }
    }
}

fn cmd_register(ctx: &Ctx, args: RegisterArgs) -> CmdResult {
    let mut form = AuthForm::new(FormKind::Register);
    form.set_value(AuthField::Username, args.username);
    form.set_value(AuthField::Email, args.email);
    form.set_value(AuthField::Password, args.password);
    submit_form(ctx, form)
}

fn cmd_login(ctx: &Ctx, args: LoginArgs) -> CmdResult {
    let mut form = AuthForm::new(FormKind::Login);
    form.set_value(AuthField::Email, args.email);
    form.set_value(AuthField::Password, args.password);
    submit_form(ctx, form)
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

fn cmd_recovery(ctx: &Ctx, args: RecoveryCmd) -> CmdResult {
    let data_dir = &ctx.workspace.data_dir;
    match args.action {
        Some(RecoveryAction::Path) => {
            println!("{}", recovery::recovery_log_path(data_dir).display());
        }
        Some(RecoveryAction::Prune(prune)) => {
            let removed = recovery::prune_recovery(data_dir, None, prune.all)?;
            println!("pruned {} entries", removed);
        }
        None => {
            let limit = args.limit.unwrap_or(10);
            let entries = recovery::read_recovery_entries(data_dir, Some(limit));
            if ctx.json {
                let out: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
                return print_json(&out);
            }
            if entries.is_empty() {
                println!("recovery log is empty");
            }
            for entry in &entries {
                for line in format_recovery_entry(entry) {
                    println!("{}", line);
                }
            }
        }
    }
    Ok(())
}
