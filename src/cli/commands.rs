use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "td", about = concat!("taskdesk v", env!("CARGO_PKG_VERSION"), " - projects and tasks in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,

    /// Project to open, by index (default: [ui] default_project)
    #[arg(short = 'p', long = "project", global = true)]
    pub project: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a taskdesk workspace in the current directory
    Init(InitArgs),
    /// List projects
    Projects,
    /// List tasks of the active project
    List,
    /// Add a task to the active project
    Add(AddArgs),
    /// Flip a task's completed flag
    Toggle(IdArgs),
    /// Change a task's title or creation date
    Edit(EditArgs),
    /// Delete a task
    Delete(IdArgs),
    /// Set the default project
    Use(UseArgs),
    /// Register an account
    Register(RegisterArgs),
    /// Log in with an existing account
    Login(LoginArgs),
    /// Open the sign-in screen of the TUI
    Auth,
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

#[derive(Args)]
pub struct InitArgs {
    /// Storage key for the project list (default: projects)
    #[arg(long)]
    pub key: Option<String>,
    /// Reinitialize even if .taskdesk/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Task args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Creation date label (default: today, DD.MM.YYYY)
    #[arg(long)]
    pub created: Option<String>,
    /// Add the task already completed
    #[arg(long)]
    pub done: bool,
}

#[derive(Args)]
pub struct IdArgs {
    /// Task id or unique id prefix
    pub id: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id or unique id prefix
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New creation date label
    #[arg(long)]
    pub created: Option<String>,
}

#[derive(Args)]
pub struct UseArgs {
    /// Project index
    pub index: usize,
}

// ---------------------------------------------------------------------------
// Auth args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RegisterArgs {
    #[arg(long, default_value = "")]
    pub username: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub password: String,
}

#[derive(Args)]
pub struct LoginArgs {
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub password: String,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove old entries
    Prune(RecoveryPruneArgs),
    /// Print the absolute path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove all entries
    #[arg(long)]
    pub all: bool,
}
