use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "wb", about = concat!("workboard v", env!("CARGO_PKG_VERSION"), " - tasks, ideas and features in one board"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,

    /// Log engine activity to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workspace in the current directory
    Init(InitArgs),
    /// List tasks as a table
    List(ListArgs),
    /// Show tasks as kanban columns
    Board(FilterArgs),
    /// Show tasks on a timeline
    Gantt(FilterArgs),
    /// Show the feature board grouped by project and category
    Features(FeatureArgs),
    /// Show the idea backlog grouped by project and category
    Ideas(IdeaArgs),
    /// Show one item
    Show(ShowArgs),
    /// Create an item
    Add(AddArgs),
    /// Change fields of an item
    Set(SetArgs),
    /// Move an item to another status
    Status(StatusArgs),
    /// Archive an item (admin only)
    Archive(IdArgs),
    /// Spawn a task from an idea or feature
    Take(IdArgs),
    /// Comment on an item
    Comment(CommentArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Workspace name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Reinitialize even if .workboard/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
pub struct FilterArgs {
    /// Only items with this status
    #[arg(long)]
    pub status: Option<String>,
    /// Only items with this priority
    #[arg(long)]
    pub priority: Option<String>,
    /// Only items assigned to this user id
    #[arg(long)]
    pub assignee: Option<String>,
    /// Only items in this project id
    #[arg(long)]
    pub project: Option<String>,
    /// Source: deal, process, content, backlog, functionality, task or a label
    #[arg(long)]
    pub source: Option<String>,
    /// Include items in a completed status
    #[arg(long)]
    pub show_completed: bool,
    /// Case-insensitive regex over title and description
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,
    /// List ideas and features too, one table per kind
    #[arg(long)]
    pub all_kinds: bool,
}

#[derive(Args)]
pub struct FeatureArgs {
    /// Only features in this project id
    #[arg(long)]
    pub project: Option<String>,
    /// Only features in this category id
    #[arg(long)]
    pub category: Option<String>,
    /// Case-insensitive regex over title and description
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct IdeaArgs {
    /// Case-insensitive regex over title and description
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Item ID to show
    pub id: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Item title
    pub title: String,
    /// task, idea or feature
    #[arg(long, default_value = "task")]
    pub kind: String,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    /// Assignee user id (repeatable; the first is the primary assignee)
    #[arg(long = "assignee", action = clap::ArgAction::Append)]
    pub assignees: Vec<String>,
    #[arg(long)]
    pub project: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,
    /// End / due date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,
    /// Originating deal id
    #[arg(long)]
    pub deal: Option<String>,
    /// Originating process id
    #[arg(long)]
    pub process: Option<String>,
    /// Originating content post id
    #[arg(long)]
    pub content: Option<String>,
    /// Free-text source label
    #[arg(long)]
    pub source: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct SetArgs {
    /// Item ID
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    /// Replace the assignee set (repeatable)
    #[arg(long = "assignee", action = clap::ArgAction::Append)]
    pub assignees: Vec<String>,
    /// Remove every assignee
    #[arg(long, conflicts_with = "assignees")]
    pub unassign: bool,
    /// Project id, or empty to clear
    #[arg(long)]
    pub project: Option<String>,
    /// Category id, or empty to clear
    #[arg(long)]
    pub category: Option<String>,
    /// Start date (YYYY-MM-DD), or empty to clear
    #[arg(long)]
    pub start: Option<String>,
    /// Due date (YYYY-MM-DD), or empty to clear
    #[arg(long)]
    pub due: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct StatusArgs {
    /// Item ID
    pub id: String,
    /// Target status name
    pub status: String,
}

#[derive(Args)]
pub struct IdArgs {
    /// Item ID
    pub id: String,
}

#[derive(Args)]
pub struct CommentArgs {
    /// Item ID
    pub id: String,
    /// Comment text
    pub text: String,
}
