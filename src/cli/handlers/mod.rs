mod init;
pub use init::cmd_init;

use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use serde::Serialize;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::item_store::FileItemStore;
use crate::io::store::MemoryStore;
use crate::io::workspace_io;
use crate::model::item::{ItemDraft, ItemKind, ItemPatch, parse_date};
use crate::model::workspace::Workspace;
use crate::ops::classify::classify;
use crate::ops::filter::{CompletedVisibility, FilterState, Scope, SourceFilter, apply_filters};
use crate::ops::item_ops::ItemError;
use crate::ops::orchestrator::{Orchestrator, ViewMode};
use crate::ops::table::{CellEditor, PickerKind};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// The CLI drives the same orchestrator as the TUI. Preferences stay in
/// memory so one-off filters never overwrite the TUI's remembered ones.
type CliOrchestrator = Orchestrator<FileItemStore, MemoryStore>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub struct Context {
    pub json: bool,
    /// Resolved `-C` override
    pub dir: Option<PathBuf>,
}

pub fn dispatch(cli: Cli) -> CliResult {
    let dir = match &cli.workspace_dir {
        Some(d) => Some(
            std::fs::canonicalize(d).map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?,
        ),
        None => None,
    };
    let ctx = Context {
        json: cli.json,
        dir,
    };

    match cli.command {
        None => Err("no subcommand given (try `wb --help`)".into()),
        Some(cmd) => match cmd {
            Commands::Init(args) => cmd_init(args, cli.workspace_dir.as_deref()),

            // Read commands
            Commands::List(args) => cmd_list(&ctx, args),
            Commands::Board(args) => cmd_board(&ctx, args),
            Commands::Gantt(args) => cmd_gantt(&ctx, args),
            Commands::Features(args) => cmd_features(&ctx, args),
            Commands::Ideas(args) => cmd_ideas(&ctx, args),
            Commands::Show(args) => cmd_show(&ctx, args),

            // Write commands
            Commands::Add(args) => cmd_add(&ctx, args),
            Commands::Set(args) => cmd_set(&ctx, args),
            Commands::Status(args) => cmd_status(&ctx, args),
            Commands::Archive(args) => cmd_archive(&ctx, args),
            Commands::Take(args) => cmd_take(&ctx, args),
            Commands::Comment(args) => cmd_comment(&ctx, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_workspace_cwd(ctx: &Context) -> Result<Workspace, Box<dyn std::error::Error>> {
    let start = match &ctx.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let root = workspace_io::discover_workspace(&start)?;
    Ok(workspace_io::load_workspace(&root)?)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn open_orchestrator(ctx: &Context) -> Result<CliOrchestrator, Box<dyn std::error::Error>> {
    let ws = load_workspace_cwd(ctx)?;
    let store = FileItemStore::new(&ws.board_dir, ws.config.vocabulary());
    Ok(Orchestrator::new(
        ws.config,
        ws.items,
        store,
        MemoryStore::default(),
        today(),
    ))
}

fn apply_filter_args(orch: &mut CliOrchestrator, args: FilterArgs) {
    orch.update_filters(|f| {
        *f = FilterState::for_scope(Scope::Aggregator);
        if args.show_completed {
            f.completed = CompletedVisibility::Show;
        }
        f.status = args.status;
        f.priority = args.priority;
        f.assignee = args.assignee;
        f.project = args.project;
        f.source = args.source.as_deref().map(SourceFilter::parse);
        f.search = args.search;
    });
}

fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

/// The orchestrator keeps failed writes pending; the CLI has nobody to show
/// them to later, so surface them now.
fn ensure_persisted(orch: &CliOrchestrator) -> CliResult {
    match orch.last_error() {
        Some(e) => Err(format!("change applied but not saved: {}", e).into()),
        None => Ok(()),
    }
}

fn print_write(ctx: &Context, id: &str, changed: bool) -> CliResult {
    if ctx.json {
        print_json(&WriteJson { id, changed })
    } else {
        println!("{}", id);
        Ok(())
    }
}

fn ensure_status(orch: &CliOrchestrator, status: &str) -> CliResult {
    if orch.vocab().status(status).is_none() {
        let names: Vec<&str> = orch.vocab().statuses.iter().map(|s| s.name.as_str()).collect();
        return Err(format!("unknown status '{}' (expected: {})", status, names.join(", ")).into());
    }
    Ok(())
}

fn ensure_priority(orch: &CliOrchestrator, priority: &str) -> CliResult {
    if orch.vocab().priority(priority).is_none() {
        let names: Vec<&str> = orch.vocab().priorities.iter().map(|p| p.name.as_str()).collect();
        return Err(format!("unknown priority '{}' (expected: {})", priority, names.join(", ")).into());
    }
    Ok(())
}

fn ensure_project(orch: &CliOrchestrator, project: &str) -> CliResult {
    if !project.trim().is_empty() && orch.directory().project(project).is_none() {
        return Err(format!("unknown project: {}", project).into());
    }
    Ok(())
}

fn ensure_users(orch: &CliOrchestrator, ids: &[String]) -> CliResult {
    for id in ids {
        if orch.directory().user(id).is_none() {
            return Err(format!("unknown user: {}", id).into());
        }
    }
    Ok(())
}

fn ensure_date(label: &str, value: &str) -> CliResult {
    if !value.trim().is_empty() && parse_date(value).is_none() {
        return Err(format!("invalid {}: {} (expected YYYY-MM-DD)", label, value).into());
    }
    Ok(())
}

/// Refuse a field the item's kind does not carry.
fn ensure_carried(kind: ItemKind, field: &'static str, given: bool, carried: bool) -> CliResult {
    if given && !carried {
        return Err(ItemError::NoField(kind, field).into());
    }
    Ok(())
}

/// `Some("")` clears a field, `Some(v)` sets it.
fn clearable(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| {
        let v = v.trim().to_string();
        (!v.is_empty()).then_some(v)
    })
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs) -> CliResult {
    let mut orch = open_orchestrator(ctx)?;
    orch.set_mode(ViewMode::Table);
    let search = args.filters.search.clone();
    apply_filter_args(&mut orch, args.filters);

    if !args.all_kinds {
        let rows = orch.table_rows();
        if ctx.json {
            return print_json(&rows);
        }
        print_lines(format_table(&rows, true));
        return Ok(());
    }

    // Ideas and features have their own boards; here they get a plain table each
    let mut sections = vec![("tasks", orch.table_rows())];
    for (label, kind) in [("ideas", ItemKind::Idea), ("features", ItemKind::Feature)] {
        orch.update_filters(|f| {
            *f = FilterState::for_scope(Scope::Kind(kind));
            f.search = search.clone();
        });
        sections.push((label, orch.table_rows()));
    }
    if ctx.json {
        let map: indexmap::IndexMap<&str, _> = sections.into_iter().collect();
        return print_json(&map);
    }
    for (i, (label, rows)) in sections.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("== {} ==", label);
        print_lines(format_table(rows, *label == "tasks"));
    }
    Ok(())
}

fn cmd_board(ctx: &Context, args: FilterArgs) -> CliResult {
    let mut orch = open_orchestrator(ctx)?;
    orch.set_mode(ViewMode::Kanban);
    apply_filter_args(&mut orch, args);
    if ctx.json {
        return print_json(&orch.projection());
    }
    print_lines(format_board(&orch.kanban_columns()));
    Ok(())
}

fn cmd_gantt(ctx: &Context, args: FilterArgs) -> CliResult {
    let mut orch = open_orchestrator(ctx)?;
    orch.set_mode(ViewMode::Gantt);
    apply_filter_args(&mut orch, args);
    if ctx.json {
        return print_json(&orch.projection());
    }
    print_lines(format_gantt(&orch.gantt_layout()));
    Ok(())
}

fn print_kind_board(ctx: &Context, ws: &Workspace, kind: ItemKind, filters: &FilterState) -> CliResult {
    let items = apply_filters(&ws.items, filters, &ws.config.completed_statuses);
    let groups = grouped_board(
        &items,
        kind,
        &ws.config.directory(),
        &ws.config.vocabulary(),
    );
    if ctx.json {
        return print_json(&groups);
    }
    print_lines(format_groups(&groups));
    Ok(())
}

fn cmd_features(ctx: &Context, args: FeatureArgs) -> CliResult {
    let ws = load_workspace_cwd(ctx)?;
    let mut filters = FilterState::for_scope(Scope::Kind(ItemKind::Feature));
    filters.project = args.project;
    filters.category = args.category;
    filters.search = args.search;
    print_kind_board(ctx, &ws, ItemKind::Feature, &filters)
}

fn cmd_ideas(ctx: &Context, args: IdeaArgs) -> CliResult {
    let ws = load_workspace_cwd(ctx)?;
    let mut filters = FilterState::for_scope(Scope::Kind(ItemKind::Idea));
    filters.search = args.search;
    print_kind_board(ctx, &ws, ItemKind::Idea, &filters)
}

fn cmd_show(ctx: &Context, args: ShowArgs) -> CliResult {
    let ws = load_workspace_cwd(ctx)?;
    let item = ws
        .find_item(&args.id)
        .ok_or_else(|| format!("item not found: {}", args.id))?;
    let directory = ws.config.directory();
    let tag = classify(item, &directory);
    if ctx.json {
        return print_json(&ItemJson {
            item,
            source_tag: tag,
        });
    }
    print_lines(format_item_detail(item, &tag, &directory));
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CliResult {
    let mut orch = open_orchestrator(ctx)?;
    let kind = ItemKind::parse(&args.kind)
        .ok_or_else(|| format!("unknown kind '{}' (expected: task, idea, feature)", args.kind))?;
    ensure_carried(kind, "status", args.status.is_some(), kind.has_status())?;
    ensure_carried(kind, "priority", args.priority.is_some(), kind.has_priority())?;
    ensure_carried(kind, "category", args.category.is_some(), kind.has_category())?;
    let dated = args.start.is_some() || args.end.is_some();
    ensure_carried(kind, "dates", dated, kind.has_dates())?;
    if let Some(status) = &args.status {
        ensure_status(&orch, status)?;
    }
    if let Some(priority) = &args.priority {
        ensure_priority(&orch, priority)?;
    }
    if let Some(project) = &args.project {
        ensure_project(&orch, project)?;
    }
    ensure_users(&orch, &args.assignees)?;
    ensure_date("start date", args.start.as_deref().unwrap_or(""))?;
    ensure_date("end date", args.end.as_deref().unwrap_or(""))?;

    let mut draft = ItemDraft::new(kind, args.title);
    draft.description = args.description;
    draft.status = args.status;
    draft.priority = args.priority;
    draft.assignees = args.assignees;
    draft.project = args.project.filter(|p| !p.trim().is_empty());
    draft.category = args.category;
    draft.start_date = args.start;
    draft.end_date = args.end;
    draft.linkage.deal = args.deal;
    draft.linkage.process = args.process;
    draft.linkage.content_post = args.content;
    draft.source = args.source;
    let draft = orch.new_draft(draft);

    let id = orch.create_item(draft)?;
    print_write(ctx, &id, true)
}

fn cmd_set(ctx: &Context, args: SetArgs) -> CliResult {
    let mut orch = open_orchestrator(ctx)?;
    let item = orch
        .item(&args.id)
        .ok_or_else(|| format!("item not found: {}", args.id))?
        .clone();

    // Single-choice cells go through the same picker path as the table
    let mut cells = CellEditor::default();
    let mut patch = ItemPatch::default();
    let mut pick = |kind: PickerKind, value: &str| -> CliResult {
        cells.open(&item.id, kind);
        if let Some(commit) = cells.select(value)? {
            patch.merge(commit.patch);
        }
        Ok(())
    };
    let kind = item.kind;
    ensure_carried(kind, "status", args.status.is_some(), kind.has_status())?;
    ensure_carried(kind, "priority", args.priority.is_some(), kind.has_priority())?;
    ensure_carried(kind, "category", args.category.is_some(), kind.has_category())?;
    let dated = args.due.is_some() || args.start.is_some();
    ensure_carried(kind, "dates", dated, kind.has_dates())?;
    if let Some(status) = &args.status {
        ensure_status(&orch, status)?;
        pick(PickerKind::Status, status)?;
    }
    if let Some(priority) = &args.priority {
        ensure_priority(&orch, priority)?;
        pick(PickerKind::Priority, priority)?;
    }
    if let Some(project) = &args.project {
        ensure_project(&orch, project)?;
        pick(PickerKind::Project, project)?;
    }
    if let Some(due) = &args.due {
        pick(PickerKind::DueDate, due)?;
    }

    if let Some(title) = args.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err("title cannot be empty".into());
        }
        patch.title = Some(title);
    }
    if args.unassign {
        patch.assignees = Some(Vec::new());
    } else if !args.assignees.is_empty() {
        ensure_users(&orch, &args.assignees)?;
        patch.assignees = Some(args.assignees);
    }
    if let Some(start) = &args.start {
        ensure_date("start date", start)?;
    }
    patch.start_date = clearable(args.start);
    patch.category = clearable(args.category);
    patch.description = clearable(args.description);

    if patch.is_empty() {
        return Err("nothing to change (see `wb set --help`)".into());
    }
    let changed = orch.update_item(&args.id, patch)?;
    ensure_persisted(&orch)?;
    print_write(ctx, &args.id, changed)
}

fn cmd_status(ctx: &Context, args: StatusArgs) -> CliResult {
    let mut orch = open_orchestrator(ctx)?;
    ensure_status(&orch, &args.status)?;
    let changed = orch.update_status(&args.id, &args.status)?;
    ensure_persisted(&orch)?;
    print_write(ctx, &args.id, changed)
}

fn cmd_archive(ctx: &Context, args: IdArgs) -> CliResult {
    let mut orch = open_orchestrator(ctx)?;
    orch.archive_item(&args.id)?;
    ensure_persisted(&orch)?;
    print_write(ctx, &args.id, true)
}

fn cmd_take(ctx: &Context, args: IdArgs) -> CliResult {
    let mut orch = open_orchestrator(ctx)?;
    let id = orch.take_to_work(&args.id)?;
    print_write(ctx, &id, true)
}

fn cmd_comment(ctx: &Context, args: CommentArgs) -> CliResult {
    let mut orch = open_orchestrator(ctx)?;
    orch.add_comment(&args.id, &args.text)?;
    print_write(ctx, &args.id, true)
}
