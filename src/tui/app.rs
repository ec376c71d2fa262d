use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::io::item_store::{FileItemStore, ItemStore};
use crate::io::store::{JsonFileStore, KEY_DARK_MODE, KEY_SIDEBAR_COLLAPSED, KeyValueStore};
use crate::io::watcher::{BoardEvent, BoardWatcher};
use crate::io::workspace_io::{self, LOG_FILE};
use crate::model::item::{ItemDraft, ItemKind, WorkItem};
use crate::ops::editor::{CloseRequest, Field, ItemEditor};
use crate::ops::filter::{Scope, SourceFilter, unique_sources};
use crate::ops::item_ops::ItemError;
use crate::ops::kanban::{self, DragTracker, KanbanAction, PointerEvent};
use crate::ops::orchestrator::{ActionError, Orchestrator, ViewMode};
use crate::ops::table::{CellEditor, NO_PROJECT_LABEL, PickerKind};

use super::input;
use super::render;
use super::theme::Theme;

/// The orchestrator as hosted by the TUI. Stores are boxed so tests can
/// swap in the in-memory ones.
pub type BoardOrchestrator = Orchestrator<Box<dyn ItemStore>, Box<dyn KeyValueStore>>;

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// A table cell picker is open
    Picker,
    /// Typing a due date for the selected row
    DueInput,
    /// Filter panel has focus
    Filter,
    Editor,
    /// "Save changes?" prompt over the editor
    ConfirmClose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct PickerState {
    pub item_id: String,
    pub kind: PickerKind,
    pub options: Vec<PickerOption>,
    pub cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRow {
    Status,
    Priority,
    Assignee,
    Project,
    Source,
    Completed,
}

impl FilterRow {
    pub const ALL: [FilterRow; 6] = [
        FilterRow::Status,
        FilterRow::Priority,
        FilterRow::Assignee,
        FilterRow::Project,
        FilterRow::Source,
        FilterRow::Completed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterRow::Status => "Status",
            FilterRow::Priority => "Priority",
            FilterRow::Assignee => "Assignee",
            FilterRow::Project => "Project",
            FilterRow::Source => "Source",
            FilterRow::Completed => "Completed",
        }
    }
}

/// One focusable row of the editor popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorRow {
    Field(Field),
    /// New-comment input, existing items only
    Comment,
}

#[derive(Debug, Clone)]
pub struct EditorState {
    pub editor: ItemEditor,
    pub cursor: usize,
    /// Highlighted user in the assignee row
    pub assignee_cursor: usize,
    pub comment: String,
}

impl EditorState {
    pub fn new(editor: ItemEditor) -> Self {
        EditorState {
            editor,
            cursor: 0,
            assignee_cursor: 0,
            comment: String::new(),
        }
    }

    pub fn rows(&self) -> Vec<EditorRow> {
        let mut rows: Vec<EditorRow> = self
            .editor
            .visible_fields()
            .iter()
            .map(|f| EditorRow::Field(*f))
            .collect();
        if !self.editor.is_new() {
            rows.push(EditorRow::Comment);
        }
        rows
    }

    pub fn current_row(&self) -> Option<EditorRow> {
        self.rows().get(self.cursor).copied()
    }
}

/// Main application state
pub struct App {
    pub orch: BoardOrchestrator,
    pub mode: Mode,
    pub should_quit: bool,
    pub theme: Theme,
    pub dark_mode: bool,
    /// Detail pane beside the table and kanban views
    pub sidebar: bool,
    pub workspace_name: String,
    /// Cursor row in the table view
    pub table_cursor: usize,
    pub kanban_col: usize,
    pub kanban_row: usize,
    /// First visible gantt row
    pub gantt_scroll: usize,
    pub cells: CellEditor,
    pub picker: Option<PickerState>,
    pub due_input: String,
    pub filter_cursor: usize,
    pub drag: DragTracker,
    pub editor: Option<EditorState>,
    /// One-line feedback shown in the status row
    pub message: Option<String>,
}

impl App {
    pub fn new(orch: BoardOrchestrator) -> Self {
        let dark_mode = orch.flag(KEY_DARK_MODE).unwrap_or(true);
        let sidebar = !orch.flag(KEY_SIDEBAR_COLLAPSED).unwrap_or(true);
        let theme = Theme::from_config(&orch.config().ui, dark_mode);
        let drag = DragTracker::new(orch.config().ui.drag_threshold);
        let workspace_name = orch.config().workspace.name.clone();
        App {
            orch,
            mode: Mode::Navigate,
            should_quit: false,
            theme,
            dark_mode,
            sidebar,
            workspace_name,
            table_cursor: 0,
            kanban_col: 0,
            kanban_row: 0,
            gantt_scroll: 0,
            cells: CellEditor::default(),
            picker: None,
            due_input: String::new(),
            filter_cursor: 0,
            drag,
            editor: None,
            message: None,
        }
    }

    /// Show an action failure in the status row.
    pub fn report<T>(&mut self, result: Result<T, ActionError>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.message = Some(e.to_string());
                None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Selection
    // -----------------------------------------------------------------------

    pub fn table_ids(&self) -> Vec<String> {
        self.orch.visible_items().iter().map(|i| i.id.clone()).collect()
    }

    pub fn clamp_cursors(&mut self) {
        let rows = self.orch.visible_items().len();
        self.table_cursor = self.table_cursor.min(rows.saturating_sub(1));
        let columns = self.orch.kanban_columns();
        self.kanban_col = self.kanban_col.min(columns.len().saturating_sub(1));
        let cards = columns.get(self.kanban_col).map_or(0, |c| c.items.len());
        self.kanban_row = self.kanban_row.min(cards.saturating_sub(1));
    }

    /// Id of the item under the cursor in the current view.
    pub fn selected_id(&self) -> Option<String> {
        match self.orch.mode() {
            ViewMode::Table => self.table_ids().get(self.table_cursor).cloned(),
            ViewMode::Kanban => self
                .orch
                .kanban_columns()
                .get(self.kanban_col)
                .and_then(|c| c.items.get(self.kanban_row))
                .map(|i| i.id.clone()),
            ViewMode::Gantt => None,
        }
    }

    pub fn selected_item(&self) -> Option<&WorkItem> {
        self.selected_id().and_then(|id| self.orch.item(&id))
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.theme = Theme::from_config(&self.orch.config().ui, self.dark_mode);
        self.orch.set_flag(KEY_DARK_MODE, self.dark_mode);
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar = !self.sidebar;
        self.orch.set_flag(KEY_SIDEBAR_COLLAPSED, !self.sidebar);
    }

    pub fn set_view(&mut self, mode: ViewMode) {
        self.orch.set_mode(mode);
        self.clamp_cursors();
    }

    /// Task list, then the idea backlog, then the feature board.
    pub fn cycle_scope(&mut self) {
        let next = match self.orch.filters().scope {
            Scope::Aggregator => Scope::Kind(ItemKind::Idea),
            Scope::Kind(ItemKind::Idea) => Scope::Kind(ItemKind::Feature),
            Scope::Kind(_) => Scope::Aggregator,
        };
        self.orch.set_scope(next);
        self.table_cursor = 0;
        self.kanban_col = 0;
        self.kanban_row = 0;
        self.gantt_scroll = 0;
    }

    /// Spawn a task from the selected idea or feature.
    pub fn take_selected(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        if item.kind == ItemKind::Task {
            return;
        }
        let id = item.id.clone();
        let result = self.orch.take_to_work(&id);
        if let Some(task_id) = self.report(result) {
            self.message = Some(format!("created {} from {}", task_id, id));
        }
    }

    // -----------------------------------------------------------------------
    // Table pickers
    // -----------------------------------------------------------------------

    fn picker_options(&self, kind: PickerKind) -> Vec<PickerOption> {
        let option = |value: &str, label: &str| PickerOption {
            value: value.to_string(),
            label: label.to_string(),
        };
        match kind {
            PickerKind::Status => self
                .orch
                .vocab()
                .statuses
                .iter()
                .map(|s| option(&s.name, &s.name))
                .collect(),
            PickerKind::Priority => self
                .orch
                .vocab()
                .priorities
                .iter()
                .map(|p| option(&p.name, &p.name))
                .collect(),
            PickerKind::Project => std::iter::once(option("", NO_PROJECT_LABEL))
                .chain(
                    self.orch
                        .directory()
                        .projects
                        .iter()
                        .map(|p| option(&p.id, &p.name)),
                )
                .collect(),
            PickerKind::Assignee => self
                .orch
                .directory()
                .users
                .iter()
                .map(|u| option(&u.id, &u.name))
                .collect(),
            PickerKind::DueDate => Vec::new(),
        }
    }

    /// Open a picker on the selected row. Any other open picker closes.
    pub fn open_picker(&mut self, kind: PickerKind) {
        let Some(item) = self.selected_item().cloned() else {
            return;
        };
        let (field, carried) = match kind {
            PickerKind::Status => ("status", item.kind.has_status()),
            PickerKind::Priority => ("priority", item.kind.has_priority()),
            PickerKind::DueDate => ("dates", item.kind.has_dates()),
            _ => ("", true),
        };
        if !carried {
            self.message = Some(ItemError::NoField(item.kind, field).to_string());
            return;
        }
        if kind == PickerKind::DueDate {
            self.cells.open(&item.id, kind);
            self.picker = None;
            self.due_input = item.end_date.clone().unwrap_or_default();
            self.mode = Mode::DueInput;
            return;
        }
        let options = self.picker_options(kind);
        let current = match kind {
            PickerKind::Status => item.status.clone(),
            PickerKind::Priority => item.priority.clone(),
            PickerKind::Project => Some(item.project.clone().unwrap_or_default()),
            _ => None,
        };
        let cursor = current
            .and_then(|c| options.iter().position(|o| o.value == c))
            .unwrap_or(0);
        self.cells.open(&item.id, kind);
        self.picker = Some(PickerState {
            item_id: item.id,
            kind,
            options,
            cursor,
        });
        self.mode = Mode::Picker;
    }

    /// Enter on the highlighted option. Single-choice pickers commit and
    /// close; the assignee picker toggles and stays open.
    pub fn picker_choose(&mut self) {
        let Some(picker) = self.picker.clone() else {
            return;
        };
        let Some(option) = picker.options.get(picker.cursor) else {
            return;
        };
        if picker.kind == PickerKind::Assignee {
            let commit = self
                .orch
                .item(&picker.item_id)
                .and_then(|item| self.cells.toggle_assignee(item, &option.value));
            if let Some(commit) = commit {
                let result = self.orch.commit(commit);
                self.report(result);
            }
            return;
        }
        match self.cells.select(&option.value) {
            Ok(Some(commit)) => {
                let result = self.orch.commit(commit);
                self.report(result);
            }
            Ok(None) => {}
            Err(e) => self.message = Some(e.to_string()),
        }
        self.picker = None;
        self.mode = Mode::Navigate;
    }

    /// Esc or click outside: close with no commit.
    pub fn dismiss_picker(&mut self) {
        self.cells.dismiss();
        self.picker = None;
        self.due_input.clear();
        self.mode = Mode::Navigate;
    }

    pub fn commit_due_date(&mut self) {
        match self.cells.select(&self.due_input) {
            Ok(Some(commit)) => {
                let result = self.orch.commit(commit);
                self.report(result);
                self.due_input.clear();
                self.mode = Mode::Navigate;
            }
            Ok(None) => self.dismiss_picker(),
            // Keep the input open so the date can be fixed
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    pub fn archive_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let result = self.orch.archive_item(&id);
        if self.report(result).is_some() {
            self.message = Some(format!("archived {}", id));
            self.clamp_cursors();
        }
    }

    // -----------------------------------------------------------------------
    // Kanban
    // -----------------------------------------------------------------------

    /// Keyboard equivalent of dropping the card on the neighbouring column.
    pub fn move_card(&mut self, step: isize) {
        let Some(item) = self.selected_item().cloned() else {
            return;
        };
        let Some(current) = item.status.as_deref() else {
            return;
        };
        let Some(target) = kanban::adjacent_status(self.orch.vocab(), current, step).map(str::to_string)
        else {
            return;
        };
        let result = self.orch.update_status(&item.id, &target);
        if self.report(result).is_some() {
            self.kanban_col = self.kanban_col.saturating_add_signed(step);
            let columns = self.orch.kanban_columns();
            if let Some(row) = columns
                .get(self.kanban_col)
                .and_then(|c| c.items.iter().position(|i| i.id == item.id))
            {
                self.kanban_row = row;
            }
            self.clamp_cursors();
        }
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        let action = self.drag.handle(event, self.orch.items());
        if action == KanbanAction::Cancelled {
            self.message = Some("drop cancelled".into());
        }
        let result = self.orch.handle_kanban(action);
        if let Some(Some(id)) = self.report(result) {
            self.open_editor(&id);
        }
        self.clamp_cursors();
    }

    // -----------------------------------------------------------------------
    // Editor
    // -----------------------------------------------------------------------

    pub fn open_editor(&mut self, id: &str) {
        if let Some(item) = self.orch.item(id) {
            self.editor = Some(EditorState::new(ItemEditor::open(item)));
            self.mode = Mode::Editor;
        }
    }

    /// Editor in "new" mode for the current scope's kind, optionally
    /// pre-filled with a kanban column status.
    pub fn new_item(&mut self, status: Option<&str>) {
        let kind = match self.orch.filters().scope {
            Scope::Aggregator => ItemKind::Task,
            Scope::Kind(kind) => kind,
        };
        let mut draft = self.orch.new_draft(ItemDraft::new(kind, ""));
        if let Some(status) = status {
            draft = kanban::column_draft(draft, status);
        }
        self.editor = Some(EditorState::new(ItemEditor::create(draft)));
        self.mode = Mode::Editor;
    }

    /// Save the open editor. Returns whether it succeeded.
    pub fn save_editor(&mut self) -> bool {
        let Some(mut state) = self.editor.take() else {
            return false;
        };
        let result = self.orch.save_editor(&mut state.editor);
        let saved = match self.report(result) {
            Some(id) => {
                if let Some(id) = id {
                    self.message = Some(format!("saved {}", id));
                }
                true
            }
            None => false,
        };
        self.editor = Some(state);
        self.clamp_cursors();
        saved
    }

    /// Close button, Esc or a click outside the popup.
    pub fn request_close_editor(&mut self) {
        let Some(state) = &self.editor else {
            return;
        };
        match state.editor.request_close() {
            CloseRequest::Close => self.close_editor(),
            CloseRequest::ConfirmSave => self.mode = Mode::ConfirmClose,
        }
    }

    /// Answer to the "save changes?" prompt.
    pub fn confirm_close(&mut self, save: bool) {
        if save {
            if self.save_editor() {
                self.close_editor();
            } else {
                self.mode = Mode::Editor;
            }
        } else {
            if let Some(state) = &mut self.editor {
                state.editor.discard();
            }
            self.close_editor();
        }
    }

    fn close_editor(&mut self) {
        self.editor = None;
        self.mode = Mode::Navigate;
    }

    pub fn post_comment(&mut self) {
        let Some(state) = &self.editor else {
            return;
        };
        let checked = state.editor.comment(&state.comment);
        let (id, text) = match checked {
            Ok(pair) => pair,
            Err(e) => {
                self.message = Some(e.to_string());
                return;
            }
        };
        let result = self.orch.add_comment(&id, &text);
        if self.report(result).is_some()
            && let Some(state) = &mut self.editor
        {
            state.comment.clear();
            self.message = Some("comment added".into());
        }
    }

    // -----------------------------------------------------------------------
    // Filters
    // -----------------------------------------------------------------------

    /// `None` first, then every selectable value of the row.
    pub fn filter_values(&self, row: FilterRow) -> Vec<Option<String>> {
        let values: Vec<String> = match row {
            FilterRow::Status => self.orch.vocab().statuses.iter().map(|s| s.name.clone()).collect(),
            FilterRow::Priority => self.orch.vocab().priorities.iter().map(|p| p.name.clone()).collect(),
            FilterRow::Assignee => self.orch.directory().users.iter().map(|u| u.id.clone()).collect(),
            FilterRow::Project => self.orch.directory().projects.iter().map(|p| p.id.clone()).collect(),
            FilterRow::Source => ["deal", "process", "content", "backlog", "functionality", "task"]
                .into_iter()
                .map(str::to_string)
                .chain(unique_sources(self.orch.items()))
                .collect(),
            FilterRow::Completed => return vec![None],
        };
        std::iter::once(None).chain(values.into_iter().map(Some)).collect()
    }

    pub fn filter_value(&self, row: FilterRow) -> Option<String> {
        let f = self.orch.filters();
        match row {
            FilterRow::Status => f.status.clone(),
            FilterRow::Priority => f.priority.clone(),
            FilterRow::Assignee => f.assignee.clone(),
            FilterRow::Project => f.project.clone(),
            FilterRow::Source => f.source.as_ref().map(|s| s.as_str().to_string()),
            FilterRow::Completed => Some(f.completed.as_str().to_string()),
        }
    }

    /// Step a filter row through its values.
    pub fn cycle_filter(&mut self, row: FilterRow, step: isize) {
        if row == FilterRow::Completed {
            self.orch.update_filters(|f| f.completed = f.completed.toggled());
            self.clamp_cursors();
            return;
        }
        let values = self.filter_values(row);
        let current = self.filter_value(row);
        let index = values.iter().position(|v| *v == current).unwrap_or(0) as isize;
        let next = (index + step).rem_euclid(values.len() as isize) as usize;
        let value = values[next].clone();
        self.orch.update_filters(|f| match row {
            FilterRow::Status => f.status = value,
            FilterRow::Priority => f.priority = value,
            FilterRow::Assignee => f.assignee = value,
            FilterRow::Project => f.project = value,
            FilterRow::Source => f.source = value.as_deref().map(SourceFilter::parse),
            FilterRow::Completed => {}
        });
        self.clamp_cursors();
    }

    pub fn clear_filters(&mut self) {
        self.orch.clear_filters();
        self.clamp_cursors();
    }

    // -----------------------------------------------------------------------
    // External changes
    // -----------------------------------------------------------------------

    pub fn apply_board_event(&mut self, event: BoardEvent, board_dir: &Path) {
        match event {
            BoardEvent::ItemsChanged => match workspace_io::read_items(board_dir) {
                Ok(items) => self.orch.reload(items),
                Err(e) => warn!(error = %e, "could not reload items"),
            },
            BoardEvent::ConfigChanged => match workspace_io::read_config(board_dir) {
                Ok(config) => {
                    self.theme = Theme::from_config(&config.ui, self.dark_mode);
                    self.workspace_name = config.workspace.name.clone();
                    self.orch.reload_config(config);
                }
                Err(e) => {
                    warn!(error = %e, "could not reload config");
                    self.message = Some(e.to_string());
                }
            },
        }
        self.clamp_cursors();
    }
}

/// Log to `.workboard/workboard.log`; the terminal belongs to the UI.
fn init_file_logging(board_dir: &Path) {
    let path = board_dir.join(LOG_FILE);
    let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let filter = EnvFilter::try_from_env("WORKBOARD_LOG")
        .unwrap_or_else(|_| EnvFilter::new("workboard=info"));
    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .try_init();
}

/// Run the TUI application
pub fn run(dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let start = match dir {
        Some(d) => std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?,
        None => std::env::current_dir()?,
    };
    let root = workspace_io::discover_workspace(&start)?;
    let board_dir: PathBuf = workspace_io::board_dir(&root);
    init_file_logging(&board_dir);
    let ws = workspace_io::load_workspace(&root)?;

    let store: Box<dyn ItemStore> = Box::new(FileItemStore::new(&board_dir, ws.config.vocabulary()));
    let prefs: Box<dyn KeyValueStore> = Box::new(JsonFileStore::open(&board_dir));
    let orch = Orchestrator::new(ws.config, ws.items, store, prefs, Local::now().date_naive());
    let mut app = App::new(orch);

    let watcher = match BoardWatcher::start(&board_dir) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!(error = %e, "file watcher unavailable, external edits will not show");
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    info!(root = %root.display(), "tui started");
    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref(), &board_dir);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if !app.orch.pending().is_empty() {
        warn!(pending = app.orch.pending().len(), "exiting with unsaved changes");
    }
    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&BoardWatcher>,
    board_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => input::handle_key(app, key),
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    input::handle_mouse(app, mouse, Rect::new(0, 0, size.width, size.height));
                }
                _ => {}
            }
        }

        if let Some(watcher) = watcher {
            for event in watcher.poll() {
                app.apply_board_event(event, board_dir);
            }
        }
        app.orch.set_today(Local::now().date_naive());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
