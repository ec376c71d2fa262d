use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::io::item_store::ItemStore;
use crate::io::store::{FILTER_KEY_PREFIX, KEY_HIDE_COMPLETED, KEY_VIEW_MODE, KeyValueStore, StoreError};
use crate::model::config::WorkspaceConfig;
use crate::model::directory::{Directory, User};
use crate::model::item::{ItemDraft, ItemPatch, WorkItem};
use crate::model::vocab::Vocabulary;

use super::editor::{EditorError, EditorSave, ItemEditor, new_item_defaults};
use super::filter::{CompletedVisibility, FilterState, Scope, SourceFilter, apply_filters};
use super::gantt::{self, GanttLayout};
use super::item_ops::{self, ItemError, PendingLog};
use super::kanban::{self, KanbanAction, KanbanColumn};
use super::table::{self, CellCommit, TableContext, TableError, TableRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Table,
    Kanban,
    Gantt,
}

impl ViewMode {
    pub const ALL: [ViewMode; 3] = [ViewMode::Table, ViewMode::Kanban, ViewMode::Gantt];

    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::Table => "table",
            ViewMode::Kanban => "kanban",
            ViewMode::Gantt => "gantt",
        }
    }

    pub fn parse(s: &str) -> Option<ViewMode> {
        match s {
            "table" => Some(ViewMode::Table),
            "kanban" => Some(ViewMode::Kanban),
            "gantt" => Some(ViewMode::Gantt),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Table => "Table",
            ViewMode::Kanban => "Kanban",
            ViewMode::Gantt => "Gantt",
        }
    }

    pub fn next(self) -> ViewMode {
        match self {
            ViewMode::Table => ViewMode::Kanban,
            ViewMode::Kanban => ViewMode::Gantt,
            ViewMode::Gantt => ViewMode::Table,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no current user configured (set workspace.current_user)")]
    NoCurrentUser,
}

/// The active projection of the filtered item set.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum Projection<'a> {
    Table { rows: Vec<TableRow> },
    Kanban { columns: Vec<KanbanColumn<'a>> },
    Gantt { layout: GanttLayout },
}

/// Filter keys remembered in the preference store.
const FILTER_KEYS: [&str; 7] = [
    "status", "priority", "assignee", "project", "category", "source", "search",
];

/// Owns the items, the filter state and the view mode, and routes every
/// mutation through the item store after applying it locally.
pub struct Orchestrator<S: ItemStore, K: KeyValueStore> {
    items: Vec<WorkItem>,
    config: WorkspaceConfig,
    vocab: Vocabulary,
    directory: Directory,
    filters: FilterState,
    mode: ViewMode,
    pending: PendingLog,
    store: S,
    prefs: K,
    today: NaiveDate,
    last_error: Option<String>,
}

impl<S: ItemStore, K: KeyValueStore> Orchestrator<S, K> {
    /// Restore mode and filters from `prefs`, falling back to the configured
    /// default view.
    pub fn new(config: WorkspaceConfig, items: Vec<WorkItem>, store: S, prefs: K, today: NaiveDate) -> Self {
        let mode = prefs
            .get(KEY_VIEW_MODE)
            .and_then(|m| ViewMode::parse(&m))
            .or_else(|| config.ui.default_view.as_deref().and_then(ViewMode::parse))
            .unwrap_or_default();
        let filters = restore_filters(&prefs);
        Orchestrator {
            items,
            vocab: config.vocabulary(),
            directory: config.directory(),
            config,
            filters,
            mode,
            pending: PendingLog::default(),
            store,
            prefs,
            today,
            last_error: None,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&WorkItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn current_user(&self) -> Option<&User> {
        self.config.current_user()
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn pending(&self) -> &PendingLog {
        &self.pending
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn prefs(&self) -> &K {
        &self.prefs
    }

    /// Message of the most recent failed store call, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_last_error(&mut self) {
        self.last_error = None;
    }

    // -----------------------------------------------------------------------
    // View mode and filters
    // -----------------------------------------------------------------------

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        debug!(mode = mode.as_str(), "view mode changed");
        self.persist(KEY_VIEW_MODE, Some(mode.as_str()));
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Change filters and remember them.
    pub fn update_filters(&mut self, f: impl FnOnce(&mut FilterState)) {
        f(&mut self.filters);
        self.persist_filters();
    }

    pub fn clear_filters(&mut self) {
        self.update_filters(FilterState::clear);
    }

    /// A boolean UI preference such as the theme or sidebar state.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.prefs.get_bool(key)
    }

    pub fn set_flag(&mut self, key: &str, value: bool) {
        self.persist(key, Some(if value { "true" } else { "false" }));
    }

    /// Switch between the task list and the single-kind boards. Filters
    /// reset to the new scope's defaults.
    pub fn set_scope(&mut self, scope: Scope) {
        if self.filters.scope == scope {
            return;
        }
        self.update_filters(|f| *f = FilterState::for_scope(scope));
    }

    fn persist_filters(&mut self) {
        let hide = self.filters.completed == CompletedVisibility::Hide;
        if let Err(e) = self.prefs.set_bool(KEY_HIDE_COMPLETED, hide) {
            warn!(key = KEY_HIDE_COMPLETED, error = %e, "could not save preference");
        }
        let f = self.filters.clone();
        let values = [
            f.status.as_deref(),
            f.priority.as_deref(),
            f.assignee.as_deref(),
            f.project.as_deref(),
            f.category.as_deref(),
            f.source.as_ref().map(SourceFilter::as_str),
            f.search.as_deref(),
        ];
        for (key, value) in FILTER_KEYS.iter().zip(values) {
            self.persist(&format!("{}{}", FILTER_KEY_PREFIX, key), value);
        }
    }

    fn persist(&mut self, key: &str, value: Option<&str>) {
        let result = match value {
            Some(v) => self.prefs.set(key, v),
            None => self.prefs.remove(key),
        };
        if let Err(e) = result {
            warn!(key, error = %e, "could not save preference");
        }
    }

    // -----------------------------------------------------------------------
    // Projections
    // -----------------------------------------------------------------------

    /// Items passing the current filters, in stored order.
    pub fn visible_items(&self) -> Vec<&WorkItem> {
        apply_filters(&self.items, &self.filters, &self.config.completed_statuses)
    }

    pub fn table_rows(&self) -> Vec<TableRow> {
        let ctx = TableContext {
            vocab: &self.vocab,
            directory: &self.directory,
            current_user: self.current_user(),
            today: self.today,
            show_source: self.filters.scope == Scope::Aggregator,
        };
        table::build_rows(&self.visible_items(), &ctx)
    }

    pub fn kanban_columns(&self) -> Vec<KanbanColumn<'_>> {
        kanban::columns(&self.visible_items(), &self.vocab)
    }

    pub fn gantt_layout(&self) -> GanttLayout {
        gantt::layout(
            &self.visible_items(),
            &self.directory,
            self.today,
            self.config.ui.gantt_padding_days,
        )
    }

    pub fn projection(&self) -> Projection<'_> {
        match self.mode {
            ViewMode::Table => Projection::Table {
                rows: self.table_rows(),
            },
            ViewMode::Kanban => Projection::Kanban {
                columns: self.kanban_columns(),
            },
            ViewMode::Gantt => Projection::Gantt {
                layout: self.gantt_layout(),
            },
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Apply a patch locally, then forward it. Returns whether the local
    /// item changed; a failed forward is logged and kept pending.
    pub fn update_item(&mut self, id: &str, patch: ItemPatch) -> Result<bool, ActionError> {
        if !item_ops::apply_patch(&mut self.items, id, &patch)? {
            return Ok(false);
        }
        self.pending.record(id, patch);
        self.forward(id);
        Ok(true)
    }

    /// Status change from a kanban drop. Unchanged status is a no-op.
    pub fn update_status(&mut self, id: &str, status: &str) -> Result<bool, ActionError> {
        let item = item_ops::find_item(&self.items, id)?;
        if !item.kind.has_status() {
            return Err(ItemError::NoField(item.kind, "status").into());
        }
        if item.status.as_deref() == Some(status) {
            return Ok(false);
        }
        self.update_item(id, ItemPatch::status(status))
    }

    /// Forward the merged pending patch for `id`. Earlier failed changes to
    /// the same item travel with the newest one.
    fn forward(&mut self, id: &str) {
        let Some(patch) = self.pending.get(id).cloned() else {
            return;
        };
        let result = match (&patch.status, patch_only_status(&patch)) {
            (Some(status), true) => self.store.update_status(id, status),
            _ => self.store.update_item(id, &patch),
        };
        match result {
            Ok(()) => {
                self.pending.clear(id);
                debug!(id, "change persisted");
            }
            Err(e) => {
                warn!(id, error = %e, "could not persist change, keeping it pending");
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn commit(&mut self, commit: CellCommit) -> Result<bool, ActionError> {
        if commit.patch.archived == Some(true) {
            return self.archive_item(&commit.id).map(|_| true);
        }
        self.update_item(&commit.id, commit.patch)
    }

    /// Archive, gated to admins. Applied locally first.
    pub fn archive_item(&mut self, id: &str) -> Result<(), ActionError> {
        let item = item_ops::find_item(&self.items, id)?;
        let commit = table::archive_commit(item, self.current_user())?;
        item_ops::apply_patch(&mut self.items, id, &commit.patch)?;
        match self.store.archive_item(id) {
            Ok(()) => info!(id, "archived"),
            Err(e) => {
                warn!(id, error = %e, "could not persist archive, keeping it pending");
                self.last_error = Some(e.to_string());
                self.pending.record(id, commit.patch);
            }
        }
        Ok(())
    }

    /// Create through the store. Creation needs the assigned id, so unlike
    /// updates it is not applied before the store answers.
    pub fn create_item(&mut self, draft: ItemDraft) -> Result<String, ActionError> {
        let id = self.store.create_item(draft.clone()).inspect_err(|e| {
            warn!(error = %e, "could not create item");
        })?;
        let item = item_ops::materialize_draft(draft, id.clone(), &self.vocab, Utc::now());
        self.items.push(item);
        info!(id = %id, "created item");
        Ok(id)
    }

    /// A new-item draft with the current user's defaults applied.
    pub fn new_draft(&self, draft: ItemDraft) -> ItemDraft {
        let user = self.config.workspace.current_user.as_deref();
        new_item_defaults(draft, &self.vocab, user, self.today)
    }

    /// Spawn a task from an idea or feature.
    pub fn take_to_work(&mut self, id: &str) -> Result<String, ActionError> {
        let draft = item_ops::take_to_work(item_ops::find_item(&self.items, id)?)?;
        let draft = self.new_draft(draft);
        self.create_item(draft)
    }

    pub fn add_comment(&mut self, id: &str, text: &str) -> Result<(), ActionError> {
        let user = self
            .config
            .workspace
            .current_user
            .clone()
            .ok_or(ActionError::NoCurrentUser)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(EditorError::EmptyComment.into());
        }
        let comment = item_ops::new_comment(&user, text, Utc::now());
        self.store.add_comment(id, comment.clone())?;
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| ItemError::NotFound(id.to_string()))?;
        item.comments.push(comment);
        Ok(())
    }

    /// Route a kanban gesture result. Returns the id to open, if any.
    pub fn handle_kanban(&mut self, action: KanbanAction) -> Result<Option<String>, ActionError> {
        match action {
            KanbanAction::OpenItem(id) => Ok(Some(id)),
            KanbanAction::UpdateStatus { id, status } => {
                self.update_status(&id, &status)?;
                Ok(None)
            }
            KanbanAction::Cancelled | KanbanAction::None => Ok(None),
        }
    }

    /// Save the editor and forward the result. Returns the id of the saved
    /// item. The editor stays dirty when the save is refused.
    pub fn save_editor(&mut self, editor: &mut ItemEditor) -> Result<Option<String>, ActionError> {
        let id = match editor.save()? {
            EditorSave::Create(draft) => {
                let id = self.create_item(draft)?;
                editor.bind_created(id.clone());
                Some(id)
            }
            EditorSave::Update { id, patch } => {
                self.update_item(&id, patch)?;
                Some(id)
            }
            EditorSave::Unchanged => editor.item_id().map(str::to_string),
        };
        editor.mark_saved();
        Ok(id)
    }

    /// Replace the item set after an external change, re-applying changes
    /// that have not reached the store yet.
    pub fn reload(&mut self, items: Vec<WorkItem>) {
        self.items = items;
        for (id, patch) in self.pending.iter() {
            if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
                patch.apply(item);
            }
        }
        debug!(items = self.items.len(), pending = self.pending.len(), "items reloaded");
    }

    /// Swap in a re-read configuration.
    pub fn reload_config(&mut self, config: WorkspaceConfig) {
        self.vocab = config.vocabulary();
        self.store.set_vocabulary(self.vocab.clone());
        self.directory = config.directory();
        self.config = config;
    }
}

fn patch_only_status(patch: &ItemPatch) -> bool {
    let status_only = ItemPatch {
        status: patch.status.clone(),
        ..Default::default()
    };
    *patch == status_only
}

fn restore_filters(prefs: &impl KeyValueStore) -> FilterState {
    let mut filters = FilterState::default();
    if let Some(hide) = prefs.get_bool(KEY_HIDE_COMPLETED) {
        filters.completed = if hide {
            CompletedVisibility::Hide
        } else {
            CompletedVisibility::Show
        };
    }
    let get = |key: &str| prefs.get(&format!("{}{}", FILTER_KEY_PREFIX, key));
    filters.status = get("status");
    filters.priority = get("priority");
    filters.assignee = get("assignee");
    filters.project = get("project");
    filters.category = get("category");
    filters.source = get("source").map(|s| SourceFilter::parse(&s));
    filters.search = get("search");
    filters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::item_store::{MemoryItemStore, StoreCall};
    use crate::io::store::MemoryStore;
    use crate::model::directory::{Role, User};
    use crate::model::item::ItemKind;
    use crate::model::vocab::VocabOption;
    use crate::ops::editor::CloseRequest;
    use crate::ops::kanban::{DragTracker, Point, PointerEvent};
    use crate::ops::table::{CellEditor, PickerKind};
    use pretty_assertions::assert_eq;

    fn config(admin: bool) -> WorkspaceConfig {
        let mut config = WorkspaceConfig::new("test");
        config.workspace.current_user = Some("u1".into());
        config.users = vec![User {
            id: "u1".into(),
            name: "Anna".into(),
            role: if admin { Role::Admin } else { Role::Employee },
            avatar: None,
        }];
        config
    }

    fn task(id: &str, status: &str) -> WorkItem {
        let mut item = WorkItem::new(id, ItemKind::Task, id);
        item.status = Some(status.into());
        item
    }

    fn items() -> Vec<WorkItem> {
        vec![
            task("a", "Не начато"),
            task("b", "Не начато"),
            task("c", "Выполнено"),
            WorkItem::new("idea", ItemKind::Idea, "X"),
            WorkItem::new("feature", ItemKind::Feature, "Y"),
        ]
    }

    fn orchestrator(admin: bool) -> Orchestrator<MemoryItemStore, MemoryStore> {
        Orchestrator::new(
            config(admin),
            items(),
            MemoryItemStore::new(items()),
            MemoryStore::default(),
            NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
        )
    }

    #[test]
    fn filtered_projection_hides_completed_and_other_kinds() {
        let orch = orchestrator(false);
        let ids: Vec<String> = orch.table_rows().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(matches!(orch.projection(), Projection::Table { .. }));
    }

    #[test]
    fn mode_and_filters_persist_and_restore() {
        let mut orch = orchestrator(false);
        orch.set_mode(ViewMode::Gantt);
        orch.update_filters(|f| {
            f.completed = CompletedVisibility::Show;
            f.source = Some(SourceFilter::Deal);
        });
        let prefs = orch.prefs().clone();
        assert_eq!(prefs.get(KEY_VIEW_MODE).as_deref(), Some("gantt"));

        let restored = Orchestrator::new(
            config(false),
            items(),
            MemoryItemStore::default(),
            prefs,
            orch.today(),
        );
        assert_eq!(restored.mode(), ViewMode::Gantt);
        assert_eq!(restored.filters().completed, CompletedVisibility::Show);
        assert_eq!(restored.filters().source, Some(SourceFilter::Deal));

        let mut restored = restored;
        restored.clear_filters();
        assert_eq!(restored.prefs().get("filters.source"), None);
        assert_eq!(restored.prefs().get_bool(KEY_HIDE_COMPLETED), Some(true));

        assert_eq!(restored.flag("dark_mode"), None);
        restored.set_flag("dark_mode", false);
        assert_eq!(restored.flag("dark_mode"), Some(false));
    }

    #[test]
    fn default_view_from_config() {
        let mut cfg = config(false);
        cfg.ui.default_view = Some("kanban".into());
        let orch = Orchestrator::new(
            cfg,
            vec![],
            MemoryItemStore::default(),
            MemoryStore::default(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        assert_eq!(orch.mode(), ViewMode::Kanban);
    }

    #[test]
    fn cell_commit_is_optimistic_and_forwarded() {
        let mut orch = orchestrator(false);
        let mut cells = CellEditor::default();
        cells.open("a", PickerKind::Priority);
        let commit = cells.select("Высокий").unwrap().unwrap();
        assert!(orch.commit(commit).unwrap());
        assert_eq!(orch.item("a").unwrap().priority.as_deref(), Some("Высокий"));
        assert_eq!(
            orch.store().calls,
            vec![StoreCall::UpdateItem("a".into(), ItemPatch::priority("Высокий"))]
        );
        assert!(orch.pending().is_empty());
    }

    #[test]
    fn kanban_drop_routes_to_update_status() {
        let mut orch = orchestrator(false);
        let mut tracker = DragTracker::new(orch.config().ui.drag_threshold);
        let items = orch.items().to_vec();
        tracker.handle(
            PointerEvent::Down {
                item_id: "a".into(),
                at: Point::new(0.0, 0.0),
            },
            &items,
        );
        tracker.handle(PointerEvent::Move { at: Point::new(40.0, 0.0) }, &items);
        let action = tracker.handle(
            PointerEvent::Up {
                at: Point::new(40.0, 0.0),
                column: Some("В работе".into()),
            },
            &items,
        );
        assert_eq!(orch.handle_kanban(action).unwrap(), None);
        assert_eq!(orch.item("a").unwrap().status.as_deref(), Some("В работе"));
        assert_eq!(
            orch.store().calls,
            vec![StoreCall::UpdateStatus("a".into(), "В работе".into())]
        );

        // Same column: nothing forwarded
        assert!(!orch.update_status("a", "В работе").unwrap());
        assert_eq!(orch.store().calls.len(), 1);
    }

    #[test]
    fn failed_forward_stays_pending_and_merges() {
        let mut orch = orchestrator(false);
        orch.store.reject = true;
        orch.update_item("a", ItemPatch::status("В работе")).unwrap();
        orch.update_item("a", ItemPatch::priority("Высокий")).unwrap();
        assert_eq!(orch.pending().len(), 1);
        assert!(orch.last_error().is_some());
        // Local state still shows the optimistic values
        assert_eq!(orch.item("a").unwrap().status.as_deref(), Some("В работе"));

        orch.store.reject = false;
        orch.update_item("a", ItemPatch::status("Выполнено")).unwrap();
        assert!(orch.pending().is_empty());
        let stored = orch.store().items.iter().find(|i| i.id == "a").unwrap();
        assert_eq!(stored.status.as_deref(), Some("Выполнено"));
        assert_eq!(stored.priority.as_deref(), Some("Высокий"));
    }

    #[test]
    fn reload_reapplies_pending_changes() {
        let mut orch = orchestrator(false);
        orch.store.reject = true;
        orch.update_item("b", ItemPatch::priority("Высокий")).unwrap();
        orch.reload(items());
        assert_eq!(orch.item("b").unwrap().priority.as_deref(), Some("Высокий"));
    }

    #[test]
    fn archive_requires_admin() {
        let mut orch = orchestrator(false);
        assert!(matches!(
            orch.archive_item("a"),
            Err(ActionError::Table(TableError::NotPermitted(_)))
        ));
        assert!(!orch.item("a").unwrap().archived);

        let mut orch = orchestrator(true);
        orch.archive_item("a").unwrap();
        assert!(orch.item("a").unwrap().archived);
        let ids: Vec<String> = orch.table_rows().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn editor_round_trip_through_orchestrator() {
        let mut orch = orchestrator(false);
        let mut editor = ItemEditor::open(orch.item("b").unwrap());
        editor.fields.title = "Renamed".into();
        assert_eq!(orch.save_editor(&mut editor).unwrap(), Some("b".into()));
        assert_eq!(orch.item("b").unwrap().title, "Renamed");
        assert!(!editor.has_changes());

        let draft = orch.new_draft(ItemDraft::new(ItemKind::Task, ""));
        let mut editor = ItemEditor::create(draft);
        editor.fields.title = "Fresh".into();
        let id = orch.save_editor(&mut editor).unwrap().unwrap();
        let created = orch.item(&id).unwrap();
        assert_eq!(created.title, "Fresh");
        assert_eq!(created.assignees, vec!["u1"]);
        assert_eq!(editor.item_id(), Some(id.as_str()));
    }

    #[test]
    fn refused_create_leaves_editor_dirty() {
        let mut orch = orchestrator(false);
        orch.store.reject = true;
        let draft = orch.new_draft(ItemDraft::new(ItemKind::Task, ""));
        let mut editor = ItemEditor::create(draft);
        editor.fields.title = "Important".into();

        assert!(matches!(
            orch.save_editor(&mut editor),
            Err(ActionError::Store(StoreError::Rejected(_)))
        ));
        assert!(editor.is_new());
        assert!(editor.has_changes());
        assert_eq!(editor.request_close(), CloseRequest::ConfirmSave);
        assert_eq!(orch.items().len(), 5);

        // Once the store accepts, the same editor saves and settles
        orch.store.reject = false;
        let id = orch.save_editor(&mut editor).unwrap().unwrap();
        assert_eq!(editor.item_id(), Some(id.as_str()));
        assert_eq!(editor.request_close(), CloseRequest::Close);
    }

    #[test]
    fn update_of_removed_item_leaves_editor_dirty() {
        let mut orch = orchestrator(false);
        let mut editor = ItemEditor::open(orch.item("b").unwrap());
        editor.fields.title = "Renamed".into();
        orch.reload(Vec::new());

        assert!(matches!(
            orch.save_editor(&mut editor),
            Err(ActionError::Item(ItemError::NotFound(_)))
        ));
        assert!(editor.has_changes());
        assert_eq!(editor.request_close(), CloseRequest::ConfirmSave);
    }

    #[test]
    fn ideas_take_no_status_or_dates() {
        let mut orch = orchestrator(false);
        assert!(matches!(
            orch.update_status("idea", "Выполнено"),
            Err(ActionError::Item(ItemError::NoField(ItemKind::Idea, "status")))
        ));

        let mut cells = CellEditor::default();
        cells.open("idea", PickerKind::DueDate);
        let commit = cells.select("2025-02-01").unwrap().unwrap();
        assert!(!orch.commit(commit).unwrap());

        let idea = orch.item("idea").unwrap();
        assert!(idea.status.is_none());
        assert!(idea.end_date.is_none());
        assert!(orch.store().calls.is_empty());
        assert!(orch.pending().is_empty());
    }

    #[test]
    fn reloaded_config_reaches_the_store() {
        let mut orch = orchestrator(false);
        let mut config = config(false);
        config.statuses = vec![VocabOption::new("open", "Open", "blue")];
        config.priorities = vec![VocabOption::new("p1", "Urgent", "red")];
        orch.reload_config(config);

        let id = orch.create_item(ItemDraft::new(ItemKind::Task, "Fresh")).unwrap();
        let stored = orch.store().items.iter().find(|i| i.id == id).unwrap();
        assert_eq!(stored.status.as_deref(), Some("Open"));
        assert_eq!(stored.priority.as_deref(), Some("Urgent"));
        assert_eq!(orch.item(&id).unwrap().status, stored.status);
    }

    #[test]
    fn take_to_work_and_comment() {
        let mut orch = orchestrator(false);
        let id = orch.take_to_work("idea").unwrap();
        let task = orch.item(&id).unwrap();
        assert_eq!(task.kind, ItemKind::Task);
        assert_eq!(task.title, "X");
        assert!(matches!(orch.take_to_work("a"), Err(ActionError::Item(_))));

        orch.add_comment("a", "  on it ").unwrap();
        assert_eq!(orch.item("a").unwrap().comments[0].text, "on it");
        assert!(orch.add_comment("a", " ").is_err());
    }
}
