use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::model::item::{ItemDraft, ItemKind, ItemPatch, WorkItem, parse_date};
use crate::model::vocab::Vocabulary;

/// Days between the default start and end of a new item.
pub const DEFAULT_SCHEDULE_DAYS: u64 = 7;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("invalid {field}: {value} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
    #[error("comment is empty")]
    EmptyComment,
    #[error("comments can only be added to saved items")]
    NotSaved,
}

/// Editable fields of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
    Status,
    Priority,
    Assignees,
    Project,
    Category,
    StartDate,
    EndDate,
}

impl Field {
    pub fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Description => "Description",
            Field::Status => "Status",
            Field::Priority => "Priority",
            Field::Assignees => "Assignees",
            Field::Project => "Project",
            Field::Category => "Category",
            Field::StartDate => "Start",
            Field::EndDate => "End",
        }
    }
}

const TASK_FIELDS: &[Field] = &[
    Field::Title,
    Field::Description,
    Field::Status,
    Field::Priority,
    Field::Assignees,
    Field::Project,
    Field::StartDate,
    Field::EndDate,
];

const FEATURE_FIELDS: &[Field] = &[
    Field::Title,
    Field::Description,
    Field::Status,
    Field::Assignees,
    Field::Project,
    Field::Category,
    Field::StartDate,
    Field::EndDate,
];

const IDEA_FIELDS: &[Field] = &[
    Field::Title,
    Field::Description,
    Field::Assignees,
    Field::Project,
    Field::Category,
];

/// Fields shown for a kind. Hidden fields take no part in change detection.
pub fn visible_fields(kind: ItemKind) -> &'static [Field] {
    match kind {
        ItemKind::Task => TASK_FIELDS,
        ItemKind::Feature => FEATURE_FIELDS,
        ItemKind::Idea => IDEA_FIELDS,
    }
}

/// Live form state. Text is kept as typed; comparisons trim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorFields {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub assignees: Vec<String>,
    pub project: Option<String>,
    pub category: Option<String>,
    pub start_date: String,
    pub end_date: String,
}

impl EditorFields {
    fn from_item(item: &WorkItem) -> Self {
        EditorFields {
            title: item.title.clone(),
            description: item.description.clone().unwrap_or_default(),
            status: item.status.clone().unwrap_or_default(),
            priority: item.priority.clone().unwrap_or_default(),
            assignees: item.assignee_ids().into_iter().map(str::to_string).collect(),
            project: item.project.clone(),
            category: item.category.clone(),
            start_date: item.start_date.clone().unwrap_or_default(),
            end_date: item.end_date.clone().unwrap_or_default(),
        }
    }

    fn from_draft(draft: &ItemDraft) -> Self {
        EditorFields {
            title: draft.title.clone(),
            description: draft.description.clone().unwrap_or_default(),
            status: draft.status.clone().unwrap_or_default(),
            priority: draft.priority.clone().unwrap_or_default(),
            assignees: draft.assignees.clone(),
            project: draft.project.clone(),
            category: draft.category.clone(),
            start_date: draft.start_date.clone().unwrap_or_default(),
            end_date: draft.end_date.clone().unwrap_or_default(),
        }
    }

    /// Whether `field` differs between two snapshots.
    fn differs(&self, other: &EditorFields, field: Field) -> bool {
        match field {
            Field::Title => self.title.trim() != other.title.trim(),
            Field::Description => self.description.trim() != other.description.trim(),
            Field::Status => self.status != other.status,
            Field::Priority => self.priority != other.priority,
            Field::Assignees => sorted(&self.assignees) != sorted(&other.assignees),
            Field::Project => self.project != other.project,
            Field::Category => self.category != other.category,
            Field::StartDate => self.start_date.trim() != other.start_date.trim(),
            Field::EndDate => self.end_date.trim() != other.end_date.trim(),
        }
    }
}

fn sorted(ids: &[String]) -> Vec<&str> {
    let mut ids: Vec<&str> = ids.iter().map(String::as_str).collect();
    ids.sort_unstable();
    ids
}

fn trimmed(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn checked_date(field: &'static str, value: &str) -> Result<Option<String>, EditorError> {
    match trimmed(value) {
        Some(v) if parse_date(&v).is_none() => Err(EditorError::InvalidDate { field, value: v }),
        other => Ok(other),
    }
}

/// What closing the editor should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseRequest {
    /// Nothing to lose: close right away
    Close,
    /// Ask "save changes before closing?"
    ConfirmSave,
}

/// Result of a successful save, to be forwarded to the item store.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorSave {
    Create(ItemDraft),
    Update { id: String, patch: ItemPatch },
    Unchanged,
}

#[derive(Debug, Clone)]
enum Target {
    Existing(String),
    /// Carries the fields of the draft the form does not edit (linkage, source)
    New(ItemDraft),
}

/// Modal editor for one item with baseline-snapshot dirty tracking.
#[derive(Debug, Clone)]
pub struct ItemEditor {
    kind: ItemKind,
    target: Target,
    baseline: EditorFields,
    pub fields: EditorFields,
}

impl ItemEditor {
    /// Open an existing item; the baseline is its current field values.
    pub fn open(item: &WorkItem) -> Self {
        let fields = EditorFields::from_item(item);
        ItemEditor {
            kind: item.kind,
            target: Target::Existing(item.id.clone()),
            baseline: fields.clone(),
            fields,
        }
    }

    /// Start a new item from a (defaulted) draft. Untouched, it has no changes.
    pub fn create(draft: ItemDraft) -> Self {
        let fields = EditorFields::from_draft(&draft);
        ItemEditor {
            kind: draft.kind,
            target: Target::New(draft),
            baseline: fields.clone(),
            fields,
        }
    }

    pub fn kind(&self) -> ItemKind {
        self.kind
    }

    pub fn item_id(&self) -> Option<&str> {
        match &self.target {
            Target::Existing(id) => Some(id),
            Target::New(_) => None,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self.target, Target::New(_))
    }

    pub fn visible_fields(&self) -> &'static [Field] {
        visible_fields(self.kind)
    }

    /// Visible fields whose live value differs from the baseline.
    pub fn changed_fields(&self) -> Vec<Field> {
        self.visible_fields()
            .iter()
            .copied()
            .filter(|f| self.fields.differs(&self.baseline, *f))
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        !self.changed_fields().is_empty()
    }

    /// Close button or a click outside the popup.
    pub fn request_close(&self) -> CloseRequest {
        if self.has_changes() {
            CloseRequest::ConfirmSave
        } else {
            CloseRequest::Close
        }
    }

    /// Throw away edits, restoring the baseline.
    pub fn discard(&mut self) {
        debug!(changed = self.changed_fields().len(), "editor edits discarded");
        self.fields = self.baseline.clone();
    }

    /// Validate and produce the store request. The baseline is untouched
    /// until the caller reports the store accepted it via [`Self::mark_saved`].
    pub fn save(&self) -> Result<EditorSave, EditorError> {
        let result = match &self.target {
            Target::Existing(id) => {
                let patch = self.patch()?;
                if patch.is_empty() {
                    EditorSave::Unchanged
                } else {
                    EditorSave::Update {
                        id: id.clone(),
                        patch,
                    }
                }
            }
            Target::New(base) => EditorSave::Create(self.draft(base.clone())?),
        };
        Ok(result)
    }

    /// Re-sync the baseline after the store accepted a save, so closing
    /// afterwards does not prompt again.
    pub fn mark_saved(&mut self) {
        self.baseline = self.fields.clone();
    }

    /// After the store assigns an id to a created item, further saves update it.
    pub fn bind_created(&mut self, id: String) {
        self.target = Target::Existing(id);
    }

    fn patch(&self) -> Result<ItemPatch, EditorError> {
        let mut patch = ItemPatch::default();
        for field in self.changed_fields() {
            match field {
                Field::Title => {
                    patch.title = Some(trimmed(&self.fields.title).ok_or(EditorError::EmptyTitle)?)
                }
                Field::Description => patch.description = Some(trimmed(&self.fields.description)),
                Field::Status => patch.status = trimmed(&self.fields.status),
                Field::Priority => patch.priority = trimmed(&self.fields.priority),
                Field::Assignees => patch.assignees = Some(self.fields.assignees.clone()),
                Field::Project => patch.project = Some(self.fields.project.clone()),
                Field::Category => patch.category = Some(self.fields.category.clone()),
                Field::StartDate => {
                    patch.start_date = Some(checked_date("start date", &self.fields.start_date)?)
                }
                Field::EndDate => {
                    patch.end_date = Some(checked_date("end date", &self.fields.end_date)?)
                }
            }
        }
        Ok(patch)
    }

    fn draft(&self, mut draft: ItemDraft) -> Result<ItemDraft, EditorError> {
        let f = &self.fields;
        draft.title = f.title.trim().to_string();
        draft.description = trimmed(&f.description);
        draft.assignees = f.assignees.clone();
        draft.project = f.project.clone();
        if self.kind.has_category() {
            draft.category = f.category.clone();
        }
        if self.kind.has_status() {
            draft.status = trimmed(&f.status);
        }
        if self.kind.has_priority() {
            draft.priority = trimmed(&f.priority);
        }
        if self.kind.has_dates() {
            draft.start_date = checked_date("start date", &f.start_date)?;
            draft.end_date = checked_date("end date", &f.end_date)?;
        }
        Ok(draft)
    }

    /// Validate a comment for the open item. Returns the item id and the
    /// trimmed text.
    pub fn comment(&self, text: &str) -> Result<(String, String), EditorError> {
        let id = self.item_id().ok_or(EditorError::NotSaved)?;
        let text = trimmed(text).ok_or(EditorError::EmptyComment)?;
        Ok((id.to_string(), text))
    }
}

/// Fill a (possibly pre-filled) draft with new-item defaults: the current
/// user as assignee, the first status and priority, a one-week schedule
/// starting today. Values already present are kept.
pub fn new_item_defaults(
    mut draft: ItemDraft,
    vocab: &Vocabulary,
    current_user: Option<&str>,
    today: NaiveDate,
) -> ItemDraft {
    if draft.assignees.is_empty()
        && let Some(user) = current_user
    {
        draft.assignees.push(user.to_string());
    }
    if draft.created_by.is_none() {
        draft.created_by = current_user.map(str::to_string);
    }
    if draft.kind.has_status() && draft.status.is_none() {
        draft.status = vocab.first_status().map(str::to_string);
    }
    if draft.kind.has_priority() && draft.priority.is_none() {
        draft.priority = vocab.first_priority().map(str::to_string);
    }
    if draft.kind.has_dates() {
        if draft.start_date.is_none() {
            draft.start_date = Some(today.format("%Y-%m-%d").to_string());
        }
        if draft.end_date.is_none() {
            let end = today + Days::new(DEFAULT_SCHEDULE_DAYS);
            draft.end_date = Some(end.format("%Y-%m-%d").to_string());
        }
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn task() -> WorkItem {
        let mut item = WorkItem::new("t1", ItemKind::Task, "same title");
        item.status = Some("Todo".into());
        item.priority = Some("Low".into());
        item.set_assignees(vec!["A".into(), "B".into()]);
        item.start_date = Some("2025-01-01".into());
        item.end_date = Some("2025-01-08".into());
        item
    }

    #[test]
    fn untouched_editor_closes_without_prompt() {
        let editor = ItemEditor::open(&task());
        assert!(!editor.has_changes());
        assert_eq!(editor.request_close(), CloseRequest::Close);
    }

    #[test]
    fn whitespace_only_title_edit_is_not_a_change() {
        let mut editor = ItemEditor::open(&task());
        editor.fields.title = " same title ".into();
        assert!(!editor.has_changes());
        editor.fields.title = "other".into();
        assert_eq!(editor.changed_fields(), vec![Field::Title]);
        assert_eq!(editor.request_close(), CloseRequest::ConfirmSave);
    }

    #[test]
    fn assignee_order_is_ignored() {
        let mut editor = ItemEditor::open(&task());
        editor.fields.assignees = vec!["B".into(), "A".into()];
        assert!(!editor.has_changes());
        editor.fields.assignees.pop();
        assert!(editor.has_changes());
    }

    #[test]
    fn hidden_fields_do_not_count() {
        let mut idea = WorkItem::new("i1", ItemKind::Idea, "Idea");
        idea.status = Some("Todo".into());
        let mut editor = ItemEditor::open(&idea);
        editor.fields.status = "Done".into();
        editor.fields.priority = "High".into();
        editor.fields.end_date = "2030-01-01".into();
        assert!(!editor.has_changes());

        let feature = WorkItem::new("f1", ItemKind::Feature, "Feature");
        let mut editor = ItemEditor::open(&feature);
        editor.fields.priority = "High".into();
        assert!(!editor.has_changes());
        editor.fields.status = "Done".into();
        assert!(editor.has_changes());
    }

    #[test]
    fn save_emits_diff_and_resyncs_baseline() {
        let mut editor = ItemEditor::open(&task());
        editor.fields.title = "  New title ".into();
        editor.fields.project = Some("p1".into());
        let saved = editor.save().unwrap();
        // Still dirty until the store accepts the change
        assert!(editor.has_changes());
        assert_eq!(editor.request_close(), CloseRequest::ConfirmSave);
        editor.mark_saved();
        let mut expected = ItemPatch::project(Some("p1".into()));
        expected.title = Some("New title".into());
        assert_eq!(
            saved,
            EditorSave::Update {
                id: "t1".into(),
                patch: expected
            }
        );
        assert!(!editor.has_changes());
        assert_eq!(editor.request_close(), CloseRequest::Close);
        assert_eq!(editor.save().unwrap(), EditorSave::Unchanged);
    }

    #[test]
    fn save_validates() {
        let mut editor = ItemEditor::open(&task());
        editor.fields.title = "   ".into();
        assert!(matches!(editor.save(), Err(EditorError::EmptyTitle)));
        assert!(editor.has_changes());

        editor.fields.title = "ok".into();
        editor.fields.end_date = "tomorrow".into();
        assert!(matches!(editor.save(), Err(EditorError::InvalidDate { .. })));

        editor.fields.end_date = String::new();
        let EditorSave::Update { patch, .. } = editor.save().unwrap() else {
            panic!("expected update");
        };
        assert_eq!(patch.end_date, Some(None));
    }

    #[test]
    fn discard_restores_baseline() {
        let mut editor = ItemEditor::open(&task());
        editor.fields.title = "changed".into();
        editor.discard();
        assert_eq!(editor.fields.title, "same title");
        assert!(!editor.has_changes());
    }

    #[test]
    fn new_item_defaults_fill_missing_fields() {
        let vocab = Vocabulary::default();
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let draft = new_item_defaults(ItemDraft::new(ItemKind::Task, ""), &vocab, Some("u1"), today);
        assert_eq!(draft.assignees, vec!["u1"]);
        assert_eq!(draft.status.as_deref(), Some("Не начато"));
        assert_eq!(draft.priority.as_deref(), Some("Низкий"));
        assert_eq!(draft.start_date.as_deref(), Some("2025-03-01"));
        assert_eq!(draft.end_date.as_deref(), Some("2025-03-08"));

        let mut prefilled = ItemDraft::new(ItemKind::Idea, "Idea");
        prefilled.assignees = vec!["u9".into()];
        let draft = new_item_defaults(prefilled, &vocab, Some("u1"), today);
        assert_eq!(draft.assignees, vec!["u9"]);
        assert!(draft.status.is_none());
        assert!(draft.start_date.is_none());
    }

    #[test]
    fn new_item_save_returns_draft() {
        let vocab = Vocabulary::default();
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut base = ItemDraft::new(ItemKind::Task, "");
        base.linkage.deal = Some("d1".into());
        let mut editor = ItemEditor::create(new_item_defaults(base, &vocab, Some("u1"), today));
        assert!(editor.is_new());
        assert!(!editor.has_changes());

        editor.fields.title = " Call the client ".into();
        let EditorSave::Create(draft) = editor.save().unwrap() else {
            panic!("expected create");
        };
        assert_eq!(draft.title, "Call the client");
        assert_eq!(draft.linkage.deal.as_deref(), Some("d1"));
        assert_eq!(draft.status.as_deref(), Some("Не начато"));
        assert!(editor.has_changes());

        editor.mark_saved();
        editor.bind_created("task-1".into());
        assert!(!editor.has_changes());
        assert_eq!(editor.item_id(), Some("task-1"));
    }

    #[test]
    fn comments_need_saved_item_and_text() {
        let editor = ItemEditor::create(ItemDraft::new(ItemKind::Task, ""));
        assert!(matches!(editor.comment("hi"), Err(EditorError::NotSaved)));
        let editor = ItemEditor::open(&task());
        assert!(matches!(editor.comment("   "), Err(EditorError::EmptyComment)));
        assert_eq!(editor.comment(" hi ").unwrap(), ("t1".into(), "hi".into()));
    }
}
