use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which family a work item belongs to. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    #[default]
    Task,
    Idea,
    Feature,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Idea => "idea",
            ItemKind::Feature => "feature",
        }
    }

    pub fn parse(s: &str) -> Option<ItemKind> {
        match s {
            "task" => Some(ItemKind::Task),
            "idea" => Some(ItemKind::Idea),
            "feature" => Some(ItemKind::Feature),
            _ => None,
        }
    }

    /// Tasks and features carry a status; ideas do not.
    pub fn has_status(self) -> bool {
        !matches!(self, ItemKind::Idea)
    }

    /// Only plain tasks carry a priority.
    pub fn has_priority(self) -> bool {
        matches!(self, ItemKind::Task)
    }

    /// Ideas have no schedule.
    pub fn has_dates(self) -> bool {
        !matches!(self, ItemKind::Idea)
    }

    /// Board grouping key for features and ideas.
    pub fn has_category(self) -> bool {
        !matches!(self, ItemKind::Task)
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural links to the entity an item originated from.
///
/// Several links may be set at once; classification picks one by precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linkage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_post: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_request: Option<String>,
}

impl Linkage {
    pub fn is_empty(&self) -> bool {
        self.deal.is_none()
            && self.process.is_none()
            && self.content_post.is_none()
            && self.purchase_request.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// The unified work item: tasks, ideas and features share one record shape
/// and the `kind` tag decides which optional fields are meaningful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    #[serde(default)]
    pub kind: ItemKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Ordered assignee set. The first entry mirrors `assignee`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    /// Legacy single-assignee field kept in sync with `assignees[0]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Raw `YYYY-MM-DD` (or RFC 3339) strings; may be unparseable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Linkage::is_empty")]
    pub linkage: Linkage,
    /// Legacy free-text origin label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl WorkItem {
    pub fn new(id: impl Into<String>, kind: ItemKind, title: impl Into<String>) -> Self {
        WorkItem {
            id: id.into(),
            kind,
            title: title.into(),
            description: None,
            status: None,
            priority: None,
            assignees: Vec::new(),
            assignee: None,
            project: None,
            category: None,
            start_date: None,
            end_date: None,
            linkage: Linkage::default(),
            source: None,
            archived: false,
            attachments: Vec::new(),
            comments: Vec::new(),
            created_at: None,
            created_by: None,
        }
    }

    /// Replace the assignee set, keeping the legacy primary field in sync.
    pub fn set_assignees(&mut self, assignees: Vec<String>) {
        let mut seen = Vec::with_capacity(assignees.len());
        for a in assignees {
            if !seen.contains(&a) {
                seen.push(a);
            }
        }
        self.assignee = seen.first().cloned();
        self.assignees = seen;
    }

    /// Current assignee set, honouring items that only carry the legacy field.
    pub fn assignee_ids(&self) -> Vec<&str> {
        if !self.assignees.is_empty() {
            self.assignees.iter().map(String::as_str).collect()
        } else {
            self.assignee.as_deref().into_iter().collect()
        }
    }

    pub fn primary_assignee(&self) -> Option<&str> {
        self.assignee_ids().first().copied()
    }

    pub fn has_assignee(&self, user_id: &str) -> bool {
        self.assignee.as_deref() == Some(user_id) || self.assignees.iter().any(|a| a == user_id)
    }

    /// Restore the assignee invariant on records written by older clients.
    pub fn normalize(&mut self) {
        if self.assignees.is_empty() {
            if let Some(a) = self.assignee.clone() {
                self.assignees.push(a);
            }
        } else {
            self.assignee = self.assignees.first().cloned();
        }
    }

    /// Both schedule bounds, when present and non-empty.
    pub fn date_bounds(&self) -> Option<(&str, &str)> {
        let start = self.start_date.as_deref().filter(|s| !s.trim().is_empty())?;
        let end = self.end_date.as_deref().filter(|s| !s.trim().is_empty())?;
        Some((start, end))
    }

    /// The due date (end of the schedule), parsed.
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.end_date.as_deref().and_then(parse_date)
    }
}

/// Parse a stored date. Accepts `YYYY-MM-DD` and full RFC 3339 timestamps.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Fields a caller may change on an existing item in one request.
///
/// `None` leaves a field alone. For clearable fields the inner `Option`
/// carries the new value, `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignees: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl ItemPatch {
    pub fn status(status: impl Into<String>) -> Self {
        ItemPatch {
            status: Some(status.into()),
            ..Default::default()
        }
    }

    pub fn priority(priority: impl Into<String>) -> Self {
        ItemPatch {
            priority: Some(priority.into()),
            ..Default::default()
        }
    }

    pub fn assignees(assignees: Vec<String>) -> Self {
        ItemPatch {
            assignees: Some(assignees),
            ..Default::default()
        }
    }

    pub fn project(project: Option<String>) -> Self {
        ItemPatch {
            project: Some(project),
            ..Default::default()
        }
    }

    pub fn end_date(date: Option<String>) -> Self {
        ItemPatch {
            end_date: Some(date),
            ..Default::default()
        }
    }

    pub fn archive() -> Self {
        ItemPatch {
            archived: Some(true),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == ItemPatch::default()
    }

    /// Apply to an item. Returns true if any field actually changed.
    /// Fields the item's kind does not carry are ignored.
    pub fn apply(&self, item: &mut WorkItem) -> bool {
        let before = item.clone();
        let kind = item.kind;
        if let Some(title) = &self.title {
            item.title = title.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(status) = self.status.as_ref().filter(|_| kind.has_status()) {
            item.status = Some(status.clone());
        }
        if let Some(priority) = self.priority.as_ref().filter(|_| kind.has_priority()) {
            item.priority = Some(priority.clone());
        }
        if let Some(assignees) = &self.assignees {
            item.set_assignees(assignees.clone());
        }
        if let Some(project) = &self.project {
            item.project = project.clone();
        }
        if let Some(category) = self.category.as_ref().filter(|_| kind.has_category()) {
            item.category = category.clone();
        }
        if let Some(start) = self.start_date.as_ref().filter(|_| kind.has_dates()) {
            item.start_date = start.clone();
        }
        if let Some(end) = self.end_date.as_ref().filter(|_| kind.has_dates()) {
            item.end_date = end.clone();
        }
        if let Some(archived) = self.archived {
            item.archived = archived;
        }
        *item != before
    }

    /// Fold a later patch into this one; fields set by `later` win.
    pub fn merge(&mut self, later: ItemPatch) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if later.$field.is_some() {
                    self.$field = later.$field;
                })*
            };
        }
        take!(
            title,
            description,
            status,
            priority,
            assignees,
            project,
            category,
            start_date,
            end_date,
            archived
        );
    }
}

/// A new item before the store has assigned it an id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    #[serde(default)]
    pub kind: ItemKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Linkage::is_empty")]
    pub linkage: Linkage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl ItemDraft {
    pub fn new(kind: ItemKind, title: impl Into<String>) -> Self {
        ItemDraft {
            kind,
            title: title.into(),
            ..Default::default()
        }
    }

    /// Materialise the draft under an assigned id. Fields that the kind does
    /// not carry are dropped.
    pub fn into_item(self, id: String, created_at: DateTime<Utc>) -> WorkItem {
        let mut item = WorkItem::new(id, self.kind, self.title);
        item.description = self.description;
        item.status = self.status.filter(|_| self.kind.has_status());
        item.priority = self.priority.filter(|_| self.kind.has_priority());
        item.set_assignees(self.assignees);
        item.project = self.project;
        item.category = self.category.filter(|_| self.kind.has_category());
        if self.kind.has_dates() {
            item.start_date = self.start_date;
            item.end_date = self.end_date;
        }
        item.linkage = self.linkage;
        item.source = self.source;
        item.created_at = Some(created_at);
        item.created_by = self.created_by;
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_assignees_keeps_primary_in_sync() {
        let mut item = WorkItem::new("t1", ItemKind::Task, "Title");
        item.set_assignees(vec!["u2".into(), "u1".into(), "u2".into()]);
        assert_eq!(item.assignees, vec!["u2", "u1"]);
        assert_eq!(item.assignee.as_deref(), Some("u2"));

        item.set_assignees(Vec::new());
        assert!(item.assignee.is_none());
    }

    #[test]
    fn normalize_promotes_legacy_assignee() {
        let mut item = WorkItem::new("t1", ItemKind::Task, "Title");
        item.assignee = Some("u1".into());
        item.normalize();
        assert_eq!(item.assignees, vec!["u1"]);

        item.assignees = vec!["u3".into(), "u1".into()];
        item.normalize();
        assert_eq!(item.assignee.as_deref(), Some("u3"));
    }

    #[test]
    fn has_assignee_checks_both_fields() {
        let mut item = WorkItem::new("t1", ItemKind::Task, "Title");
        item.assignee = Some("legacy".into());
        assert!(item.has_assignee("legacy"));
        item.assignees = vec!["u1".into(), "u2".into()];
        assert!(item.has_assignee("u2"));
        assert!(!item.has_assignee("u9"));
    }

    #[test]
    fn parse_date_formats() {
        assert_eq!(
            parse_date("2025-03-04"),
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
        assert_eq!(
            parse_date("2025-03-04T10:00:00Z"),
            NaiveDate::from_ymd_opt(2025, 3, 4)
        );
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("next week"), None);
    }

    #[test]
    fn date_bounds_requires_both() {
        let mut item = WorkItem::new("t1", ItemKind::Task, "Title");
        item.start_date = Some("2025-01-01".into());
        assert!(item.date_bounds().is_none());
        item.end_date = Some("  ".into());
        assert!(item.date_bounds().is_none());
        item.end_date = Some("2025-01-05".into());
        assert_eq!(item.date_bounds(), Some(("2025-01-01", "2025-01-05")));
    }

    #[test]
    fn patch_apply_reports_change() {
        let mut item = WorkItem::new("t1", ItemKind::Task, "Title");
        item.status = Some("Todo".into());
        assert!(!ItemPatch::status("Todo").apply(&mut item));
        assert!(ItemPatch::status("Done").apply(&mut item));
        assert_eq!(item.status.as_deref(), Some("Done"));

        assert!(ItemPatch::project(Some("p1".into())).apply(&mut item));
        assert!(ItemPatch::project(None).apply(&mut item));
        assert!(item.project.is_none());
    }

    #[test]
    fn patch_skips_fields_kind_does_not_carry() {
        let mut idea = WorkItem::new("i1", ItemKind::Idea, "Idea");
        let mut patch = ItemPatch::status("Done");
        patch.priority = Some("High".into());
        patch.end_date = Some(Some("2025-02-01".into()));
        patch.start_date = Some(Some("2025-01-01".into()));
        assert!(!patch.apply(&mut idea));
        assert!(idea.status.is_none());
        assert!(idea.end_date.is_none());

        // Mixed patches still land the fields the kind has
        patch.title = Some("Better idea".into());
        patch.category = Some(Some("seo".into()));
        assert!(patch.apply(&mut idea));
        assert_eq!(idea.title, "Better idea");
        assert_eq!(idea.category.as_deref(), Some("seo"));
        assert!(idea.start_date.is_none());

        let mut task = WorkItem::new("t1", ItemKind::Task, "Task");
        let category = ItemPatch {
            category: Some(Some("seo".into())),
            ..Default::default()
        };
        assert!(!category.apply(&mut task));
        assert!(task.category.is_none());

        let mut feature = WorkItem::new("f1", ItemKind::Feature, "Feature");
        assert!(patch.apply(&mut feature));
        assert_eq!(feature.status.as_deref(), Some("Done"));
        assert_eq!(feature.end_date.as_deref(), Some("2025-02-01"));
        assert!(feature.priority.is_none());
    }

    #[test]
    fn patch_merge_last_write_wins() {
        let mut first = ItemPatch::status("Todo");
        first.title = Some("Keep".into());
        first.merge(ItemPatch::status("Done"));
        assert_eq!(first.status.as_deref(), Some("Done"));
        assert_eq!(first.title.as_deref(), Some("Keep"));
    }

    #[test]
    fn draft_drops_fields_kind_does_not_carry() {
        let mut draft = ItemDraft::new(ItemKind::Idea, "Idea");
        draft.status = Some("Todo".into());
        draft.priority = Some("High".into());
        draft.start_date = Some("2025-01-01".into());
        draft.category = Some("seo".into());
        let item = draft.into_item("i1".into(), Utc::now());
        assert!(item.status.is_none());
        assert!(item.priority.is_none());
        assert!(item.start_date.is_none());
        assert_eq!(item.category.as_deref(), Some("seo"));

        let mut draft = ItemDraft::new(ItemKind::Task, "Task");
        draft.category = Some("seo".into());
        assert!(draft.into_item("t1".into(), Utc::now()).category.is_none());

        let mut draft = ItemDraft::new(ItemKind::Feature, "Feature");
        draft.status = Some("Todo".into());
        draft.priority = Some("High".into());
        let item = draft.into_item("f1".into(), Utc::now());
        assert_eq!(item.status.as_deref(), Some("Todo"));
        assert!(item.priority.is_none());
    }

    #[test]
    fn deserialize_minimal_item() {
        let item: WorkItem = serde_json::from_str(r#"{"id":"t1","title":"Hello"}"#).unwrap();
        assert_eq!(item.kind, ItemKind::Task);
        assert!(!item.archived);
        assert!(item.linkage.is_empty());
    }
}
