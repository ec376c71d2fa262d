use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::model::item::{Comment, ItemDraft, ItemKind, ItemPatch, WorkItem};
use crate::model::vocab::Vocabulary;

use super::classify::{BACKLOG_SOURCE, FUNCTIONALITY_SOURCE, TASK_SOURCE};

/// Title given to items created without one.
pub const DEFAULT_TITLE: &str = "Новая задача";
/// Prefix of generated item ids.
pub const ID_PREFIX: &str = "task";

#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("only ideas and features can be taken to work, {0} is a {1}")]
    NotTakeable(String, ItemKind),
    #[error("{0} items have no {1}")]
    NoField(ItemKind, &'static str),
}

pub fn find_item<'a>(items: &'a [WorkItem], id: &str) -> Result<&'a WorkItem, ItemError> {
    items
        .iter()
        .find(|i| i.id == id)
        .ok_or_else(|| ItemError::NotFound(id.to_string()))
}

/// Apply a patch in place. Returns whether anything changed.
pub fn apply_patch(items: &mut [WorkItem], id: &str, patch: &ItemPatch) -> Result<bool, ItemError> {
    let item = items
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or_else(|| ItemError::NotFound(id.to_string()))?;
    Ok(patch.apply(item))
}

/// Fresh id of the form `<prefix>-<unix millis>`, suffixed until unique.
pub fn generate_id(prefix: &str, now: DateTime<Utc>, items: &[WorkItem]) -> String {
    let base = format!("{}-{}", prefix, now.timestamp_millis());
    if !items.iter().any(|i| i.id == base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !items.iter().any(|i| i.id == candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Materialize a draft the way the store does on creation: blank titles get
/// the default title, tasks get the first status and priority, features the
/// first status, plain tasks without linkage or source are labelled as
/// tasks, and scheduled kinds missing dates start and end on the creation day.
pub fn materialize_draft(
    mut draft: ItemDraft,
    id: String,
    vocab: &Vocabulary,
    now: DateTime<Utc>,
) -> WorkItem {
    if draft.title.trim().is_empty() {
        draft.title = DEFAULT_TITLE.to_string();
    }
    if draft.kind.has_status() && draft.status.is_none() {
        draft.status = vocab.first_status().map(str::to_string);
    }
    if draft.kind.has_priority() && draft.priority.is_none() {
        draft.priority = vocab.first_priority().map(str::to_string);
    }
    if draft.kind == ItemKind::Task && draft.source.is_none() && draft.linkage.is_empty() {
        draft.source = Some(TASK_SOURCE.to_string());
    }
    if draft.kind.has_dates() {
        let today = now.date_naive().format("%Y-%m-%d").to_string();
        draft.start_date.get_or_insert_with(|| today.clone());
        draft.end_date.get_or_insert(today);
    }
    draft.into_item(id, now)
}

pub fn new_comment(user_id: &str, text: &str, now: DateTime<Utc>) -> Comment {
    Comment {
        id: format!("c-{}", now.timestamp_millis()),
        user_id: user_id.to_string(),
        text: text.to_string(),
        created_at: now,
    }
}

/// Draft of a task spawned from an idea or a feature. The reserved source
/// label records where the work came from.
pub fn take_to_work(item: &WorkItem) -> Result<ItemDraft, ItemError> {
    let source = match item.kind {
        ItemKind::Idea => BACKLOG_SOURCE,
        ItemKind::Feature => FUNCTIONALITY_SOURCE,
        ItemKind::Task => return Err(ItemError::NotTakeable(item.id.clone(), item.kind)),
    };
    let mut draft = ItemDraft::new(ItemKind::Task, item.title.clone());
    draft.description = item.description.clone();
    draft.project = item.project.clone();
    draft.assignees = item.assignee_ids().into_iter().map(str::to_string).collect();
    draft.source = Some(source.to_string());
    Ok(draft)
}

// ---------------------------------------------------------------------------
// Pending-operation log
// ---------------------------------------------------------------------------

/// Patches applied locally whose forward to the store has not succeeded.
///
/// Keyed by item id; a later patch for the same id merges field by field
/// and wins. Nothing here retries.
#[derive(Debug, Clone, Default)]
pub struct PendingLog {
    entries: IndexMap<String, ItemPatch>,
}

impl PendingLog {
    pub fn record(&mut self, id: &str, patch: ItemPatch) {
        match self.entries.get_mut(id) {
            Some(existing) => existing.merge(patch),
            None => {
                self.entries.insert(id.to_string(), patch);
            }
        }
    }

    /// Forget an id once the store has accepted its latest state.
    pub fn clear(&mut self, id: &str) -> Option<ItemPatch> {
        self.entries.shift_remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&ItemPatch> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ItemPatch)> {
        self.entries.iter().map(|(id, patch)| (id.as_str(), patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn apply_patch_missing_item() {
        let mut items = vec![WorkItem::new("a", ItemKind::Task, "a")];
        assert!(apply_patch(&mut items, "a", &ItemPatch::status("Done")).unwrap());
        assert!(matches!(
            apply_patch(&mut items, "zz", &ItemPatch::status("Done")),
            Err(ItemError::NotFound(_))
        ));
    }

    #[test]
    fn generated_ids_are_unique() {
        let first = generate_id("task", now(), &[]);
        assert_eq!(first, format!("task-{}", now().timestamp_millis()));
        let items = vec![WorkItem::new(first.clone(), ItemKind::Task, "a")];
        assert_eq!(generate_id("task", now(), &items), format!("{}-2", first));
    }

    #[test]
    fn materialize_fills_creation_defaults() {
        let vocab = Vocabulary::default();
        let item = materialize_draft(ItemDraft::new(ItemKind::Task, "  "), "t1".into(), &vocab, now());
        assert_eq!(item.title, DEFAULT_TITLE);
        assert_eq!(item.status.as_deref(), Some("Не начато"));
        assert_eq!(item.priority.as_deref(), Some("Низкий"));
        assert_eq!(item.source.as_deref(), Some(TASK_SOURCE));
        assert_eq!(item.start_date.as_deref(), Some("2025-01-02"));
        assert_eq!(item.end_date.as_deref(), Some("2025-01-02"));
        assert_eq!(item.created_at, Some(now()));

        let mut linked = ItemDraft::new(ItemKind::Task, "Call");
        linked.linkage.deal = Some("d1".into());
        linked.end_date = Some("2025-02-01".into());
        let item = materialize_draft(linked, "t2".into(), &vocab, now());
        assert!(item.source.is_none());
        assert_eq!(item.end_date.as_deref(), Some("2025-02-01"));

        let item = materialize_draft(ItemDraft::new(ItemKind::Idea, "Idea"), "i1".into(), &vocab, now());
        assert!(item.status.is_none());
        assert!(item.start_date.is_none());
        assert!(item.source.is_none());
    }

    #[test]
    fn take_idea_to_work() {
        let mut idea = WorkItem::new("i1", ItemKind::Idea, "Dark mode");
        idea.description = Some("Users asked".into());
        idea.project = Some("p1".into());
        idea.set_assignees(vec!["u2".into()]);
        let draft = take_to_work(&idea).unwrap();
        assert_eq!(draft.kind, ItemKind::Task);
        assert_eq!(draft.title, "Dark mode");
        assert_eq!(draft.source.as_deref(), Some(BACKLOG_SOURCE));
        assert_eq!(draft.assignees, vec!["u2"]);

        let feature = WorkItem::new("f1", ItemKind::Feature, "Export");
        assert_eq!(
            take_to_work(&feature).unwrap().source.as_deref(),
            Some(FUNCTIONALITY_SOURCE)
        );

        let task = WorkItem::new("t1", ItemKind::Task, "Task");
        assert!(matches!(take_to_work(&task), Err(ItemError::NotTakeable(..))));
    }

    #[test]
    fn pending_log_merges_last_write_wins() {
        let mut log = PendingLog::default();
        log.record("a", ItemPatch::status("Todo"));
        log.record("a", ItemPatch::priority("High"));
        log.record("a", ItemPatch::status("Done"));
        log.record("b", ItemPatch::archive());
        assert_eq!(log.len(), 2);

        let merged = log.get("a").unwrap();
        assert_eq!(merged.status.as_deref(), Some("Done"));
        assert_eq!(merged.priority.as_deref(), Some("High"));

        assert!(log.clear("a").is_some());
        assert!(log.get("a").is_none());
        let ids: Vec<&str> = log.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["b"]);
    }
}
