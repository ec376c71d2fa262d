use chrono::NaiveDate;
use serde::Serialize;

use crate::model::directory::{Directory, User};
use crate::model::item::{ItemPatch, WorkItem, parse_date};
use crate::model::vocab::{Tone, Vocabulary};

use super::classify::{SourceTag, classify};

/// Label shown for items without a project, and for the option that clears it.
pub const NO_PROJECT_LABEL: &str = "No project";
/// Names listed in an assignee cell before collapsing into `+N`.
pub const ASSIGNEE_SUMMARY_LIMIT: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("only an admin can {0}")]
    NotPermitted(&'static str),
    #[error("invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Inputs a row needs besides the item itself.
pub struct TableContext<'a> {
    pub vocab: &'a Vocabulary,
    pub directory: &'a Directory,
    pub current_user: Option<&'a User>,
    pub today: NaiveDate,
    /// Aggregated views show the source column
    pub show_source: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToneCell {
    pub value: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneeSummary {
    /// Resolved names, at most `ASSIGNEE_SUMMARY_LIMIT`
    pub names: Vec<String>,
    /// Resolved assignees not listed in `names`
    pub overflow: usize,
}

impl AssigneeSummary {
    /// Unknown ids are skipped entirely.
    pub fn from_item(item: &WorkItem, directory: &Directory) -> Self {
        let users = directory.resolve_users(&item.assignee_ids());
        let names = users
            .iter()
            .take(ASSIGNEE_SUMMARY_LIMIT)
            .map(|u| u.name.clone())
            .collect();
        AssigneeSummary {
            names,
            overflow: users.len().saturating_sub(ASSIGNEE_SUMMARY_LIMIT),
        }
    }

    pub fn label(&self) -> String {
        if self.names.is_empty() {
            return "unassigned".to_string();
        }
        let mut label = self.names.join(", ");
        if self.overflow > 0 {
            label.push_str(&format!(" +{}", self.overflow));
        }
        label
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueCell {
    pub date: String,
    pub overdue: bool,
}

/// One table row. Every cell is independently editable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceTag>,
    pub status: Option<ToneCell>,
    pub priority: Option<ToneCell>,
    pub assignees: AssigneeSummary,
    pub project: String,
    pub due: Option<DueCell>,
    pub can_archive: bool,
}

/// A due date is overdue when it falls strictly before today; the same day
/// never counts. Unparseable dates are never overdue.
pub fn is_overdue(date: &str, today: NaiveDate) -> bool {
    parse_date(date).is_some_and(|d| d < today)
}

pub fn can_archive(user: Option<&User>) -> bool {
    user.is_some_and(User::is_admin)
}

pub fn build_row(item: &WorkItem, ctx: &TableContext<'_>) -> TableRow {
    TableRow {
        id: item.id.clone(),
        title: item.title.clone(),
        source: ctx.show_source.then(|| classify(item, ctx.directory)),
        status: item.status.as_ref().map(|s| ToneCell {
            value: s.clone(),
            tone: ctx.vocab.status_tone(s),
        }),
        priority: item.priority.as_ref().map(|p| ToneCell {
            value: p.clone(),
            tone: ctx.vocab.priority_tone(p),
        }),
        assignees: AssigneeSummary::from_item(item, ctx.directory),
        project: project_label(item, ctx.directory).to_string(),
        due: item
            .end_date
            .as_ref()
            .filter(|d| !d.trim().is_empty())
            .map(|d| DueCell {
                date: d.clone(),
                overdue: is_overdue(d, ctx.today),
            }),
        can_archive: can_archive(ctx.current_user),
    }
}

/// One row per item, in input order.
pub fn build_rows(items: &[&WorkItem], ctx: &TableContext<'_>) -> Vec<TableRow> {
    items.iter().map(|item| build_row(item, ctx)).collect()
}

/// Project name, or the no-project label when unset or unresolvable.
pub fn project_label<'a>(item: &WorkItem, directory: &'a Directory) -> &'a str {
    item.project
        .as_deref()
        .and_then(|id| directory.project(id))
        .map_or(NO_PROJECT_LABEL, |p| p.name.as_str())
}

// ---------------------------------------------------------------------------
// Cell pickers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Status,
    Priority,
    Project,
    Assignee,
    DueDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenPicker {
    pub item_id: String,
    pub kind: PickerKind,
}

/// A committed cell edit, forwarded as `update_item(id, patch)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CellCommit {
    pub id: String,
    pub patch: ItemPatch,
}

/// At most one picker is open across the whole table.
#[derive(Debug, Clone, Default)]
pub struct CellEditor {
    open: Option<OpenPicker>,
}

impl CellEditor {
    /// Open a picker, closing whichever one was open.
    pub fn open(&mut self, item_id: &str, kind: PickerKind) {
        self.open = Some(OpenPicker {
            item_id: item_id.to_string(),
            kind,
        });
    }

    pub fn current(&self) -> Option<&OpenPicker> {
        self.open.as_ref()
    }

    pub fn is_open(&self, item_id: &str, kind: PickerKind) -> bool {
        self.open
            .as_ref()
            .is_some_and(|p| p.item_id == item_id && p.kind == kind)
    }

    /// Click outside: close without committing anything.
    pub fn dismiss(&mut self) {
        self.open = None;
    }

    /// Pick a value from a single-choice picker. Commits and closes.
    ///
    /// For the project picker an empty value is the "no project" option;
    /// for the due date an empty value clears the date.
    pub fn select(&mut self, value: &str) -> Result<Option<CellCommit>, TableError> {
        let Some(open) = self.open.as_ref() else {
            return Ok(None);
        };
        let patch = match open.kind {
            PickerKind::Status => ItemPatch::status(value),
            PickerKind::Priority => ItemPatch::priority(value),
            PickerKind::Project => ItemPatch::project(non_empty(value)),
            PickerKind::DueDate => due_date_patch(value)?,
            // Multi-select never commits through `select`
            PickerKind::Assignee => return Ok(None),
        };
        let id = open.item_id.clone();
        self.open = None;
        Ok(Some(CellCommit { id, patch }))
    }

    /// Toggle one user in the assignee picker. The picker stays open; each
    /// toggle commits the full new set.
    pub fn toggle_assignee(&self, item: &WorkItem, user_id: &str) -> Option<CellCommit> {
        let open = self.open.as_ref()?;
        if open.kind != PickerKind::Assignee || open.item_id != item.id {
            return None;
        }
        let mut ids: Vec<String> = item.assignee_ids().into_iter().map(str::to_string).collect();
        if let Some(pos) = ids.iter().position(|id| id == user_id) {
            ids.remove(pos);
        } else {
            ids.push(user_id.to_string());
        }
        Some(CellCommit {
            id: item.id.clone(),
            patch: ItemPatch::assignees(ids),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Patch for the due-date cell. Empty input clears the date.
pub fn due_date_patch(value: &str) -> Result<ItemPatch, TableError> {
    match non_empty(value) {
        None => Ok(ItemPatch::end_date(None)),
        Some(v) if parse_date(&v).is_some() => Ok(ItemPatch::end_date(Some(v))),
        Some(v) => Err(TableError::InvalidDate(v)),
    }
}

/// Archive request from the row's delete control.
pub fn archive_commit(item: &WorkItem, user: Option<&User>) -> Result<CellCommit, TableError> {
    if !can_archive(user) {
        return Err(TableError::NotPermitted("archive items"));
    }
    Ok(CellCommit {
        id: item.id.clone(),
        patch: ItemPatch::archive(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::directory::{Project, Role};
    use crate::model::item::ItemKind;
    use crate::ops::filter::{FilterState, apply_filters};
    use pretty_assertions::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn user(id: &str, name: &str, role: Role) -> User {
        User {
            id: id.into(),
            name: name.into(),
            role,
            avatar: None,
        }
    }

    fn directory() -> Directory {
        Directory {
            users: vec![
                user("u1", "Anna", Role::Admin),
                user("u2", "Boris", Role::Employee),
                user("u3", "Clara", Role::Employee),
                user("u4", "Dmitri", Role::Employee),
                user("u5", "Eva", Role::Employee),
            ],
            projects: vec![Project {
                id: "p1".into(),
                name: "Website".into(),
                color: None,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn overdue_excludes_today() {
        let today = day(2025, 6, 10);
        assert!(is_overdue("2025-06-09", today));
        assert!(!is_overdue("2025-06-10", today));
        assert!(!is_overdue("2025-06-10T23:00:00Z", today));
        assert!(!is_overdue("2025-06-11", today));
        assert!(!is_overdue("soon", today));
    }

    #[test]
    fn assignee_summary_overflow_and_unknown_ids() {
        let dir = directory();
        let mut item = WorkItem::new("t", ItemKind::Task, "t");
        assert_eq!(AssigneeSummary::from_item(&item, &dir).label(), "unassigned");

        item.set_assignees(vec!["ghost".into(), "u2".into()]);
        assert_eq!(AssigneeSummary::from_item(&item, &dir).label(), "Boris");

        item.set_assignees(["u1", "u2", "u3", "u4", "u5"].map(String::from).to_vec());
        let summary = AssigneeSummary::from_item(&item, &dir);
        assert_eq!(summary.overflow, 2);
        assert_eq!(summary.label(), "Anna, Boris, Clara +2");
    }

    #[test]
    fn row_cells() {
        let dir = directory();
        let vocab = Vocabulary::default();
        let admin = dir.user("u1");
        let ctx = TableContext {
            vocab: &vocab,
            directory: &dir,
            current_user: admin,
            today: day(2025, 6, 10),
            show_source: true,
        };
        let mut item = WorkItem::new("t", ItemKind::Task, "Ship it");
        item.status = Some("В работе".into());
        item.priority = Some("Unknown".into());
        item.end_date = Some("2025-06-01".into());
        item.project = Some("p1".into());
        item.linkage.deal = Some("d1".into());

        let row = build_row(&item, &ctx);
        assert_eq!(row.source, Some(SourceTag::Deal));
        assert_eq!(row.status.as_ref().map(|c| c.tone), Some(Tone::Blue));
        assert_eq!(row.priority.as_ref().map(|c| c.tone), Some(Tone::Gray));
        assert_eq!(row.project, "Website");
        assert_eq!(
            row.due,
            Some(DueCell {
                date: "2025-06-01".into(),
                overdue: true
            })
        );
        assert!(row.can_archive);

        item.project = Some("deleted".into());
        let ctx = TableContext {
            current_user: dir.user("u2"),
            show_source: false,
            ..ctx
        };
        let row = build_row(&item, &ctx);
        assert_eq!(row.project, NO_PROJECT_LABEL);
        assert_eq!(row.source, None);
        assert!(!row.can_archive);
    }

    #[test]
    fn aggregator_renders_only_tasks() {
        let dir = directory();
        let vocab = Vocabulary::default();
        let items = vec![
            WorkItem::new("i", ItemKind::Idea, "X"),
            WorkItem::new("f", ItemKind::Feature, "Y"),
            WorkItem::new("t", ItemKind::Task, "Z"),
        ];
        let filtered = apply_filters(&items, &FilterState::default(), &[]);
        let ctx = TableContext {
            vocab: &vocab,
            directory: &dir,
            current_user: None,
            today: day(2025, 1, 1),
            show_source: true,
        };
        let rows = build_rows(&filtered, &ctx);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Z");
    }

    #[test]
    fn opening_a_picker_closes_the_other() {
        let mut editor = CellEditor::default();
        editor.open("t1", PickerKind::Status);
        editor.open("t1", PickerKind::Priority);
        assert!(!editor.is_open("t1", PickerKind::Status));
        assert!(editor.is_open("t1", PickerKind::Priority));
        editor.open("t2", PickerKind::Project);
        assert!(!editor.is_open("t1", PickerKind::Priority));
    }

    #[test]
    fn select_commits_and_closes() {
        let mut editor = CellEditor::default();
        editor.open("t1", PickerKind::Status);
        let commit = editor.select("Done").unwrap().unwrap();
        assert_eq!(commit.id, "t1");
        assert_eq!(commit.patch, ItemPatch::status("Done"));
        assert!(editor.current().is_none());
        assert!(editor.select("Again").unwrap().is_none());
    }

    #[test]
    fn project_picker_no_project_option() {
        let mut editor = CellEditor::default();
        editor.open("t1", PickerKind::Project);
        let commit = editor.select("").unwrap().unwrap();
        assert_eq!(commit.patch, ItemPatch::project(None));
    }

    #[test]
    fn dismiss_commits_nothing() {
        let mut editor = CellEditor::default();
        editor.open("t1", PickerKind::Priority);
        editor.dismiss();
        assert!(editor.current().is_none());
        assert!(editor.select("High").unwrap().is_none());
    }

    #[test]
    fn assignee_toggles_keep_picker_open() {
        let mut item = WorkItem::new("t1", ItemKind::Task, "t");
        item.set_assignees(vec!["u1".into()]);
        let mut editor = CellEditor::default();
        editor.open("t1", PickerKind::Assignee);

        let commit = editor.toggle_assignee(&item, "u2").unwrap();
        assert!(commit.patch.apply(&mut item));
        assert_eq!(item.assignees, vec!["u1", "u2"]);
        assert!(editor.is_open("t1", PickerKind::Assignee));

        let commit = editor.toggle_assignee(&item, "u1").unwrap();
        commit.patch.apply(&mut item);
        assert_eq!(item.assignees, vec!["u2"]);
        assert_eq!(item.assignee.as_deref(), Some("u2"));
        assert!(editor.is_open("t1", PickerKind::Assignee));

        let other = WorkItem::new("t2", ItemKind::Task, "t");
        assert!(editor.toggle_assignee(&other, "u1").is_none());
    }

    #[test]
    fn due_date_picker_validates() {
        let mut editor = CellEditor::default();
        editor.open("t1", PickerKind::DueDate);
        assert!(matches!(editor.select("31/12"), Err(TableError::InvalidDate(_))));
        let commit = editor.select("2025-12-31").unwrap().unwrap();
        assert_eq!(commit.patch, ItemPatch::end_date(Some("2025-12-31".into())));
        assert_eq!(due_date_patch(" ").unwrap(), ItemPatch::end_date(None));
    }

    #[test]
    fn archive_is_admin_only() {
        let dir = directory();
        let item = WorkItem::new("t1", ItemKind::Task, "t");
        let commit = archive_commit(&item, dir.user("u1")).unwrap();
        assert_eq!(commit.patch, ItemPatch::archive());
        assert!(matches!(
            archive_commit(&item, dir.user("u2")),
            Err(TableError::NotPermitted(_))
        ));
        assert!(archive_commit(&item, None).is_err());
    }
}
