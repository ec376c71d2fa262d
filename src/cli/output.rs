use serde::Serialize;

use crate::model::directory::Directory;
use crate::model::item::{ItemKind, WorkItem};
use crate::model::vocab::Vocabulary;
use crate::ops::classify::SourceTag;
use crate::ops::gantt::GanttLayout;
use crate::ops::group::{Bucket, group_by_project_and_category, progress};
use crate::ops::kanban::KanbanColumn;
use crate::ops::table::{NO_PROJECT_LABEL, TableRow};
use crate::util::unicode::{display_width, pad_to_width};

/// Widest title column in table output.
const TITLE_MAX_WIDTH: usize = 40;
/// Width of the bar track in gantt output.
pub const GANTT_TRACK_WIDTH: usize = 40;
const NO_CATEGORY_LABEL: &str = "No category";

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct WriteJson<'a> {
    pub id: &'a str,
    /// False when the command changed nothing
    pub changed: bool,
}

#[derive(Serialize)]
pub struct ItemJson<'a> {
    #[serde(flatten)]
    pub item: &'a WorkItem,
    pub source_tag: SourceTag,
}

#[derive(Serialize)]
pub struct ProjectGroupJson<'a> {
    pub project: Bucket,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    pub categories: Vec<CategoryGroupJson<'a>>,
}

#[derive(Serialize)]
pub struct CategoryGroupJson<'a> {
    pub category: Bucket,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    pub items: Vec<&'a WorkItem>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Project → category groups for the feature and idea boards. Progress is
/// reported only for kinds that carry a status.
pub fn grouped_board<'a>(
    items: &[&'a WorkItem],
    kind: ItemKind,
    directory: &Directory,
    vocab: &Vocabulary,
) -> Vec<ProjectGroupJson<'a>> {
    let with_progress = |members: &[&WorkItem]| kind.has_status().then(|| progress(members, vocab));
    group_by_project_and_category(items)
        .into_iter()
        .map(|(project, categories)| {
            let members: Vec<&WorkItem> = categories.values().flatten().copied().collect();
            ProjectGroupJson {
                label: project_bucket_label(&project, directory),
                progress: with_progress(&members),
                categories: categories
                    .into_iter()
                    .map(|(category, items)| CategoryGroupJson {
                        label: match category.name() {
                            Some(id) => directory.category_label(id).to_string(),
                            None => NO_CATEGORY_LABEL.to_string(),
                        },
                        progress: with_progress(&items),
                        category,
                        items,
                    })
                    .collect(),
                project,
            }
        })
        .collect()
}

fn project_bucket_label(bucket: &Bucket, directory: &Directory) -> String {
    match bucket.name() {
        Some(id) => directory
            .project(id)
            .map_or_else(|| id.to_string(), |p| p.name.clone()),
        None => NO_PROJECT_LABEL.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Lay cells out in padded columns separated by two spaces.
fn render_columns(header: &[&str], rows: &[Vec<String>], max_widths: &[usize]) -> Vec<String> {
    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let widest = rows
                .iter()
                .map(|r| display_width(&r[i]))
                .chain([display_width(h)])
                .max()
                .unwrap_or(0);
            widest.min(max_widths.get(i).copied().unwrap_or(usize::MAX))
        })
        .collect();
    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| pad_to_width(c, *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let mut lines = vec![line(header.to_vec())];
    for row in rows {
        lines.push(line(row.iter().map(String::as_str).collect()));
    }
    lines
}

pub fn format_table(rows: &[TableRow], show_source: bool) -> Vec<String> {
    if rows.is_empty() {
        return vec!["no items".to_string()];
    }
    let mut header = vec!["ID", "TITLE"];
    if show_source {
        header.push("SOURCE");
    }
    header.extend(["STATUS", "PRIORITY", "ASSIGNEES", "PROJECT", "DUE"]);

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = vec![row.id.clone(), row.title.clone()];
            if show_source {
                cells.push(row.source.as_ref().map_or_else(String::new, |s| s.to_string()));
            }
            cells.push(row.status.as_ref().map_or("-".into(), |c| c.value.clone()));
            cells.push(row.priority.as_ref().map_or("-".into(), |c| c.value.clone()));
            cells.push(row.assignees.label());
            cells.push(row.project.clone());
            cells.push(match &row.due {
                Some(due) if due.overdue => format!("{} (overdue)", due.date),
                Some(due) => due.date.clone(),
                None => "-".into(),
            });
            cells
        })
        .collect();

    let mut max = vec![usize::MAX; header.len()];
    max[1] = TITLE_MAX_WIDTH;
    render_columns(&header, &cells, &max)
}

pub fn format_board(columns: &[KanbanColumn<'_>]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("== {} ({}) ==", column.status, column.items.len()));
        if column.items.is_empty() {
            lines.push("  (empty)".to_string());
        }
        for item in &column.items {
            lines.push(format!("  {}  {}", item.id, item.title));
        }
    }
    lines
}

/// Draw a bar on a fixed-width track.
fn bar_track(left: usize, len: usize, width: usize) -> String {
    (0..width)
        .map(|col| if col >= left && col < left + len { '#' } else { ' ' })
        .collect()
}

pub fn format_gantt(layout: &GanttLayout) -> Vec<String> {
    let mut lines = vec![format!(
        "{} .. {} ({} days)",
        layout.axis_start, layout.axis_end, layout.total_days
    )];
    let months: Vec<&str> = layout.months.iter().map(|m| m.label.as_str()).collect();
    lines.push(format!("months: {}", months.join(", ")));
    if layout.lanes.is_empty() {
        lines.push("no scheduled items".to_string());
        return lines;
    }
    let title_width = layout
        .lanes
        .iter()
        .flat_map(|l| &l.bars)
        .map(|b| display_width(&b.title))
        .max()
        .unwrap_or(0)
        .min(TITLE_MAX_WIDTH);
    for lane in &layout.lanes {
        lines.push(String::new());
        lines.push(format!("== {} ==", lane.label));
        for bar in &lane.bars {
            let (left, len) = bar.cells(GANTT_TRACK_WIDTH);
            lines.push(format!(
                "  {}  {}..{}  |{}|",
                pad_to_width(&bar.title, title_width),
                bar.start,
                bar.end,
                bar_track(left, len, GANTT_TRACK_WIDTH)
            ));
        }
    }
    lines
}

pub fn format_groups(groups: &[ProjectGroupJson<'_>]) -> Vec<String> {
    if groups.is_empty() {
        return vec!["no items".to_string()];
    }
    let with_progress = |label: &str, progress: Option<u8>| match progress {
        Some(p) => format!("{} ({}%)", label, p),
        None => label.to_string(),
    };
    let mut lines = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(format!("== {} ==", with_progress(&group.label, group.progress)));
        for category in &group.categories {
            lines.push(format!("  -- {} --", with_progress(&category.label, category.progress)));
            for item in &category.items {
                let status = item
                    .status
                    .as_deref()
                    .map(|s| format!("[{}] ", s))
                    .unwrap_or_default();
                lines.push(format!("    {}{} ({})", status, item.title, item.id));
            }
        }
    }
    lines
}

/// Detailed single-item view.
pub fn format_item_detail(item: &WorkItem, tag: &SourceTag, directory: &Directory) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", item.title, item.id)];
    lines.push(format!("kind: {}", item.kind));
    lines.push(format!("source: {}", tag));
    if let Some(status) = &item.status {
        lines.push(format!("status: {}", status));
    }
    if let Some(priority) = &item.priority {
        lines.push(format!("priority: {}", priority));
    }
    let names: Vec<String> = item
        .assignee_ids()
        .into_iter()
        .map(|id| directory.user(id).map_or_else(|| id.to_string(), |u| u.name.clone()))
        .collect();
    if !names.is_empty() {
        lines.push(format!("assignees: {}", names.join(", ")));
    }
    if let Some(project) = &item.project {
        let label = directory.project(project).map_or(project.as_str(), |p| p.name.as_str());
        lines.push(format!("project: {}", label));
    }
    if let Some(category) = &item.category {
        lines.push(format!("category: {}", directory.category_label(category)));
    }
    match (&item.start_date, &item.end_date) {
        (Some(start), Some(end)) => lines.push(format!("dates: {} .. {}", start, end)),
        (None, Some(end)) => lines.push(format!("due: {}", end)),
        (Some(start), None) => lines.push(format!("start: {}", start)),
        (None, None) => {}
    }
    if item.archived {
        lines.push("archived".to_string());
    }
    if let Some(description) = item.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push("description:".to_string());
        for line in description.lines() {
            lines.push(format!("  {}", line));
        }
    }
    if !item.comments.is_empty() {
        lines.push("comments:".to_string());
        for c in &item.comments {
            let author = directory.user(&c.user_id).map_or(c.user_id.as_str(), |u| u.name.as_str());
            lines.push(format!(
                "  {} ({}): {}",
                author,
                c.created_at.format("%Y-%m-%d %H:%M"),
                c.text
            ));
        }
    }
    lines
}
