use serde::Serialize;

use crate::model::directory::Directory;
use crate::model::item::{ItemKind, WorkItem};
use crate::model::vocab::Tone;

/// Legacy `source` labels that name a space rather than a content plan.
pub const BACKLOG_LABELS: &[&str] = &["Беклог", "Backlog"];
pub const FUNCTIONALITY_LABELS: &[&str] = &["Функционал", "Functionality"];
pub const TASK_LABELS: &[&str] = &["Задача", "Task"];

/// Canonical label written into `source` when an item is taken to work.
pub const BACKLOG_SOURCE: &str = "Беклог";
pub const FUNCTIONALITY_SOURCE: &str = "Функционал";
pub const TASK_SOURCE: &str = "Задача";

/// Where a work item came from, for display in aggregated views.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "label", rename_all = "lowercase")]
pub enum SourceTag {
    Backlog,
    Functionality,
    Request,
    Deal,
    /// Process title, or `None` when the process id no longer resolves
    Process(Option<String>),
    /// A free-text origin such as a content plan name
    Content(String),
    Task,
}

impl SourceTag {
    /// Display label
    pub fn label(&self) -> &str {
        match self {
            SourceTag::Backlog => "Backlog",
            SourceTag::Functionality => "Functionality",
            SourceTag::Request => "Request",
            SourceTag::Deal => "Deal",
            SourceTag::Process(Some(title)) => title,
            SourceTag::Process(None) => "Process",
            SourceTag::Content(label) => label,
            SourceTag::Task => "Task",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            SourceTag::Backlog => Tone::Orange,
            SourceTag::Functionality => Tone::Violet,
            SourceTag::Request => Tone::Amber,
            SourceTag::Deal => Tone::Blue,
            SourceTag::Process(_) => Tone::Indigo,
            SourceTag::Content(_) => Tone::Pink,
            SourceTag::Task => Tone::Gray,
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the source tag of an item. First match wins:
/// kind, then structural linkage, then the legacy `source` label.
pub fn classify(item: &WorkItem, directory: &Directory) -> SourceTag {
    match item.kind {
        ItemKind::Idea => return SourceTag::Backlog,
        ItemKind::Feature => return SourceTag::Functionality,
        ItemKind::Task => {}
    }
    if item.linkage.purchase_request.is_some() {
        return SourceTag::Request;
    }
    if item.linkage.deal.is_some() {
        return SourceTag::Deal;
    }
    if let Some(process_id) = &item.linkage.process {
        return SourceTag::Process(directory.process_title(process_id).map(str::to_string));
    }
    match item.source.as_deref().map(str::trim) {
        Some(label) if is_backlog_label(label) => SourceTag::Backlog,
        Some(label) if is_functionality_label(label) => SourceTag::Functionality,
        Some(label) if !label.is_empty() && !is_task_label(label) => {
            SourceTag::Content(label.to_string())
        }
        _ => SourceTag::Task,
    }
}

pub fn is_backlog_label(label: &str) -> bool {
    BACKLOG_LABELS.contains(&label)
}

pub fn is_functionality_label(label: &str) -> bool {
    FUNCTIONALITY_LABELS.contains(&label)
}

pub fn is_task_label(label: &str) -> bool {
    TASK_LABELS.contains(&label)
}

/// Labels that never count as a free-text content source.
pub fn is_reserved_label(label: &str) -> bool {
    is_backlog_label(label) || is_functionality_label(label) || is_task_label(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::directory::Process;

    fn task(source: Option<&str>) -> WorkItem {
        let mut item = WorkItem::new("t1", ItemKind::Task, "Task");
        item.source = source.map(str::to_string);
        item
    }

    fn directory() -> Directory {
        Directory {
            processes: vec![Process {
                id: "bp1".into(),
                title: "Hiring".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn kind_wins_over_everything() {
        let dir = directory();
        let mut idea = WorkItem::new("i1", ItemKind::Idea, "Idea");
        idea.linkage.deal = Some("d1".into());
        assert_eq!(classify(&idea, &dir), SourceTag::Backlog);

        let mut feature = WorkItem::new("f1", ItemKind::Feature, "Feature");
        feature.source = Some("Беклог".into());
        assert_eq!(classify(&feature, &dir), SourceTag::Functionality);
    }

    #[test]
    fn deal_linkage_beats_stale_source_label() {
        let mut item = task(Some("Беклог"));
        item.linkage.deal = Some("d1".into());
        assert_eq!(classify(&item, &directory()), SourceTag::Deal);
        assert_eq!(classify(&item, &directory()).label(), "Deal");
    }

    #[test]
    fn purchase_request_beats_deal() {
        let mut item = task(None);
        item.linkage.deal = Some("d1".into());
        item.linkage.purchase_request = Some("r1".into());
        assert_eq!(classify(&item, &directory()), SourceTag::Request);
    }

    #[test]
    fn process_title_resolution() {
        let dir = directory();
        let mut item = task(Some("Plan"));
        item.linkage.process = Some("bp1".into());
        assert_eq!(classify(&item, &dir), SourceTag::Process(Some("Hiring".into())));
        assert_eq!(classify(&item, &dir).label(), "Hiring");

        item.linkage.process = Some("gone".into());
        let tag = classify(&item, &dir);
        assert_eq!(tag, SourceTag::Process(None));
        assert_eq!(tag.label(), "Process");
    }

    #[test]
    fn legacy_source_labels() {
        let dir = directory();
        assert_eq!(classify(&task(Some("Беклог")), &dir), SourceTag::Backlog);
        assert_eq!(classify(&task(Some("Backlog")), &dir), SourceTag::Backlog);
        assert_eq!(classify(&task(Some("Функционал")), &dir), SourceTag::Functionality);
        assert_eq!(
            classify(&task(Some("Spring campaign")), &dir),
            SourceTag::Content("Spring campaign".into())
        );
        assert_eq!(classify(&task(Some("   ")), &dir), SourceTag::Task);
        assert_eq!(classify(&task(Some("Задача")), &dir), SourceTag::Task);
        assert_eq!(classify(&task(None), &dir), SourceTag::Task);
    }

    #[test]
    fn classify_is_deterministic() {
        let dir = directory();
        let mut item = task(Some("Plan"));
        item.linkage.content_post = Some("c1".into());
        assert_eq!(classify(&item, &dir), classify(&item.clone(), &dir));
    }

    #[test]
    fn tones() {
        assert_eq!(SourceTag::Deal.tone(), Tone::Blue);
        assert_eq!(SourceTag::Process(None).tone(), Tone::Indigo);
        assert_eq!(SourceTag::Content("x".into()).tone(), Tone::Pink);
    }
}
