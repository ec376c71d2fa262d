use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::item::{ItemKind, WorkItem};

use super::classify::{is_backlog_label, is_functionality_label, is_reserved_label, is_task_label};

/// Which slice of the item family a view works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The cross-source task list: ideas and features live elsewhere
    Aggregator,
    /// A single-kind board (backlog of ideas, feature board)
    Kind(ItemKind),
}

impl Scope {
    fn admits(self, kind: ItemKind) -> bool {
        match self {
            Scope::Aggregator => kind == ItemKind::Task,
            Scope::Kind(k) => k == kind,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CompletedVisibility {
    #[default]
    Hide,
    Show,
}

impl CompletedVisibility {
    pub fn as_str(self) -> &'static str {
        match self {
            CompletedVisibility::Hide => "hide",
            CompletedVisibility::Show => "show",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "hide" => Some(CompletedVisibility::Hide),
            "show" => Some(CompletedVisibility::Show),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            CompletedVisibility::Hide => CompletedVisibility::Show,
            CompletedVisibility::Show => CompletedVisibility::Hide,
        }
    }
}

/// Source filter value. The pseudo-values test structural linkage; any other
/// string matches the legacy `source` label literally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFilter {
    Deal,
    Process,
    Content,
    Backlog,
    Functionality,
    Task,
    Label(String),
}

impl SourceFilter {
    pub fn parse(s: &str) -> SourceFilter {
        match s {
            "deal" => SourceFilter::Deal,
            "process" => SourceFilter::Process,
            "content" => SourceFilter::Content,
            "backlog" => SourceFilter::Backlog,
            "functionality" => SourceFilter::Functionality,
            "task" => SourceFilter::Task,
            other => SourceFilter::Label(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SourceFilter::Deal => "deal",
            SourceFilter::Process => "process",
            SourceFilter::Content => "content",
            SourceFilter::Backlog => "backlog",
            SourceFilter::Functionality => "functionality",
            SourceFilter::Task => "task",
            SourceFilter::Label(label) => label,
        }
    }

    pub fn matches(&self, item: &WorkItem) -> bool {
        let source = item.source.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match self {
            SourceFilter::Deal => item.linkage.deal.is_some(),
            SourceFilter::Process => item.linkage.process.is_some(),
            SourceFilter::Content => {
                item.linkage.content_post.is_some()
                    || source.is_some_and(|s| !is_reserved_label(s))
            }
            SourceFilter::Backlog => source.is_some_and(is_backlog_label),
            SourceFilter::Functionality => source.is_some_and(is_functionality_label),
            SourceFilter::Task => source.is_none_or(is_task_label),
            SourceFilter::Label(label) => source == Some(label.as_str()),
        }
    }
}

/// Declarative filter set. Every predicate is independent; an item must
/// satisfy all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub scope: Scope,
    pub completed: CompletedVisibility,
    pub status: Option<String>,
    pub priority: Option<String>,
    /// User id that must be among the item's assignees
    pub assignee: Option<String>,
    pub project: Option<String>,
    pub category: Option<String>,
    pub source: Option<SourceFilter>,
    /// Case-insensitive pattern over title and description
    pub search: Option<String>,
}

impl Default for FilterState {
    fn default() -> Self {
        FilterState::for_scope(Scope::Aggregator)
    }
}

impl FilterState {
    /// Fresh filters for a scope. The task list hides completed work by
    /// default; single-kind boards show everything.
    pub fn for_scope(scope: Scope) -> Self {
        FilterState {
            scope,
            completed: match scope {
                Scope::Aggregator => CompletedVisibility::Hide,
                Scope::Kind(_) => CompletedVisibility::Show,
            },
            status: None,
            priority: None,
            assignee: None,
            project: None,
            category: None,
            source: None,
            search: None,
        }
    }

    /// Reset every predicate to the scope default.
    pub fn clear(&mut self) {
        *self = FilterState::for_scope(self.scope);
    }

    /// Number of predicates that differ from the scope default.
    pub fn active_filter_count(&self) -> usize {
        let default = FilterState::for_scope(self.scope);
        [
            self.completed != default.completed,
            self.status.is_some(),
            self.priority.is_some(),
            self.assignee.is_some(),
            self.project.is_some(),
            self.category.is_some(),
            self.source.is_some(),
            self.search.as_deref().is_some_and(|s| !s.is_empty()),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0
    }

    /// Compile the search pattern. Invalid regexes fall back to a literal match.
    pub fn search_regex(&self) -> Option<Regex> {
        let pattern = self.search.as_deref().filter(|s| !s.is_empty())?;
        Regex::new(&format!("(?i){}", pattern))
            .or_else(|_| Regex::new(&format!("(?i){}", regex::escape(pattern))))
            .ok()
    }

    fn admits(&self, item: &WorkItem, completed_statuses: &[String], search: Option<&Regex>) -> bool {
        if item.archived || !self.scope.admits(item.kind) {
            return false;
        }
        if self.completed == CompletedVisibility::Hide
            && item
                .status
                .as_ref()
                .is_some_and(|s| completed_statuses.contains(s))
        {
            return false;
        }
        if let Some(status) = &self.status
            && item.status.as_ref() != Some(status)
        {
            return false;
        }
        if let Some(priority) = &self.priority
            && item.priority.as_ref() != Some(priority)
        {
            return false;
        }
        if let Some(assignee) = &self.assignee
            && !item.has_assignee(assignee)
        {
            return false;
        }
        if let Some(project) = &self.project
            && item.project.as_ref() != Some(project)
        {
            return false;
        }
        if let Some(category) = &self.category
            && item.category.as_ref() != Some(category)
        {
            return false;
        }
        if let Some(source) = &self.source
            && !source.matches(item)
        {
            return false;
        }
        if let Some(re) = search {
            let in_title = re.is_match(&item.title);
            let in_description = item.description.as_deref().is_some_and(|d| re.is_match(d));
            if !in_title && !in_description {
                return false;
            }
        }
        true
    }
}

/// Items that pass every filter, in their original relative order.
pub fn apply_filters<'a>(
    items: &'a [WorkItem],
    filters: &FilterState,
    completed_statuses: &[String],
) -> Vec<&'a WorkItem> {
    let search = filters.search_regex();
    items
        .iter()
        .filter(|item| filters.admits(item, completed_statuses, search.as_ref()))
        .collect()
}

/// Free-text source labels present in the collection, first-seen order,
/// for populating the source filter.
pub fn unique_sources(items: &[WorkItem]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for item in items {
        if let Some(source) = item.source.as_deref().map(str::trim)
            && !source.is_empty()
            && !is_reserved_label(source)
            && !seen.iter().any(|s| s == source)
        {
            seen.push(source.to_string());
        }
    }
    seen
}
