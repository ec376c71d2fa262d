use std::hash::Hash;

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::item::WorkItem;
use crate::model::vocab::{Tone, Vocabulary};

/// Group key for optional fields: a named value or the explicit
/// "missing" bucket. Ordering of `IndexMap` results puts `Unassigned` last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum Bucket {
    Named(String),
    Unassigned,
}

impl Bucket {
    fn from_field(value: Option<&str>) -> Bucket {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(v) => Bucket::Named(v.to_string()),
            None => Bucket::Unassigned,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Bucket::Named(name) => Some(name),
            Bucket::Unassigned => None,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, Bucket::Unassigned)
    }
}

/// Group by an arbitrary key, preserving first-seen key order and the
/// relative order of items within each group.
pub fn group_by<'a, K, F>(items: &[&'a WorkItem], key: F) -> IndexMap<K, Vec<&'a WorkItem>>
where
    K: Eq + Hash,
    F: Fn(&WorkItem) -> K,
{
    let mut groups: IndexMap<K, Vec<&'a WorkItem>> = IndexMap::new();
    for item in items {
        groups.entry(key(item)).or_default().push(item);
    }
    groups
}

/// Move the `Unassigned` bucket (if any) behind every named bucket.
fn sink_unassigned<V>(groups: &mut IndexMap<Bucket, V>) {
    if let Some(index) = groups.get_index_of(&Bucket::Unassigned) {
        let last = groups.len() - 1;
        groups.move_index(index, last);
    }
}

pub fn group_by_project<'a>(items: &[&'a WorkItem]) -> IndexMap<Bucket, Vec<&'a WorkItem>> {
    let mut groups = group_by(items, |i| Bucket::from_field(i.project.as_deref()));
    sink_unassigned(&mut groups);
    groups
}

pub fn group_by_category<'a>(items: &[&'a WorkItem]) -> IndexMap<Bucket, Vec<&'a WorkItem>> {
    let mut groups = group_by(items, |i| Bucket::from_field(i.category.as_deref()));
    sink_unassigned(&mut groups);
    groups
}

/// Two-level project → category grouping used by the feature and idea boards.
pub fn group_by_project_and_category<'a>(
    items: &[&'a WorkItem],
) -> IndexMap<Bucket, IndexMap<Bucket, Vec<&'a WorkItem>>> {
    group_by_project(items)
        .into_iter()
        .map(|(project, members)| (project, group_by_category(&members)))
        .collect()
}

/// Items per status, in vocabulary order. Statuses with no items are kept
/// as empty groups; items whose status is not in the vocabulary are dropped.
pub fn group_by_status<'a>(
    items: &[&'a WorkItem],
    vocab: &Vocabulary,
) -> IndexMap<String, Vec<&'a WorkItem>> {
    let mut groups: IndexMap<String, Vec<&'a WorkItem>> = vocab
        .statuses
        .iter()
        .map(|s| (s.name.clone(), Vec::new()))
        .collect();
    for item in items {
        if let Some(bucket) = item.status.as_ref().and_then(|s| groups.get_mut(s)) {
            bucket.push(item);
        }
    }
    groups
}

/// Share of items whose status resolves to a green tone, as a rounded
/// percentage. An empty set is 0%.
pub fn progress(items: &[&WorkItem], vocab: &Vocabulary) -> u8 {
    if items.is_empty() {
        return 0;
    }
    let done = items
        .iter()
        .filter(|i| {
            i.status
                .as_deref()
                .is_some_and(|s| vocab.status_tone(s) == Tone::Emerald)
        })
        .count();
    ((done as f64 / items.len() as f64) * 100.0).round() as u8
}
