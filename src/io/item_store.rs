use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::model::item::{Comment, ItemDraft, ItemPatch, WorkItem};
use crate::model::vocab::Vocabulary;
use crate::ops::item_ops::{self, ID_PREFIX, ItemError};

use super::lock::BoardLock;
use super::store::StoreError;
use super::workspace_io::{read_items, write_items};

/// Persistence collaborator for work items. Calls are fire-and-forget from
/// the engine's point of view: it applies changes locally first and never
/// retries a failed call.
pub trait ItemStore {
    fn update_item(&mut self, id: &str, patch: &ItemPatch) -> Result<(), StoreError>;
    fn update_status(&mut self, id: &str, status: &str) -> Result<(), StoreError>;
    /// Persist a new item and return its assigned id.
    fn create_item(&mut self, draft: ItemDraft) -> Result<String, StoreError>;
    fn archive_item(&mut self, id: &str) -> Result<(), StoreError>;
    fn add_comment(&mut self, id: &str, comment: Comment) -> Result<(), StoreError>;
    /// Vocabulary used to default the status and priority of created items.
    fn set_vocabulary(&mut self, vocab: Vocabulary);
}

impl<T: ItemStore + ?Sized> ItemStore for Box<T> {
    fn update_item(&mut self, id: &str, patch: &ItemPatch) -> Result<(), StoreError> {
        (**self).update_item(id, patch)
    }

    fn update_status(&mut self, id: &str, status: &str) -> Result<(), StoreError> {
        (**self).update_status(id, status)
    }

    fn create_item(&mut self, draft: ItemDraft) -> Result<String, StoreError> {
        (**self).create_item(draft)
    }

    fn archive_item(&mut self, id: &str) -> Result<(), StoreError> {
        (**self).archive_item(id)
    }

    fn add_comment(&mut self, id: &str, comment: Comment) -> Result<(), StoreError> {
        (**self).add_comment(id, comment)
    }

    fn set_vocabulary(&mut self, vocab: Vocabulary) {
        (**self).set_vocabulary(vocab)
    }
}

/// `items.json`-backed store. Every call locks the board, re-reads the file,
/// applies one change and writes the file back atomically, so concurrent
/// writers resolve last-write-wins per call.
pub struct FileItemStore {
    board_dir: PathBuf,
    vocab: Vocabulary,
}

impl FileItemStore {
    pub fn new(board_dir: &Path, vocab: Vocabulary) -> Self {
        FileItemStore {
            board_dir: board_dir.to_path_buf(),
            vocab,
        }
    }

    fn modify<T>(
        &self,
        f: impl FnOnce(&mut Vec<WorkItem>) -> Result<T, ItemError>,
    ) -> Result<T, StoreError> {
        let _lock = BoardLock::acquire_default(&self.board_dir)?;
        let mut items = read_items(&self.board_dir)?;
        let result = f(&mut items)?;
        write_items(&self.board_dir, &items)?;
        Ok(result)
    }
}

fn find_mut<'a>(items: &'a mut [WorkItem], id: &str) -> Result<&'a mut WorkItem, ItemError> {
    items
        .iter_mut()
        .find(|i| i.id == id)
        .ok_or_else(|| ItemError::NotFound(id.to_string()))
}

impl ItemStore for FileItemStore {
    fn update_item(&mut self, id: &str, patch: &ItemPatch) -> Result<(), StoreError> {
        self.modify(|items| item_ops::apply_patch(items, id, patch))?;
        debug!(id, "updated item");
        Ok(())
    }

    fn update_status(&mut self, id: &str, status: &str) -> Result<(), StoreError> {
        self.update_item(id, &ItemPatch::status(status))
    }

    fn create_item(&mut self, draft: ItemDraft) -> Result<String, StoreError> {
        let vocab = self.vocab.clone();
        let id = self.modify(move |items| {
            let now = Utc::now();
            let id = item_ops::generate_id(ID_PREFIX, now, items);
            items.push(item_ops::materialize_draft(draft, id.clone(), &vocab, now));
            Ok(id)
        })?;
        info!(id = %id, "created item");
        Ok(id)
    }

    fn archive_item(&mut self, id: &str) -> Result<(), StoreError> {
        self.modify(|items| item_ops::apply_patch(items, id, &ItemPatch::archive()))?;
        info!(id, "archived item");
        Ok(())
    }

    fn add_comment(&mut self, id: &str, comment: Comment) -> Result<(), StoreError> {
        self.modify(|items| {
            find_mut(items, id)?.comments.push(comment);
            Ok(())
        })
    }

    fn set_vocabulary(&mut self, vocab: Vocabulary) {
        self.vocab = vocab;
    }
}

/// A call received by [`MemoryItemStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    UpdateItem(String, ItemPatch),
    UpdateStatus(String, String),
    CreateItem(ItemDraft),
    ArchiveItem(String),
    AddComment(String, String),
}

/// In-memory store that records every call. With `reject` set, every call
/// fails after being recorded.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    pub items: Vec<WorkItem>,
    pub calls: Vec<StoreCall>,
    pub reject: bool,
    vocab: Vocabulary,
}

impl MemoryItemStore {
    pub fn new(items: Vec<WorkItem>) -> Self {
        MemoryItemStore {
            items,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.reject {
            Err(StoreError::Rejected("store offline".into()))
        } else {
            Ok(())
        }
    }
}

impl ItemStore for MemoryItemStore {
    fn update_item(&mut self, id: &str, patch: &ItemPatch) -> Result<(), StoreError> {
        self.calls.push(StoreCall::UpdateItem(id.to_string(), patch.clone()));
        self.check()?;
        item_ops::apply_patch(&mut self.items, id, patch)?;
        Ok(())
    }

    fn update_status(&mut self, id: &str, status: &str) -> Result<(), StoreError> {
        self.calls
            .push(StoreCall::UpdateStatus(id.to_string(), status.to_string()));
        self.check()?;
        item_ops::apply_patch(&mut self.items, id, &ItemPatch::status(status))?;
        Ok(())
    }

    fn create_item(&mut self, draft: ItemDraft) -> Result<String, StoreError> {
        self.calls.push(StoreCall::CreateItem(draft.clone()));
        self.check()?;
        let id = format!("{}-{}", ID_PREFIX, self.items.len() + 1);
        let item = item_ops::materialize_draft(draft, id.clone(), &self.vocab, Utc::now());
        self.items.push(item);
        Ok(id)
    }

    fn archive_item(&mut self, id: &str) -> Result<(), StoreError> {
        self.calls.push(StoreCall::ArchiveItem(id.to_string()));
        self.check()?;
        item_ops::apply_patch(&mut self.items, id, &ItemPatch::archive())?;
        Ok(())
    }

    fn add_comment(&mut self, id: &str, comment: Comment) -> Result<(), StoreError> {
        self.calls
            .push(StoreCall::AddComment(id.to_string(), comment.text.clone()));
        self.check()?;
        find_mut(&mut self.items, id)?.comments.push(comment);
        Ok(())
    }

    fn set_vocabulary(&mut self, vocab: Vocabulary) {
        self.vocab = vocab;
    }
}
