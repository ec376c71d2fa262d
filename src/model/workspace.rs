use std::path::PathBuf;

use super::config::WorkspaceConfig;
use super::item::WorkItem;

/// A fully loaded workspace
#[derive(Debug)]
pub struct Workspace {
    /// Directory containing `.workboard/`
    pub root: PathBuf,
    /// Path to the `.workboard/` directory
    pub board_dir: PathBuf,
    /// Parsed workspace.toml
    pub config: WorkspaceConfig,
    /// Every stored item, archived ones included, in file order
    pub items: Vec<WorkItem>,
}

impl Workspace {
    pub fn items_path(&self) -> PathBuf {
        self.board_dir.join("items.json")
    }

    pub fn find_item(&self, id: &str) -> Option<&WorkItem> {
        self.items.iter().find(|i| i.id == id)
    }
}
