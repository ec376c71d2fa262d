use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::model::config::WorkspaceConfig;
use crate::model::item::WorkItem;
use crate::model::workspace::Workspace;

/// Name of the directory that marks a workspace root.
pub const BOARD_DIR: &str = ".workboard";
pub const CONFIG_FILE: &str = "workspace.toml";
pub const ITEMS_FILE: &str = "items.json";
pub const STATE_FILE: &str = ".state.json";
pub const LOG_FILE: &str = "workboard.log";

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a workboard workspace: no .workboard/ directory found (run `wb init`)")]
    NotAWorkspace,
    #[error("workspace already exists at {0}")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse workspace.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not parse {path}: {source}")]
    ItemsParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize items: {0}")]
    ItemsSerializeError(#[from] serde_json::Error),
}

/// Walk up from `start` looking for a directory containing `.workboard/workspace.toml`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        let board_dir = current.join(BOARD_DIR);
        if board_dir.is_dir() && board_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

pub fn board_dir(root: &Path) -> PathBuf {
    root.join(BOARD_DIR)
}

/// Load the config and every stored item of the workspace at `root`.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let board_dir = board_dir(root);
    if !board_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let config = read_config(&board_dir)?;
    let items = read_items(&board_dir)?;
    info!(
        root = %root.display(),
        items = items.len(),
        "loaded workspace"
    );
    Ok(Workspace {
        root: root.to_path_buf(),
        board_dir,
        config,
        items,
    })
}

pub fn read_config(board_dir: &Path) -> Result<WorkspaceConfig, WorkspaceError> {
    let path = board_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| WorkspaceError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Read `items.json`. A missing file is an empty collection. Records written
/// by older clients are normalized on the way in.
pub fn read_items(board_dir: &Path) -> Result<Vec<WorkItem>, WorkspaceError> {
    let path = board_dir.join(ITEMS_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(&path).map_err(|e| WorkspaceError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut items: Vec<WorkItem> =
        serde_json::from_str(&text).map_err(|e| WorkspaceError::ItemsParseError {
            path: path.clone(),
            source: e,
        })?;
    for item in &mut items {
        item.normalize();
    }
    Ok(items)
}

/// Replace `items.json` atomically.
pub fn write_items(board_dir: &Path, items: &[WorkItem]) -> Result<(), WorkspaceError> {
    let path = board_dir.join(ITEMS_FILE);
    let mut content = serde_json::to_string_pretty(items)?;
    content.push('\n');
    atomic_write(&path, content.as_bytes()).map_err(|e| WorkspaceError::WriteError {
        path: path.clone(),
        source: e,
    })?;
    debug!(path = %path.display(), items = items.len(), "wrote items");
    Ok(())
}

/// Create `.workboard/` under `root` with the given config text and an
/// empty item collection. Refuses to overwrite unless `force` is set.
pub fn init_workspace(root: &Path, config_text: &str, force: bool) -> Result<PathBuf, WorkspaceError> {
    let board_dir = board_dir(root);
    if board_dir.join(CONFIG_FILE).exists() && !force {
        return Err(WorkspaceError::AlreadyExists(board_dir));
    }
    // Validate before touching disk
    let _: WorkspaceConfig = toml::from_str(config_text)?;
    fs::create_dir_all(&board_dir).map_err(|e| WorkspaceError::WriteError {
        path: board_dir.clone(),
        source: e,
    })?;
    let config_path = board_dir.join(CONFIG_FILE);
    atomic_write(&config_path, config_text.as_bytes()).map_err(|e| WorkspaceError::WriteError {
        path: config_path,
        source: e,
    })?;
    if !board_dir.join(ITEMS_FILE).exists() {
        write_items(&board_dir, &[])?;
    }
    info!(path = %board_dir.display(), "initialized workspace");
    Ok(board_dir)
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
