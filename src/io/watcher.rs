use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::debug;

use super::workspace_io::{CONFIG_FILE, ITEMS_FILE};

/// Something another process changed under `.workboard/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    ItemsChanged,
    ConfigChanged,
}

fn classify_path(path: &Path, board_dir: &Path) -> Option<BoardEvent> {
    if path.parent() != Some(board_dir) {
        return None;
    }
    match path.file_name()?.to_str()? {
        ITEMS_FILE => Some(BoardEvent::ItemsChanged),
        CONFIG_FILE => Some(BoardEvent::ConfigChanged),
        _ => None,
    }
}

/// Watches the board directory; the TUI polls it once per tick.
pub struct BoardWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<BoardEvent>,
}

impl BoardWatcher {
    pub fn start(board_dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let dir: PathBuf = board_dir.to_path_buf();

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else { return };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    return;
                }
                // Atomic writes land as a rename of a temp file onto the target
                for path in &event.paths {
                    if let Some(board_event) = classify_path(path, &dir) {
                        let _ = tx.send(board_event);
                    }
                }
            },
            Config::default(),
        )?;

        watcher.watch(board_dir, RecursiveMode::NonRecursive)?;
        debug!(path = %board_dir.display(), "watching board directory");
        Ok(BoardWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Drain pending events, collapsing duplicates.
    pub fn poll(&self) -> Vec<BoardEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            if !events.contains(&event) {
                events.push(event);
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_board_files_are_relevant() {
        let board = Path::new("/w/.workboard");
        assert_eq!(
            classify_path(&board.join("items.json"), board),
            Some(BoardEvent::ItemsChanged)
        );
        assert_eq!(
            classify_path(&board.join("workspace.toml"), board),
            Some(BoardEvent::ConfigChanged)
        );
        assert_eq!(classify_path(&board.join(".state.json"), board), None);
        assert_eq!(classify_path(&board.join(".lock"), board), None);
        assert_eq!(classify_path(Path::new("/w/items.json"), board), None);
    }
}
