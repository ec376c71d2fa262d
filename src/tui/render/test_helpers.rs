use chrono::NaiveDate;
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::item_store::{ItemStore, MemoryItemStore};
use crate::io::store::{KeyValueStore, MemoryStore};
use crate::model::config::WorkspaceConfig;
use crate::model::directory::{Project, Role, User};
use crate::model::item::{ItemKind, WorkItem};
use crate::ops::orchestrator::Orchestrator;
use crate::tui::app::App;

pub const TERM_W: u16 = 100;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
}

/// Config with an admin current user, one employee and one project.
pub fn test_config() -> WorkspaceConfig {
    let mut config = WorkspaceConfig::new("Test");
    config.workspace.current_user = Some("ann".into());
    config.users = vec![
        User {
            id: "ann".into(),
            name: "Ann".into(),
            role: Role::Admin,
            avatar: None,
        },
        User {
            id: "bob".into(),
            name: "Bob".into(),
            role: Role::Employee,
            avatar: None,
        },
    ];
    config.projects = vec![Project {
        id: "web".into(),
        name: "Website".into(),
        color: None,
    }];
    config
}

pub fn task(id: &str, title: &str, status: &str) -> WorkItem {
    let mut item = WorkItem::new(id, ItemKind::Task, title);
    item.status = Some(status.into());
    item.priority = Some("Средний".into());
    item
}

/// Three open tasks and one finished one.
pub fn sample_items() -> Vec<WorkItem> {
    let mut a = task("t1", "Write copy", "Не начато");
    a.project = Some("web".into());
    a.start_date = Some("2024-03-01".into());
    a.end_date = Some("2024-03-05".into());
    a.set_assignees(vec!["ann".into()]);
    let mut b = task("t2", "Fix login", "В работе");
    b.start_date = Some("2024-03-04".into());
    b.end_date = Some("2024-03-20".into());
    let c = task("t3", "Review docs", "На проверке");
    let d = task("t4", "Ship release", "Выполнено");
    vec![a, b, c, d]
}

pub fn app_with(items: Vec<WorkItem>) -> App {
    app_with_store(items.clone(), MemoryItemStore::new(items))
}

/// App over a caller-built store, e.g. one that rejects every call.
pub fn app_with_store(items: Vec<WorkItem>, store: MemoryItemStore) -> App {
    let store: Box<dyn ItemStore> = Box::new(store);
    let prefs: Box<dyn KeyValueStore> = Box::new(MemoryStore::default());
    App::new(Orchestrator::new(test_config(), items, store, prefs, today()))
}

pub fn sample_app() -> App {
    app_with(sample_items())
}
