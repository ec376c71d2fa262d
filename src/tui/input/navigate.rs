use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::orchestrator::ViewMode;
use crate::ops::table::PickerKind;
use crate::tui::app::{App, Mode};
use crate::tui::render::gantt_view;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    app.message = None;
    app.orch.clear_last_error();

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('1') => app.set_view(ViewMode::Table),
        KeyCode::Char('2') => app.set_view(ViewMode::Kanban),
        KeyCode::Char('3') => app.set_view(ViewMode::Gantt),
        KeyCode::Tab => app.set_view(app.orch.mode().next()),
        KeyCode::Char('v') => app.cycle_scope(),
        KeyCode::Char('f') => {
            app.filter_cursor = 0;
            app.mode = Mode::Filter;
        }
        KeyCode::Char('c') => app.clear_filters(),
        KeyCode::Char('b') => app.toggle_sidebar(),
        KeyCode::Char('D') => app.toggle_dark_mode(),
        _ => match app.orch.mode() {
            ViewMode::Table => handle_table(app, key),
            ViewMode::Kanban => handle_kanban(app, key),
            ViewMode::Gantt => handle_gantt(app, key),
        },
    }
}

fn handle_table(app: &mut App, key: KeyEvent) {
    let rows = app.orch.visible_items().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.table_cursor + 1 < rows {
                app.table_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => app.table_cursor = app.table_cursor.saturating_sub(1),
        KeyCode::Char('g') | KeyCode::Home => app.table_cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.table_cursor = rows.saturating_sub(1),
        KeyCode::Char('s') => app.open_picker(PickerKind::Status),
        KeyCode::Char('p') => app.open_picker(PickerKind::Priority),
        KeyCode::Char('m') => app.open_picker(PickerKind::Project),
        KeyCode::Char('a') => app.open_picker(PickerKind::Assignee),
        KeyCode::Char('d') => app.open_picker(PickerKind::DueDate),
        KeyCode::Char('x') => app.archive_selected(),
        KeyCode::Char('t') => app.take_selected(),
        KeyCode::Char('n') => app.new_item(None),
        KeyCode::Enter => {
            if let Some(id) = app.selected_id() {
                app.open_editor(&id);
            }
        }
        _ => {}
    }
}

fn handle_kanban(app: &mut App, key: KeyEvent) {
    let columns = app.orch.kanban_columns();
    let column_count = columns.len();
    let cards = columns.get(app.kanban_col).map_or(0, |c| c.items.len());
    let column_status = columns.get(app.kanban_col).map(|c| c.status.clone());
    drop(columns);

    match key.code {
        KeyCode::Char('h') | KeyCode::Left => {
            app.kanban_col = app.kanban_col.saturating_sub(1);
            app.clamp_cursors();
        }
        KeyCode::Char('l') | KeyCode::Right => {
            if app.kanban_col + 1 < column_count {
                app.kanban_col += 1;
            }
            app.clamp_cursors();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.kanban_row + 1 < cards {
                app.kanban_row += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => app.kanban_row = app.kanban_row.saturating_sub(1),
        KeyCode::Char('H') => app.move_card(-1),
        KeyCode::Char('L') => app.move_card(1),
        KeyCode::Char('n') => app.new_item(column_status.as_deref()),
        KeyCode::Char('t') => app.take_selected(),
        KeyCode::Enter => {
            if let Some(id) = app.selected_id() {
                app.open_editor(&id);
            }
        }
        _ => {}
    }
}

fn handle_gantt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.gantt_scroll += 1,
        KeyCode::Char('k') | KeyCode::Up => app.gantt_scroll = app.gantt_scroll.saturating_sub(1),
        KeyCode::Char('g') | KeyCode::Home => app.gantt_scroll = 0,
        KeyCode::Char('n') => app.new_item(None),
        _ => {}
    }
    let rows = gantt_view::row_count(&app.orch.gantt_layout());
    app.gantt_scroll = app.gantt_scroll.min(rows.saturating_sub(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::KeyValueStore;
    use crate::model::item::{ItemKind, WorkItem};
    use crate::tui::input::handle_key;
    use crate::tui::input::test_keys::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn view_keys_switch_and_persist() {
        let mut app = sample_app();
        handle_key(&mut app, ch('2'));
        assert_eq!(app.orch.mode(), ViewMode::Kanban);
        assert_eq!(app.orch.prefs().get("view_mode").as_deref(), Some("kanban"));
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.orch.mode(), ViewMode::Gantt);
        handle_key(&mut app, ch('1'));
        assert_eq!(app.orch.mode(), ViewMode::Table);
    }

    #[test]
    fn sidebar_and_theme_persist() {
        let mut app = sample_app();
        assert!(!app.sidebar);
        handle_key(&mut app, ch('b'));
        assert!(app.sidebar);
        assert_eq!(app.orch.prefs().get_bool("sidebar_collapsed"), Some(false));

        let background = app.theme.background;
        handle_key(&mut app, ch('D'));
        assert!(!app.dark_mode);
        assert_ne!(app.theme.background, background);
        assert_eq!(app.orch.prefs().get_bool("dark_mode"), Some(false));
    }

    #[test]
    fn table_cursor_stays_in_bounds() {
        let mut app = sample_app();
        // Three open tasks visible
        for _ in 0..5 {
            handle_key(&mut app, ch('j'));
        }
        assert_eq!(app.table_cursor, 2);
        handle_key(&mut app, ch('g'));
        assert_eq!(app.table_cursor, 0);
        handle_key(&mut app, ch('k'));
        assert_eq!(app.table_cursor, 0);
    }

    #[test]
    fn opening_a_picker_closes_the_other() {
        let mut app = sample_app();
        handle_key(&mut app, ch('s'));
        assert_eq!(app.mode, Mode::Picker);
        assert_eq!(app.picker.as_ref().map(|p| p.kind), Some(PickerKind::Status));
        handle_key(&mut app, key(KeyCode::Esc));
        handle_key(&mut app, ch('p'));
        assert_eq!(app.picker.as_ref().map(|p| p.kind), Some(PickerKind::Priority));
        assert!(app.cells.is_open("t1", PickerKind::Priority));
        assert!(!app.cells.is_open("t1", PickerKind::Status));
    }

    #[test]
    fn kanban_move_right_updates_status() {
        let mut app = sample_app();
        handle_key(&mut app, ch('2'));
        handle_key(&mut app, ch('L'));
        assert_eq!(app.orch.item("t1").unwrap().status.as_deref(), Some("В работе"));
        // Selection follows the card
        assert_eq!(app.kanban_col, 1);
        assert_eq!(app.selected_id().as_deref(), Some("t1"));
    }

    #[test]
    fn kanban_new_uses_column_status() {
        let mut app = sample_app();
        handle_key(&mut app, ch('2'));
        handle_key(&mut app, ch('l'));
        handle_key(&mut app, ch('n'));
        assert_eq!(app.mode, Mode::Editor);
        let state = app.editor.as_ref().unwrap();
        assert!(state.editor.is_new());
        assert_eq!(state.editor.fields.status, "В работе");
    }

    #[test]
    fn archive_requires_admin() {
        let mut app = sample_app();
        handle_key(&mut app, ch('x'));
        assert!(app.orch.item("t1").unwrap().archived);

        let mut config = test_config();
        config.workspace.current_user = Some("bob".into());
        app.orch.reload_config(config);
        handle_key(&mut app, ch('x'));
        assert!(app.message.is_some());
        assert!(!app.orch.item("t2").unwrap().archived);
    }

    #[test]
    fn scope_cycle_and_take() {
        let mut items = sample_items();
        items.push(WorkItem::new("i1", ItemKind::Idea, "Dark mode"));
        let mut app = app_with(items);
        handle_key(&mut app, ch('v'));
        assert_eq!(app.selected_id().as_deref(), Some("i1"));
        handle_key(&mut app, ch('t'));
        assert!(app.message.as_deref().is_some_and(|m| m.contains("from i1")));
        assert_eq!(app.orch.items().len(), 6);
    }
}
