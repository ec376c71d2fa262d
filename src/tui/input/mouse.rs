use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::ops::kanban::{Point, PointerEvent};
use crate::ops::orchestrator::ViewMode;
use crate::tui::app::{App, Mode};
use crate::tui::render::editor_popup::editor_area;
use crate::tui::render::helpers::contains;
use crate::tui::render::kanban_view::{KanbanHit, hit_test};
use crate::tui::render::picker_popup::{option_at, picker_area};
use crate::tui::render::{body_area, sidebar, table_view};

/// Handle a mouse event. `area` is the full terminal area.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent, area: Rect) {
    let (x, y) = (mouse.column, mouse.row);
    let pressed = matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left));

    match app.mode {
        Mode::Editor if pressed => {
            if !contains(editor_area(area), x, y) {
                app.request_close_editor();
            }
        }
        Mode::Picker if pressed => {
            let count = app.picker.as_ref().map_or(0, |p| p.options.len());
            let popup = picker_area(area, count);
            if !contains(popup, x, y) {
                app.dismiss_picker();
            } else if let Some(index) = option_at(popup, x, y, count) {
                if let Some(picker) = app.picker.as_mut() {
                    picker.cursor = index;
                }
                app.picker_choose();
            }
        }
        Mode::DueInput if pressed => {
            if !contains(picker_area(area, 1), x, y) {
                app.dismiss_picker();
            }
        }
        Mode::Navigate => handle_view_mouse(app, mouse, area),
        _ => {}
    }
}

fn handle_view_mouse(app: &mut App, mouse: MouseEvent, area: Rect) {
    let body = sidebar::split(app, body_area(area)).0;
    let (x, y) = (mouse.column, mouse.row);
    match app.orch.mode() {
        ViewMode::Table => match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let rows = app.orch.visible_items().len();
                if let Some(index) = table_view::row_at(body, y, app.table_cursor, rows) {
                    app.table_cursor = index;
                }
            }
            MouseEventKind::ScrollDown => {
                if app.table_cursor + 1 < app.orch.visible_items().len() {
                    app.table_cursor += 1;
                }
            }
            MouseEventKind::ScrollUp => app.table_cursor = app.table_cursor.saturating_sub(1),
            _ => {}
        },
        ViewMode::Kanban => {
            let at = Point::new(f64::from(x), f64::from(y));
            let event = match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    let Some(KanbanHit::Card { column, index }) = kanban_hit(app, body, x, y) else {
                        return;
                    };
                    app.kanban_col = column;
                    app.kanban_row = index;
                    let Some(item_id) = app.selected_id() else {
                        return;
                    };
                    PointerEvent::Down { item_id, at }
                }
                MouseEventKind::Drag(MouseButton::Left) => PointerEvent::Move { at },
                MouseEventKind::Up(MouseButton::Left) => {
                    let column = kanban_hit(app, body, x, y).and_then(|hit| {
                        let index = match hit {
                            KanbanHit::Card { column, .. } | KanbanHit::Column(column) => column,
                        };
                        app.orch.kanban_columns().get(index).map(|c| c.status.clone())
                    });
                    PointerEvent::Up { at, column }
                }
                _ => return,
            };
            app.pointer(event);
        }
        ViewMode::Gantt => match mouse.kind {
            MouseEventKind::ScrollDown => app.gantt_scroll += 1,
            MouseEventKind::ScrollUp => app.gantt_scroll = app.gantt_scroll.saturating_sub(1),
            _ => {}
        },
    }
}

fn kanban_hit(app: &App, body: Rect, x: u16, y: u16) -> Option<KanbanHit> {
    let counts: Vec<usize> = app
        .orch
        .kanban_columns()
        .iter()
        .map(|c| c.items.len())
        .collect();
    hit_test(body, &counts, (app.kanban_col, app.kanban_row), x, y)
}
