pub mod editor_popup;
pub mod filter_panel;
pub mod gantt_view;
pub mod helpers;
pub mod kanban_view;
pub mod picker_popup;
pub mod sidebar;
pub mod status_row;
pub mod tab_bar;
pub mod table_view;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, Mode};
use crate::ops::orchestrator::ViewMode;

/// Split the screen: tab bar (2 rows) | content | status row (1 row)
pub fn screen_layout(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tab bar + separator
            Constraint::Min(1),    // content area
            Constraint::Length(1), // status row
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Content area for a full-screen `area`. Mouse hit-testing uses this too.
pub fn body_area(area: Rect) -> Rect {
    screen_layout(area)[1]
}

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let [tabs, body, status] = screen_layout(area);
    tab_bar::render_tab_bar(frame, app, tabs);

    let (view, side) = sidebar::split(app, body);
    match app.orch.mode() {
        ViewMode::Table => table_view::render_table_view(frame, app, view),
        ViewMode::Kanban => kanban_view::render_kanban_view(frame, app, view),
        ViewMode::Gantt => gantt_view::render_gantt_view(frame, app, view),
    }
    if let Some(side) = side {
        sidebar::render_sidebar(frame, app, side);
    }

    match app.mode {
        Mode::Picker | Mode::DueInput => picker_popup::render_picker(frame, app, area),
        Mode::Filter => filter_panel::render_filter_panel(frame, app, area),
        Mode::Editor | Mode::ConfirmClose => editor_popup::render_editor(frame, app, area),
        Mode::Navigate => {}
    }

    status_row::render_status_row(frame, app, status);
}
