use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::model::item::WorkItem;
use crate::ops::kanban::DragState;
use crate::ops::table::AssigneeSummary;
use crate::tui::app::App;
use crate::util::unicode;

use super::helpers::contains;

/// Rows per card: title, meta line, gap
pub const CARD_H: u16 = 3;

/// What a screen position lands on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KanbanHit {
    Card { column: usize, index: usize },
    /// Empty space inside a column
    Column(usize),
}

/// One equal-width rect per status column.
pub fn column_areas(body: Rect, columns: usize) -> Vec<Rect> {
    if columns == 0 {
        return Vec::new();
    }
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, columns as u32); columns])
        .split(body)
        .to_vec()
}

fn inner(column: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(column)
}

/// Cards that fit in one column.
fn visible_cards(column: Rect) -> usize {
    (inner(column).height / CARD_H) as usize
}

/// First card drawn in a column. Only the selected column scrolls.
pub fn card_offset(selected: bool, row: usize, visible: usize) -> usize {
    if !selected || visible == 0 {
        return 0;
    }
    row.saturating_sub(visible - 1)
}

/// Resolve a position to a card or column. `counts` holds the number of
/// cards per column.
pub fn hit_test(
    body: Rect,
    counts: &[usize],
    selected: (usize, usize),
    x: u16,
    y: u16,
) -> Option<KanbanHit> {
    let areas = column_areas(body, counts.len());
    let column = areas.iter().position(|a| contains(*a, x, y))?;
    let area = inner(areas[column]);
    if !contains(area, x, y) {
        return Some(KanbanHit::Column(column));
    }
    let offset = card_offset(column == selected.0, selected.1, visible_cards(areas[column]));
    let index = offset + ((y - area.y) / CARD_H) as usize;
    if index < counts[column] && (y - area.y) % CARD_H < CARD_H - 1 {
        Some(KanbanHit::Card { column, index })
    } else {
        Some(KanbanHit::Column(column))
    }
}

pub fn render_kanban_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let columns = app.orch.kanban_columns();
    if columns.is_empty() {
        let line = Line::from(Span::styled(
            "  No statuses configured",
            Style::default().fg(app.theme.dim).bg(bg),
        ));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let dragged = app.drag.active_item();
    let drop_column = match app.drag.state() {
        DragState::Dragging { position, .. } => column_areas(area, columns.len())
            .iter()
            .position(|a| contains(*a, position.x as u16, position.y as u16)),
        _ => None,
    };

    for (ci, (column, rect)) in columns
        .iter()
        .zip(column_areas(area, columns.len()))
        .enumerate()
    {
        let tone = app.theme.tone(column.tone);
        let is_selected_col = ci == app.kanban_col;
        let border = if drop_column == Some(ci) {
            app.theme.highlight
        } else if is_selected_col {
            app.theme.selection_border
        } else {
            app.theme.dim
        };
        let title = Line::from(vec![
            Span::styled(
                format!(" {} ", column.status),
                Style::default().fg(tone).bg(bg).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} ", column.items.len()),
                Style::default().fg(app.theme.dim).bg(bg),
            ),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border).bg(bg))
            .style(Style::default().bg(bg))
            .title(title);
        let inner_area = block.inner(rect);
        frame.render_widget(block, rect);

        let visible = visible_cards(rect);
        let offset = card_offset(is_selected_col, app.kanban_row, visible);
        let width = inner_area.width as usize;
        let mut lines: Vec<Line> = Vec::new();
        for (ri, item) in column.items.iter().enumerate().skip(offset).take(visible) {
            let selected = is_selected_col && ri == app.kanban_row;
            let ghost = dragged == Some(item.id.as_str());
            lines.extend(card_lines(app, item, selected, ghost, width));
        }
        frame.render_widget(Paragraph::new(lines), inner_area);
    }
}

fn card_lines<'a>(app: &App, item: &WorkItem, selected: bool, ghost: bool, width: usize) -> Vec<Line<'a>> {
    let card_bg = if selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let title_fg = if ghost {
        app.theme.dim
    } else if selected {
        app.theme.text_bright
    } else {
        app.theme.text
    };

    let title = Span::styled(
        unicode::pad_to_width(&item.title, width),
        Style::default().fg(title_fg).bg(card_bg),
    );

    let mut meta: Vec<String> = Vec::new();
    if let Some(priority) = &item.priority {
        meta.push(priority.clone());
    }
    let assignees = AssigneeSummary::from_item(item, app.orch.directory()).label();
    if !assignees.is_empty() {
        meta.push(assignees);
    }
    if let Some(end) = &item.end_date {
        meta.push(end.clone());
    }
    let meta = Span::styled(
        unicode::pad_to_width(&meta.join(" \u{00B7} "), width),
        Style::default().fg(app.theme.dim).bg(card_bg),
    );

    vec![Line::from(title), Line::from(meta), Line::from("")]
}
