use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::filter::Scope;
use crate::ops::table::TableRow;
use crate::tui::app::App;
use crate::util::unicode;

use super::helpers::fill_line;

const SOURCE_W: usize = 14;
const STATUS_W: usize = 14;
const PRIORITY_W: usize = 10;
const ASSIGNEES_W: usize = 16;
const PROJECT_W: usize = 14;
const DUE_W: usize = 11;
const MIN_TITLE_W: usize = 12;

/// First row shown when `cursor` is selected and `visible` rows fit.
pub fn table_offset(cursor: usize, visible: usize) -> usize {
    if visible == 0 {
        return 0;
    }
    cursor.saturating_sub(visible - 1)
}

/// Row index under screen row `y`, for mouse selection. The first body
/// row is the header.
pub fn row_at(body: Rect, y: u16, cursor: usize, rows: usize) -> Option<usize> {
    if y <= body.y || y >= body.y + body.height {
        return None;
    }
    let visible = body.height.saturating_sub(1) as usize;
    let index = table_offset(cursor, visible) + (y - body.y - 1) as usize;
    (index < rows).then_some(index)
}

fn show_source(app: &App) -> bool {
    app.orch.filters().scope == Scope::Aggregator
}

fn title_width(total: usize, with_source: bool) -> usize {
    let fixed = 2
        + STATUS_W
        + PRIORITY_W
        + ASSIGNEES_W
        + PROJECT_W
        + DUE_W
        + if with_source { SOURCE_W } else { 0 };
    total.saturating_sub(fixed).max(MIN_TITLE_W)
}

pub fn render_table_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let with_source = show_source(app);
    let title_w = title_width(width, with_source);
    let rows = app.orch.table_rows();

    let mut lines: Vec<Line> = Vec::new();

    // Header
    let header_style = Style::default()
        .fg(app.theme.dim)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let mut header = vec![
        Span::styled("  ", header_style),
        Span::styled(unicode::pad_to_width("Title", title_w), header_style),
    ];
    if with_source {
        header.push(Span::styled(unicode::pad_to_width("Source", SOURCE_W), header_style));
    }
    for (label, w) in [
        ("Status", STATUS_W),
        ("Priority", PRIORITY_W),
        ("Assignees", ASSIGNEES_W),
        ("Project", PROJECT_W),
        ("Due", DUE_W),
    ] {
        header.push(Span::styled(unicode::pad_to_width(label, w), header_style));
    }
    fill_line(&mut header, width, Style::default().bg(bg));
    lines.push(Line::from(header));

    if rows.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No items match the current filters",
            Style::default().fg(app.theme.dim).bg(bg),
        )));
        frame.render_widget(Paragraph::new(lines), area);
        return;
    }

    let visible = area.height.saturating_sub(1) as usize;
    let offset = table_offset(app.table_cursor, visible);
    for (i, row) in rows.iter().enumerate().skip(offset).take(visible) {
        lines.push(render_row(app, row, i == app.table_cursor, title_w, with_source, width));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_row<'a>(
    app: &App,
    row: &TableRow,
    selected: bool,
    title_w: usize,
    with_source: bool,
    width: usize,
) -> Line<'a> {
    let row_bg = if selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };
    let base = Style::default().fg(app.theme.text).bg(row_bg);
    let dim = Style::default().fg(app.theme.dim).bg(row_bg);

    let mut spans = vec![Span::styled(
        if selected { "\u{258E} " } else { "  " },
        Style::default().fg(app.theme.selection_border).bg(row_bg),
    )];
    let title_style = if selected {
        base.fg(app.theme.text_bright).add_modifier(Modifier::BOLD)
    } else {
        base
    };
    spans.push(Span::styled(unicode::pad_to_width(&row.title, title_w), title_style));

    if with_source {
        let (label, style) = match &row.source {
            Some(tag) => (tag.label().to_string(), base.fg(app.theme.tone(tag.tone()))),
            None => (String::new(), dim),
        };
        spans.push(Span::styled(unicode::pad_to_width(&label, SOURCE_W), style));
    }

    for (cell, w) in [(&row.status, STATUS_W), (&row.priority, PRIORITY_W)] {
        match cell {
            Some(cell) => spans.push(Span::styled(
                unicode::pad_to_width(&cell.value, w),
                base.fg(app.theme.tone(cell.tone)),
            )),
            None => spans.push(Span::styled(unicode::pad_to_width("\u{2014}", w), dim)),
        }
    }

    spans.push(Span::styled(
        unicode::pad_to_width(&row.assignees.label(), ASSIGNEES_W),
        base,
    ));
    spans.push(Span::styled(unicode::pad_to_width(&row.project, PROJECT_W), base));

    match &row.due {
        Some(due) => {
            let style = if due.overdue {
                base.fg(app.theme.red)
            } else {
                base
            };
            spans.push(Span::styled(unicode::pad_to_width(&due.date, DUE_W), style));
        }
        None => spans.push(Span::styled(unicode::pad_to_width("", DUE_W), dim)),
    }

    fill_line(&mut spans, width, Style::default().bg(row_bg));
    Line::from(spans)
}
