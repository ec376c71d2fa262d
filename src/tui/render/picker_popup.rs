use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ops::table::PickerKind;
use crate::tui::app::{App, Mode};
use crate::util::unicode;

use super::helpers::{centered_rect, fill_line};

const POPUP_W: u16 = 36;

fn title(kind: PickerKind) -> &'static str {
    match kind {
        PickerKind::Status => " Status ",
        PickerKind::Priority => " Priority ",
        PickerKind::Project => " Project ",
        PickerKind::Assignee => " Assignees ",
        PickerKind::DueDate => " Due date ",
    }
}

/// Popup rect for a picker with `options` rows (borders included).
pub fn picker_area(area: Rect, options: usize) -> Rect {
    centered_rect(POPUP_W, options as u16 + 2, area)
}

/// Option index under a screen position, if any.
pub fn option_at(popup: Rect, x: u16, y: u16, options: usize) -> Option<usize> {
    if x <= popup.x || x + 1 >= popup.x + popup.width || y <= popup.y {
        return None;
    }
    let index = (y - popup.y - 1) as usize;
    (index < options).then_some(index)
}

pub fn render_picker(frame: &mut Frame, app: &App, area: Rect) {
    if app.mode == Mode::DueInput {
        render_due_input(frame, app, area);
        return;
    }
    let Some(picker) = &app.picker else {
        return;
    };
    let bg = app.theme.background;
    let popup = picker_area(area, picker.options.len());
    let inner_w = popup.width.saturating_sub(2) as usize;

    let assigned: Vec<String> = match picker.kind {
        PickerKind::Assignee => app
            .orch
            .item(&picker.item_id)
            .map(|item| item.assignee_ids().into_iter().map(str::to_string).collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let mut lines: Vec<Line> = Vec::new();
    for (i, option) in picker.options.iter().enumerate() {
        let selected = i == picker.cursor;
        let row_bg = if selected { app.theme.selection_bg } else { bg };
        let style = if selected {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(row_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text).bg(row_bg)
        };
        let indicator = if selected { " \u{25B6} " } else { "   " };
        let mut spans = vec![Span::styled(indicator, style)];
        if picker.kind == PickerKind::Assignee {
            let mark = if assigned.contains(&option.value) { "[x] " } else { "[ ] " };
            spans.push(Span::styled(mark, style));
        }
        let tone = match picker.kind {
            PickerKind::Status => Some(app.orch.vocab().status_tone(&option.value)),
            PickerKind::Priority => Some(app.orch.vocab().priority_tone(&option.value)),
            _ => None,
        };
        let label_style = match tone {
            Some(tone) => style.fg(app.theme.tone(tone)),
            None => style,
        };
        let used = spans.iter().map(|s| unicode::display_width(&s.content)).sum::<usize>();
        spans.push(Span::styled(
            unicode::truncate_to_width(&option.label, inner_w.saturating_sub(used)),
            label_style,
        ));
        fill_line(&mut spans, inner_w, Style::default().bg(row_bg));
        lines.push(Line::from(spans));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
        .style(Style::default().bg(bg))
        .title(title(picker.kind));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_due_input(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let popup = picker_area(area, 1);
    let line = Line::from(vec![
        Span::styled(" ", Style::default().bg(bg)),
        Span::styled(
            app.due_input.clone(),
            Style::default().fg(app.theme.text_bright).bg(bg),
        ),
        Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
        .style(Style::default().bg(bg))
        .title(title(PickerKind::DueDate));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(line).block(block), popup);
}
