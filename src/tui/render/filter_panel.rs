use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::{App, FilterRow};
use crate::util::unicode;

use super::helpers::{centered_rect, fill_line};

const PANEL_W: u16 = 44;
const LABEL_W: usize = 11;

/// Display text for a row's current value.
pub fn value_label(app: &App, row: FilterRow) -> String {
    let Some(value) = app.filter_value(row) else {
        return "any".to_string();
    };
    match row {
        FilterRow::Assignee => app
            .orch
            .directory()
            .user(&value)
            .map_or(value.clone(), |u| u.name.clone()),
        FilterRow::Project => app
            .orch
            .directory()
            .project(&value)
            .map_or(value.clone(), |p| p.name.clone()),
        _ => value,
    }
}

pub fn render_filter_panel(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let popup = centered_rect(PANEL_W, FilterRow::ALL.len() as u16 + 2, area);
    let inner_w = popup.width.saturating_sub(2) as usize;

    let lines: Vec<Line> = FilterRow::ALL
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let selected = i == app.filter_cursor;
            let row_bg = if selected { app.theme.selection_bg } else { bg };
            let value = value_label(app, *row);
            let value_style = if value == "any" {
                Style::default().fg(app.theme.dim).bg(row_bg)
            } else {
                Style::default()
                    .fg(app.theme.text_bright)
                    .bg(row_bg)
                    .add_modifier(Modifier::BOLD)
            };
            let mut spans = vec![
                Span::styled(
                    if selected { " \u{25B6} " } else { "   " },
                    Style::default().fg(app.theme.highlight).bg(row_bg),
                ),
                Span::styled(
                    unicode::pad_to_width(row.label(), LABEL_W),
                    Style::default().fg(app.theme.text).bg(row_bg),
                ),
                Span::styled(
                    unicode::truncate_to_width(&value, inner_w.saturating_sub(LABEL_W + 3)),
                    value_style,
                ),
            ];
            fill_line(&mut spans, inner_w, Style::default().bg(row_bg));
            Line::from(spans)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
        .style(Style::default().bg(bg))
        .title(" Filters ");
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::Mode;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn shows_rows_and_values() {
        let mut app = sample_app();
        app.mode = Mode::Filter;
        app.orch.update_filters(|f| f.project = Some("web".into()));
        let output = render_to_string(TERM_W, TERM_H, |frame, area| {
            render_filter_panel(frame, &app, area);
        });
        assert!(output.contains("Filters"));
        assert!(output.contains("Website"));
        assert!(output.contains("hide"));
        assert!(output.contains("any"));
    }

    #[test]
    fn unknown_ids_show_raw() {
        let mut app = sample_app();
        app.orch.update_filters(|f| f.assignee = Some("ghost".into()));
        assert_eq!(value_label(&app, FilterRow::Assignee), "ghost");
        assert_eq!(value_label(&app, FilterRow::Status), "any");
    }
}
