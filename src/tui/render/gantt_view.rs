use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::gantt::{GanttLayout, MonthTick};
use crate::tui::app::App;
use crate::util::unicode;

use super::helpers::fill_line;

/// Width of the lane/title column left of the track
pub const LABEL_W: usize = 24;

/// Number of scrollable rows (lane headers plus bars) below the month header.
pub fn row_count(layout: &GanttLayout) -> usize {
    layout.lanes.iter().map(|l| 1 + l.bars.len()).sum()
}

/// Month labels placed at their axis offsets on a `track` wide header.
pub fn month_header(months: &[MonthTick], track: usize) -> String {
    let mut header = " ".repeat(track);
    let mut next_free = 0;
    for tick in months {
        let col = ((tick.left / 100.0) * track as f64).round() as usize;
        if col < next_free || col >= track {
            continue;
        }
        let label = format!("\u{2502}{}", tick.label);
        let label = unicode::truncate_to_width(&label, track - col);
        let width = unicode::display_width(&label);
        let before: String = header.chars().take(col).collect();
        let after: String = header.chars().skip(col + width).collect();
        header = format!("{}{}{}", before, label, after);
        next_free = col + width + 1;
    }
    header
}

pub fn render_gantt_view(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let layout = app.orch.gantt_layout();
    let track = width.saturating_sub(LABEL_W);
    let bg_style = Style::default().bg(bg);
    let dim = Style::default().fg(app.theme.dim).bg(bg);

    let mut lines: Vec<Line> = Vec::new();
    let mut header = vec![
        Span::styled(unicode::pad_to_width("", LABEL_W), bg_style),
        Span::styled(month_header(&layout.months, track), dim),
    ];
    fill_line(&mut header, width, bg_style);
    lines.push(Line::from(header));

    if layout.lanes.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No scheduled items (set start and end dates to plot them)",
            dim,
        )));
        frame.render_widget(Paragraph::new(lines), area);
        return;
    }

    let mut rows: Vec<Line> = Vec::new();
    for lane in &layout.lanes {
        let mut spans = vec![Span::styled(
            unicode::pad_to_width(&format!("{} ({})", lane.label, lane.bars.len()), LABEL_W),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )];
        fill_line(&mut spans, width, bg_style);
        rows.push(Line::from(spans));

        for bar in &lane.bars {
            let tone = bar
                .status
                .as_deref()
                .map(|s| app.theme.tone(app.orch.vocab().status_tone(s)))
                .unwrap_or(app.theme.dim);
            let (start, len) = bar.cells(track);
            let mut spans = vec![
                Span::styled(
                    unicode::pad_to_width(&format!("  {}", bar.title), LABEL_W),
                    Style::default().fg(app.theme.text).bg(bg),
                ),
                Span::styled(" ".repeat(start), bg_style),
                Span::styled("\u{2588}".repeat(len), Style::default().fg(tone).bg(bg)),
            ];
            fill_line(&mut spans, width, bg_style);
            rows.push(Line::from(spans));
        }
    }

    let visible = area.height.saturating_sub(1) as usize;
    let scroll = app.gantt_scroll.min(rows.len().saturating_sub(1));
    lines.extend(rows.into_iter().skip(scroll).take(visible));
    frame.render_widget(Paragraph::new(lines), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;
    use chrono::NaiveDate;

    #[test]
    fn lanes_and_bars() {
        let app = sample_app();
        let output = render_to_string(TERM_W, 10, |frame, area| {
            render_gantt_view(frame, &app, area);
        });
        assert!(output.contains("Website (1)"));
        assert!(output.contains("No project (1)"));
        assert!(output.contains("Write copy"));
        assert!(output.contains('\u{2588}'));
        // Unscheduled items are not plotted
        assert!(!output.contains("Review docs"));
    }

    #[test]
    fn empty_layout_message() {
        let app = app_with(vec![task("t1", "Loose", "Не начато")]);
        let output = render_to_string(TERM_W, 5, |frame, area| {
            render_gantt_view(frame, &app, area);
        });
        assert!(output.contains("No scheduled items"));
    }

    #[test]
    fn month_labels_skip_overlaps() {
        let tick = |left: f64, label: &str| MonthTick {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            label: label.into(),
            left,
        };
        let header = month_header(&[tick(0.0, "Jan"), tick(5.0, "Feb"), tick(50.0, "Mar")], 20);
        assert_eq!(header, "\u{2502}Jan      \u{2502}Mar      ");
    }
}
