use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::orchestrator::ViewMode;
use crate::ops::table::PickerKind;
use crate::tui::app::{App, Mode};
use crate::util::unicode;

/// Key hints for the current mode and view.
pub fn hints(app: &App) -> &'static str {
    match app.mode {
        Mode::Navigate => match app.orch.mode() {
            ViewMode::Table => {
                "j/k move  s/p/m/a pick  d due  Enter open  x archive  n new  f filter  q quit"
            }
            ViewMode::Kanban => "h/l column  j/k card  H/L move  Enter open  n new  b details  f filter  q quit",
            ViewMode::Gantt => "j/k scroll  f filter  Tab view  D theme  q quit",
        },
        Mode::Picker => match app.picker.as_ref().map(|p| p.kind) {
            Some(PickerKind::Assignee) => "Space toggle  Enter/Esc close",
            _ => "j/k move  Enter select  Esc cancel",
        },
        Mode::DueInput => "YYYY-MM-DD  Enter set  empty clears  Esc cancel",
        Mode::Filter => "j/k row  h/l change  c clear  Esc close",
        Mode::Editor => "Tab next  h/l change  Space toggle  Ctrl-S save  Esc close",
        Mode::ConfirmClose => "y save  n discard",
    }
}

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (left, left_style) = match (&app.message, app.orch.last_error()) {
        (Some(msg), _) => (msg.clone(), Style::default().fg(app.theme.text_bright).bg(bg)),
        (None, Some(err)) => (err.to_string(), Style::default().fg(app.theme.red).bg(bg)),
        (None, None) => (hints(app).to_string(), Style::default().fg(app.theme.dim).bg(bg)),
    };

    let pending = app.orch.pending().len();
    let right = if pending > 0 {
        format!("{} unsaved ", pending)
    } else {
        String::new()
    };
    let right_width = unicode::display_width(&right);
    let left = unicode::truncate_to_width(&format!(" {}", left), width.saturating_sub(right_width));
    let padding = width.saturating_sub(unicode::display_width(&left) + right_width);

    let line = Line::from(vec![
        Span::styled(left, left_style),
        Span::styled(" ".repeat(padding), Style::default().bg(bg)),
        Span::styled(right, Style::default().fg(app.theme.red).bg(bg)),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}
