use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::model::item::ItemKind;
use crate::model::vocab::Tone;
use crate::ops::filter::Scope;
use crate::ops::orchestrator::ViewMode;
use crate::tui::app::App;

use super::helpers::fill_line;

pub fn scope_label(scope: Scope) -> &'static str {
    match scope {
        Scope::Aggregator => "Tasks",
        Scope::Kind(ItemKind::Task) => "Tasks only",
        Scope::Kind(ItemKind::Idea) => "Ideas",
        Scope::Kind(ItemKind::Feature) => "Features",
    }
}

/// Render the tab bar: workspace name, view tabs and the filter badge,
/// with a separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    let mut spans: Vec<Span> = vec![
        Span::styled(" ", bg_style),
        Span::styled(
            "\u{25B6}",
            Style::default().fg(app.theme.highlight).bg(bg),
        ),
        Span::styled(
            format!(" {} ", app.workspace_name),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        sep.clone(),
        Span::styled(
            format!(" {} ", scope_label(app.orch.filters().scope)),
            Style::default().fg(app.theme.highlight).bg(bg),
        ),
        sep.clone(),
    ];

    for (i, mode) in ViewMode::ALL.iter().enumerate() {
        let is_current = app.orch.mode() == *mode;
        let style = if is_current {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.dim).bg(bg)
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, mode.label()), style));
        spans.push(sep.clone());
    }

    let active = app.orch.filters().active_filter_count();
    if active > 0 {
        spans.push(Span::styled(
            format!(" filters: {} ", active),
            Style::default().fg(app.theme.tone(Tone::Amber)).bg(bg),
        ));
    }
    fill_line(&mut spans, chunks[0].width as usize, bg_style);
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    let separator = "\u{2500}".repeat(chunks[1].width as usize);
    let line = Line::from(Span::styled(separator, Style::default().fg(app.theme.dim).bg(bg)));
    frame.render_widget(Paragraph::new(line), chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn shows_views_and_filter_badge() {
        let mut app = sample_app();
        app.orch.update_filters(|f| f.status = Some("В работе".into()));
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        let first = output.lines().next().unwrap();
        assert!(first.contains("Test"));
        assert!(first.contains("1 Table"));
        assert!(first.contains("2 Kanban"));
        assert!(first.contains("3 Gantt"));
        assert!(first.contains("filters:"));
        assert!(first.contains("Tasks"));
    }

    #[test]
    fn scope_follows_cycle() {
        let mut app = sample_app();
        app.cycle_scope();
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        assert!(output.contains("Ideas"));
    }

    #[test]
    fn no_badge_without_filters() {
        let mut app = sample_app();
        app.orch.clear_filters();
        let output = render_to_string(TERM_W, 2, |frame, area| {
            render_tab_bar(frame, &app, area);
        });
        assert!(!output.contains("filters:"));
    }
}
