use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::ops::classify::classify;
use crate::ops::orchestrator::ViewMode;
use crate::tui::app::App;

pub const SIDEBAR_W: u16 = 32;

/// Split the view body into the view itself and the detail pane, when the
/// pane is open and there is room for both.
pub fn split(app: &App, body: Rect) -> (Rect, Option<Rect>) {
    let shown = app.sidebar
        && app.orch.mode() != ViewMode::Gantt
        && body.width >= SIDEBAR_W * 2;
    if !shown {
        return (body, None);
    }
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(SIDEBAR_W)])
        .split(body);
    (chunks[0], Some(chunks[1]))
}

fn field<'a>(app: &App, label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(app.theme.dim)),
        Span::styled(value, Style::default().fg(app.theme.text)),
    ])
}

fn detail_lines<'a>(app: &'a App) -> Vec<Line<'a>> {
    let Some(item) = app.selected_item() else {
        return vec![Line::from(Span::styled(
            "No item selected",
            Style::default().fg(app.theme.dim),
        ))];
    };
    let directory = app.orch.directory();
    let vocab = app.orch.vocab();
    let tag = classify(item, directory);

    let mut lines = vec![
        Line::from(Span::styled(
            item.title.clone(),
            Style::default()
                .fg(app.theme.text_bright)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                tag.label().to_string(),
                Style::default().fg(app.theme.tone(tag.tone())),
            ),
            Span::styled(format!("  {}", item.id), Style::default().fg(app.theme.dim)),
        ]),
        Line::default(),
    ];
    if let Some(status) = &item.status {
        lines.push(Line::from(vec![
            Span::styled("status: ", Style::default().fg(app.theme.dim)),
            Span::styled(
                status.clone(),
                Style::default().fg(app.theme.tone(vocab.status_tone(status))),
            ),
        ]));
    }
    if let Some(priority) = &item.priority {
        lines.push(field(app, "priority", priority.clone()));
    }
    let names: Vec<String> = item
        .assignee_ids()
        .into_iter()
        .filter_map(|id| directory.user(id).map(|u| u.name.clone()))
        .collect();
    if !names.is_empty() {
        lines.push(field(app, "assignees", names.join(", ")));
    }
    if let Some(project) = item.project.as_deref().and_then(|id| directory.project(id)) {
        lines.push(field(app, "project", project.name.clone()));
    }
    if let Some(category) = &item.category {
        lines.push(field(app, "category", directory.category_label(category).to_string()));
    }
    if let Some(start) = &item.start_date {
        lines.push(field(app, "start", start.clone()));
    }
    if let Some(end) = &item.end_date {
        lines.push(field(app, "due", end.clone()));
    }
    if let Some(description) = item.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(Line::default());
        lines.extend(
            description
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(app.theme.text)))),
        );
    }
    if !item.comments.is_empty() {
        lines.push(Line::default());
        lines.push(field(app, "comments", item.comments.len().to_string()));
    }
    lines
}

pub fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg))
        .title(" Details ");
    let paragraph = Paragraph::new(detail_lines(app))
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
