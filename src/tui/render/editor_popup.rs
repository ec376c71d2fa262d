use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ops::editor::{EditorFields, Field};
use crate::ops::table::NO_PROJECT_LABEL;
use crate::tui::app::{App, EditorRow, EditorState, Mode};
use crate::util::unicode;

use super::helpers::{centered_rect, fill_line};

const LABEL_W: usize = 13;
/// Most recent comments listed under the form
const COMMENT_PREVIEW: usize = 3;

/// The editor popup rect. Clicks outside it request close.
pub fn editor_area(area: Rect) -> Rect {
    let width = ((area.width as f32 * 0.7) as u16).clamp(50, 90);
    centered_rect(width, 20, area)
}

fn kind_title(state: &EditorState) -> String {
    let kind = state.editor.kind().as_str();
    let dirty = if state.editor.has_changes() { " *" } else { "" };
    if state.editor.is_new() {
        format!(" New {}{} ", kind, dirty)
    } else {
        format!(" Edit {}{} ", kind, dirty)
    }
}

/// Text shown for a field's live value.
fn field_text(app: &App, fields: &EditorFields, field: Field) -> String {
    match field {
        Field::Title => fields.title.clone(),
        Field::Description => fields.description.replace('\n', " "),
        Field::Status => fields.status.clone(),
        Field::Priority => fields.priority.clone(),
        Field::Project => fields
            .project
            .as_deref()
            .and_then(|id| app.orch.directory().project(id))
            .map_or(NO_PROJECT_LABEL.to_string(), |p| p.name.clone()),
        Field::Category => fields
            .category
            .as_deref()
            .map_or("none".to_string(), |id| {
                app.orch.directory().category_label(id).to_string()
            }),
        Field::StartDate => fields.start_date.clone(),
        Field::EndDate => fields.end_date.clone(),
        Field::Assignees => String::new(),
    }
}

fn is_text_row(row: EditorRow) -> bool {
    matches!(
        row,
        EditorRow::Comment
            | EditorRow::Field(Field::Title | Field::Description | Field::StartDate | Field::EndDate)
    )
}

pub fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let Some(state) = &app.editor else {
        return;
    };
    let bg = app.theme.background;
    let popup = editor_area(area);
    let inner_w = popup.width.saturating_sub(2) as usize;
    let value_w = inner_w.saturating_sub(LABEL_W + 3);
    let fields = &state.editor.fields;
    let changed = state.editor.changed_fields();

    let mut lines: Vec<Line> = vec![Line::from("")];
    for (i, row) in state.rows().into_iter().enumerate() {
        let focused = i == state.cursor;
        let row_bg = if focused { app.theme.selection_bg } else { bg };
        let label = match row {
            EditorRow::Field(field) => field.label(),
            EditorRow::Comment => "Comment",
        };
        let label_fg = match row {
            EditorRow::Field(field) if changed.contains(&field) => app.theme.highlight,
            _ => app.theme.dim,
        };
        let mut spans = vec![
            Span::styled(
                if focused { " \u{25B6} " } else { "   " },
                Style::default().fg(app.theme.highlight).bg(row_bg),
            ),
            Span::styled(
                unicode::pad_to_width(label, LABEL_W),
                Style::default().fg(label_fg).bg(row_bg),
            ),
        ];
        let value_style = Style::default().fg(app.theme.text_bright).bg(row_bg);

        match row {
            EditorRow::Field(Field::Assignees) => {
                for (ui, user) in app.orch.directory().users.iter().enumerate() {
                    let checked = fields.assignees.contains(&user.id);
                    let mut style = Style::default().fg(app.theme.text).bg(row_bg);
                    if focused && ui == state.assignee_cursor {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    let mark = if checked { "[x]" } else { "[ ]" };
                    spans.push(Span::styled(format!("{} {}", mark, user.name), style));
                    spans.push(Span::styled(" ", Style::default().bg(row_bg)));
                }
            }
            EditorRow::Field(field) => {
                let text = field_text(app, fields, field);
                let style = match field {
                    Field::Status => value_style.fg(app.theme.tone(app.orch.vocab().status_tone(&text))),
                    Field::Priority => {
                        value_style.fg(app.theme.tone(app.orch.vocab().priority_tone(&text)))
                    }
                    _ => value_style,
                };
                spans.push(Span::styled(unicode::truncate_to_width(&text, value_w), style));
                if focused && !is_text_row(row) {
                    spans.push(Span::styled(
                        "  \u{2039} \u{203A}",
                        Style::default().fg(app.theme.dim).bg(row_bg),
                    ));
                }
            }
            EditorRow::Comment => {
                spans.push(Span::styled(
                    unicode::truncate_to_width(&state.comment, value_w),
                    value_style,
                ));
            }
        }
        if focused && is_text_row(row) {
            spans.push(Span::styled(
                "\u{258C}",
                Style::default().fg(app.theme.highlight).bg(row_bg),
            ));
        }
        fill_line(&mut spans, inner_w, Style::default().bg(row_bg));
        lines.push(Line::from(spans));
    }

    if let Some(item) = state.editor.item_id().and_then(|id| app.orch.item(id)) {
        let skip = item.comments.len().saturating_sub(COMMENT_PREVIEW);
        if !item.comments.is_empty() {
            lines.push(Line::from(""));
        }
        for comment in item.comments.iter().skip(skip) {
            let author = app
                .orch
                .directory()
                .user(&comment.user_id)
                .map_or(comment.user_id.as_str(), |u| u.name.as_str());
            let text = format!("   {}: {}", author, comment.text);
            lines.push(Line::from(Span::styled(
                unicode::truncate_to_width(&text, inner_w),
                Style::default().fg(app.theme.dim).bg(bg),
            )));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.selection_border).bg(bg))
        .style(Style::default().bg(bg))
        .title(kind_title(state));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);

    if app.mode == Mode::ConfirmClose {
        render_confirm(frame, app, area);
    }
}

fn render_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let popup = centered_rect(34, 3, area);
    let line = Line::from(vec![
        Span::styled(" Save changes? ", Style::default().fg(app.theme.text_bright).bg(bg)),
        Span::styled("y", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(" save  ", Style::default().fg(app.theme.dim).bg(bg)),
        Span::styled("n", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(" discard", Style::default().fg(app.theme.dim).bg(bg)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.red).bg(bg))
        .style(Style::default().bg(bg));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(line).block(block), popup);
}
