use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::ops::editor::Field;
use crate::tui::app::{App, EditorRow};
use crate::util::unicode;

/// Step through `options` (None = unset) from the current value.
fn cycle(options: &[Option<String>], current: Option<&str>, step: isize) -> Option<String> {
    if options.is_empty() {
        return current.map(str::to_string);
    }
    let index = options
        .iter()
        .position(|o| o.as_deref() == current)
        .map_or(0, |i| i as isize + step);
    options[index.rem_euclid(options.len() as isize) as usize].clone()
}

fn cycle_choice(app: &mut App, field: Field, step: isize) {
    let vocab = app.orch.vocab();
    let directory = app.orch.directory();
    let options: Vec<Option<String>> = match field {
        Field::Status => vocab.statuses.iter().map(|s| Some(s.name.clone())).collect(),
        Field::Priority => vocab.priorities.iter().map(|p| Some(p.name.clone())).collect(),
        Field::Project => std::iter::once(None)
            .chain(directory.projects.iter().map(|p| Some(p.id.clone())))
            .collect(),
        Field::Category => std::iter::once(None)
            .chain(directory.categories.iter().map(|c| Some(c.id.clone())))
            .collect(),
        _ => return,
    };
    let Some(state) = app.editor.as_mut() else {
        return;
    };
    let fields = &mut state.editor.fields;
    match field {
        Field::Status => {
            fields.status = cycle(&options, Some(&fields.status), step).unwrap_or_default()
        }
        Field::Priority => {
            fields.priority = cycle(&options, Some(&fields.priority), step).unwrap_or_default()
        }
        Field::Project => fields.project = cycle(&options, fields.project.as_deref(), step),
        Field::Category => fields.category = cycle(&options, fields.category.as_deref(), step),
        _ => {}
    }
}

fn text_buffer(app: &mut App, row: EditorRow) -> Option<&mut String> {
    let state = app.editor.as_mut()?;
    match row {
        EditorRow::Field(Field::Title) => Some(&mut state.editor.fields.title),
        EditorRow::Field(Field::Description) => Some(&mut state.editor.fields.description),
        EditorRow::Field(Field::StartDate) => Some(&mut state.editor.fields.start_date),
        EditorRow::Field(Field::EndDate) => Some(&mut state.editor.fields.end_date),
        EditorRow::Comment => Some(&mut state.comment),
        EditorRow::Field(_) => None,
    }
}

fn toggle_assignee(app: &mut App) {
    let Some(user_id) = app
        .editor
        .as_ref()
        .and_then(|s| app.orch.directory().users.get(s.assignee_cursor))
        .map(|u| u.id.clone())
    else {
        return;
    };
    if let Some(state) = app.editor.as_mut() {
        let assignees = &mut state.editor.fields.assignees;
        if let Some(pos) = assignees.iter().position(|id| *id == user_id) {
            assignees.remove(pos);
        } else {
            assignees.push(user_id);
        }
    }
}

pub(super) fn handle_editor(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('s') {
        app.save_editor();
        return;
    }

    let Some(state) = app.editor.as_mut() else {
        return;
    };
    let rows = state.rows();
    let Some(row) = rows.get(state.cursor).copied() else {
        return;
    };

    match key.code {
        KeyCode::Esc => app.request_close_editor(),
        KeyCode::Tab | KeyCode::Down => {
            state.cursor = (state.cursor + 1) % rows.len();
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.cursor = (state.cursor + rows.len() - 1) % rows.len();
        }
        _ => match row {
            EditorRow::Field(Field::Assignees) => {
                let users = app.orch.directory().users.len();
                match key.code {
                    KeyCode::Left | KeyCode::Char('h') => {
                        state.assignee_cursor = state.assignee_cursor.saturating_sub(1)
                    }
                    KeyCode::Right | KeyCode::Char('l') => {
                        if state.assignee_cursor + 1 < users {
                            state.assignee_cursor += 1;
                        }
                    }
                    KeyCode::Char(' ') | KeyCode::Enter => toggle_assignee(app),
                    _ => {}
                }
            }
            EditorRow::Field(field @ (Field::Status | Field::Priority | Field::Project | Field::Category)) => {
                match key.code {
                    KeyCode::Left | KeyCode::Char('h') => cycle_choice(app, field, -1),
                    KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => {
                        cycle_choice(app, field, 1)
                    }
                    _ => {}
                }
            }
            EditorRow::Comment if key.code == KeyCode::Enter => app.post_comment(),
            _ => {
                let Some(buffer) = text_buffer(app, row) else {
                    return;
                };
                match key.code {
                    KeyCode::Char(c) if !ctrl => buffer.push(c),
                    KeyCode::Enter if row == EditorRow::Field(Field::Description) => {
                        buffer.push('\n')
                    }
                    KeyCode::Backspace => unicode::pop_grapheme(buffer),
                    _ => {}
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::item_store::MemoryItemStore;
    use crate::tui::app::Mode;
    use crate::tui::input::handle_key;
    use crate::tui::input::test_keys::*;
    use crate::tui::render::test_helpers::*;

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, ch(c));
        }
    }

    #[test]
    fn cycle_wraps_both_ways() {
        let options = vec![None, Some("a".to_string()), Some("b".to_string())];
        assert_eq!(cycle(&options, None, 1), Some("a".into()));
        assert_eq!(cycle(&options, Some("b"), 1), None);
        assert_eq!(cycle(&options, None, -1), Some("b".into()));
        // Unknown values restart at the first option
        assert_eq!(cycle(&options, Some("zzz"), 1), None);
    }

    #[test]
    fn typing_edits_title_and_marks_dirty() {
        let mut app = sample_app();
        app.open_editor("t1");
        type_text(&mut app, " now");
        let state = app.editor.as_ref().unwrap();
        assert_eq!(state.editor.fields.title, "Write copy now");
        assert!(state.editor.has_changes());

        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::ConfirmClose);
    }

    #[test]
    fn whitespace_only_edit_closes_without_prompt() {
        let mut app = sample_app();
        app.open_editor("t1");
        type_text(&mut app, "  ");
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.editor.is_none());
    }

    #[test]
    fn ctrl_s_saves_and_resyncs_baseline() {
        let mut app = sample_app();
        app.open_editor("t1");
        // Title -> Description -> Status
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, key(KeyCode::Tab));
        handle_key(&mut app, ch('l'));
        handle_key(&mut app, ctrl('s'));
        assert_eq!(app.orch.item("t1").unwrap().status.as_deref(), Some("В работе"));
        assert!(!app.editor.as_ref().unwrap().editor.has_changes());
        // Closing after a save does not prompt again
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
    }

    #[test]
    fn assignee_row_toggles_users() {
        let mut app = sample_app();
        app.open_editor("t1");
        for _ in 0..4 {
            handle_key(&mut app, key(KeyCode::Tab));
        }
        handle_key(&mut app, ch('l'));
        handle_key(&mut app, ch(' '));
        let state = app.editor.as_ref().unwrap();
        assert_eq!(state.editor.fields.assignees, vec!["ann".to_string(), "bob".to_string()]);
    }

    #[test]
    fn new_item_saves_through_store() {
        let mut app = sample_app();
        app.new_item(None);
        type_text(&mut app, "Plan sprint");
        handle_key(&mut app, ctrl('s'));
        let state = app.editor.as_ref().unwrap();
        assert!(!state.editor.is_new());
        let id = state.editor.item_id().unwrap().to_string();
        let created = app.orch.item(&id).unwrap();
        assert_eq!(created.title, "Plan sprint");
        assert_eq!(created.assignees, vec!["ann".to_string()]);
    }

    #[test]
    fn refused_create_keeps_edits_behind_prompt() {
        let mut store = MemoryItemStore::new(sample_items());
        store.reject = true;
        let mut app = app_with_store(sample_items(), store);
        app.new_item(None);
        type_text(&mut app, "Plan sprint");

        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::ConfirmClose);
        handle_key(&mut app, ch('y'));
        // Save failed: back in the editor, still dirty
        assert_eq!(app.mode, Mode::Editor);
        assert!(app.message.as_deref().is_some_and(|m| m.contains("store offline")));
        let state = app.editor.as_ref().unwrap();
        assert!(state.editor.is_new());
        assert!(state.editor.has_changes());
        assert_eq!(app.orch.items().len(), 4);

        // Closing again still asks
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::ConfirmClose);
        handle_key(&mut app, ch('n'));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.editor.is_none());
    }

    #[test]
    fn save_of_removed_item_stays_dirty() {
        let mut app = sample_app();
        app.open_editor("t1");
        type_text(&mut app, " now");
        app.orch.reload(sample_items().into_iter().skip(1).collect());
        handle_key(&mut app, ctrl('s'));
        assert!(app.message.as_deref().is_some_and(|m| m.contains("item not found: t1")));
        assert!(app.editor.as_ref().unwrap().editor.has_changes());
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::ConfirmClose);
    }

    #[test]
    fn comment_row_posts() {
        let mut app = sample_app();
        app.open_editor("t1");
        handle_key(&mut app, key(KeyCode::BackTab));
        type_text(&mut app, "looks good");
        handle_key(&mut app, key(KeyCode::Enter));
        let item = app.orch.item("t1").unwrap();
        assert_eq!(item.comments.len(), 1);
        assert_eq!(item.comments[0].text, "looks good");
        assert!(app.editor.as_ref().unwrap().comment.is_empty());
    }
}
