use crossterm::event::{KeyCode, KeyEvent};

use crate::ops::table::PickerKind;
use crate::tui::app::{App, FilterRow, Mode};
use crate::util::unicode;

pub(super) fn handle_picker(app: &mut App, key: KeyEvent) {
    let Some(picker) = app.picker.as_mut() else {
        app.mode = Mode::Navigate;
        return;
    };
    let count = picker.options.len();
    let multi = picker.kind == PickerKind::Assignee;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if picker.cursor + 1 < count {
                picker.cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => picker.cursor = picker.cursor.saturating_sub(1),
        KeyCode::Char(' ') if multi => app.picker_choose(),
        KeyCode::Enter if multi => app.dismiss_picker(),
        KeyCode::Enter => app.picker_choose(),
        KeyCode::Esc | KeyCode::Char('q') => app.dismiss_picker(),
        _ => {}
    }
}

pub(super) fn handle_due_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => app.due_input.push(c),
        KeyCode::Backspace => unicode::pop_grapheme(&mut app.due_input),
        KeyCode::Enter => app.commit_due_date(),
        KeyCode::Esc => app.dismiss_picker(),
        _ => {}
    }
}

pub(super) fn handle_filter(app: &mut App, key: KeyEvent) {
    let row = FilterRow::ALL[app.filter_cursor.min(FilterRow::ALL.len() - 1)];
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.filter_cursor + 1 < FilterRow::ALL.len() {
                app.filter_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => app.filter_cursor = app.filter_cursor.saturating_sub(1),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ') => {
            app.cycle_filter(row, 1)
        }
        KeyCode::Char('h') | KeyCode::Left => app.cycle_filter(row, -1),
        KeyCode::Char('c') => app.clear_filters(),
        KeyCode::Esc | KeyCode::Char('f') | KeyCode::Char('q') => app.mode = Mode::Navigate,
        _ => {}
    }
}

pub(super) fn handle_confirm_close(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_close(true),
        KeyCode::Char('n') | KeyCode::Char('N') => app.confirm_close(false),
        // Back to editing
        KeyCode::Esc => app.mode = Mode::Editor,
        _ => {}
    }
}
