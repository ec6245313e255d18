use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode, Overlay};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.status = None;

    match app.active_overlay() {
        Some(Overlay::Editor { .. }) => handle_editor(app, key),
        Some(Overlay::DeleteConfirm { .. }) => handle_confirm(app, key),
        None => match app.mode {
            Mode::Navigate => handle_navigate(app, key),
            Mode::Search => handle_search(app, key),
        },
    }
}

fn handle_navigate(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) | (KeyModifiers::CONTROL, KeyCode::Char('c')) => {
            app.should_quit = true;
        }
        (_, KeyCode::Char('j')) | (_, KeyCode::Down) => app.move_cursor(1),
        (_, KeyCode::Char('k')) | (_, KeyCode::Up) => app.move_cursor(-1),
        (_, KeyCode::Char('g')) | (_, KeyCode::Home) => app.cursor_to_top(),
        (_, KeyCode::Char('G')) | (_, KeyCode::End) => app.cursor_to_bottom(),
        (_, KeyCode::Char(' ')) => app.toggle_selected(),
        (_, KeyCode::Char('n')) => app.open_new_editor(),
        (_, KeyCode::Char('e')) | (_, KeyCode::Enter) => app.open_edit_editor(),
        (_, KeyCode::Char('d')) => app.open_delete_confirm(),
        (_, KeyCode::Char('/')) => app.start_search(),
        (_, KeyCode::Char('f')) => app.cycle_filter(),
        (_, KeyCode::Char('t')) => app.toggle_theme(),
        (_, KeyCode::Char('R')) => app.retry_sync(),
        (_, KeyCode::Esc) => {
            if app.query.filter_mode().is_none() {
                app.clear_search();
            }
        }
        _ => {}
    }
}

fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.clear_search(),
        KeyCode::Enter => app.commit_search(),
        KeyCode::Backspace => {
            app.search_input.pop();
            app.update_search();
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.search_input.push(c);
            app.update_search();
        }
        _ => {}
    }
}

fn handle_editor(app: &mut App, key: KeyEvent) {
    let form = &mut app.editor;
    match key.code {
        KeyCode::Esc => app.close_overlay(),
        KeyCode::Enter => app.submit_editor(),
        KeyCode::Tab => form.focus(form.focus.next()),
        KeyCode::BackTab => form.focus(form.focus.prev()),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Delete => form.delete(),
        KeyCode::Left => form.move_left(),
        KeyCode::Right => form.move_right(),
        KeyCode::Home => form.move_home(),
        KeyCode::End => form.move_end(),
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.delete_word_back()
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.insert_char(c)
        }
        _ => {}
    }
}

fn handle_confirm(app: &mut App, key: KeyEvent) {
    match (key.modifiers, key.code) {
        (KeyModifiers::NONE, KeyCode::Char('y')) => app.confirm_delete(),
        (KeyModifiers::NONE, KeyCode::Char('n')) | (_, KeyCode::Esc) => app.close_overlay(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::{KeyValueStore, MemoryStore};
    use crate::model::{Config, FilterMode, Note};
    use crate::ops::note_store::{NOTES_KEY, NoteStore, serialize_notes};
    use crate::ops::view::ViewQuery;
    use crate::tui::app::{EditorField, Store};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, key(code));
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app_with_titles(titles: &[(&str, bool)]) -> App {
        let notes: Vec<Note> = titles
            .iter()
            .enumerate()
            .map(|(i, (title, finish))| Note {
                id: format!("id-{}", i),
                title: title.to_string(),
                description: "d".into(),
                datetime: "2024-01-01T10:00".into(),
                finish: *finish,
            })
            .collect();
        let mut backing = MemoryStore::new();
        backing
            .set(NOTES_KEY, &serialize_notes(&notes).unwrap())
            .unwrap();
        let store: Store = NoteStore::load(Box::new(backing.clone()) as Box<dyn KeyValueStore>);
        App::new(store, Box::new(backing), Config::default())
    }

    #[test]
    fn navigation_keys_move_and_clamp() {
        let mut app = app_with_titles(&[("A", false), ("B", false), ("C", false)]);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.cursor, 2);
        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.cursor, 1);
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.cursor, 0);
        press(&mut app, KeyCode::Char('G'));
        assert_eq!(app.cursor, 2);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.cursor, 0);
    }

    #[test]
    fn space_toggles_finish() {
        let mut app = app_with_titles(&[("A", false)]);
        press(&mut app, KeyCode::Char(' '));
        assert!(app.store.notes()[0].finish);
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.store.notes()[0].finish);
    }

    #[test]
    fn new_note_flow() {
        let mut app = app_with_titles(&[]);
        press(&mut app, KeyCode::Char('n'));
        assert!(app.modal.is_visible());

        type_str(&mut app, "Buy milk");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.editor.focus, EditorField::Description);
        type_str(&mut app, "2% fat");
        press(&mut app, KeyCode::Enter);

        assert!(!app.modal.is_visible());
        assert_eq!(app.store.len(), 1);
        let note = &app.store.notes()[0];
        assert_eq!(note.title, "Buy milk");
        assert_eq!(note.description, "2% fat");
        assert!(!note.finish);
    }

    #[test]
    fn typing_q_in_editor_does_not_quit() {
        let mut app = app_with_titles(&[]);
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "quit");
        assert!(!app.should_quit);
        assert_eq!(app.editor.draft.title, "quit");
    }

    #[test]
    fn escape_cancels_editor_without_changes() {
        let mut app = app_with_titles(&[("A", false)]);
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, " changed");
        press(&mut app, KeyCode::Esc);
        assert!(!app.modal.is_visible());
        assert_eq!(app.store.notes()[0].title, "A");
    }

    #[test]
    fn shift_tab_moves_focus_backwards() {
        let mut app = app_with_titles(&[]);
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.editor.focus, EditorField::Due);
    }

    #[test]
    fn delete_confirm_keys() {
        let mut app = app_with_titles(&[("A", false), ("B", false)]);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store.len(), 2);
        assert!(!app.modal.is_visible());

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.store.len(), 2);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.store.len(), 1);
        assert_eq!(app.store.notes()[0].title, "B");
    }

    #[test]
    fn delete_on_empty_list_opens_nothing() {
        let mut app = app_with_titles(&[]);
        press(&mut app, KeyCode::Char('d'));
        assert!(!app.modal.is_visible());
        assert!(app.overlay.is_none());
    }

    #[test]
    fn live_search_then_escape_restores_filter() {
        let mut app = app_with_titles(&[("Buy Milk", false), ("Call mom", false)]);
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "MIL");
        assert_eq!(app.visible_notes().len(), 1);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.query, ViewQuery::Search("M".into()));
        assert_eq!(app.visible_notes().len(), 2);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.query, ViewQuery::Filter(FilterMode::All));
    }

    #[test]
    fn enter_keeps_search() {
        let mut app = app_with_titles(&[("Buy Milk", false), ("Call mom", false)]);
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "call");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.visible_notes().len(), 1);

        // Navigate keys act on the filtered list
        press(&mut app, KeyCode::Char(' '));
        assert!(app.store.notes()[1].finish);
    }

    #[test]
    fn f_cycles_filters() {
        let mut app = app_with_titles(&[("A", true), ("B", false)]);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.query, ViewQuery::Filter(FilterMode::Finished));
        assert_eq!(app.visible_notes().len(), 1);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.query, ViewQuery::Filter(FilterMode::Unfinished));
    }

    #[test]
    fn q_quits() {
        let mut app = app_with_titles(&[]);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
