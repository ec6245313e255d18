use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::storage::{KeyValueStore, MemoryStore};
use crate::model::{Config, Note};
use crate::ops::note_store::{NOTES_KEY, NoteStore, serialize_notes};
use crate::tui::app::{App, Store};

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

pub fn note(id: &str, title: &str, finish: bool) -> Note {
    Note {
        id: id.into(),
        title: title.into(),
        description: format!("{} details", title),
        datetime: "2024-01-01T10:00".into(),
        finish,
    }
}

/// Three notes, the middle one finished.
pub fn sample_notes() -> Vec<Note> {
    vec![
        note("1", "Buy milk", false),
        note("2", "Call mom", true),
        note("3", "Write report", false),
    ]
}

/// Build an App over in-memory storage seeded with `notes`.
pub fn app_with_notes(notes: &[Note]) -> App {
    let mut backing = MemoryStore::new();
    backing
        .set(NOTES_KEY, &serialize_notes(notes).unwrap())
        .unwrap();
    let store: Store = NoteStore::load(Box::new(backing.clone()) as Box<dyn KeyValueStore>);
    App::new(store, Box::new(backing), Config::default())
}
