use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::Note;
use crate::ops::theme_pref::ThemeMode;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ToggleJson<'a> {
    pub id: &'a str,
    pub finish: bool,
}

#[derive(Serialize)]
pub struct IdJson<'a> {
    pub id: &'a str,
}

#[derive(Serialize)]
pub struct RemovedJson<'a> {
    pub removed: Option<&'a Note>,
}

#[derive(Serialize)]
pub struct ThemeJson {
    pub mode: &'static str,
}

impl From<ThemeMode> for ThemeJson {
    fn from(mode: ThemeMode) -> Self {
        ThemeJson {
            mode: mode.as_str(),
        }
    }
}

#[derive(Serialize)]
pub struct PruneJson {
    pub removed: usize,
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// One-line summary: `[x] <title>  due <datetime>  <short id>`
pub fn format_note_line(note: &Note) -> String {
    format!(
        "[{}] {}  due {}  {}",
        if note.finish { "x" } else { " " },
        note.title,
        note.datetime,
        note.short_id()
    )
}

/// Summary line followed by the indented description.
pub fn format_note_detail(note: &Note) -> String {
    let mut out = format_note_line(note);
    for line in note.description.lines() {
        out.push_str("\n    ");
        out.push_str(line);
    }
    out.push_str(&format!("\n    id: {}", note.id));
    out
}

pub fn format_recovery_entries(entries: &[RecoveryEntry]) -> String {
    entries
        .iter()
        .map(RecoveryEntry::render)
        .collect::<Vec<_>>()
        .join("\n")
}
