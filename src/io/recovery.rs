use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::io::storage::atomic_write;
use crate::model::Note;

/// File name of the recovery log inside the data directory
pub const LOG_FILE: &str = ".recovery.log";

/// Entries older than this are dropped by `prune_recovery` and by the
/// size-triggered trim.
pub const MAX_AGE_DAYS: i64 = 30;

/// Past this size, appending also drops entries older than `MAX_AGE_DAYS`.
const TRIM_THRESHOLD: u64 = 1024 * 1024;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Why text was set aside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryKind {
    /// Stored notes could not be parsed and were replaced by an empty list
    Parser,
    /// A storage write failed; the payload is the unsaved value
    Write,
    /// A note was deleted; the payload is its JSON
    Delete,
}

impl fmt::Display for RecoveryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecoveryKind::Parser => "parser",
            RecoveryKind::Write => "write",
            RecoveryKind::Delete => "delete",
        })
    }
}

/// One line of the log: a JSON object holding text that would otherwise
/// be lost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryEntry {
    pub at: DateTime<Utc>,
    pub kind: RecoveryKind,
    /// Storage key, or note id for deletions
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub payload: String,
}

impl RecoveryEntry {
    pub fn new(kind: RecoveryKind, subject: impl Into<String>, payload: impl Into<String>) -> Self {
        RecoveryEntry {
            at: Utc::now(),
            kind,
            subject: subject.into(),
            error: None,
            payload: payload.into(),
        }
    }

    pub fn with_error(mut self, error: impl fmt::Display) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn headline(&self) -> String {
        match self.kind {
            RecoveryKind::Parser => format!("unreadable {} set aside", self.subject),
            RecoveryKind::Write => format!("{} could not be saved", self.subject),
            RecoveryKind::Delete => format!("note {} deleted", self.subject),
        }
    }

    /// Human-readable block: a header line, the error if any, then the
    /// payload indented by four spaces.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{} [{}] {}\n",
            self.at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            self.kind,
            self.headline()
        );
        if let Some(error) = &self.error {
            out.push_str(&format!("  error: {}\n", error));
        }
        for line in self.payload.lines() {
            out.push_str("    ");
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

pub fn recovery_log_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOG_FILE)
}

/// Append `entry`. The log is the last resort, so a failure here only
/// produces a warning on stderr.
pub fn log_recovery(data_dir: &Path, entry: RecoveryEntry) {
    if let Err(e) = append(data_dir, &entry) {
        eprintln!("warning: could not write to recovery log: {}", e);
    }
}

fn append(data_dir: &Path, entry: &RecoveryEntry) -> io::Result<()> {
    let mut line = serde_json::to_string(entry)?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(recovery_log_path(data_dir))?;
    file.write_all(line.as_bytes())?;

    if file.metadata()?.len() > TRIM_THRESHOLD {
        let cutoff = Utc::now() - Duration::days(MAX_AGE_DAYS);
        retain_entries(data_dir, |e| e.at >= cutoff)?;
    }
    Ok(())
}

/// Record a storage value that could not be written.
pub fn log_write_failure(data_dir: &Path, key: &str, error: &io::Error, payload: &str) {
    log_recovery(
        data_dir,
        RecoveryEntry::new(RecoveryKind::Write, key, payload).with_error(error),
    );
}

/// Record a deleted note so it can be restored by hand.
pub fn log_note_deletion(data_dir: &Path, note: &Note) {
    let payload = serde_json::to_string_pretty(note).unwrap_or_else(|_| format!("{:?}", note));
    log_recovery(
        data_dir,
        RecoveryEntry::new(RecoveryKind::Delete, note.id.as_str(), payload),
    );
}

/// Record stored text that failed to parse, before it gets overwritten.
pub fn log_discarded_notes(data_dir: &Path, key: &str, raw: &str) {
    log_recovery(data_dir, RecoveryEntry::new(RecoveryKind::Parser, key, raw));
}

// ---------------------------------------------------------------------------
// Reading and pruning
// ---------------------------------------------------------------------------

/// All readable entries, newest first. A missing log is empty.
pub fn read_recovery_entries(data_dir: &Path) -> Vec<RecoveryEntry> {
    let Ok(content) = fs::read_to_string(recovery_log_path(data_dir)) else {
        return Vec::new();
    };
    let mut entries: Vec<RecoveryEntry> = content
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    entries.reverse();
    entries
}

/// Drop every entry (`all`) or those older than `MAX_AGE_DAYS`. Returns
/// how many were removed.
pub fn prune_recovery(data_dir: &Path, all: bool) -> io::Result<usize> {
    if all {
        return retain_entries(data_dir, |_| false);
    }
    let cutoff = Utc::now() - Duration::days(MAX_AGE_DAYS);
    retain_entries(data_dir, |e| e.at >= cutoff)
}

/// Rewrite the log keeping entries that satisfy `keep`. Lines that do not
/// parse are kept untouched.
fn retain_entries(data_dir: &Path, keep: impl Fn(&RecoveryEntry) -> bool) -> io::Result<usize> {
    let path = recovery_log_path(data_dir);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut kept = String::with_capacity(content.len());
    let mut removed = 0;
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        match serde_json::from_str::<RecoveryEntry>(line) {
            Ok(entry) if !keep(&entry) => removed += 1,
            _ => {
                kept.push_str(line);
                kept.push('\n');
            }
        }
    }
    if removed > 0 {
        atomic_write(&path, kept.as_bytes())?;
    }
    Ok(removed)
}
