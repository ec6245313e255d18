use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Format of the `datetime` field: a local date-time without timezone,
/// the same shape a `datetime-local` picker produces.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// A single to-do note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Opaque unique id, assigned at creation
    pub id: String,
    pub title: String,
    pub description: String,
    /// Due date-time, `YYYY-MM-DDTHH:MM`
    pub datetime: String,
    /// Completion flag
    #[serde(default)]
    pub finish: bool,
}

impl Note {
    /// Build an unfinished note from a draft and an id
    pub fn from_draft(id: String, draft: NoteDraft) -> Self {
        Note {
            id,
            title: draft.title,
            description: draft.description,
            datetime: draft.datetime,
            finish: false,
        }
    }

    /// First eight characters of the id, for display
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    /// The editable fields of this note
    pub fn to_draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            datetime: self.datetime.clone(),
        }
    }
}

/// Editor form contents, before a note exists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub description: String,
    pub datetime: String,
}

/// A draft was submitted with a required field left blank
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
}

impl NoteDraft {
    /// A blank draft due at `now` (minute precision)
    pub fn due_now() -> Self {
        NoteDraft {
            datetime: chrono::Local::now()
                .naive_local()
                .format(DATETIME_FORMAT)
                .to_string(),
            ..Default::default()
        }
    }

    /// Required-field check: every field must contain non-whitespace text.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField("description"));
        }
        if self.datetime.trim().is_empty() {
            return Err(ValidationError::MissingField("datetime"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid due date '{0}' (expected YYYY-MM-DDTHH:MM, YYYY-MM-DD HH:MM or YYYY-MM-DD)")]
pub struct DueParseError(String);

/// Normalize a typed due date to `YYYY-MM-DDTHH:MM`. A bare date means
/// midnight; seconds are dropped.
pub fn parse_due(input: &str) -> Result<String, DueParseError> {
    let s = input.trim();
    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.format(DATETIME_FORMAT).to_string());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.format(DATETIME_FORMAT).to_string())
        .ok_or_else(|| DueParseError(input.to_string()))
}
