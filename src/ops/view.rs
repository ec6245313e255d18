use std::cmp::Ordering;
use std::fmt;

use crate::model::filter::FilterMode;
use crate::model::note::Note;

/// The single active view over the collection: either a structural filter
/// or a title search. Setting one replaces the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewQuery {
    Filter(FilterMode),
    Search(String),
}

impl Default for ViewQuery {
    fn default() -> Self {
        ViewQuery::Filter(FilterMode::All)
    }
}

impl ViewQuery {
    pub fn apply<'a>(&self, notes: &'a [Note]) -> Vec<&'a Note> {
        match self {
            ViewQuery::Filter(mode) => apply_filter(*mode, notes),
            ViewQuery::Search(query) => apply_search(query, notes),
        }
    }

    /// The filter mode in effect, or `None` while searching.
    pub fn filter_mode(&self) -> Option<FilterMode> {
        match self {
            ViewQuery::Filter(mode) => Some(*mode),
            ViewQuery::Search(_) => None,
        }
    }
}

impl fmt::Display for ViewQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewQuery::Filter(mode) => write!(f, "{}", mode),
            ViewQuery::Search(query) => write!(f, "search: {}", query),
        }
    }
}

/// Derive the displayed sequence for a structural filter. The input slice
/// is never reordered; sorting happens on a vector of references.
pub fn apply_filter(mode: FilterMode, notes: &[Note]) -> Vec<&Note> {
    match mode {
        FilterMode::All => notes.iter().collect(),
        FilterMode::Finished => notes.iter().filter(|n| n.finish).collect(),
        FilterMode::Unfinished => notes.iter().filter(|n| !n.finish).collect(),
        FilterMode::AToZ => {
            let mut sorted: Vec<&Note> = notes.iter().collect();
            sorted.sort_by(|a, b| compare_titles(&a.title, &b.title));
            sorted
        }
        FilterMode::ZToA => {
            let mut sorted: Vec<&Note> = notes.iter().collect();
            sorted.sort_by(|a, b| compare_titles(&b.title, &a.title));
            sorted
        }
    }
}

/// Case-insensitive substring match on titles. An empty query matches
/// everything.
pub fn apply_search<'a>(query: &str, notes: &'a [Note]) -> Vec<&'a Note> {
    if query.is_empty() {
        return notes.iter().collect();
    }
    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|n| n.title.to_lowercase().contains(&needle))
        .collect()
}

/// Locale-style title ordering: compare case-folded text first, and only
/// when that ties put lowercase before uppercase at the first differing
/// character.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    let folded = a.to_lowercase().cmp(&b.to_lowercase());
    if folded != Ordering::Equal {
        return folded;
    }
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca == cb {
            continue;
        }
        match (ca.is_lowercase(), cb.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => return ca.cmp(&cb),
        }
    }
    a.len().cmp(&b.len())
}
