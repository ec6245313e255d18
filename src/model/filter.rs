use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Structural view modes offered by the filter selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    #[default]
    #[serde(rename = "ALL")]
    All,
    #[serde(rename = "FINISHED")]
    Finished,
    #[serde(rename = "UNFINISHED")]
    Unfinished,
    #[serde(rename = "A-Z")]
    AToZ,
    #[serde(rename = "Z-A")]
    ZToA,
}

impl FilterMode {
    /// Every mode, in selector order
    pub const ALL_MODES: [FilterMode; 5] = [
        FilterMode::All,
        FilterMode::Finished,
        FilterMode::Unfinished,
        FilterMode::AToZ,
        FilterMode::ZToA,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterMode::All => "ALL",
            FilterMode::Finished => "FINISHED",
            FilterMode::Unfinished => "UNFINISHED",
            FilterMode::AToZ => "A-Z",
            FilterMode::ZToA => "Z-A",
        }
    }

    /// The mode after this one in selector order, wrapping around
    pub fn next(self) -> FilterMode {
        let idx = Self::ALL_MODES.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL_MODES[(idx + 1) % Self::ALL_MODES.len()]
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown filter mode '{0}' (expected ALL, FINISHED, UNFINISHED, A-Z or Z-A)")]
pub struct ParseFilterModeError(String);

impl FromStr for FilterMode {
    type Err = ParseFilterModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL_MODES
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| ParseFilterModeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("finished".parse::<FilterMode>(), Ok(FilterMode::Finished));
        assert_eq!("a-z".parse::<FilterMode>(), Ok(FilterMode::AToZ));
        assert_eq!(" Z-A ".parse::<FilterMode>(), Ok(FilterMode::ZToA));
        assert!("newest".parse::<FilterMode>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for mode in FilterMode::ALL_MODES {
            assert_eq!(mode.to_string().parse::<FilterMode>(), Ok(mode));
        }
    }

    #[test]
    fn next_cycles_through_every_mode() {
        let mut mode = FilterMode::All;
        let mut seen = Vec::new();
        for _ in 0..5 {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(seen, FilterMode::ALL_MODES.to_vec());
        assert_eq!(mode, FilterMode::All);
    }

    #[test]
    fn serde_uses_selector_labels() {
        assert_eq!(serde_json::to_string(&FilterMode::AToZ).unwrap(), "\"A-Z\"");
        let m: FilterMode = serde_json::from_str("\"UNFINISHED\"").unwrap();
        assert_eq!(m, FilterMode::Unfinished);
    }
}
