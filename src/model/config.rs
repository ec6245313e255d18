use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::filter::FilterMode;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Filter mode the TUI starts in when no saved view state exists
    #[serde(default)]
    pub default_filter: FilterMode,
    /// Default: true
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Color overrides for the dark palette (`name = "#RRGGBB"`)
    #[serde(default)]
    pub dark: IndexMap<String, String>,
    /// Color overrides for the light palette
    #[serde(default)]
    pub light: IndexMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            default_filter: FilterMode::All,
            show_key_hints: true,
            dark: IndexMap::new(),
            light: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// How long a writer waits for the data directory lock. Default: 5000
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.ui.default_filter, FilterMode::All);
        assert!(config.ui.show_key_hints);
        assert!(config.ui.dark.is_empty());
        assert_eq!(config.storage.lock_timeout_ms, 5000);
    }

    #[test]
    fn parses_all_sections() {
        let config: Config = toml::from_str(
            r##"
[ui]
default_filter = "Z-A"
show_key_hints = false

[ui.dark]
highlight = "#FB4196"
background = "#000000"

[ui.light]
background = "#FFFFFF"

[storage]
lock_timeout_ms = 250
"##,
        )
        .unwrap();
        assert_eq!(config.ui.default_filter, FilterMode::ZToA);
        assert!(!config.ui.show_key_hints);
        // Insertion order is kept
        let keys: Vec<&String> = config.ui.dark.keys().collect();
        assert_eq!(keys, vec!["highlight", "background"]);
        assert_eq!(config.ui.light["background"], "#FFFFFF");
        assert_eq!(config.storage.lock_timeout_ms, 250);
    }

    #[test]
    fn rejects_unknown_filter_mode() {
        assert!(toml::from_str::<Config>("[ui]\ndefault_filter = \"NEWEST\"\n").is_err());
    }
}
