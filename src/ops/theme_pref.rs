use std::fmt;
use std::str::FromStr;

use crate::io::storage::{KeyValueStore, StorageError};

/// Storage key holding the theme preference (`dark` or `light`)
pub const MODE_KEY: &str = "mode";
/// Older boolean key (`true`/`false`), read only when `mode` is absent
pub const LEGACY_KEY: &str = "darkMode";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    pub fn toggled(self) -> ThemeMode {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == ThemeMode::Dark
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme '{0}' (expected dark or light)")]
pub struct ParseThemeModeError(String);

impl FromStr for ThemeMode {
    type Err = ParseThemeModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(ThemeMode::Dark),
            "light" => Ok(ThemeMode::Light),
            _ => Err(ParseThemeModeError(s.to_string())),
        }
    }
}

/// Read the stored preference. Missing or unrecognized values give
/// `Light`. A legacy `darkMode` value is moved to `mode` on the way; if
/// that write fails the legacy key is left for the next attempt.
pub fn load_theme<S: KeyValueStore + ?Sized>(storage: &mut S) -> ThemeMode {
    if let Ok(Some(raw)) = storage.get(MODE_KEY) {
        return raw.parse().unwrap_or_default();
    }
    let legacy = match storage.get(LEGACY_KEY) {
        Ok(Some(raw)) => raw,
        _ => return ThemeMode::default(),
    };
    let mode = if legacy.trim() == "true" {
        ThemeMode::Dark
    } else {
        ThemeMode::Light
    };
    if storage.set(MODE_KEY, mode.as_str()).is_ok() {
        let _ = storage.remove(LEGACY_KEY);
    }
    mode
}

pub fn save_theme<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    mode: ThemeMode,
) -> Result<(), StorageError> {
    storage.set(MODE_KEY, mode.as_str())
}

/// Flip the stored preference and return the new mode.
pub fn toggle_theme<S: KeyValueStore + ?Sized>(
    storage: &mut S,
) -> Result<ThemeMode, StorageError> {
    let mode = load_theme(storage).toggled();
    save_theme(storage, mode)?;
    Ok(mode)
}
