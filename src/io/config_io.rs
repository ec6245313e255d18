use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use toml_edit::{DocumentMut, Item, Table};

use crate::io::storage::atomic_write;
use crate::model::config::Config;
use crate::model::filter::FilterMode;

/// Error type for config.toml access
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not parse config.toml: {0}")]
    Edit(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

/// Read config.toml, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing. A missing file yields
/// the defaults and an empty document.
pub fn read_config(data_dir: &Path) -> Result<(Config, DocumentMut), ConfigError> {
    let path = config_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok((Config::default(), DocumentMut::new()));
        }
        Err(e) => return Err(ConfigError::Read { path, source: e }),
    };
    let config: Config = toml::from_str(&text)?;
    let doc: DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Read just the parsed config.
pub fn load_config(data_dir: &Path) -> Result<Config, ConfigError> {
    read_config(data_dir).map(|(config, _)| config)
}

/// Write the document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &DocumentMut) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|e| ConfigError::Write { path, source: e })
}

/// Set a dotted key (e.g. `ui.default_filter`, `ui.dark.highlight`) in the
/// document after checking the value parses for that key.
pub fn set_config_value(doc: &mut DocumentMut, key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = key.split('.').collect();
    match parts.as_slice() {
        ["ui", "default_filter"] => {
            let mode = value
                .parse::<FilterMode>()
                .map_err(|e| invalid(&e.to_string()))?;
            let ui = ensure_table(doc.as_table_mut(), "ui")?;
            ui["default_filter"] = toml_edit::value(mode.as_str());
        }
        ["ui", "show_key_hints"] => {
            let flag: bool = value.parse().map_err(|_| invalid("expected true or false"))?;
            let ui = ensure_table(doc.as_table_mut(), "ui")?;
            ui["show_key_hints"] = toml_edit::value(flag);
        }
        ["storage", "lock_timeout_ms"] => {
            let ms: i64 = value
                .parse()
                .ok()
                .filter(|ms| *ms >= 0)
                .ok_or_else(|| invalid("expected a non-negative number of milliseconds"))?;
            let storage = ensure_table(doc.as_table_mut(), "storage")?;
            storage["lock_timeout_ms"] = toml_edit::value(ms);
        }
        ["ui", palette @ ("dark" | "light"), color] => {
            if !is_hex_color(value) {
                return Err(invalid("expected a #RRGGBB color"));
            }
            let ui = ensure_table(doc.as_table_mut(), "ui")?;
            let colors = ensure_table(ui, palette)?;
            colors[*color] = toml_edit::value(value);
        }
        _ => return Err(ConfigError::UnknownKey(key.to_string())),
    }
    Ok(())
}

fn ensure_table<'a>(parent: &'a mut Table, key: &str) -> Result<&'a mut Table, ConfigError> {
    if !parent.contains_key(key) {
        parent.insert(key, Item::Table(Table::new()));
    }
    parent
        .get_mut(key)
        .and_then(Item::as_table_mut)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
}

fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
