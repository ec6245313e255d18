use std::path::{Path, PathBuf};

/// Default data directory: `$XDG_DATA_HOME/jotter`, falling back to
/// `~/.local/share/jotter`.
pub fn default_data_dir() -> PathBuf {
    let data_home = std::env::var("XDG_DATA_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs_home().join(".local").join("share"));
    data_home.join("jotter")
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Pick the data directory: an explicit `-C` override wins.
pub fn resolve_data_dir(override_dir: Option<&Path>) -> PathBuf {
    match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => default_data_dir(),
    }
}
