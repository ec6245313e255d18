use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::FilterMode;

#[derive(Parser)]
#[command(name = "jt", about = concat!("jotter v", env!("CARGO_PKG_VERSION"), " - notes and to-dos in your terminal"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List notes through a filter or a title search
    List(ListArgs),
    /// Show one note
    Show(IdArgs),
    /// Add a note (newest first)
    Add(AddArgs),
    /// Edit fields of a note in place
    Edit(EditArgs),
    /// Flip a note between finished and unfinished
    Toggle(IdArgs),
    /// Delete a note
    Rm(IdArgs),
    /// Show or change the light/dark theme
    Theme(ThemeArgs),
    /// Edit config.toml
    Config(ConfigCmd),
    /// View or manage the recovery log
    Recovery(RecoveryCmd),
}

// ---------------------------------------------------------------------------
// Note commands
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// ALL, FINISHED, UNFINISHED, A-Z or Z-A
    #[arg(long, conflicts_with = "search")]
    pub filter: Option<FilterMode>,
    /// Case-insensitive title search
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct IdArgs {
    /// Note id or a unique prefix of it
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Note title
    pub title: String,
    /// Note description
    #[arg(long = "desc")]
    pub description: String,
    /// Due date-time (YYYY-MM-DDTHH:MM, YYYY-MM-DD HH:MM or YYYY-MM-DD; default: now)
    #[arg(long)]
    pub due: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Note id or a unique prefix of it
    pub id: String,
    /// New title
    #[arg(long)]
    pub title: Option<String>,
    /// New description
    #[arg(long = "desc")]
    pub description: Option<String>,
    /// New due date-time
    #[arg(long)]
    pub due: Option<String>,
}

// ---------------------------------------------------------------------------
// Theme and config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub action: Option<ThemeAction>,
}

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Switch between light and dark
    Toggle,
    /// Use the dark theme
    Dark,
    /// Use the light theme
    Light,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set a key, e.g. `ui.default_filter UNFINISHED` or `ui.dark.highlight #FB4196`
    Set(ConfigSetArgs),
    /// Print the path to config.toml
    Path,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryCmd {
    #[command(subcommand)]
    pub action: Option<RecoveryAction>,
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Subcommand)]
pub enum RecoveryAction {
    /// Remove entries older than 30 days
    Prune(RecoveryPruneArgs),
    /// Print the path to the recovery log
    Path,
}

#[derive(Args)]
pub struct RecoveryPruneArgs {
    /// Remove every entry
    #[arg(long)]
    pub all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn filter_and_search_conflict() {
        let result = Cli::try_parse_from(["jt", "list", "--filter", "ALL", "--search", "x"]);
        assert!(result.is_err());
    }

    #[test]
    fn filter_parses_case_insensitively() {
        let cli = Cli::try_parse_from(["jt", "list", "--filter", "z-a"]).unwrap();
        match cli.command {
            Some(Commands::List(args)) => assert_eq!(args.filter, Some(FilterMode::ZToA)),
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["jt", "show", "abc", "--json", "-C", "/tmp/x"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
    }
}
