mod settings;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::load_config;
use crate::io::data_dir::resolve_data_dir;
use crate::io::lock::FileLock;
use crate::io::recovery::{
    log_discarded_notes, log_note_deletion, prune_recovery, read_recovery_entries,
    recovery_log_path,
};
use crate::io::storage::FileStore;
use crate::model::{Note, NoteDraft, parse_due};
use crate::ops::note_store::{LookupError, NOTES_KEY, NoteStore};
use crate::ops::view::ViewQuery;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Resolved global options shared by every handler
pub(crate) struct Context {
    pub data_dir: PathBuf,
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context {
        data_dir: resolve_data_dir(cli.data_dir.as_deref()),
        json: cli.json,
    };

    match cli.command {
        None => Err("no command given (run `jt` without arguments for the TUI)".into()),
        Some(cmd) => match cmd {
            // Read commands
            Commands::List(args) => cmd_list(&ctx, args),
            Commands::Show(args) => cmd_show(&ctx, args),

            // Write commands
            Commands::Add(args) => cmd_add(&ctx, args),
            Commands::Edit(args) => cmd_edit(&ctx, args),
            Commands::Toggle(args) => cmd_toggle(&ctx, args),
            Commands::Rm(args) => cmd_rm(&ctx, args),

            // Preferences
            Commands::Theme(args) => settings::cmd_theme(&ctx, args),
            Commands::Config(args) => settings::cmd_config(&ctx, args),

            // Maintenance
            Commands::Recovery(args) => cmd_recovery(&ctx, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_storage(ctx: &Context) -> Result<FileStore, Box<dyn std::error::Error>> {
    Ok(FileStore::open(&ctx.data_dir)?)
}

/// Take the data-directory lock, waiting up to `storage.lock_timeout_ms`.
pub(crate) fn acquire_lock(data_dir: &Path) -> Result<FileLock, Box<dyn std::error::Error>> {
    let config = load_config(data_dir)?;
    let timeout = Duration::from_millis(config.storage.lock_timeout_ms);
    Ok(FileLock::acquire(data_dir, timeout)?)
}

/// Unreadable stored notes load as an empty list and stay on disk until
/// the next write replaces them. Call this right before that write.
fn set_aside_discarded(ctx: &Context, store: &NoteStore<FileStore>) {
    if let Some(raw) = store.discarded() {
        log_discarded_notes(&ctx.data_dir, NOTES_KEY, raw);
    }
}

/// Resolve a typed id. Unknown ids give `None`; an ambiguous prefix is an error.
fn resolve(
    store: &NoteStore<FileStore>,
    prefix: &str,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    match store.resolve_id(prefix) {
        Ok(id) => Ok(Some(id.to_string())),
        Err(LookupError::NotFound(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let store = NoteStore::load(open_storage(ctx)?);
    let query = match (args.search, args.filter) {
        (Some(text), _) => ViewQuery::Search(text),
        (None, Some(mode)) => ViewQuery::Filter(mode),
        (None, None) => ViewQuery::Filter(load_config(&ctx.data_dir)?.ui.default_filter),
    };
    let notes = query.apply(store.notes());

    if ctx.json {
        return print_json(&notes);
    }
    for note in notes {
        println!("{}", format_note_line(note));
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: IdArgs) -> CmdResult {
    let store = NoteStore::load(open_storage(ctx)?);
    let id = store.resolve_id(&args.id)?;
    let note = store
        .get(id)
        .ok_or_else(|| format!("note not found: {}", args.id))?;

    if ctx.json {
        return print_json(note);
    }
    println!("{}", format_note_detail(note));
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let storage = open_storage(ctx)?;
    let _lock = acquire_lock(&ctx.data_dir)?;
    let mut store = NoteStore::load(storage);

    let datetime = match args.due {
        Some(due) => parse_due(&due)?,
        None => NoteDraft::due_now().datetime,
    };
    let draft = NoteDraft {
        title: args.title,
        description: args.description,
        datetime,
    };
    draft.validate()?;
    set_aside_discarded(ctx, &store);
    let id = store.create(draft)?;

    if ctx.json {
        return print_json(&IdJson { id: &id });
    }
    println!("{}", id);
    Ok(())
}

fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let storage = open_storage(ctx)?;
    let _lock = acquire_lock(&ctx.data_dir)?;
    let mut store = NoteStore::load(storage);

    let Some(id) = resolve(&store, &args.id)? else {
        return Ok(());
    };
    let Some(current) = store.get(&id) else {
        return Ok(());
    };

    let mut draft = current.to_draft();
    let finish = current.finish;
    if let Some(title) = args.title {
        draft.title = title;
    }
    if let Some(description) = args.description {
        draft.description = description;
    }
    if let Some(due) = args.due {
        draft.datetime = parse_due(&due)?;
    }
    draft.validate()?;

    let mut note = Note::from_draft(id.clone(), draft);
    note.finish = finish;
    set_aside_discarded(ctx, &store);
    store.edit(&id, note)?;

    if let Some(note) = store.get(&id) {
        if ctx.json {
            return print_json(note);
        }
        println!("{}", format_note_line(note));
    }
    Ok(())
}

fn cmd_toggle(ctx: &Context, args: IdArgs) -> CmdResult {
    let storage = open_storage(ctx)?;
    let _lock = acquire_lock(&ctx.data_dir)?;
    let mut store = NoteStore::load(storage);

    let Some(id) = resolve(&store, &args.id)? else {
        return Ok(());
    };
    set_aside_discarded(ctx, &store);
    let Some(finish) = store.toggle_finish(&id)? else {
        return Ok(());
    };

    if ctx.json {
        return print_json(&ToggleJson { id: &id, finish });
    }
    if let Some(note) = store.get(&id) {
        println!("{}", format_note_line(note));
    }
    Ok(())
}

fn cmd_rm(ctx: &Context, args: IdArgs) -> CmdResult {
    let storage = open_storage(ctx)?;
    let _lock = acquire_lock(&ctx.data_dir)?;
    let mut store = NoteStore::load(storage);

    let removed = match resolve(&store, &args.id)? {
        Some(id) => {
            set_aside_discarded(ctx, &store);
            store.remove(&id)?
        }
        None => None,
    };
    if let Some(note) = &removed {
        log_note_deletion(&ctx.data_dir, note);
    }

    if ctx.json {
        return print_json(&RemovedJson {
            removed: removed.as_ref(),
        });
    }
    if let Some(note) = &removed {
        println!("deleted {} \"{}\"", note.short_id(), note.title);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

fn cmd_recovery(ctx: &Context, args: RecoveryCmd) -> CmdResult {
    match args.action {
        Some(RecoveryAction::Path) => {
            println!("{}", recovery_log_path(&ctx.data_dir).display());
            Ok(())
        }
        Some(RecoveryAction::Prune(prune)) => {
            let _lock = acquire_lock(&ctx.data_dir)?;
            let removed = prune_recovery(&ctx.data_dir, prune.all)?;
            if ctx.json {
                return print_json(&PruneJson { removed });
            }
            println!(
                "pruned {} entr{}",
                removed,
                if removed == 1 { "y" } else { "ies" }
            );
            Ok(())
        }
        None => {
            let mut entries = read_recovery_entries(&ctx.data_dir);
            let total = entries.len();
            entries.truncate(args.limit.unwrap_or(10));
            if ctx.json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("No recovery log entries.");
                return Ok(());
            }
            print!("{}", format_recovery_entries(&entries));
            if total > entries.len() {
                println!("({} of {} entries shown; use --limit for more)", entries.len(), total);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ctx(dir: &Path) -> Context {
        Context {
            data_dir: dir.to_path_buf(),
            json: false,
        }
    }

    fn add(ctx: &Context, title: &str) -> String {
        cmd_add(
            ctx,
            AddArgs {
                title: title.into(),
                description: "d".into(),
                due: Some("2024-01-01".into()),
            },
        )
        .unwrap();
        let store = NoteStore::load(FileStore::open(&ctx.data_dir).unwrap());
        store.notes()[0].id.clone()
    }

    #[test]
    fn add_then_edit_keeps_finish_and_position() {
        let tmp = TempDir::new().unwrap();
        let ctx = ctx(tmp.path());
        let first = add(&ctx, "First");
        add(&ctx, "Second");
        cmd_toggle(&ctx, IdArgs { id: first.clone() }).unwrap();

        cmd_edit(
            &ctx,
            EditArgs {
                id: first[..8].to_string(),
                title: Some("First, renamed".into()),
                description: None,
                due: Some("2024-02-02 08:15".into()),
            },
        )
        .unwrap();

        let store = NoteStore::load(FileStore::open(tmp.path()).unwrap());
        let note = &store.notes()[1];
        assert_eq!(note.id, first);
        assert_eq!(note.title, "First, renamed");
        assert_eq!(note.datetime, "2024-02-02T08:15");
        assert!(note.finish);
    }

    #[test]
    fn edit_rejects_blank_title() {
        let tmp = TempDir::new().unwrap();
        let ctx = ctx(tmp.path());
        let id = add(&ctx, "Keep me");
        let result = cmd_edit(
            &ctx,
            EditArgs {
                id,
                title: Some("  ".into()),
                description: None,
                due: None,
            },
        );
        assert!(result.unwrap_err().to_string().contains("title"));
        let store = NoteStore::load(FileStore::open(tmp.path()).unwrap());
        assert_eq!(store.notes()[0].title, "Keep me");
    }

    #[test]
    fn rm_logs_deleted_note() {
        let tmp = TempDir::new().unwrap();
        let ctx = ctx(tmp.path());
        let id = add(&ctx, "Doomed");
        cmd_rm(&ctx, IdArgs { id: id.clone() }).unwrap();

        let store = NoteStore::load(FileStore::open(tmp.path()).unwrap());
        assert!(store.is_empty());
        let entries = read_recovery_entries(tmp.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].subject, id);
        assert!(entries[0].payload.contains("Doomed"));
    }

    #[test]
    fn unknown_ids_are_silent_noops() {
        let tmp = TempDir::new().unwrap();
        let ctx = ctx(tmp.path());
        add(&ctx, "Only");
        cmd_rm(&ctx, IdArgs { id: "zzzz".into() }).unwrap();
        cmd_toggle(&ctx, IdArgs { id: "zzzz".into() }).unwrap();
        let store = NoteStore::load(FileStore::open(tmp.path()).unwrap());
        assert_eq!(store.len(), 1);
        assert!(!store.notes()[0].finish);
    }

    #[test]
    fn corrupt_notes_are_set_aside_once_before_overwrite() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(NOTES_KEY), "not json").unwrap();
        let ctx = ctx(tmp.path());

        cmd_list(&ctx, ListArgs { filter: None, search: None }).unwrap();
        cmd_list(&ctx, ListArgs { filter: None, search: None }).unwrap();
        cmd_rm(&ctx, IdArgs { id: "abc".into() }).unwrap();
        assert!(read_recovery_entries(tmp.path()).is_empty());

        add(&ctx, "Fresh start");
        add(&ctx, "Second");
        let entries = read_recovery_entries(tmp.path());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].payload, "not json");
    }

    #[test]
    fn show_unknown_id_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = cmd_show(&ctx(tmp.path()), IdArgs { id: "nope".into() });
        assert!(result.is_err());
    }

    #[test]
    fn invalid_add_leaves_corrupt_file_unlogged() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(NOTES_KEY), "not json").unwrap();
        let result = cmd_add(
            &ctx(tmp.path()),
            AddArgs {
                title: "No description".into(),
                description: " ".into(),
                due: None,
            },
        );
        assert!(result.is_err());
        assert!(read_recovery_entries(tmp.path()).is_empty());
        assert_eq!(
            std::fs::read_to_string(tmp.path().join(NOTES_KEY)).unwrap(),
            "not json"
        );
    }
}
