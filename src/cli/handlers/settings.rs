use crate::cli::commands::{ConfigAction, ConfigCmd, ThemeAction, ThemeArgs};
use crate::cli::output::ThemeJson;
use crate::io::config_io::{config_path, read_config, set_config_value, write_config};
use crate::io::storage::{FileStore, StorageError};
use crate::ops::theme_pref::{self, ThemeMode};

use super::{CmdResult, Context, acquire_lock, print_json};

pub(super) fn cmd_theme(ctx: &Context, args: ThemeArgs) -> CmdResult {
    let mut storage = FileStore::open(&ctx.data_dir)?;
    // Reading may migrate the legacy key, so every path writes under the lock
    let _lock = acquire_lock(&ctx.data_dir)?;
    let mode = match args.action {
        None => theme_pref::load_theme(&mut storage),
        Some(ThemeAction::Toggle) => theme_pref::toggle_theme(&mut storage)?,
        Some(ThemeAction::Dark) => set_mode(&mut storage, ThemeMode::Dark)?,
        Some(ThemeAction::Light) => set_mode(&mut storage, ThemeMode::Light)?,
    };

    if ctx.json {
        return print_json(&ThemeJson::from(mode));
    }
    println!("{}", mode);
    Ok(())
}

fn set_mode(storage: &mut FileStore, mode: ThemeMode) -> Result<ThemeMode, StorageError> {
    theme_pref::save_theme(storage, mode)?;
    Ok(mode)
}

pub(super) fn cmd_config(ctx: &Context, args: ConfigCmd) -> CmdResult {
    match args.action {
        ConfigAction::Path => {
            println!("{}", config_path(&ctx.data_dir).display());
        }
        ConfigAction::Set(set) => {
            std::fs::create_dir_all(&ctx.data_dir)?;
            let _lock = acquire_lock(&ctx.data_dir)?;
            let (_config, mut doc) = read_config(&ctx.data_dir)?;
            set_config_value(&mut doc, &set.key, &set.value)?;
            write_config(&ctx.data_dir, &doc)?;
        }
    }
    Ok(())
}
