use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use regex::Regex;

use crate::io::config_io::load_config;
use crate::io::data_dir::resolve_data_dir;
use crate::io::lock::{FileLock, LockError};
use crate::io::recovery::{log_discarded_notes, log_note_deletion};
use crate::io::storage::{FileStore, KeyValueStore};
use crate::io::watcher::DataWatcher;
use crate::model::{Config, FilterMode, Note, NoteDraft, parse_due};
use crate::ops::note_store::{NOTES_KEY, NoteStore, StoreError};
use crate::ops::theme_pref::{self, ThemeMode};
use crate::ops::view::ViewQuery;
use crate::util::unicode;

use super::input;
use super::modal::ModalCoordinator;
use super::render;
use super::theme::Theme;

pub type Store = NoteStore<Box<dyn KeyValueStore>>;

/// Current interaction mode outside overlays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    Search,
}

/// Why the modal is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// Note form; `editing` is the id being edited, `None` for a new note
    Editor { editing: Option<String> },
    DeleteConfirm { id: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorField {
    #[default]
    Title,
    Description,
    Due,
}

impl EditorField {
    pub const ALL: [EditorField; 3] = [
        EditorField::Title,
        EditorField::Description,
        EditorField::Due,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EditorField::Title => "Title",
            EditorField::Description => "Description",
            EditorField::Due => "Due",
        }
    }

    pub fn next(self) -> EditorField {
        match self {
            EditorField::Title => EditorField::Description,
            EditorField::Description => EditorField::Due,
            EditorField::Due => EditorField::Title,
        }
    }

    pub fn prev(self) -> EditorField {
        match self {
            EditorField::Title => EditorField::Due,
            EditorField::Description => EditorField::Title,
            EditorField::Due => EditorField::Description,
        }
    }
}

/// Editor form contents plus which field has focus. `cursor` is a byte
/// offset into the focused field, always on a grapheme boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorForm {
    pub draft: NoteDraft,
    pub focus: EditorField,
    pub cursor: usize,
}

impl EditorForm {
    pub fn new(draft: NoteDraft) -> Self {
        let cursor = draft.title.len();
        EditorForm {
            draft,
            focus: EditorField::Title,
            cursor,
        }
    }

    pub fn field(&self, field: EditorField) -> &str {
        match field {
            EditorField::Title => &self.draft.title,
            EditorField::Description => &self.draft.description,
            EditorField::Due => &self.draft.datetime,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            EditorField::Title => &mut self.draft.title,
            EditorField::Description => &mut self.draft.description,
            EditorField::Due => &mut self.draft.datetime,
        }
    }

    pub fn focus(&mut self, field: EditorField) {
        self.focus = field;
        self.cursor = self.field(field).len();
    }

    pub fn insert_char(&mut self, c: char) {
        let cursor = self.cursor;
        self.focused_mut().insert(cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        let cursor = self.cursor;
        let text = self.focused_mut();
        if let Some(prev) = unicode::prev_grapheme_boundary(text, cursor) {
            text.replace_range(prev..cursor, "");
            self.cursor = prev;
        }
    }

    /// Ctrl-W: remove the word before the cursor
    pub fn delete_word_back(&mut self) {
        let cursor = self.cursor;
        let text = self.focused_mut();
        let start = unicode::word_boundary_left(text, cursor);
        text.replace_range(start..cursor, "");
        self.cursor = start;
    }

    pub fn delete(&mut self) {
        let cursor = self.cursor;
        let text = self.focused_mut();
        if let Some(next) = unicode::next_grapheme_boundary(text, cursor) {
            text.replace_range(cursor..next, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = unicode::prev_grapheme_boundary(self.field(self.focus), self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = unicode::next_grapheme_boundary(self.field(self.focus), self.cursor) {
            self.cursor = next;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.field(self.focus).len();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// Main application state
pub struct App {
    pub store: Store,
    /// Key-value storage holding the theme preference
    pub prefs: Box<dyn KeyValueStore>,
    /// Data directory for lock, recovery log and view state. `None` when
    /// running against in-memory storage.
    pub data_dir: Option<PathBuf>,
    pub config: Config,
    pub theme_mode: ThemeMode,
    pub theme: Theme,
    pub mode: Mode,
    pub modal: ModalCoordinator,
    pub overlay: Option<Overlay>,
    pub editor: EditorForm,
    pub query: ViewQuery,
    /// Structural filter to return to when a search is cleared
    pub filter: FilterMode,
    pub search_input: String,
    pub cursor: usize,
    pub scroll_offset: usize,
    pub status: Option<StatusMessage>,
    /// Set after a failed write; memory is ahead of storage until `retry_sync`
    pub unsaved: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(store: Store, mut prefs: Box<dyn KeyValueStore>, config: Config) -> Self {
        let theme_mode = theme_pref::load_theme(&mut *prefs);
        let theme = Theme::for_mode(theme_mode, &config.ui);
        let filter = config.ui.default_filter;

        App {
            store,
            prefs,
            data_dir: None,
            config,
            theme_mode,
            theme,
            mode: Mode::Navigate,
            modal: ModalCoordinator::default(),
            overlay: None,
            editor: EditorForm::default(),
            query: ViewQuery::Filter(filter),
            filter,
            search_input: String::new(),
            cursor: 0,
            scroll_offset: 0,
            status: None,
            unsaved: false,
            should_quit: false,
        }
    }

    pub fn with_data_dir(mut self, data_dir: PathBuf) -> Self {
        self.data_dir = Some(data_dir);
        self
    }

    /// The notes currently on screen, in display order
    pub fn visible_notes(&self) -> Vec<&Note> {
        self.query.apply(self.store.notes())
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.visible_notes().get(self.cursor).copied()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected_note().map(|n| n.id.clone())
    }

    /// The overlay to draw, if the modal is up
    pub fn active_overlay(&self) -> Option<&Overlay> {
        if self.modal.is_visible() {
            self.overlay.as_ref()
        } else {
            None
        }
    }

    /// Case-insensitive literal matcher for the active search, for highlighting
    pub fn active_search_re(&self) -> Option<Regex> {
        let query = match &self.query {
            ViewQuery::Search(q) if !q.is_empty() => q,
            _ => return None,
        };
        Regex::new(&format!("(?i){}", regex::escape(query))).ok()
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    // -- cursor --

    pub fn clamp_cursor(&mut self) {
        let count = self.visible_notes().len();
        self.cursor = if count == 0 {
            0
        } else {
            self.cursor.min(count - 1)
        };
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let count = self.visible_notes().len();
        if count == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(count - 1);
    }

    pub fn cursor_to_top(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_to_bottom(&mut self) {
        self.cursor = self.visible_notes().len().saturating_sub(1);
    }

    /// Put the cursor on the note with `id` if it is visible
    pub fn select_id(&mut self, id: &str) {
        if let Some(pos) = self.visible_notes().iter().position(|n| n.id == id) {
            self.cursor = pos;
        }
    }

    // -- view query --

    pub fn set_filter(&mut self, mode: FilterMode) {
        self.filter = mode;
        self.query = ViewQuery::Filter(mode);
        self.search_input.clear();
        self.cursor = 0;
    }

    pub fn cycle_filter(&mut self) {
        // While searching, `f` returns to the remembered filter first
        let next = match self.query {
            ViewQuery::Filter(mode) => mode.next(),
            ViewQuery::Search(_) => self.filter,
        };
        self.set_filter(next);
    }

    pub fn start_search(&mut self) {
        self.mode = Mode::Search;
        self.search_input = match &self.query {
            ViewQuery::Search(q) => q.clone(),
            ViewQuery::Filter(_) => String::new(),
        };
    }

    /// Re-run the search with the text typed so far
    pub fn update_search(&mut self) {
        self.query = ViewQuery::Search(self.search_input.clone());
        self.cursor = 0;
    }

    pub fn commit_search(&mut self) {
        if self.search_input.is_empty() {
            self.clear_search();
        } else {
            self.update_search();
            self.mode = Mode::Navigate;
        }
    }

    pub fn clear_search(&mut self) {
        self.mode = Mode::Navigate;
        self.set_filter(self.filter);
    }

    // -- overlays --

    fn show_overlay(&mut self, overlay: Overlay) {
        self.overlay = Some(overlay);
        self.modal.set_visible(true);
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
        self.modal.set_visible(false);
    }

    pub fn open_new_editor(&mut self) {
        self.editor = EditorForm::new(NoteDraft::due_now());
        self.show_overlay(Overlay::Editor { editing: None });
    }

    pub fn open_edit_editor(&mut self) {
        let Some(note) = self.selected_note() else {
            return;
        };
        let id = note.id.clone();
        self.editor = EditorForm::new(note.to_draft());
        self.show_overlay(Overlay::Editor { editing: Some(id) });
    }

    /// Validate the form and hand it to the store. The editor stays open
    /// when validation fails.
    pub fn submit_editor(&mut self) {
        let editing = match &self.overlay {
            Some(Overlay::Editor { editing }) => editing.clone(),
            _ => return,
        };
        if let Err(e) = self.editor.draft.validate() {
            self.set_error(e.to_string());
            return;
        }
        let mut draft = self.editor.draft.clone();
        match parse_due(&draft.datetime) {
            Ok(due) => draft.datetime = due,
            Err(e) => {
                self.editor.focus(EditorField::Due);
                self.set_error(e.to_string());
                return;
            }
        }
        self.close_overlay();

        match editing {
            None => {
                if let Some(id) = self.mutate(|store| store.create(draft)) {
                    self.select_id(&id);
                    self.set_status("added");
                }
            }
            Some(id) => {
                let finish = self.store.get(&id).is_some_and(|n| n.finish);
                let mut note = Note::from_draft(id.clone(), draft);
                note.finish = finish;
                if self.mutate(|store| store.edit(&id, note)).is_some() {
                    self.set_status("saved");
                }
            }
        }
        self.clamp_cursor();
    }

    pub fn open_delete_confirm(&mut self) {
        if let Some(id) = self.selected_id() {
            self.show_overlay(Overlay::DeleteConfirm { id });
        }
    }

    pub fn confirm_delete(&mut self) {
        let id = match &self.overlay {
            Some(Overlay::DeleteConfirm { id }) => id.clone(),
            _ => return,
        };
        self.close_overlay();

        let removed = self.store.get(&id).cloned();
        self.mutate(|store| store.remove(&id));
        if let Some(note) = removed
            && self.store.get(&id).is_none()
        {
            if let Some(dir) = &self.data_dir {
                log_note_deletion(dir, &note);
            }
            if !self.unsaved {
                self.set_status(format!("deleted \"{}\"", note.title));
            }
        }
        self.clamp_cursor();
    }

    // -- store mutations --

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        self.mutate(|store| store.toggle_finish(&id));
        self.clamp_cursor();
    }

    /// Write the in-memory collection again after a failed save
    pub fn retry_sync(&mut self) {
        if !self.unsaved {
            return;
        }
        if self.mutate(|store| store.sync()).is_some() {
            self.set_status("saved");
        }
    }

    /// Run a store mutation under the data-directory lock. Storage is
    /// re-read first unless memory holds unsaved changes. Errors land in
    /// the status row.
    fn mutate<T>(&mut self, op: impl FnOnce(&mut Store) -> Result<T, StoreError>) -> Option<T> {
        let _lock = match self.acquire_lock() {
            Ok(lock) => lock,
            Err(e) => {
                self.set_error(e.to_string());
                return None;
            }
        };
        if !self.unsaved {
            self.store.reload();
            self.set_aside_discarded();
        }
        match op(&mut self.store) {
            Ok(value) => {
                self.unsaved = false;
                Some(value)
            }
            Err(StoreError::Storage(e)) => {
                self.unsaved = true;
                self.set_error(format!("{} (R to retry)", e));
                None
            }
            Err(e) => {
                self.set_error(e.to_string());
                None
            }
        }
    }

    fn acquire_lock(&self) -> Result<Option<FileLock>, LockError> {
        match &self.data_dir {
            Some(dir) => {
                let timeout = Duration::from_millis(self.config.storage.lock_timeout_ms);
                FileLock::acquire(dir, timeout).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Unreadable notes stay on disk until the next write; log them just
    /// before that write replaces them.
    fn set_aside_discarded(&self) {
        if let (Some(dir), Some(raw)) = (&self.data_dir, self.store.discarded()) {
            log_discarded_notes(dir, NOTES_KEY, raw);
        }
    }

    // -- theme --

    pub fn toggle_theme(&mut self) {
        match theme_pref::toggle_theme(&mut *self.prefs) {
            Ok(mode) => self.apply_theme(mode),
            Err(e) => self.set_error(e.to_string()),
        }
    }

    fn apply_theme(&mut self, mode: ThemeMode) {
        self.theme_mode = mode;
        self.theme = Theme::for_mode(mode, &self.config.ui);
    }

    /// Another process changed the data directory
    pub fn reload_from_disk(&mut self) {
        let selected = self.selected_id();
        if !self.unsaved {
            self.store.reload();
        }
        let mode = theme_pref::load_theme(&mut *self.prefs);
        self.apply_theme(mode);
        if let Some(id) = selected {
            self.select_id(&id);
        }
        self.clamp_cursor();
    }
}

/// Restore view state from .state.json
pub fn restore_ui_state(app: &mut App) {
    use crate::io::state::read_ui_state;

    let Some(dir) = &app.data_dir else {
        return;
    };
    let Some(ui_state) = read_ui_state(dir) else {
        return;
    };

    app.set_filter(ui_state.filter);
    if let Some(search) = ui_state.search {
        app.search_input = search;
        app.update_search();
    }
    if let Some(id) = ui_state.selected {
        app.select_id(&id);
    }
}

/// Save view state to .state.json
pub fn save_ui_state(app: &App) {
    use crate::io::state::{UiState, write_ui_state};

    let Some(dir) = &app.data_dir else {
        return;
    };
    let ui_state = UiState {
        filter: app.filter,
        search: match &app.query {
            ViewQuery::Search(q) => Some(q.clone()),
            ViewQuery::Filter(_) => None,
        },
        selected: app.selected_id(),
    };
    if let Err(e) = write_ui_state(dir, &ui_state) {
        eprintln!("warning: could not save view state: {}", e);
    }
}

/// Run the TUI application against the data directory
pub fn run(data_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let dir = resolve_data_dir(data_dir);
    let storage = FileStore::open(&dir)?;
    let config = load_config(&dir)?;

    let store: Store = NoteStore::load(Box::new(storage.clone()) as Box<dyn KeyValueStore>);
    let mut app = App::new(store, Box::new(storage), config).with_data_dir(dir.clone());
    restore_ui_state(&mut app);

    let watcher = match DataWatcher::start(&dir) {
        Ok(w) => Some(w),
        Err(e) => {
            eprintln!("warning: not watching {} for changes: {}", dir.display(), e);
            None
        }
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Restore the terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    save_ui_state(&app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&DataWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if let Some(w) = watcher
            && !w.poll().is_empty()
        {
            app.reload_from_disk();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
