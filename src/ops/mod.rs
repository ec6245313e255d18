pub mod note_store;
pub mod theme_pref;
pub mod view;
