//! Visitor preferences that persist across sessions, currently just the theme.

pub mod store;
pub mod theme;

pub use store::{FilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore};
pub use theme::{ThemeContext, ThemeSnapshot, DARK_MODE_KEY};
