use std::sync::Arc;

use serde::Serialize;

use super::store::{PreferenceError, PreferenceStore};

/// Preference key holding the JSON boolean for dark mode.
pub const DARK_MODE_KEY: &str = "darkMode";

/// Read-only view of the theme handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSnapshot {
    pub dark_mode: bool,
}

impl ThemeSnapshot {
    pub const fn name(self) -> &'static str {
        if self.dark_mode {
            "dark"
        } else {
            "light"
        }
    }
}

/// Owns the dark-mode flag; `toggle` is the only writer.
pub struct ThemeContext<S: ?Sized> {
    store: Arc<S>,
    dark_mode: bool,
}

impl<S> ThemeContext<S>
where
    S: PreferenceStore + ?Sized,
{
    /// Loads the stored choice, seeding the store with the system default on first use.
    pub fn initialize(store: Arc<S>, system_prefers_dark: bool) -> Result<Self, PreferenceError> {
        let stored = store.get(DARK_MODE_KEY)?;
        let dark_mode = match stored.as_deref().map(serde_json::from_str::<bool>) {
            Some(Ok(value)) => value,
            Some(Err(err)) => {
                tracing::warn!(error = %err, "ignoring unreadable theme preference");
                store.set(DARK_MODE_KEY, encode(system_prefers_dark))?;
                system_prefers_dark
            }
            None => {
                store.set(DARK_MODE_KEY, encode(system_prefers_dark))?;
                system_prefers_dark
            }
        };

        Ok(Self { store, dark_mode })
    }

    pub fn snapshot(&self) -> ThemeSnapshot {
        ThemeSnapshot {
            dark_mode: self.dark_mode,
        }
    }

    pub fn is_dark(&self) -> bool {
        self.dark_mode
    }

    /// Flips the theme and persists it; the in-memory value only changes once the write lands.
    pub fn toggle(&mut self) -> Result<ThemeSnapshot, PreferenceError> {
        let next = !self.dark_mode;
        self.store.set(DARK_MODE_KEY, encode(next))?;
        self.dark_mode = next;
        tracing::debug!(theme = self.snapshot().name(), "theme toggled");
        Ok(self.snapshot())
    }
}

fn encode(dark_mode: bool) -> &'static str {
    if dark_mode {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::store::MemoryPreferenceStore;

    #[test]
    fn first_read_seeds_system_default() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let theme = ThemeContext::initialize(store.clone(), true).expect("initializes");

        assert!(theme.is_dark());
        assert_eq!(store.get(DARK_MODE_KEY).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn stored_choice_beats_system_default() {
        let store = Arc::new(MemoryPreferenceStore::new());
        store.set(DARK_MODE_KEY, "false").expect("seed");

        let theme = ThemeContext::initialize(store, true).expect("initializes");
        assert_eq!(theme.snapshot().name(), "light");
    }

    #[test]
    fn unreadable_value_is_replaced() {
        let store = Arc::new(MemoryPreferenceStore::new());
        store.set(DARK_MODE_KEY, "\"sometimes\"").expect("seed");

        let theme = ThemeContext::initialize(store.clone(), false).expect("initializes");
        assert!(!theme.is_dark());
        assert_eq!(store.get(DARK_MODE_KEY).unwrap().as_deref(), Some("false"));
    }

    #[test]
    fn toggle_persists_each_flip() {
        let store = Arc::new(MemoryPreferenceStore::new());
        let mut theme = ThemeContext::initialize(store.clone(), false).expect("initializes");

        assert_eq!(theme.toggle().expect("toggle"), ThemeSnapshot { dark_mode: true });
        assert_eq!(store.get(DARK_MODE_KEY).unwrap().as_deref(), Some("true"));

        theme.toggle().expect("toggle");
        assert_eq!(store.get(DARK_MODE_KEY).unwrap().as_deref(), Some("false"));
    }
}
