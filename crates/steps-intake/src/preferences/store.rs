use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// Failure reading or writing persisted preferences.
#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("failed to access preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("preferences at {path} are not a JSON object of strings: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("preference store lock poisoned")]
    Poisoned,
}

/// Small string key-value store that outlives a single session.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Preferences kept as one JSON object on disk.
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(PreferenceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| PreferenceError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes a sibling temp file and renames it over the target, so readers never see a
    /// partially written file.
    fn replace_all(&self, entries: &BTreeMap<String, String>) -> Result<(), PreferenceError> {
        let io_error = |source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        };
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(io_error)?;
                parent
            }
            None => Path::new("."),
        };
        let rendered = serde_json::to_string_pretty(entries).map_err(|source| {
            PreferenceError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;

        let mut staged = NamedTempFile::new_in(parent).map_err(io_error)?;
        staged.write_all(rendered.as_bytes()).map_err(io_error)?;
        staged.as_file().sync_all().map_err(io_error)?;
        staged
            .persist(&self.path)
            .map_err(|err| io_error(err.error))?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| PreferenceError::Poisoned)?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.replace_all(&entries)
    }
}

/// In-process store used by tests and one-off CLI runs.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let entries = self.entries.lock().map_err(|_| PreferenceError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut entries = self.entries.lock().map_err(|_| PreferenceError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FilePreferenceStore::new(dir.path().join("nested/preferences.json"));
        assert_eq!(store.get("darkMode").expect("readable"), None);
    }

    #[test]
    fn writes_create_parent_directories_and_keep_other_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/preferences.json");
        let store = FilePreferenceStore::new(&path);

        store.set("language", "\"en\"").expect("write");
        store.set("darkMode", "true").expect("write");

        let reopened = FilePreferenceStore::new(&path);
        assert_eq!(reopened.get("darkMode").unwrap().as_deref(), Some("true"));
        assert_eq!(reopened.get("language").unwrap().as_deref(), Some("\"en\""));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        fs::write(&path, "[1, 2").expect("seed file");

        let err = FilePreferenceStore::new(&path)
            .get("darkMode")
            .expect_err("corrupt");
        assert!(matches!(err, PreferenceError::Corrupt { .. }));
    }

    #[test]
    fn readers_never_observe_a_partial_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("preferences.json");
        let store = std::sync::Arc::new(FilePreferenceStore::new(&path));
        store.set("darkMode", "false").expect("seed");

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for round in 0..200 {
                    let value = if round % 2 == 0 { "true" } else { "false" };
                    store.set("darkMode", value).expect("write");
                }
            })
        };
        for _ in 0..200 {
            let value = store.get("darkMode").expect("never corrupt or empty");
            assert!(matches!(value.as_deref(), Some("true") | Some("false")));
        }
        writer.join().expect("writer thread");

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .expect("list dir")
            .filter_map(Result::ok)
            .map(|entry| entry.file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("preferences.json")]);
    }

    #[test]
    fn memory_store_round_trips_values() {
        let store = MemoryPreferenceStore::new();
        store.set("darkMode", "false").expect("write");
        assert_eq!(store.get("darkMode").unwrap().as_deref(), Some("false"));
        assert_eq!(store.get("other").unwrap(), None);
    }
}
