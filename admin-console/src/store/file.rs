use super::{KeyValueStore, StoreError};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// JSON-object file on disk, mirrored in memory.
///
/// Every write rewrites the whole file through a temporary sibling and a
/// rename, so a crash never leaves half of a multi-key update behind.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: DashMap<String, String>,
    writer: Mutex<()>,
}

impl FileStore {
    /// Open the state file, creating nothing until the first write.
    ///
    /// An unreadable or corrupt file is treated as empty, the same way a
    /// browser treats cleared site data.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = DashMap::new();

        match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(map) => {
                    for (key, value) in map {
                        entries.insert(key, value);
                    }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Ignoring corrupt state file");
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            path,
            entries,
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect()
    }

    /// Apply `edit` to a copy of the current entries, persist the copy, and
    /// only then publish it in memory. A failed write leaves both untouched.
    fn commit(
        &self,
        edit: impl FnOnce(&mut BTreeMap<String, String>) -> bool,
    ) -> Result<(), StoreError> {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut next = self.snapshot();
        if !edit(&mut next) {
            return Ok(());
        }
        self.write(&next)?;

        self.entries.retain(|key, _| next.contains_key(key));
        for (key, value) in next {
            self.entries.insert(key, value);
        }
        Ok(())
    }

    fn write(&self, snapshot: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(snapshot)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        {
            let mut file = open_private(&tmp_path)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set_many(&self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        self.commit(|next| {
            for (key, value) in entries {
                next.insert((*key).to_string(), value.clone());
            }
            true
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        self.commit(|next| {
            let mut changed = false;
            for key in keys {
                changed |= next.remove(*key).is_some();
            }
            changed
        })
    }
}
