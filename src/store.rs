use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CatalogError;
use crate::model::PosterRecord;

/// Key under which the full poster list is handed from the list view to the
/// detail view.
pub const SNAPSHOT_KEY: &str = "posters_items";

/// Origin-scoped key/value storage surviving between views.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, CatalogError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError>;
    fn clear(&mut self) -> Result<(), CatalogError>;
}

/// Subdirectory of the store location that holds the entries. Nothing else
/// is written there, so clearing it never touches the user's files.
const ENTRIES_DIR: &str = "entries";

/// One file per key inside a directory owned by the store.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(location: &Path) -> Result<Self, CatalogError> {
        let dir = location.join(ENTRIES_DIR);
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CatalogError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        // Write beside the target and rename so a reader never sees half a value
        let mut temp = tempfile::NamedTempFile::new_in(&self.dir)?;
        temp.write_all(value.as_bytes())?;
        temp.flush()?;
        temp.persist(self.path_for(key)).map_err(|e| e.error)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CatalogError> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

/// In-memory store, for tests and for sessions that must not touch disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CatalogError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), CatalogError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), CatalogError> {
        self.values.clear();
        Ok(())
    }
}

/// The poster list snapshot kept in a [`KeyValueStore`].
pub struct SnapshotStore<S> {
    store: S,
}

impl<S: KeyValueStore> SnapshotStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Overwrite the snapshot with the full record set.
    pub fn save(&mut self, records: &[PosterRecord]) -> Result<(), CatalogError> {
        let json = serde_json::to_string(records)?;
        self.store.set(SNAPSHOT_KEY, &json)
    }

    /// The stored record set, `None` when nothing was ever saved.
    pub fn load(&self) -> Result<Option<Vec<PosterRecord>>, CatalogError> {
        match self.store.get(SNAPSHOT_KEY)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn clear(&mut self) -> Result<(), CatalogError> {
        self.store.clear()
    }

    #[cfg(test)]
    pub fn inner(&self) -> &S {
        &self.store
    }
}
