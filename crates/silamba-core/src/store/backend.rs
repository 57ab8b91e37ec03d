//! Key/value storage backends for the document store and session flags.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::StoreError;

/// String key/value storage with the shape of a browser storage area.
pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;

    fn remove_item(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every key.
    fn clear(&self) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory. Keys are
/// percent-encoded, so distinct keys never share a file.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir.to_string_lossy(), e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", urlencoding::encode(key)))
    }
}

impl StorageBackend for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.item_path(key);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| StoreError::io(key, e))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.item_path(key);
        debug!(key, path = %path.display(), "Writing storage item");
        std::fs::write(&path, value).map_err(|e| StoreError::io(key, e))
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        let path = self.item_path(key);
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| StoreError::io(key, e))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let dir_key = self.dir.to_string_lossy();
        let entries = std::fs::read_dir(&self.dir).map_err(|e| StoreError::io(&dir_key, e))?;
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&dir_key, e))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                std::fs::remove_file(&path).map_err(|e| StoreError::io(&dir_key, e))?;
            }
        }
        Ok(())
    }
}

/// In-process storage; lives as long as the process (a "session").
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data")).unwrap();

        assert_eq!(storage.get_item("photo-studio-data").unwrap(), None);
        storage.set_item("photo-studio-data", "{}").unwrap();
        assert_eq!(storage.get_item("photo-studio-data").unwrap().as_deref(), Some("{}"));
        assert!(storage.dir().join("photo-studio-data.json").exists());

        storage.remove_item("photo-studio-data").unwrap();
        assert_eq!(storage.get_item("photo-studio-data").unwrap(), None);
    }

    #[test]
    fn test_file_storage_keys_stay_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data")).unwrap();
        storage.set_item("../escape/key", "x").unwrap();
        assert!(storage.dir().join("..%2Fescape%2Fkey.json").exists());
        assert!(!dir.path().join("escape").exists());
    }

    #[test]
    fn test_distinct_keys_never_share_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        storage.set_item("../escape/key", "slashes").unwrap();
        storage.set_item("___escape_key", "underscores").unwrap();
        storage.set_item("a b", "space").unwrap();
        storage.set_item("a%20b", "literal").unwrap();

        assert_eq!(storage.get_item("../escape/key").unwrap().as_deref(), Some("slashes"));
        assert_eq!(storage.get_item("___escape_key").unwrap().as_deref(), Some("underscores"));
        assert_eq!(storage.get_item("a b").unwrap().as_deref(), Some("space"));
        assert_eq!(storage.get_item("a%20b").unwrap().as_deref(), Some("literal"));
    }

    #[test]
    fn test_clear_removes_all_items() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        storage.set_item("a", "1").unwrap();
        storage.set_item("b", "2").unwrap();
        storage.clear().unwrap();
        assert_eq!(storage.get_item("a").unwrap(), None);

        let memory = MemoryStorage::new();
        memory.set_item("a", "1").unwrap();
        memory.clear().unwrap();
        assert_eq!(memory.get_item("a").unwrap(), None);
    }
}
