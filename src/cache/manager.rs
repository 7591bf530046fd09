//! Key-value store persisted to disk
//!
//! Provides a `CacheManager` that keeps one file per key inside a cache
//! directory. Writes go through a temporary file and a rename so a reader
//! never observes a half-written value.

use directories::ProjectDirs;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by the on-disk store
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cache directory or a key file could not be read or written
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] io::Error),

    /// A value could not be serialized before writing
    #[error("Failed to serialize cache value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Manages reading and writing keyed values to disk
///
/// Values live in an XDG-compliant cache directory (`~/.cache/postboard/` on
/// Linux). Keys map to file names, so they must be plain identifiers.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where key files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "postboard")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory backing this store
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to the file for the given key
    fn key_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(key)
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Stores `value` under `key`, replacing any previous value
    ///
    /// The value is first written to `<key>.tmp` and then renamed over the
    /// key file.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.ensure_dir()?;

        let path = self.key_path(key);
        let tmp_path = self.cache_dir.join(format!("{}.tmp", key));
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    /// Reads the value stored under `key`
    ///
    /// Returns `Ok(None)` when the key has never been written.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.key_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes the value stored under `key`
    ///
    /// Removing a missing key is not an error.
    pub fn remove_item(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    #[test]
    fn test_set_item_creates_file_in_cache_directory() {
        let (cache, temp_dir) = create_test_cache();

        cache.set_item("test_key", "hello").expect("Write should succeed");

        let expected_path = temp_dir.path().join("test_key");
        assert!(expected_path.exists(), "Key file should exist");
        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert_eq!(content, "hello");
    }

    #[test]
    fn test_set_item_leaves_no_temp_file() {
        let (cache, temp_dir) = create_test_cache();

        cache.set_item("key", "value").expect("Write should succeed");

        assert!(!temp_dir.path().join("key.tmp").exists());
    }

    #[test]
    fn test_get_item_returns_none_for_missing_key() {
        let (cache, _temp_dir) = create_test_cache();

        let result = cache.get_item("nonexistent_key").expect("Read should succeed");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_get_item_returns_stored_value() {
        let (cache, _temp_dir) = create_test_cache();

        cache.set_item("key", "[1,2,3]").unwrap();

        assert_eq!(cache.get_item("key").unwrap().as_deref(), Some("[1,2,3]"));
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache").join("dir");
        let cache = CacheManager::with_dir(nested_path.clone());

        cache.set_item("nested_key", "1").expect("Write should succeed");

        assert!(nested_path.exists(), "Nested directory should be created");
        assert!(nested_path.join("nested_key").exists(), "Key file should exist");
    }

    #[test]
    fn test_overwrite_existing_value() {
        let (cache, _temp_dir) = create_test_cache();

        cache.set_item("overwrite_key", "first").unwrap();
        cache.set_item("overwrite_key", "second").unwrap();

        assert_eq!(
            cache.get_item("overwrite_key").unwrap().as_deref(),
            Some("second"),
            "Store should contain latest value"
        );
    }

    #[test]
    fn test_remove_item_is_idempotent() {
        let (cache, _temp_dir) = create_test_cache();

        cache.set_item("key", "value").unwrap();
        cache.remove_item("key").expect("First remove should succeed");
        cache.remove_item("key").expect("Second remove should succeed");

        assert!(cache.get_item("key").unwrap().is_none());
    }

    #[test]
    fn test_set_item_fails_when_dir_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let cache = CacheManager::with_dir(blocker);

        let result = cache.set_item("key", "value");

        assert!(matches!(result, Err(CacheError::StorageUnavailable(_))));
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheManager::new() {
            let path_str = cache.cache_dir.to_string_lossy();
            assert!(
                path_str.contains("postboard"),
                "Cache path should contain project name"
            );
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
