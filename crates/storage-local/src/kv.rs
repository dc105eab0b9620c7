//! Persistent key-value storage used by the local expense repository.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use log::debug;

use crate::errors::{StorageError, StorageResult};

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `None` when nothing has been stored under `key`.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
}

fn check_quota(quota: Option<usize>, key: &str, len: usize) -> StorageResult<()> {
    match quota {
        Some(max) if len > max => Err(StorageError::QuotaExceeded(format!(
            "value for '{}' is {} bytes, limit is {}",
            key, len, max
        ))),
        _ => Ok(()),
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    max_value_bytes: Option<usize>,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_value_bytes: None,
        }
    }

    /// Reject writes larger than `bytes`.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.max_value_bytes = Some(bytes);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        check_quota(self.max_value_bytes, key, value.len())?;
        let path = self.path_for(key)?;
        let tmp_path = path.with_extension("json.tmp");

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&tmp_path, value.as_bytes()).await?;
        if let Err(err) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}

/// Volatile in-process store.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
    max_value_bytes: Option<usize>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.max_value_bytes = Some(bytes);
        self
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        check_quota(self.max_value_bytes, key, value.len())?;
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("spendwise-kv-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = temp_dir();
        let store = FileKeyValueStore::new(&dir);

        assert_eq!(store.get("kec_expenses").await.unwrap(), None);
        store.set("kec_expenses", "[1,2,3]").await.unwrap();
        assert_eq!(
            store.get("kec_expenses").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );
        store.set("kec_expenses", "[]").await.unwrap();
        assert_eq!(store.get("kec_expenses").await.unwrap().as_deref(), Some("[]"));
        assert!(!dir.join("kec_expenses.json.tmp").exists());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn file_store_rejects_path_like_keys() {
        let store = FileKeyValueStore::new(temp_dir());
        let err = store.set("../escape", "x").await.unwrap_err();
        assert!(matches!(err, StorageError::InvalidKey(_)));
        assert!(matches!(
            store.get("").await.unwrap_err(),
            StorageError::InvalidKey(_)
        ));
    }

    #[tokio::test]
    async fn file_store_quota() {
        let dir = temp_dir();
        let store = FileKeyValueStore::new(&dir).with_quota(4);
        store.set("k", "1234").await.unwrap();
        let err = store.set("k", "12345").await.unwrap_err();
        assert!(err.is_full());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("1234"));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn memory_store_quota() {
        let store = MemoryKeyValueStore::new().with_quota(2);
        store.set("k", "ab").await.unwrap();
        assert!(store.set("k", "abc").await.unwrap_err().is_full());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("ab"));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }
}
