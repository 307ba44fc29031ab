use std::{
    collections::BTreeMap,
    future::Future,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt store file: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A set of key changes applied to a store as one unit.
///
/// `None` values remove the key.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<(String, Option<String>)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<String>) -> Self {
        self.ops.push((key.to_string(), Some(value.into())));
        self
    }

    pub fn remove(mut self, key: &str) -> Self {
        self.ops.push((key.to_string(), None));
        self
    }

    fn apply_to(self, entries: &mut BTreeMap<String, String>) {
        for (key, value) in self.ops {
            match value {
                Some(v) => {
                    entries.insert(key, v);
                }
                None => {
                    entries.remove(&key);
                }
            }
        }
    }
}

/// String key/value storage used for credentials and the CSRF state.
///
/// Implementations must apply a [`WriteBatch`] so that no reader observes
/// part of it, and must read and remove a key in [`take`](Self::take)
/// without another caller interleaving. Nothing beyond that is coordinated:
/// concurrent writers are last-write-wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    fn write(&self, batch: WriteBatch) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Removes `key` and returns the value it held. Of several concurrent
    /// calls, at most one sees the value.
    fn take(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send;
}

impl<T: KeyValueStore> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        (**self).get(key)
    }

    fn write(&self, batch: WriteBatch) -> impl Future<Output = Result<(), StorageError>> + Send {
        (**self).write(batch)
    }

    fn take(&self, key: &str) -> impl Future<Output = Result<Option<String>, StorageError>> + Send {
        (**self).take(key)
    }
}

/// Process-local store. Used for the per-login session state and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write(&self, batch: WriteBatch) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().await;
        batch.apply_to(&mut *entries);
        Ok(())
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.remove(key))
    }
}

/// Persistent store backed by a single JSON object on disk.
///
/// Every batch rewrites the whole file, so a reader in another process sees
/// either the old or the new set of values.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store under the local data directory, e.g.
    /// `~/.local/share/tastemixer/cache/credentials.json` on Linux.
    pub fn default_location() -> Self {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("tastemixer/cache/credentials.json");
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match async_fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            async_fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_entries().await?.remove(key))
    }

    async fn write(&self, batch: WriteBatch) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        batch.apply_to(&mut entries);
        self.write_entries(&entries).await
    }

    async fn take(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.read_entries().await?;
        let value = entries.remove(key);
        if value.is_some() {
            self.write_entries(&entries).await?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_applies_sets_and_removes() {
        let store = MemoryStore::new();
        store
            .write(WriteBatch::new().set("a", "1").set("b", "2"))
            .await
            .unwrap();
        store.write(WriteBatch::new().remove("a")).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), None);
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/store.json");

        FileStore::new(&path)
            .write(WriteBatch::new().set("token", "abc"))
            .await
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("token").await.unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn take_returns_value_once() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileStore::new(dir.path().join("store.json"));
        let memory = MemoryStore::new();

        file.write(WriteBatch::new().set("k", "v").set("other", "x"))
            .await
            .unwrap();
        memory.write(WriteBatch::new().set("k", "v")).await.unwrap();

        assert_eq!(file.take("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(file.take("k").await.unwrap(), None);
        assert_eq!(file.get("other").await.unwrap().as_deref(), Some("x"));

        assert_eq!(memory.take("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(memory.take("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get("anything").await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileStore::new(&path).get("token").await.unwrap_err();
        assert!(matches!(err, StorageError::Serde(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        FileStore::new(&path)
            .write(WriteBatch::new().set("k", "v"))
            .await
            .unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
