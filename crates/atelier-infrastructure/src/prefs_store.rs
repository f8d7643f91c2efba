//! TOML-backed preference store.

use crate::paths::AtelierPaths;
use async_trait::async_trait;
use atelier_core::error::Result;
use atelier_core::prefs::PreferenceStore;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Durable key/value store persisted as a flat TOML table.
///
/// Reads hit the file every time, never a cache: the token and other keys
/// may be written out-of-band (another process, a test harness) and a
/// stale in-memory copy would mask that. Reads are best-effort; any
/// failure degrades to `None`. Writes are serialized by a lock so
/// concurrent read-modify-write cycles cannot drop each other's keys.
pub struct TomlPreferenceStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl TomlPreferenceStore {
    /// Opens the store at the default platform location.
    ///
    /// # Errors
    ///
    /// Returns a config error if the platform config directory cannot be
    /// determined. The file itself is created lazily on first write.
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(AtelierPaths::state_file()?))
    }

    /// Opens the store at an explicit path. Used by tests.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_table(&self) -> BTreeMap<String, String> {
        let Ok(raw) = tokio::fs::read_to_string(&self.path).await else {
            return BTreeMap::new();
        };
        match toml::from_str(&raw) {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "unreadable preference file");
                BTreeMap::new()
            }
        }
    }

    async fn write_table(&self, table: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let raw = toml::to_string_pretty(table)?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for TomlPreferenceStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.read_table().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut table = self.read_table().await;
        table.insert(key.to_string(), value.to_string());
        self.write_table(&table).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut table = self.read_table().await;
        if table.remove(key).is_none() {
            return Ok(());
        }
        self.write_table(&table).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atelier_core::prefs::keys;

    fn store_in(dir: &tempfile::TempDir) -> TomlPreferenceStore {
        TomlPreferenceStore::with_path(dir.path().join("state.toml"))
    }

    #[tokio::test]
    async fn test_set_and_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.set(keys::AUTH_TOKEN, "tok-123").await.unwrap();

        assert_eq!(store.get(keys::AUTH_TOKEN).await.as_deref(), Some("tok-123"));
    }

    #[tokio::test]
    async fn test_missing_file_degrades_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        assert!(store.get(keys::AUTH_TOKEN).await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_degrades_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        tokio::fs::write(&path, "not [valid toml").await.unwrap();
        let store = TomlPreferenceStore::with_path(path);

        assert!(store.get(keys::AUTH_TOKEN).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_deletes_only_the_named_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.set(keys::AUTH_TOKEN, "tok").await.unwrap();
        store.set(keys::LAST_PROJECT, "p1").await.unwrap();

        store.remove(keys::AUTH_TOKEN).await.unwrap();

        assert!(store.get(keys::AUTH_TOKEN).await.is_none());
        assert_eq!(store.get(keys::LAST_PROJECT).await.as_deref(), Some("p1"));
    }

    #[tokio::test]
    async fn test_out_of_band_write_is_visible() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        let store = TomlPreferenceStore::with_path(path.clone());
        store.set(keys::AUTH_TOKEN, "old").await.unwrap();

        // Another process rewrites the file between reads.
        tokio::fs::write(&path, "auth_token = \"new\"\n")
            .await
            .unwrap();

        assert_eq!(store.get(keys::AUTH_TOKEN).await.as_deref(), Some("new"));
    }
}
