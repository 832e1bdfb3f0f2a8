// JSON-file implementation of ExemptStore.
//
// The whole set lives in one pretty-printed JSON array of user ids. The set
// is loaded once at startup and rewritten after every mutation.

use crate::core::moderation::{ExemptError, ExemptStore};
use async_trait::async_trait;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub struct JsonExemptStore {
    path: PathBuf,
    cache: RwLock<HashSet<u64>>,
}

impl JsonExemptStore {
    /// Open the store, eagerly loading the backing file.
    ///
    /// A missing file starts an empty set. A file that cannot be parsed is
    /// moved aside to `<path>.bak` (best-effort) and also starts an empty
    /// set - bad data on disk must never stop the bot from coming up.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cache = RwLock::new(Self::load(&path));
        Self { path, cache }
    }

    fn load(path: &Path) -> HashSet<u64> {
        if !path.exists() {
            return HashSet::new();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<Vec<u64>>(&raw).map_err(|e| e.to_string()));

        match parsed {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                tracing::warn!(
                    "Failed to load exempt list from {}, starting empty: {}",
                    path.display(),
                    e
                );

                let mut backup = path.as_os_str().to_os_string();
                backup.push(".bak");
                match std::fs::rename(path, &backup) {
                    Ok(()) => tracing::warn!(
                        "Unreadable exempt list moved to {}",
                        Path::new(&backup).display()
                    ),
                    Err(e) => tracing::warn!("Failed to back up unreadable exempt list: {}", e),
                }

                HashSet::new()
            }
        }
    }

    async fn persist(&self) -> Result<(), ExemptError> {
        let cache = self.cache.read().await;
        let mut ids: Vec<u64> = cache.iter().copied().collect();
        ids.sort_unstable();

        let file =
            File::create(&self.path).map_err(|e| ExemptError::StorageError(e.to_string()))?;
        serde_json::to_writer_pretty(file, &ids)
            .map_err(|e| ExemptError::StorageError(e.to_string()))?;
        Ok(())
    }

    /// Persist, logging instead of failing. The in-memory set stays
    /// authoritative for the running process when the disk write is refused.
    async fn persist_best_effort(&self) {
        if let Err(e) = self.persist().await {
            tracing::warn!("Failed to save exempt list to {}: {}", self.path.display(), e);
        }
    }
}

#[async_trait]
impl ExemptStore for JsonExemptStore {
    async fn is_exempt(&self, user_id: u64) -> Result<bool, ExemptError> {
        let cache = self.cache.read().await;
        Ok(cache.contains(&user_id))
    }

    async fn add(&self, user_id: u64) -> Result<bool, ExemptError> {
        let mut cache = self.cache.write().await;
        let inserted = cache.insert(user_id);
        drop(cache); // Release lock before persisting

        if inserted {
            self.persist_best_effort().await;
        }
        Ok(inserted)
    }

    async fn remove(&self, user_id: u64) -> Result<bool, ExemptError> {
        let mut cache = self.cache.write().await;
        let removed = cache.remove(&user_id);
        drop(cache);

        if removed {
            self.persist_best_effort().await;
        }
        Ok(removed)
    }

    async fn all(&self) -> Result<Vec<u64>, ExemptError> {
        let cache = self.cache.read().await;
        let mut ids: Vec<u64> = cache.iter().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exempt_users.json");

        let store = JsonExemptStore::new(path.clone());
        store.add(42).await.unwrap();
        store.add(7).await.unwrap();

        // Reload from file
        let store2 = JsonExemptStore::new(path);
        assert!(store2.is_exempt(42).await.unwrap());
        assert_eq!(store2.all().await.unwrap(), vec![7, 42]);
    }

    #[tokio::test]
    async fn missing_file_starts_empty_without_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exempt_users.json");

        let store = JsonExemptStore::new(path.clone());
        assert!(store.all().await.unwrap().is_empty());
        assert!(!path.exists());
        assert!(!dir.path().join("exempt_users.json.bak").exists());
    }

    #[tokio::test]
    async fn malformed_file_is_backed_up_and_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exempt_users.json");
        std::fs::write(&path, "{definitely not an id array").unwrap();

        let store = JsonExemptStore::new(path.clone());
        assert!(store.all().await.unwrap().is_empty());

        // Original content survives under the .bak suffix.
        let backup = dir.path().join("exempt_users.json.bak");
        assert!(backup.exists());
        assert_eq!(
            std::fs::read_to_string(backup).unwrap(),
            "{definitely not an id array"
        );
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn duplicate_add_does_not_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exempt_users.json");

        let store = JsonExemptStore::new(path.clone());
        assert!(store.add(1).await.unwrap());

        // Delete the file; a no-op add must not recreate it.
        std::fs::remove_file(&path).unwrap();
        assert!(!store.add(1).await.unwrap());
        assert!(!path.exists());

        // A real mutation writes again.
        assert!(store.add(2).await.unwrap());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn remove_of_missing_user_does_not_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exempt_users.json");

        let store = JsonExemptStore::new(path.clone());
        store.add(1).await.unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(!store.remove(99).await.unwrap());
        assert!(!path.exists());

        assert!(store.remove(1).await.unwrap());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn file_is_a_sorted_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exempt_users.json");

        let store = JsonExemptStore::new(path.clone());
        store.add(9).await.unwrap();
        store.add(3).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let ids: Vec<u64> = serde_json::from_str(&raw).unwrap();
        assert_eq!(ids, vec![3, 9]);
    }
}
