//! Typed access to persisted sessions and best results.

use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

use crate::game::{BestResults, SavedGame};
use crate::storage::{KeyValueStore, StorageResult};

/// Reads and writes engine data as JSON under configured keys
///
/// Backend failures are returned as errors. Values that are present but do
/// not parse are logged and reported as absent.
#[derive(Clone)]
pub struct GameRepository {
    store: Arc<dyn KeyValueStore>,
    session_key: String,
    best_results_key: String,
}

impl GameRepository {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        session_key: impl Into<String>,
        best_results_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            session_key: session_key.into(),
            best_results_key: best_results_key.into(),
        }
    }

    pub async fn load_session(&self) -> StorageResult<Option<SavedGame>> {
        self.load(&self.session_key).await
    }

    pub async fn save_session(&self, saved: &SavedGame) -> StorageResult<()> {
        self.save(&self.session_key, saved).await
    }

    pub async fn clear_session(&self) -> StorageResult<()> {
        self.store.remove(&self.session_key).await
    }

    /// Persisted best results, empty when none were stored
    pub async fn load_best_results(&self) -> StorageResult<BestResults> {
        Ok(self
            .load(&self.best_results_key)
            .await?
            .unwrap_or_default())
    }

    pub async fn save_best_results(&self, best: &BestResults) -> StorageResult<()> {
        self.save(&self.best_results_key, best).await
    }

    async fn load<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(raw) = self.store.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("Ignoring malformed data under {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> StorageResult<()> {
        let json = serde_json::to_string(value)?;
        self.store.set(key, &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{BestResult, Difficulty};
    use crate::storage::MemoryStore;
    use chrono::Utc;

    fn repository(store: Arc<MemoryStore>) -> GameRepository {
        GameRepository::new(store, "session", "best")
    }

    #[tokio::test]
    async fn test_missing_values_are_absent() {
        let repo = repository(Arc::new(MemoryStore::new()));
        assert!(repo.load_session().await.unwrap().is_none());
        assert!(repo.load_best_results().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_values_are_absent() {
        let store = Arc::new(MemoryStore::new());
        store.set("session", "{not json").await.unwrap();
        store.set("best", "[1, 2, 3]").await.unwrap();

        let repo = repository(store);
        assert!(repo.load_session().await.unwrap().is_none());
        assert!(repo.load_best_results().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_best_results_round_trip() {
        let store = Arc::new(MemoryStore::new());
        let repo = repository(Arc::clone(&store));

        let mut best = BestResults::new();
        best.consider(
            6,
            BestResult {
                attempts: 4,
                time_ms: 12_000,
                date: Utc::now(),
                difficulty: Difficulty::Hard,
            },
        );
        repo.save_best_results(&best).await.unwrap();

        assert_eq!(repo.load_best_results().await.unwrap(), best);
        assert!(store.get("best").await.unwrap().is_some());
    }
}
