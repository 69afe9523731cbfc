use async_trait::async_trait;
use quiz_core::model::QuizId;
use serde_json::Value;

use super::KvRepository;
use crate::keys;
use crate::repository::{ReleaseRepository, StorageError};

#[async_trait]
impl ReleaseRepository for KvRepository {
    async fn is_released(&self, quiz: &QuizId) -> Result<bool, StorageError> {
        // older writers stored the flag as the string "true"
        let flag: Option<Value> = self.read(&keys::released(quiz)).await?;
        Ok(match flag {
            Some(Value::Bool(released)) => released,
            Some(Value::String(raw)) => raw == "true",
            _ => false,
        })
    }

    async fn set_released(&self, quiz: &QuizId, released: bool) -> Result<(), StorageError> {
        let key = keys::released(quiz);
        if released {
            self.write(&key, &true).await
        } else {
            self.store.remove(&key).await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repository::{InMemoryStore, KeyValueStore};

    #[tokio::test]
    async fn flag_defaults_to_false_and_toggles() {
        let repo = KvRepository::new(Arc::new(InMemoryStore::new()));
        let quiz = QuizId::new("quiz_1");
        assert!(!repo.is_released(&quiz).await.unwrap());

        repo.set_released(&quiz, true).await.unwrap();
        assert!(repo.is_released(&quiz).await.unwrap());
        assert!(!repo.is_released(&QuizId::new("quiz_2")).await.unwrap());

        repo.set_released(&quiz, false).await.unwrap();
        assert!(!repo.is_released(&quiz).await.unwrap());
    }

    #[tokio::test]
    async fn string_flag_is_tolerated() {
        let store = Arc::new(InMemoryStore::new());
        let quiz = QuizId::new("quiz_1");
        store
            .set(&keys::released(&quiz), Value::String("true".into()))
            .await
            .unwrap();
        let repo = KvRepository::new(store);
        assert!(repo.is_released(&quiz).await.unwrap());
    }
}
