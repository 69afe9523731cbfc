use async_trait::async_trait;
use quiz_core::model::{QuestionId, Quiz, QuizId, QuizResult, StudentId, User};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::kv::KvRepository;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── KEY-VALUE PORT ────────────────────────────────────────────────────────────
//

/// One write inside an atomic batch.
#[derive(Debug, Clone, PartialEq)]
pub enum KvWrite {
    Set { key: String, value: Value },
    Remove { key: String },
}

/// String-keyed JSON store every repository is built on.
///
/// Missing keys read as `None`; callers treat that as empty/default.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails or the value is not JSON.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// List keys starting with `prefix`, in lexical order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Store `value` only if `key` is absent. Returns whether it was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn insert_if_absent(&self, key: &str, value: Value) -> Result<bool, StorageError>;

    /// Apply all writes or none of them.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any write fails; no write is kept in that case.
    async fn apply(&self, batch: Vec<KvWrite>) -> Result<(), StorageError>;
}

/// Process-local store for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Value>>, StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.lock()?.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .range(prefix.to_owned()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn insert_if_absent(&self, key: &str, value: Value) -> Result<bool, StorageError> {
        let mut guard = self.lock()?;
        if guard.contains_key(key) {
            return Ok(false);
        }
        guard.insert(key.to_owned(), value);
        Ok(true)
    }

    async fn apply(&self, batch: Vec<KvWrite>) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        for write in batch {
            match write {
                KvWrite::Set { key, value } => {
                    guard.insert(key, value);
                }
                KvWrite::Remove { key } => {
                    guard.remove(&key);
                }
            }
        }
        Ok(())
    }
}

//
// ─── REPOSITORIES ──────────────────────────────────────────────────────────────
//

/// Quiz catalog persistence.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Load the whole catalog. `None` means the catalog was never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn load_catalog(&self) -> Result<Option<Vec<Quiz>>, StorageError>;

    /// Replace the whole catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalog cannot be written.
    async fn save_catalog(&self, quizzes: &[Quiz]) -> Result<(), StorageError>;
}

/// Flat list of quiz results across all quizzes.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// All results in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn list_results(&self) -> Result<Vec<QuizResult>, StorageError>;

    /// Find the result of `student` for `quiz`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn find_result(
        &self,
        student: &StudentId,
        quiz: &QuizId,
    ) -> Result<Option<QuizResult>, StorageError>;

    /// Claim the student's single attempt slot and append the result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a result for this student and quiz
    /// was already claimed; nothing is written in that case.
    async fn append_result(&self, result: &QuizResult) -> Result<(), StorageError>;
}

/// Per-quiz release flag.
#[async_trait]
pub trait ReleaseRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn is_released(&self, quiz: &QuizId) -> Result<bool, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the flag cannot be written.
    async fn set_released(&self, quiz: &QuizId, released: bool) -> Result<(), StorageError>;
}

/// Sparse map of manual essay points.
#[async_trait]
pub trait EssayGradeRepository: Send + Sync {
    /// Points recorded for one student's essays in one quiz.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn grades_for(
        &self,
        student: &StudentId,
        quiz: &QuizId,
    ) -> Result<HashMap<QuestionId, u32>, StorageError>;

    /// Store `points` for `question` and replace the owning result with
    /// `rescored`, in one atomic write.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if no result exists for the student
    /// and quiz of `rescored`, or another `StorageError` if the batch cannot
    /// be applied; nothing is written in either case.
    async fn record_grade(
        &self,
        rescored: &QuizResult,
        question: &QuestionId,
        points: u32,
    ) -> Result<(), StorageError>;
}

/// The signed-in identity for this device.
#[async_trait]
pub trait IdentityRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend or decoding failures.
    async fn current_user(&self) -> Result<Option<User>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the identity cannot be written.
    async fn set_current_user(&self, user: &User) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the identity cannot be removed.
    async fn clear_current_user(&self) -> Result<(), StorageError>;
}

/// What a purge removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub results_removed: usize,
    pub grades_removed: usize,
    pub quiz_removed: bool,
}

/// Removes everything scoped to a quiz in one atomic write.
#[async_trait]
pub trait PurgeRepository: Send + Sync {
    /// Delete results, essay grades, attempt claims and the release flag of
    /// `quiz`; with `remove_definition`, also drop the quiz from the catalog.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be applied; nothing is
    /// removed in that case.
    async fn purge_quiz(
        &self,
        quiz: &QuizId,
        remove_definition: bool,
    ) -> Result<PurgeReport, StorageError>;
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub quizzes: Arc<dyn QuizRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub releases: Arc<dyn ReleaseRepository>,
    pub grades: Arc<dyn EssayGradeRepository>,
    pub identity: Arc<dyn IdentityRepository>,
    pub purge: Arc<dyn PurgeRepository>,
}

impl Storage {
    /// Build every repository on top of one key-value store.
    #[must_use]
    pub fn over(store: Arc<dyn KeyValueStore>) -> Self {
        let repo = KvRepository::new(store);
        Self {
            quizzes: Arc::new(repo.clone()),
            results: Arc::new(repo.clone()),
            releases: Arc::new(repo.clone()),
            grades: Arc::new(repo.clone()),
            identity: Arc::new(repo.clone()),
            purge: Arc::new(repo),
        }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::over(Arc::new(InMemoryStore::new()))
    }
}
