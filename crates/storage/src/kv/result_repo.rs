use async_trait::async_trait;
use quiz_core::model::{QuizId, QuizResult, StudentId};

use super::{KvRepository, to_value};
use crate::keys;
use crate::repository::{ResultRepository, StorageError};

#[async_trait]
impl ResultRepository for KvRepository {
    async fn list_results(&self) -> Result<Vec<QuizResult>, StorageError> {
        Ok(self.read(keys::QUIZ_RESULTS).await?.unwrap_or_default())
    }

    async fn find_result(
        &self,
        student: &StudentId,
        quiz: &QuizId,
    ) -> Result<Option<QuizResult>, StorageError> {
        Ok(self
            .list_results()
            .await?
            .into_iter()
            .find(|r| r.is_for(student, quiz)))
    }

    async fn append_result(&self, result: &QuizResult) -> Result<(), StorageError> {
        let student = result.student_id();
        let claim = keys::attempt_claim(result.quiz_id(), &student);
        let claimed = self
            .store
            .insert_if_absent(&claim, to_value(&result.timestamp())?)
            .await?;
        if !claimed {
            return Err(StorageError::Conflict);
        }

        match self.push_claimed(result, &student).await {
            Err(err) if !matches!(err, StorageError::Conflict) => {
                if let Err(release_err) = self.store.remove(&claim).await {
                    tracing::warn!(%claim, error = %release_err, "failed to release attempt claim");
                }
                Err(err)
            }
            outcome => outcome,
        }
    }
}

impl KvRepository {
    /// Append `result` once its attempt claim is held.
    async fn push_claimed(
        &self,
        result: &QuizResult,
        student: &StudentId,
    ) -> Result<(), StorageError> {
        let mut results = self.list_results().await?;
        if results.iter().any(|r| r.is_for(student, result.quiz_id())) {
            // written before claims existed; the claim now matches it
            return Err(StorageError::Conflict);
        }
        results.push(result.clone());
        self.write(keys::QUIZ_RESULTS, &results).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use serde_json::Value;

    use super::*;
    use crate::repository::{InMemoryStore, KeyValueStore, KvWrite};
    use quiz_core::model::{AnswerSheet, QuizCode, Score, StudentIdentity, SubmissionRecord};
    use quiz_core::time::fixed_now;

    fn result(email: &str, quiz: &str, score: u32) -> QuizResult {
        QuizResult::from_submission(SubmissionRecord {
            quiz_id: QuizId::new(quiz),
            quiz_code: QuizCode::parse("ABCD1234").unwrap(),
            quiz_title: "Quiz".into(),
            student: StudentIdentity::new("Student", email),
            score: Score::new(score, 5),
            answers: AnswerSheet::new(),
            violations: 0,
            timestamp: fixed_now(),
            auto_submitted: false,
        })
    }

    /// Fails the first read of the results list.
    #[derive(Default)]
    struct FirstReadFails {
        inner: InMemoryStore,
        tripped: AtomicBool,
    }

    #[async_trait]
    impl KeyValueStore for FirstReadFails {
        async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
            if key == keys::QUIZ_RESULTS && !self.tripped.swap(true, Ordering::SeqCst) {
                return Err(StorageError::Connection("transient".into()));
            }
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
            self.inner.set(key, value).await
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key).await
        }

        async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
            self.inner.keys_with_prefix(prefix).await
        }

        async fn insert_if_absent(&self, key: &str, value: Value) -> Result<bool, StorageError> {
            self.inner.insert_if_absent(key, value).await
        }

        async fn apply(&self, batch: Vec<KvWrite>) -> Result<(), StorageError> {
            self.inner.apply(batch).await
        }
    }

    #[tokio::test]
    async fn append_keeps_insertion_order() {
        let repo = KvRepository::new(Arc::new(InMemoryStore::new()));
        repo.append_result(&result("b@x.io", "quiz_1", 1)).await.unwrap();
        repo.append_result(&result("a@x.io", "quiz_1", 2)).await.unwrap();
        repo.append_result(&result("a@x.io", "quiz_2", 3)).await.unwrap();

        let emails: Vec<_> = repo
            .list_results()
            .await
            .unwrap()
            .iter()
            .map(|r| r.student().email.clone())
            .collect();
        assert_eq!(emails, vec!["b@x.io", "a@x.io", "a@x.io"]);
    }

    #[tokio::test]
    async fn second_append_for_same_pair_conflicts() {
        let repo = KvRepository::new(Arc::new(InMemoryStore::new()));
        repo.append_result(&result("a@x.io", "quiz_1", 1)).await.unwrap();
        let err = repo
            .append_result(&result("A@X.io", "quiz_1", 5))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
        assert_eq!(repo.list_results().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_read_releases_the_claim() {
        let repo = KvRepository::new(Arc::new(FirstReadFails::default()));
        let err = repo
            .append_result(&result("a@x.io", "quiz_1", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));

        repo.append_result(&result("a@x.io", "quiz_1", 1)).await.unwrap();
        assert_eq!(repo.list_results().await.unwrap().len(), 1);
    }
}
