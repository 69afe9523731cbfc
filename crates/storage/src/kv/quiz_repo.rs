use async_trait::async_trait;
use quiz_core::model::Quiz;

use super::KvRepository;
use crate::keys;
use crate::repository::{QuizRepository, StorageError};

#[async_trait]
impl QuizRepository for KvRepository {
    async fn load_catalog(&self) -> Result<Option<Vec<Quiz>>, StorageError> {
        self.read(keys::QUIZZES).await
    }

    async fn save_catalog(&self, quizzes: &[Quiz]) -> Result<(), StorageError> {
        self.write(keys::QUIZZES, quizzes).await
    }
}
