use std::collections::HashMap;

use async_trait::async_trait;
use quiz_core::model::{QuestionId, QuizId, QuizResult, StudentId};

use super::{KvRepository, to_value};
use crate::keys;
use crate::repository::{EssayGradeRepository, KvWrite, ResultRepository, StorageError};

#[async_trait]
impl EssayGradeRepository for KvRepository {
    async fn grades_for(
        &self,
        student: &StudentId,
        quiz: &QuizId,
    ) -> Result<HashMap<QuestionId, u32>, StorageError> {
        let prefix = keys::essay_grades_of_student(quiz, student);
        let mut grades = HashMap::new();
        for key in self.store.keys_with_prefix(&prefix).await? {
            let Some(question) = keys::question_of_essay_grade(&key) else {
                continue;
            };
            if let Some(points) = self.read::<u32>(&key).await? {
                grades.insert(question, points);
            }
        }
        Ok(grades)
    }

    async fn record_grade(
        &self,
        rescored: &QuizResult,
        question: &QuestionId,
        points: u32,
    ) -> Result<(), StorageError> {
        let student = rescored.student_id();
        let mut results = self.list_results().await?;
        let slot = results
            .iter_mut()
            .find(|r| r.is_for(&student, rescored.quiz_id()))
            .ok_or(StorageError::NotFound)?;
        *slot = rescored.clone();

        tracing::debug!(
            %student,
            quiz = %rescored.quiz_id(),
            %question,
            "writing essay grade"
        );
        self.store
            .apply(vec![
                KvWrite::Set {
                    key: keys::essay_grade(rescored.quiz_id(), &student, question),
                    value: to_value(&points)?,
                },
                KvWrite::Set {
                    key: keys::QUIZ_RESULTS.to_string(),
                    value: to_value(&results)?,
                },
            ])
            .await
    }
}
