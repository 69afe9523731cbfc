use async_trait::async_trait;
use quiz_core::model::{Quiz, QuizId, QuizResult};

use super::{KvRepository, to_value};
use crate::keys;
use crate::repository::{KvWrite, PurgeReport, PurgeRepository, StorageError};

#[async_trait]
impl PurgeRepository for KvRepository {
    async fn purge_quiz(
        &self,
        quiz: &QuizId,
        remove_definition: bool,
    ) -> Result<PurgeReport, StorageError> {
        let mut report = PurgeReport::default();
        let mut batch = Vec::new();

        let results: Vec<QuizResult> = self.read(keys::QUIZ_RESULTS).await?.unwrap_or_default();
        let before = results.len();
        let kept: Vec<QuizResult> = results
            .into_iter()
            .filter(|r| r.quiz_id() != quiz)
            .collect();
        report.results_removed = before - kept.len();
        batch.push(KvWrite::Set {
            key: keys::QUIZ_RESULTS.to_owned(),
            value: to_value(&kept)?,
        });

        let grade_keys = self
            .store
            .keys_with_prefix(&keys::essay_grades_of_quiz(quiz))
            .await?;
        report.grades_removed = grade_keys.len();
        let claim_keys = self
            .store
            .keys_with_prefix(&keys::attempt_claims_of_quiz(quiz))
            .await?;
        batch.extend(
            grade_keys
                .into_iter()
                .chain(claim_keys)
                .map(|key| KvWrite::Remove { key }),
        );
        batch.push(KvWrite::Remove {
            key: keys::released(quiz),
        });

        if remove_definition {
            if let Some(catalog) = self.read::<Vec<Quiz>>(keys::QUIZZES).await? {
                let before = catalog.len();
                let kept: Vec<Quiz> = catalog.into_iter().filter(|q| q.id() != quiz).collect();
                report.quiz_removed = kept.len() < before;
                batch.push(KvWrite::Set {
                    key: keys::QUIZZES.to_owned(),
                    value: to_value(&kept)?,
                });
            }
        }

        self.store.apply(batch).await?;
        tracing::debug!(quiz = %quiz, ?report, "purged quiz records");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::repository::{
        EssayGradeRepository, InMemoryStore, KeyValueStore, QuizRepository, ReleaseRepository,
        ResultRepository,
    };
    use quiz_core::model::{
        AnswerSheet, QuestionId, QuizCode, Score, StudentId, StudentIdentity, SubmissionRecord,
        default_quiz,
    };
    use quiz_core::time::fixed_now;

    fn result(email: &str, quiz: &QuizId) -> QuizResult {
        QuizResult::from_submission(SubmissionRecord {
            quiz_id: quiz.clone(),
            quiz_code: QuizCode::parse("ABCD1234").unwrap(),
            quiz_title: "Quiz".into(),
            student: StudentIdentity::new("Student", email),
            score: Score::new(1, 1),
            answers: AnswerSheet::new(),
            violations: 0,
            timestamp: fixed_now(),
            auto_submitted: false,
        })
    }

    #[tokio::test]
    async fn purge_leaves_other_quizzes_untouched() {
        let store = Arc::new(InMemoryStore::new());
        let repo = KvRepository::new(store.clone());
        let target = default_quiz().id().clone();
        let other = QuizId::new("quiz_other");
        let ana = StudentId::new("ana@x.io");

        repo.save_catalog(&[default_quiz()]).await.unwrap();
        repo.append_result(&result("ana@x.io", &target)).await.unwrap();
        repo.append_result(&result("ana@x.io", &other)).await.unwrap();
        for quiz in [&target, &other] {
            repo.record_grade(&result("ana@x.io", quiz), &QuestionId::new("q1"), 3)
                .await
                .unwrap();
        }
        repo.set_released(&target, true).await.unwrap();

        let report = repo.purge_quiz(&target, false).await.unwrap();
        assert_eq!(report.results_removed, 1);
        assert_eq!(report.grades_removed, 1);
        assert!(!report.quiz_removed);

        let remaining = repo.list_results().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].quiz_id(), &other);
        assert!(repo.grades_for(&ana, &target).await.unwrap().is_empty());
        assert_eq!(repo.grades_for(&ana, &other).await.unwrap().len(), 1);
        assert!(!repo.is_released(&target).await.unwrap());
        assert_eq!(repo.load_catalog().await.unwrap().unwrap().len(), 1);

        // the claim went with the result, so the student may submit again
        repo.append_result(&result("ana@x.io", &target)).await.unwrap();
        assert!(store.keys_with_prefix("attempt_claim::").await.unwrap().len() == 2);
    }

    #[tokio::test]
    async fn purge_with_definition_drops_quiz_from_catalog() {
        let repo = KvRepository::new(Arc::new(InMemoryStore::new()));
        let quiz = default_quiz();
        repo.save_catalog(&[quiz.clone()]).await.unwrap();

        let report = repo.purge_quiz(quiz.id(), true).await.unwrap();
        assert!(report.quiz_removed);
        assert!(repo.load_catalog().await.unwrap().unwrap().is_empty());
    }
}
