use std::sync::Arc;

use quiz_core::grading::{clamp_points, recompute_score};
use quiz_core::model::{QuestionId, Quiz, QuizId, QuizResult, StudentId};
use storage::repository::{
    EssayGradeRepository, PurgeReport, PurgeRepository, ReleaseRepository, ResultRepository,
    Storage, StorageError,
};

use crate::catalog::QuizCatalogService;
use crate::error::GradingError;
use crate::notifier::{Notifier, ScoreNotification};
use super::release::{ReleaseSummary, notify_all};
use super::view::{QuizOverview, QuizState, StudentResultView};

/// Instructor-side workflow: results, essay grades and release.
#[derive(Clone)]
pub struct GradingService {
    catalog: QuizCatalogService,
    results: Arc<dyn ResultRepository>,
    releases: Arc<dyn ReleaseRepository>,
    grades: Arc<dyn EssayGradeRepository>,
    purge: Arc<dyn PurgeRepository>,
    notifier: Arc<dyn Notifier>,
}

impl GradingService {
    #[must_use]
    pub fn new(catalog: QuizCatalogService, storage: &Storage, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            catalog,
            results: Arc::clone(&storage.results),
            releases: Arc::clone(&storage.releases),
            grades: Arc::clone(&storage.grades),
            purge: Arc::clone(&storage.purge),
            notifier,
        }
    }

    //
    // ─── QUERIES ───────────────────────────────────────────────────────────────
    //

    /// Results for `quiz` in submission order.
    ///
    /// # Errors
    ///
    /// Returns `GradingError::Storage` if results cannot be read.
    pub async fn list_results(&self, quiz: &QuizId) -> Result<Vec<QuizResult>, GradingError> {
        Ok(self
            .results
            .list_results()
            .await?
            .into_iter()
            .filter(|r| r.quiz_id() == quiz)
            .collect())
    }

    /// # Errors
    ///
    /// Returns `GradingError::Storage` if the flag cannot be read.
    pub async fn quiz_state(&self, quiz: &QuizId) -> Result<QuizState, GradingError> {
        Ok(QuizState::from_flag(self.releases.is_released(quiz).await?))
    }

    /// Dashboard entry for one quiz.
    ///
    /// # Errors
    ///
    /// Returns `GradingError::QuizNotFound` for an unknown quiz, or a
    /// storage error.
    pub async fn overview(&self, quiz: &QuizId) -> Result<QuizOverview, GradingError> {
        let definition = self.require_quiz(quiz).await?;
        let state = self.quiz_state(quiz).await?;
        let results = self.list_results(quiz).await?;
        Ok(QuizOverview::new(&definition, state, &results))
    }

    /// A student's own result, hidden until release.
    ///
    /// # Errors
    ///
    /// Returns `GradingError::Storage` if results or the flag cannot be read.
    pub async fn student_view(
        &self,
        student: &StudentId,
        quiz: &QuizId,
    ) -> Result<StudentResultView, GradingError> {
        let result = self.results.find_result(student, quiz).await?;
        let state = self.quiz_state(quiz).await?;
        Ok(StudentResultView::new(result.as_ref(), state))
    }

    //
    // ─── ESSAY GRADING ─────────────────────────────────────────────────────────
    //

    /// Record manual points for an essay and rescore the owning result.
    ///
    /// `points` is clamped to `[0, max_points]`. The new score is rebuilt
    /// from the stored answers and every recorded essay grade, never from the
    /// previous score. The grade and the rescored result are written together.
    ///
    /// # Errors
    ///
    /// - `GradingError::QuizNotFound` / `QuestionNotFound` / `NotEssay` for a
    ///   bad target.
    /// - `GradingError::ResultNotFound` if the student has not submitted.
    /// - `GradingError::Storage` on persistence failures, in which case
    ///   neither the grade nor the score changes.
    pub async fn record_essay_grade(
        &self,
        student: &StudentId,
        quiz: &QuizId,
        question: &QuestionId,
        points: i64,
    ) -> Result<QuizResult, GradingError> {
        let definition = self.require_quiz(quiz).await?;
        let target = definition
            .question(question)
            .ok_or_else(|| GradingError::QuestionNotFound(question.clone()))?;
        if !target.is_essay() {
            return Err(GradingError::NotEssay(question.clone()));
        }
        let mut result = self
            .results
            .find_result(student, quiz)
            .await?
            .ok_or(GradingError::ResultNotFound)?;

        let points = clamp_points(points, target.max_points());
        let mut essay_points = self.grades.grades_for(student, quiz).await?;
        essay_points.insert(question.clone(), points);
        let score = recompute_score(&definition, result.answers(), &essay_points);
        result.apply_score(score);

        self.grades
            .record_grade(&result, question, points)
            .await
            .map_err(|err| match err {
                StorageError::NotFound => GradingError::ResultNotFound,
                other => GradingError::Storage(other),
            })?;

        tracing::info!(
            %student,
            %quiz,
            %question,
            points,
            score = score.earned,
            total = score.total,
            "essay graded"
        );
        Ok(result)
    }

    //
    // ─── RELEASE ───────────────────────────────────────────────────────────────
    //

    /// Close the quiz, reveal scores and notify every student once.
    ///
    /// The flag is set before any notification is sent; delivery failures
    /// only show up in the summary.
    ///
    /// # Errors
    ///
    /// - `GradingError::NoResults` if nobody has submitted.
    /// - `GradingError::AlreadyReleased` if the flag is already set.
    /// - `GradingError::Storage` if results or the flag cannot be accessed.
    pub async fn release_scores(
        &self,
        quiz: &QuizId,
        instructor: &str,
    ) -> Result<ReleaseSummary, GradingError> {
        let results = self.list_results(quiz).await?;
        if results.is_empty() {
            return Err(GradingError::NoResults);
        }
        if self.releases.is_released(quiz).await? {
            return Err(GradingError::AlreadyReleased);
        }
        self.releases.set_released(quiz, true).await?;

        let notifications: Vec<ScoreNotification> = results
            .iter()
            .map(|r| ScoreNotification::for_result(r, instructor))
            .collect();
        let summary = notify_all(self.notifier.as_ref(), &notifications).await;

        tracing::info!(
            %quiz,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "scores released"
        );
        Ok(summary)
    }

    /// Clear the release flag. Students who already submitted still cannot
    /// start again until the quiz is reset.
    ///
    /// # Errors
    ///
    /// Returns `GradingError::Storage` if the flag cannot be written.
    pub async fn reopen(&self, quiz: &QuizId) -> Result<(), GradingError> {
        self.releases.set_released(quiz, false).await?;
        tracing::info!(%quiz, "quiz reopened");
        Ok(())
    }

    /// Remove every result, essay grade and attempt claim of `quiz` and
    /// clear its release flag, all in one write.
    ///
    /// # Errors
    ///
    /// Returns `GradingError::Storage` if the purge fails; nothing is
    /// removed in that case.
    pub async fn reset_quiz(&self, quiz: &QuizId) -> Result<PurgeReport, GradingError> {
        let report = self.purge.purge_quiz(quiz, false).await?;
        tracing::info!(
            %quiz,
            results = report.results_removed,
            grades = report.grades_removed,
            "quiz reset"
        );
        Ok(report)
    }

    /// Reset `quiz` and drop it from the catalog in the same write.
    ///
    /// # Errors
    ///
    /// Returns `GradingError::QuizNotFound` for an unknown quiz, or
    /// `GradingError::Storage` if the purge fails.
    pub async fn delete_quiz(&self, quiz: &QuizId) -> Result<PurgeReport, GradingError> {
        self.require_quiz(quiz).await?;
        let report = self.purge.purge_quiz(quiz, true).await?;
        tracing::info!(
            %quiz,
            results = report.results_removed,
            grades = report.grades_removed,
            "quiz deleted"
        );
        Ok(report)
    }

    async fn require_quiz(&self, quiz: &QuizId) -> Result<Quiz, GradingError> {
        self.catalog
            .get(quiz)
            .await?
            .ok_or(GradingError::QuizNotFound)
    }
}
