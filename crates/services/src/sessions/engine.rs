use std::sync::Arc;

use quiz_core::model::{EngineSettings, QuizResult, StudentIdentity};
use storage::repository::{ResultRepository, StorageError};

use crate::Clock;
use crate::catalog::QuizCatalogService;
use crate::error::{ClosedReason, SessionError};
use super::attempt::{Attempt, AttemptStatus};

/// Outcome of a manual submit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted(QuizResult),
    /// Submission was already triggered by the timer, the violation limit or
    /// an earlier click; nothing was written.
    AlreadySubmitted,
}

/// Starts attempts and persists their results.
///
/// Every check that can refuse an attempt runs in `start`, before any
/// `Attempt` exists.
#[derive(Clone)]
pub struct SessionEngine {
    clock: Clock,
    settings: EngineSettings,
    catalog: QuizCatalogService,
    results: Arc<dyn ResultRepository>,
}

impl SessionEngine {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: EngineSettings,
        catalog: QuizCatalogService,
        results: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            clock,
            settings,
            catalog,
            results,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Open an attempt for `student` on the quiz with access code `code`.
    ///
    /// # Errors
    ///
    /// - `SessionError::InvalidCode` if no quiz has that code.
    /// - `SessionError::QuizClosed` if scores are released or the deadline
    ///   has passed.
    /// - `SessionError::AlreadyAttempted` if the student already has a result.
    /// - `SessionError::Catalog` / `SessionError::Storage` on store failures.
    pub async fn start(
        &self,
        student: &StudentIdentity,
        code: &str,
    ) -> Result<Attempt, SessionError> {
        let quiz = self
            .catalog
            .get_by_code(code)
            .await?
            .ok_or_else(|| SessionError::InvalidCode(code.trim().to_string()))?;

        if self.catalog.is_released(quiz.id()).await? {
            return Err(SessionError::QuizClosed {
                reason: ClosedReason::Released,
            });
        }
        let now = self.clock.now();
        if quiz.is_past_deadline(now) {
            return Err(SessionError::QuizClosed {
                reason: ClosedReason::DeadlinePassed,
            });
        }
        if self
            .results
            .find_result(&student.id(), quiz.id())
            .await?
            .is_some()
        {
            return Err(SessionError::AlreadyAttempted);
        }

        tracing::info!(
            student = %student.id(),
            quiz = %quiz.id(),
            duration_secs = quiz.duration_secs(),
            "attempt started"
        );
        Ok(Attempt::new(quiz, student.clone(), &self.settings, now))
    }

    /// Manual submit from the final question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Validation` before the final question, or any
    /// error from [`SessionEngine::finalize`].
    pub async fn submit(&self, attempt: &mut Attempt) -> Result<SubmitOutcome, SessionError> {
        if !attempt.request_submit()? {
            return Ok(SubmitOutcome::AlreadySubmitted);
        }
        self.finalize(attempt).await.map(SubmitOutcome::Submitted)
    }

    /// Score and persist an attempt that is submitting.
    ///
    /// Calling this again after success returns the stored result without
    /// writing. After a storage failure the attempt stays submitting, so the
    /// call can be retried.
    ///
    /// # Errors
    ///
    /// - `SessionError::NotInProgress` if submission was never triggered.
    /// - `SessionError::AlreadyAttempted` if another submission for the same
    ///   student and quiz won the race.
    /// - `SessionError::Storage` if the result cannot be written.
    pub async fn finalize(&self, attempt: &mut Attempt) -> Result<QuizResult, SessionError> {
        if let Some(result) = attempt.result() {
            return Ok(result.clone());
        }
        if attempt.status() != AttemptStatus::Submitting {
            return Err(SessionError::NotInProgress);
        }
        let result = attempt
            .build_result(self.clock.now())
            .ok_or(SessionError::NotInProgress)?;

        if self.catalog.is_released(result.quiz_id()).await? {
            tracing::warn!(
                student = %result.student_id(),
                quiz = %result.quiz_id(),
                "accepting submission after scores were released"
            );
        }

        self.results
            .append_result(&result)
            .await
            .map_err(|err| match err {
                StorageError::Conflict => SessionError::AlreadyAttempted,
                other => SessionError::Storage(other),
            })?;

        tracing::info!(
            student = %result.student_id(),
            quiz = %result.quiz_id(),
            score = result.score().earned,
            total = result.total_questions(),
            violations = result.violations(),
            auto_submitted = result.auto_submitted(),
            "attempt submitted"
        );
        attempt.finish(result.clone());
        Ok(result)
    }
}
