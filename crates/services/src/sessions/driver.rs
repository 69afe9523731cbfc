use std::future;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};

use quiz_core::model::{Answer, QuestionId, QuizResult};

use crate::error::{AnswerError, SessionError};
use super::attempt::{Attempt, AttemptStatus, ViolationOutcome};
use super::engine::SessionEngine;
use super::progress::AttemptProgress;

/// Countdown resolution.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Input from the page running the attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptEvent {
    Answer { question: QuestionId, answer: Answer },
    AnswerCurrent(Answer),
    Next,
    Previous,
    Submit,
    /// The page lost visibility or focus.
    VisibilityLost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriveOutcome {
    Submitted(QuizResult),
    /// The event channel closed before submission; nothing was persisted.
    Abandoned,
}

/// Runs one attempt against the clock.
///
/// The countdown, the warning timeout and page events are handled one at a
/// time, each to completion, so the attempt is never touched concurrently.
pub struct AttemptDriver {
    engine: SessionEngine,
    attempt: Attempt,
    warning_for: Duration,
    progress: watch::Sender<AttemptProgress>,
}

impl AttemptDriver {
    #[must_use]
    pub fn new(
        engine: SessionEngine,
        attempt: Attempt,
    ) -> (Self, watch::Receiver<AttemptProgress>) {
        let warning_for = Duration::from_secs(u64::from(engine.settings().warning_secs()));
        let (progress, rx) = watch::channel(attempt.progress());
        (
            Self {
                engine,
                attempt,
                warning_for,
                progress,
            },
            rx,
        )
    }

    #[must_use]
    pub fn attempt(&self) -> &Attempt {
        &self.attempt
    }

    /// Drive the attempt until it is submitted or the page goes away.
    ///
    /// If persisting fails the attempt stays submitting; calling `run` again
    /// retries the write straight away.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the result cannot be persisted, including
    /// `SessionError::AlreadyAttempted` when another submission won.
    pub async fn run(
        &mut self,
        events: &mut mpsc::Receiver<AttemptEvent>,
    ) -> Result<DriveOutcome, SessionError> {
        let mut ticker = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        let mut warning_until: Option<Instant> = None;

        loop {
            if self.attempt.status() != AttemptStatus::InProgress {
                let result = self.engine.finalize(&mut self.attempt).await?;
                self.publish(None);
                return Ok(DriveOutcome::Submitted(result));
            }

            let mut rejected = None;
            tokio::select! {
                _ = ticker.tick() => {
                    self.attempt.tick();
                }
                () = wait_until(warning_until) => {
                    self.attempt.dismiss_warning();
                    warning_until = None;
                }
                event = events.recv() => {
                    let Some(event) = event else {
                        tracing::info!(
                            student = %self.attempt.student().id(),
                            quiz = %self.attempt.quiz().id(),
                            "attempt abandoned"
                        );
                        return Ok(DriveOutcome::Abandoned);
                    };
                    match self.apply(event) {
                        Ok(Some(ViolationOutcome::Warned(_))) => {
                            warning_until = Some(Instant::now() + self.warning_for);
                        }
                        Ok(_) | Err(SessionError::NotInProgress) => {}
                        Err(SessionError::Validation(err)) => {
                            tracing::debug!(%err, "attempt input refused");
                            rejected = Some(err);
                        }
                        Err(other) => return Err(other),
                    }
                }
            }
            self.publish(rejected);
        }
    }

    fn apply(&mut self, event: AttemptEvent) -> Result<Option<ViolationOutcome>, SessionError> {
        match event {
            AttemptEvent::Answer { question, answer } => self.attempt.answer(&question, answer)?,
            AttemptEvent::AnswerCurrent(answer) => self.attempt.answer_current(answer)?,
            AttemptEvent::Next => {
                self.attempt.next()?;
            }
            AttemptEvent::Previous => {
                self.attempt.previous()?;
            }
            AttemptEvent::Submit => {
                self.attempt.request_submit()?;
            }
            AttemptEvent::VisibilityLost => return Ok(Some(self.attempt.record_violation())),
        }
        Ok(None)
    }

    fn publish(&self, rejected: Option<AnswerError>) {
        let mut progress = self.attempt.progress();
        progress.rejected = rejected;
        self.progress.send_replace(progress);
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => time::sleep_until(at).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use quiz_core::model::{EngineSettings, StudentIdentity, default_quiz};
    use quiz_core::time::fixed_clock;
    use storage::repository::Storage;

    use crate::catalog::QuizCatalogService;

    async fn driver(storage: &Storage) -> (AttemptDriver, watch::Receiver<AttemptProgress>) {
        let catalog = QuizCatalogService::new(
            fixed_clock(),
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.releases),
        );
        let engine = SessionEngine::new(
            fixed_clock(),
            EngineSettings::default(),
            catalog,
            Arc::clone(&storage.results),
        );
        let attempt = engine
            .start(
                &StudentIdentity::new("Ana", "ana@school.edu"),
                default_quiz().code().as_str(),
            )
            .await
            .unwrap();
        AttemptDriver::new(engine, attempt)
    }

    #[tokio::test(start_paused = true)]
    async fn refused_input_is_reported_in_progress() {
        let storage = Storage::in_memory();
        let (mut driver, mut progress) = driver(&storage).await;
        let (tx, mut rx) = mpsc::channel(8);

        let handle = tokio::spawn(async move { driver.run(&mut rx).await });
        tx.send(AttemptEvent::Next).await.unwrap();
        progress.changed().await.unwrap();
        assert_eq!(progress.borrow().rejected, Some(AnswerError::Unanswered));

        drop(tx);
        assert_eq!(handle.await.unwrap().unwrap(), DriveOutcome::Abandoned);
        assert!(storage.results.list_results().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn warning_clears_after_its_timeout() {
        let storage = Storage::in_memory();
        let (mut driver, mut progress) = driver(&storage).await;
        let (tx, mut rx) = mpsc::channel(8);

        let handle = tokio::spawn(async move { driver.run(&mut rx).await });
        tx.send(AttemptEvent::VisibilityLost).await.unwrap();
        progress.changed().await.unwrap();
        assert!(progress.borrow().warning.is_some());

        time::sleep(Duration::from_millis(2_500)).await;
        assert!(progress.borrow().warning.is_some());
        time::sleep(Duration::from_millis(600)).await;
        assert!(progress.borrow().warning.is_none());
        assert_eq!(progress.borrow().violations, 1);

        drop(tx);
        handle.await.unwrap().unwrap();
    }
}
