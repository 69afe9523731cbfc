use chrono::{DateTime, Utc};

use quiz_core::grading::score_submission;
use quiz_core::model::{
    Answer, AnswerSheet, EngineSettings, Question, QuestionId, Quiz, QuizResult, StudentIdentity,
    SubmissionRecord,
};

use crate::error::{AnswerError, SessionError};
use super::progress::AttemptProgress;

//
// ─── STATES & OUTCOMES ─────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    InProgress,
    /// Submission has been triggered; no further input is accepted.
    Submitting,
    Done,
}

/// What moved the attempt into `Submitting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitReason {
    Manual,
    TimeExpired,
    ViolationLimit,
}

impl SubmitReason {
    #[must_use]
    pub fn is_auto(self) -> bool {
        !matches!(self, SubmitReason::Manual)
    }
}

/// Transient, non-blocking proctoring notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProctorWarning {
    pub violation: u32,
    pub max_violations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Running { remaining_secs: u32 },
    /// Countdown hit zero and the attempt is now submitting.
    Expired,
    /// Countdown is stopped.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationOutcome {
    Warned(ProctorWarning),
    /// The limit was reached and the attempt is now submitting.
    LimitReached,
    Ignored,
}

//
// ─── ATTEMPT ───────────────────────────────────────────────────────────────────
//

/// One student's timed, proctored run through one quiz.
///
/// Holds its own copy of the quiz, so catalog edits made while the attempt is
/// running do not affect it. Answers live only here until submission.
#[derive(Debug, Clone)]
pub struct Attempt {
    quiz: Quiz,
    student: StudentIdentity,
    answers: AnswerSheet,
    current: usize,
    violations: u32,
    max_violations: u32,
    time_remaining: u32,
    warning: Option<ProctorWarning>,
    status: AttemptStatus,
    submit_reason: Option<SubmitReason>,
    started_at: DateTime<Utc>,
    result: Option<QuizResult>,
}

impl Attempt {
    #[must_use]
    pub fn new(
        quiz: Quiz,
        student: StudentIdentity,
        settings: &EngineSettings,
        started_at: DateTime<Utc>,
    ) -> Self {
        let time_remaining = quiz.duration_secs();
        Self {
            quiz,
            student,
            answers: AnswerSheet::new(),
            current: 0,
            violations: 0,
            max_violations: settings.max_violations(),
            time_remaining,
            warning: None,
            status: AttemptStatus::InProgress,
            submit_reason: None,
            started_at,
            result: None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn student(&self) -> &StudentIdentity {
        &self.student
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions().get(self.current)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.quiz.questions().len()
    }

    #[must_use]
    pub fn is_on_final_question(&self) -> bool {
        self.current + 1 >= self.total_questions()
    }

    /// Questions whose stored answer passes the "Next" gate.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.quiz
            .questions()
            .iter()
            .filter(|q| q.is_answered_by(self.answers.get(&q.id)))
            .count()
    }

    #[must_use]
    pub fn violations(&self) -> u32 {
        self.violations
    }

    #[must_use]
    pub fn max_violations(&self) -> u32 {
        self.max_violations
    }

    #[must_use]
    pub fn time_remaining_secs(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn warning(&self) -> Option<ProctorWarning> {
        self.warning
    }

    #[must_use]
    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    #[must_use]
    pub fn submit_reason(&self) -> Option<SubmitReason> {
        self.submit_reason
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The persisted result, once the attempt is done.
    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn progress(&self) -> AttemptProgress {
        AttemptProgress::of(self)
    }

    //
    // ─── INPUT ─────────────────────────────────────────────────────────────────
    //

    /// Store `answer` for `question`, replacing any earlier answer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` once submission has started, or
    /// `SessionError::Validation` if the question is unknown or the answer
    /// does not fit it.
    pub fn answer(&mut self, question: &QuestionId, answer: Answer) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        let q = self
            .quiz
            .question(question)
            .ok_or_else(|| AnswerError::UnknownQuestion(question.clone()))?;
        if !q.accepts(&answer) {
            return Err(AnswerError::InvalidAnswer(question.clone()).into());
        }
        self.answers.insert(question.clone(), answer);
        Ok(())
    }

    /// Answer the question currently shown.
    ///
    /// # Errors
    ///
    /// Same as [`Attempt::answer`].
    pub fn answer_current(&mut self, answer: Answer) -> Result<(), SessionError> {
        let id = self
            .current_question()
            .map(|q| q.id.clone())
            .ok_or(SessionError::NotInProgress)?;
        self.answer(&id, answer)
    }

    /// Move forward. Stays on the final question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Validation` with `AnswerError::Unanswered` if
    /// the current question has no usable answer, or
    /// `SessionError::NotInProgress` once submission has started.
    pub fn next(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress()?;
        let answered = self
            .current_question()
            .is_some_and(|q| q.is_answered_by(self.answers.get(&q.id)));
        if !answered {
            return Err(AnswerError::Unanswered.into());
        }
        if !self.is_on_final_question() {
            self.current += 1;
        }
        Ok(self.current)
    }

    /// Move back. Stays on the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotInProgress` once submission has started.
    pub fn previous(&mut self) -> Result<usize, SessionError> {
        self.ensure_in_progress()?;
        self.current = self.current.saturating_sub(1);
        Ok(self.current)
    }

    /// Explicit submit from the final question.
    ///
    /// Returns `false` when submission was already triggered, so duplicate
    /// clicks and a racing timer collapse into one submission.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Validation` with `AnswerError::NotOnFinalQuestion`
    /// when called before the last question.
    pub fn request_submit(&mut self) -> Result<bool, SessionError> {
        if self.status != AttemptStatus::InProgress {
            return Ok(false);
        }
        if !self.is_on_final_question() {
            return Err(AnswerError::NotOnFinalQuestion.into());
        }
        Ok(self.begin_submit(SubmitReason::Manual))
    }

    //
    // ─── TIMER & PROCTORING ────────────────────────────────────────────────────
    //

    /// One second of countdown.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != AttemptStatus::InProgress {
            return TickOutcome::Idle;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.begin_submit(SubmitReason::TimeExpired);
            return TickOutcome::Expired;
        }
        TickOutcome::Running {
            remaining_secs: self.time_remaining,
        }
    }

    /// The page lost visibility or focus.
    pub fn record_violation(&mut self) -> ViolationOutcome {
        if self.status != AttemptStatus::InProgress {
            return ViolationOutcome::Ignored;
        }
        self.violations = self.violations.saturating_add(1);
        tracing::warn!(
            student = %self.student.id(),
            quiz = %self.quiz.id(),
            violations = self.violations,
            "proctoring violation"
        );
        if self.violations >= self.max_violations {
            self.warning = None;
            self.begin_submit(SubmitReason::ViolationLimit);
            return ViolationOutcome::LimitReached;
        }
        let warning = ProctorWarning {
            violation: self.violations,
            max_violations: self.max_violations,
        };
        self.warning = Some(warning);
        ViolationOutcome::Warned(warning)
    }

    pub fn dismiss_warning(&mut self) {
        self.warning = None;
    }

    //
    // ─── SUBMISSION ────────────────────────────────────────────────────────────
    //

    fn begin_submit(&mut self, reason: SubmitReason) -> bool {
        if self.status != AttemptStatus::InProgress {
            return false;
        }
        self.status = AttemptStatus::Submitting;
        self.submit_reason = Some(reason);
        true
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        if self.status == AttemptStatus::InProgress {
            Ok(())
        } else {
            Err(SessionError::NotInProgress)
        }
    }

    /// Build the result to persist. Only available while submitting.
    pub(crate) fn build_result(&self, submitted_at: DateTime<Utc>) -> Option<QuizResult> {
        if self.status != AttemptStatus::Submitting {
            return None;
        }
        let auto_submitted = self.submit_reason.is_some_and(SubmitReason::is_auto);
        Some(QuizResult::from_submission(SubmissionRecord {
            quiz_id: self.quiz.id().clone(),
            quiz_code: self.quiz.code().clone(),
            quiz_title: self.quiz.title().to_string(),
            student: self.student.clone(),
            score: score_submission(&self.quiz, &self.answers),
            answers: self.answers.clone(),
            violations: self.violations,
            timestamp: submitted_at,
            auto_submitted,
        }))
    }

    pub(crate) fn finish(&mut self, result: QuizResult) {
        self.status = AttemptStatus::Done;
        self.warning = None;
        self.result = Some(result);
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
