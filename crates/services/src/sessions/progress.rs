use quiz_core::time::format_countdown;

use crate::error::AnswerError;
use super::attempt::{Attempt, AttemptStatus, ProctorWarning};

/// Snapshot of a running attempt, shaped for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptProgress {
    pub current_index: usize,
    pub total_questions: usize,
    pub answered: usize,
    pub time_remaining_secs: u32,
    /// `m:ss`
    pub countdown: String,
    pub violations: u32,
    pub max_violations: u32,
    pub warning: Option<ProctorWarning>,
    pub status: AttemptStatus,
    pub can_go_next: bool,
    pub can_submit: bool,
    /// Last input the attempt refused, if the most recent event was refused.
    pub rejected: Option<AnswerError>,
}

impl AttemptProgress {
    #[must_use]
    pub fn of(attempt: &Attempt) -> Self {
        let in_progress = attempt.status() == AttemptStatus::InProgress;
        let current_answered = attempt
            .current_question()
            .is_some_and(|q| q.is_answered_by(attempt.answers().get(&q.id)));
        let on_final = attempt.is_on_final_question();

        Self {
            current_index: attempt.current_index(),
            total_questions: attempt.total_questions(),
            answered: attempt.answered_count(),
            time_remaining_secs: attempt.time_remaining_secs(),
            countdown: format_countdown(attempt.time_remaining_secs()),
            violations: attempt.violations(),
            max_violations: attempt.max_violations(),
            warning: attempt.warning(),
            status: attempt.status(),
            can_go_next: in_progress && current_answered && !on_final,
            can_submit: in_progress && on_final,
            rejected: None,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == AttemptStatus::Done
    }
}
