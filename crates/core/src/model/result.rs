use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{QuestionId, QuizCode, QuizId, StudentId};
use crate::model::question::Answer;

/// Answers keyed by question id, as captured during an attempt.
pub type AnswerSheet = BTreeMap<QuestionId, Answer>;

/// Who took the quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdentity {
    #[serde(rename = "studentName")]
    pub name: String,
    #[serde(rename = "studentEmail")]
    pub email: String,
}

impl StudentIdentity {
    #[must_use]
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> StudentId {
        StudentId::new(&self.email)
    }
}

/// Earned points out of a total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    pub earned: u32,
    pub total: u32,
}

impl Score {
    #[must_use]
    pub fn new(earned: u32, total: u32) -> Self {
        Self { earned, total }
    }

    /// Rounded percentage for display; 0 when there is nothing to score.
    // earned <= total in practice, so the cast stays within 0..=100
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percentage(self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        (f64::from(self.earned) / f64::from(self.total) * 100.0).round() as u32
    }
}

/// Persisted outcome of one student's attempt at one quiz.
///
/// `score` and `total_questions` are written at submission and afterwards only
/// through `apply_score` when essays are graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    quiz_id: QuizId,
    quiz_code: QuizCode,
    quiz_title: String,
    #[serde(flatten)]
    student: StudentIdentity,
    score: u32,
    total_questions: u32,
    answers: AnswerSheet,
    violations: u32,
    timestamp: DateTime<Utc>,
    auto_submitted: bool,
}

/// Everything needed to build a `QuizResult` at submission time.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    pub quiz_id: QuizId,
    pub quiz_code: QuizCode,
    pub quiz_title: String,
    pub student: StudentIdentity,
    pub score: Score,
    pub answers: AnswerSheet,
    pub violations: u32,
    pub timestamp: DateTime<Utc>,
    pub auto_submitted: bool,
}

impl QuizResult {
    #[must_use]
    pub fn from_submission(record: SubmissionRecord) -> Self {
        Self {
            quiz_id: record.quiz_id,
            quiz_code: record.quiz_code,
            quiz_title: record.quiz_title,
            student: record.student,
            score: record.score.earned,
            total_questions: record.score.total,
            answers: record.answers,
            violations: record.violations,
            timestamp: record.timestamp,
            auto_submitted: record.auto_submitted,
        }
    }

    #[must_use]
    pub fn quiz_id(&self) -> &QuizId {
        &self.quiz_id
    }

    #[must_use]
    pub fn quiz_code(&self) -> &QuizCode {
        &self.quiz_code
    }

    #[must_use]
    pub fn quiz_title(&self) -> &str {
        &self.quiz_title
    }

    #[must_use]
    pub fn student(&self) -> &StudentIdentity {
        &self.student
    }

    #[must_use]
    pub fn student_id(&self) -> StudentId {
        self.student.id()
    }

    #[must_use]
    pub fn score(&self) -> Score {
        Score::new(self.score, self.total_questions)
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        self.score().percentage()
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn violations(&self) -> u32 {
        self.violations
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn auto_submitted(&self) -> bool {
        self.auto_submitted
    }

    /// True if this result belongs to `student` for `quiz`.
    #[must_use]
    pub fn is_for(&self, student: &StudentId, quiz: &QuizId) -> bool {
        &self.quiz_id == quiz && &self.student_id() == student
    }

    /// Overwrite the score after a recomputation.
    pub fn apply_score(&mut self, score: Score) {
        self.score = score.earned;
        self.total_questions = score.total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn sample() -> QuizResult {
        let mut answers = AnswerSheet::new();
        answers.insert(QuestionId::new("q1"), Answer::Choice(0));
        answers.insert(QuestionId::new("q2"), Answer::text("Paris"));
        QuizResult::from_submission(SubmissionRecord {
            quiz_id: QuizId::new("quiz_1"),
            quiz_code: QuizCode::parse("ABCD1234").unwrap(),
            quiz_title: "Geo".into(),
            student: StudentIdentity::new("Ana", "Ana@school.edu"),
            score: Score::new(1, 2),
            answers,
            violations: 1,
            timestamp: fixed_now(),
            auto_submitted: false,
        })
    }

    #[test]
    fn percentage_rounds_and_handles_zero_total() {
        assert_eq!(Score::new(1, 3).percentage(), 33);
        assert_eq!(Score::new(2, 3).percentage(), 67);
        assert_eq!(Score::new(0, 0).percentage(), 0);
    }

    #[test]
    fn result_matches_student_case_insensitively() {
        let result = sample();
        assert!(result.is_for(&StudentId::new("ana@SCHOOL.edu"), &QuizId::new("quiz_1")));
        assert!(!result.is_for(&StudentId::new("ana@school.edu"), &QuizId::new("quiz_2")));
    }

    #[test]
    fn serialized_result_uses_flat_camel_case_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["studentEmail"], "Ana@school.edu");
        assert_eq!(json["totalQuestions"], 2);
        assert_eq!(json["autoSubmitted"], false);
        assert_eq!(json["answers"]["q2"], "Paris");
    }

    #[test]
    fn apply_score_overwrites_both_fields() {
        let mut result = sample();
        result.apply_score(Score::new(8, 12));
        assert_eq!(result.score(), Score::new(8, 12));
        assert_eq!(result.total_questions(), 12);
    }
}
