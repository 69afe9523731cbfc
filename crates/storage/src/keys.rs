//! String key layout of the persistent store.
//!
//! Composite keys join their parts with `::`, quiz id first, so everything
//! belonging to one quiz can be found with a single prefix scan.

use quiz_core::model::{QuestionId, QuizId, StudentId};

pub const CURRENT_USER: &str = "current_user";
pub const QUIZZES: &str = "all_quizzes";
pub const QUIZ_RESULTS: &str = "quiz_results";

const RELEASED_PREFIX: &str = "released_scores_";
const ESSAY_GRADE_PREFIX: &str = "essay_grade";
const ATTEMPT_CLAIM_PREFIX: &str = "attempt_claim";
const SEP: &str = "::";

#[must_use]
pub fn released(quiz: &QuizId) -> String {
    format!("{RELEASED_PREFIX}{quiz}")
}

#[must_use]
pub fn essay_grade(quiz: &QuizId, student: &StudentId, question: &QuestionId) -> String {
    format!("{ESSAY_GRADE_PREFIX}{SEP}{quiz}{SEP}{student}{SEP}{question}")
}

/// Prefix shared by every essay grade of one student in one quiz.
#[must_use]
pub fn essay_grades_of_student(quiz: &QuizId, student: &StudentId) -> String {
    format!("{ESSAY_GRADE_PREFIX}{SEP}{quiz}{SEP}{student}{SEP}")
}

/// Prefix shared by every essay grade of one quiz.
#[must_use]
pub fn essay_grades_of_quiz(quiz: &QuizId) -> String {
    format!("{ESSAY_GRADE_PREFIX}{SEP}{quiz}{SEP}")
}

/// Extract the question id from a full essay grade key.
#[must_use]
pub fn question_of_essay_grade(key: &str) -> Option<QuestionId> {
    key.rsplit_once(SEP)
        .map(|(_, question)| QuestionId::new(question))
}

#[must_use]
pub fn attempt_claim(quiz: &QuizId, student: &StudentId) -> String {
    format!("{ATTEMPT_CLAIM_PREFIX}{SEP}{quiz}{SEP}{student}")
}

#[must_use]
pub fn attempt_claims_of_quiz(quiz: &QuizId) -> String {
    format!("{ATTEMPT_CLAIM_PREFIX}{SEP}{quiz}{SEP}")
}
