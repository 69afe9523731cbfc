//! Scoring rules shared by submission and manual essay grading.
//!
//! Every score here is derived from a quiz definition, an answer sheet and
//! (for essays) the recorded manual points. Nothing reads a previously stored
//! score, so recomputing always reproduces the same value from the same inputs.

use std::collections::HashMap;

use crate::model::{AnswerSheet, QuestionId, Quiz, Score};

/// Score computed at submission: one point per correct non-essay question.
///
/// `total` is the number of non-essay questions; essays are left out until an
/// instructor grades them.
#[must_use]
pub fn score_submission(quiz: &Quiz, answers: &AnswerSheet) -> Score {
    let mut earned = 0_u32;
    let mut total = 0_u32;
    for question in quiz.questions().iter().filter(|q| !q.is_essay()) {
        total = total.saturating_add(1);
        let correct = answers
            .get(&question.id)
            .is_some_and(|answer| question.is_correct(answer));
        if correct {
            earned = earned.saturating_add(1);
        }
    }
    Score::new(earned, total)
}

/// Score including essays, recomputed from answers and recorded essay points.
///
/// Essays contribute their graded points (0 when ungraded) out of their
/// `max_points`; every other question contributes 1 point out of 1 when the
/// stored answer is correct.
#[must_use]
pub fn recompute_score(
    quiz: &Quiz,
    answers: &AnswerSheet,
    essay_points: &HashMap<QuestionId, u32>,
) -> Score {
    let mut earned = 0_u32;
    let mut total = 0_u32;
    for question in quiz.questions() {
        let max = question.max_points();
        total = total.saturating_add(max);
        let got = if question.is_essay() {
            essay_points.get(&question.id).copied().unwrap_or(0).min(max)
        } else {
            u32::from(
                answers
                    .get(&question.id)
                    .is_some_and(|answer| question.is_correct(answer)),
            )
        };
        earned = earned.saturating_add(got);
    }
    Score::new(earned, total)
}

/// Clamp instructor input to `[0, max]`.
#[must_use]
pub fn clamp_points(raw: i64, max: u32) -> u32 {
    let clamped = raw.clamp(0, i64::from(max));
    u32::try_from(clamped).unwrap_or(0)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Answer, Question, QuestionKind, QuizCode, QuizDraft, QuizId};

    fn mixed_quiz() -> Quiz {
        QuizDraft::new("Mixed")
            .with_question(Question::new(
                "q1",
                "Pick A",
                QuestionKind::MultipleChoice {
                    options: vec!["A".into(), "B".into()],
                    correct_answer: 0,
                },
            ))
            .with_question(Question::new(
                "q2",
                "True?",
                QuestionKind::TrueFalse { correct_answer: 1 },
            ))
            .with_question(Question::new(
                "q3",
                "Capital of France",
                QuestionKind::Identification {
                    correct_answer: "Paris".into(),
                },
            ))
            .with_question(Question::new(
                "q4",
                "Discuss",
                QuestionKind::Essay { max_points: 10 },
            ))
            .validate(QuizId::new("quiz_1"), QuizCode::parse("MIXED001").unwrap())
            .unwrap()
    }

    fn sheet(entries: &[(&str, Answer)]) -> AnswerSheet {
        entries
            .iter()
            .map(|(id, answer)| (QuestionId::new(*id), answer.clone()))
            .collect()
    }

    #[test]
    fn submission_score_skips_essays() {
        let quiz = mixed_quiz();
        let answers = sheet(&[
            ("q1", Answer::Choice(0)),
            ("q2", Answer::Choice(0)),
            ("q3", Answer::text(" paris ")),
            ("q4", Answer::text("long essay")),
        ]);
        assert_eq!(score_submission(&quiz, &answers), Score::new(2, 3));
    }

    #[test]
    fn unanswered_questions_score_zero() {
        let quiz = mixed_quiz();
        assert_eq!(score_submission(&quiz, &AnswerSheet::new()), Score::new(0, 3));
    }

    #[test]
    fn recompute_adds_essay_points_and_max() {
        let quiz = mixed_quiz();
        let answers = sheet(&[("q1", Answer::Choice(0)), ("q3", Answer::text("Paris"))]);

        let ungraded = recompute_score(&quiz, &answers, &HashMap::new());
        assert_eq!(ungraded, Score::new(2, 13));

        let graded = HashMap::from([(QuestionId::new("q4"), 7)]);
        assert_eq!(recompute_score(&quiz, &answers, &graded), Score::new(9, 13));
    }

    #[test]
    fn recompute_is_stable_for_same_inputs() {
        let quiz = mixed_quiz();
        let answers = sheet(&[("q2", Answer::Choice(1))]);
        let graded = HashMap::from([(QuestionId::new("q4"), 4)]);
        let first = recompute_score(&quiz, &answers, &graded);
        let second = recompute_score(&quiz, &answers, &graded);
        assert_eq!(first, second);
    }

    #[test]
    fn recompute_caps_stale_essay_points() {
        let quiz = mixed_quiz();
        let graded = HashMap::from([(QuestionId::new("q4"), 50)]);
        assert_eq!(
            recompute_score(&quiz, &AnswerSheet::new(), &graded),
            Score::new(10, 13)
        );
    }

    #[test]
    fn clamp_points_bounds_input() {
        assert_eq!(clamp_points(-3, 10), 0);
        assert_eq!(clamp_points(7, 10), 7);
        assert_eq!(clamp_points(12, 10), 10);
    }
}
