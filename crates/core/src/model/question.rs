use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// Fixed option labels of a true/false question.
pub const TRUE_FALSE_OPTIONS: [&str; 2] = ["True", "False"];

/// Points an essay is worth when the author does not say otherwise.
pub const DEFAULT_ESSAY_POINTS: u32 = 5;

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One question of a quiz.
///
/// The kind-specific fields live in `QuestionKind`; serialized form is flat,
/// e.g. `{"id":"q1","question":"...","type":"multiple-choice","options":[..],"correctAnswer":0}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    #[serde(rename = "question")]
    pub prompt: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Question kinds, each carrying only what it needs for grading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        correct_answer: usize,
    },
    TrueFalse {
        correct_answer: usize,
    },
    /// Free-text answer compared case-insensitively after trimming.
    Identification {
        correct_answer: String,
    },
    /// Manually graded; never contributes to the auto-graded score.
    Essay {
        max_points: u32,
    },
}

/// A student's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    /// Selected option index (multiple-choice, true/false).
    Choice(usize),
    /// Typed text (identification, essay).
    Text(String),
}

impl Answer {
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

impl Question {
    #[must_use]
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            id: QuestionId::new(id),
            prompt: prompt.into(),
            kind,
        }
    }

    /// Option labels for choice questions; empty for free-text kinds.
    #[must_use]
    pub fn options(&self) -> Vec<&str> {
        match &self.kind {
            QuestionKind::MultipleChoice { options, .. } => {
                options.iter().map(String::as_str).collect()
            }
            QuestionKind::TrueFalse { .. } => TRUE_FALSE_OPTIONS.to_vec(),
            QuestionKind::Identification { .. } | QuestionKind::Essay { .. } => Vec::new(),
        }
    }

    #[must_use]
    pub fn is_essay(&self) -> bool {
        matches!(self.kind, QuestionKind::Essay { .. })
    }

    /// Points this question is worth in a recomputed total.
    #[must_use]
    pub fn max_points(&self) -> u32 {
        match self.kind {
            QuestionKind::Essay { max_points } => max_points,
            _ => 1,
        }
    }

    /// Whether `answer` has the right shape for this question.
    ///
    /// Choice questions need an in-range index, text questions need text
    /// (possibly empty).
    #[must_use]
    pub fn accepts(&self, answer: &Answer) -> bool {
        match (&self.kind, answer) {
            (QuestionKind::MultipleChoice { options, .. }, Answer::Choice(idx)) => {
                *idx < options.len()
            }
            (QuestionKind::TrueFalse { .. }, Answer::Choice(idx)) => {
                *idx < TRUE_FALSE_OPTIONS.len()
            }
            (
                QuestionKind::Identification { .. } | QuestionKind::Essay { .. },
                Answer::Text(_),
            ) => true,
            _ => false,
        }
    }

    /// Whether `answer` counts as answered for the "Next" gate.
    #[must_use]
    pub fn is_answered_by(&self, answer: Option<&Answer>) -> bool {
        match answer {
            Some(answer @ Answer::Text(text)) => self.accepts(answer) && !text.trim().is_empty(),
            Some(answer) => self.accepts(answer),
            None => false,
        }
    }

    /// Auto-graded correctness. Essays are never correct here.
    #[must_use]
    pub fn is_correct(&self, answer: &Answer) -> bool {
        match (&self.kind, answer) {
            (
                QuestionKind::MultipleChoice { correct_answer, .. }
                | QuestionKind::TrueFalse { correct_answer },
                Answer::Choice(idx),
            ) => idx == correct_answer,
            (QuestionKind::Identification { correct_answer }, Answer::Text(text)) => {
                identification_matches(correct_answer, text)
            }
            _ => false,
        }
    }
}

/// Case-insensitive comparison of trimmed strings.
#[must_use]
pub fn identification_matches(expected: &str, given: &str) -> bool {
    expected.trim().to_lowercase() == given.trim().to_lowercase()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn mc() -> Question {
        Question::new(
            "q1",
            "Pick A",
            QuestionKind::MultipleChoice {
                options: vec!["A".into(), "B".into()],
                correct_answer: 0,
            },
        )
    }

    #[test]
    fn identification_ignores_case_and_padding() {
        assert!(identification_matches("Paris", "Paris "));
        assert!(identification_matches("Paris", "paris"));
        assert!(!identification_matches("Paris", "Pari"));
    }

    #[test]
    fn choice_answers_are_range_checked() {
        let q = mc();
        assert!(q.accepts(&Answer::Choice(1)));
        assert!(!q.accepts(&Answer::Choice(2)));
        assert!(!q.accepts(&Answer::text("A")));
    }

    #[test]
    fn next_gate_requires_non_blank_text() {
        let q = Question::new(
            "q2",
            "Capital of France",
            QuestionKind::Identification {
                correct_answer: "Paris".into(),
            },
        );
        assert!(!q.is_answered_by(None));
        assert!(!q.is_answered_by(Some(&Answer::text("   "))));
        assert!(q.is_answered_by(Some(&Answer::text("paris"))));
        assert!(!q.is_answered_by(Some(&Answer::Choice(0))));
    }

    #[test]
    fn true_false_uses_fixed_options() {
        let q = Question::new("q3", "Sky is blue", QuestionKind::TrueFalse { correct_answer: 0 });
        assert_eq!(q.options(), vec!["True", "False"]);
        assert!(q.is_correct(&Answer::Choice(0)));
        assert!(!q.is_correct(&Answer::Choice(1)));
    }

    #[test]
    fn essays_are_never_auto_correct() {
        let q = Question::new("q4", "Explain", QuestionKind::Essay { max_points: 10 });
        assert!(!q.is_correct(&Answer::text("anything")));
        assert_eq!(q.max_points(), 10);
    }

    #[test]
    fn serialized_shape_is_flat_and_tagged() {
        let json = serde_json::to_value(mc()).unwrap();
        assert_eq!(json["type"], "multiple-choice");
        assert_eq!(json["question"], "Pick A");
        assert_eq!(json["correctAnswer"], 0);

        let essay: Question = serde_json::from_str(
            r#"{"id":"q9","question":"Why?","type":"essay","maxPoints":7}"#,
        )
        .unwrap();
        assert_eq!(essay.kind, QuestionKind::Essay { max_points: 7 });
    }

    #[test]
    fn answers_deserialize_untagged() {
        let choice: Answer = serde_json::from_str("2").unwrap();
        let text: Answer = serde_json::from_str("\"Paris\"").unwrap();
        assert_eq!(choice, Answer::Choice(2));
        assert_eq!(text, Answer::text("Paris"));
    }
}
