use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizCode, QuizId};
use crate::model::question::{Question, QuestionKind};

/// Default time limit for a new quiz, in seconds.
pub const DEFAULT_DURATION_SECS: u32 = 600;

pub const DEFAULT_QUIZ_ID: &str = "quiz_default_001";
pub const DEFAULT_QUIZ_CODE: &str = "DCIT26QZ";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("quiz must have at least one question")]
    NoQuestions,

    #[error("quiz duration must be at least one second")]
    InvalidDuration,

    #[error("question {number} is empty")]
    EmptyPrompt { number: usize },

    #[error("question {number} has empty options")]
    EmptyOption { number: usize },

    #[error("question {number} needs at least two options")]
    TooFewOptions { number: usize },

    #[error("question {number} marks a correct answer that is not one of its options")]
    CorrectAnswerOutOfRange { number: usize },

    #[error("question {number} has no correct answer")]
    EmptyCorrectAnswer { number: usize },

    #[error("essay question {number} must be worth at least one point")]
    InvalidEssayPoints { number: usize },

    #[error("question id {id} is used more than once")]
    DuplicateQuestionId { id: String },
}

//
// ─── QUIZ TYPE ─────────────────────────────────────────────────────────────────
//

/// Predominant question type a quiz was authored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizType {
    #[default]
    MultipleChoice,
    TrueFalse,
    Identification,
    Essay,
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A validated quiz definition as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    id: QuizId,
    code: QuizCode,
    title: String,
    #[serde(rename = "type", default)]
    quiz_type: QuizType,
    #[serde(rename = "duration")]
    duration_secs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deadline: Option<DateTime<Utc>>,
    questions: Vec<Question>,
}

impl Quiz {
    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn code(&self) -> &QuizCode {
        &self.code
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn quiz_type(&self) -> QuizType {
        self.quiz_type
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    /// Returns true once `now` is past the optional deadline.
    #[must_use]
    pub fn is_past_deadline(&self, now: DateTime<Utc>) -> bool {
        self.deadline.is_some_and(|deadline| now > deadline)
    }

    /// Turn this quiz back into an editable draft.
    #[must_use]
    pub fn to_draft(&self) -> QuizDraft {
        QuizDraft {
            title: self.title.clone(),
            quiz_type: self.quiz_type,
            duration_secs: self.duration_secs,
            deadline: self.deadline,
            questions: self.questions.clone(),
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated quiz input from the authoring form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDraft {
    pub title: String,
    pub quiz_type: QuizType,
    pub duration_secs: u32,
    pub deadline: Option<DateTime<Utc>>,
    pub questions: Vec<Question>,
}

impl Default for QuizDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            quiz_type: QuizType::default(),
            duration_secs: DEFAULT_DURATION_SECS,
            deadline: None,
            questions: Vec::new(),
        }
    }
}

impl QuizDraft {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_duration_secs(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    /// Validate the draft and bind it to an id and access code.
    ///
    /// Question numbers in errors are 1-based, matching what the author sees.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` describing the first problem found.
    pub fn validate(self, id: QuizId, code: QuizCode) -> Result<Quiz, QuizError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if self.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        if self.duration_secs == 0 {
            return Err(QuizError::InvalidDuration);
        }

        let mut seen = std::collections::HashSet::new();
        for (idx, question) in self.questions.iter().enumerate() {
            validate_question(idx + 1, question)?;
            if !seen.insert(question.id.clone()) {
                return Err(QuizError::DuplicateQuestionId {
                    id: question.id.to_string(),
                });
            }
        }

        Ok(Quiz {
            id,
            code,
            title,
            quiz_type: self.quiz_type,
            duration_secs: self.duration_secs,
            deadline: self.deadline,
            questions: self.questions,
        })
    }
}

fn validate_question(number: usize, question: &Question) -> Result<(), QuizError> {
    if question.prompt.trim().is_empty() {
        return Err(QuizError::EmptyPrompt { number });
    }
    match &question.kind {
        QuestionKind::MultipleChoice {
            options,
            correct_answer,
        } => {
            if options.len() < 2 {
                return Err(QuizError::TooFewOptions { number });
            }
            if options.iter().any(|opt| opt.trim().is_empty()) {
                return Err(QuizError::EmptyOption { number });
            }
            if *correct_answer >= options.len() {
                return Err(QuizError::CorrectAnswerOutOfRange { number });
            }
        }
        QuestionKind::TrueFalse { correct_answer } => {
            if *correct_answer > 1 {
                return Err(QuizError::CorrectAnswerOutOfRange { number });
            }
        }
        QuestionKind::Identification { correct_answer } => {
            if correct_answer.trim().is_empty() {
                return Err(QuizError::EmptyCorrectAnswer { number });
            }
        }
        QuestionKind::Essay { max_points } => {
            if *max_points == 0 {
                return Err(QuizError::InvalidEssayPoints { number });
            }
        }
    }
    Ok(())
}

/// The quiz the catalog starts with on a fresh device.
#[must_use]
pub fn default_quiz() -> Quiz {
    let mc = |id: &str, prompt: &str, options: [&str; 4], correct_answer: usize| {
        Question::new(
            id,
            prompt,
            QuestionKind::MultipleChoice {
                options: options.iter().map(|s| (*s).to_string()).collect(),
                correct_answer,
            },
        )
    };

    Quiz {
        id: QuizId::new(DEFAULT_QUIZ_ID),
        code: QuizCode::from_trusted(DEFAULT_QUIZ_CODE),
        title: "DCIT 26 - Web Development Final Quiz".to_string(),
        quiz_type: QuizType::MultipleChoice,
        duration_secs: DEFAULT_DURATION_SECS,
        deadline: None,
        questions: vec![
            mc(
                "q1",
                "What is React?",
                [
                    "A JavaScript library for building user interfaces",
                    "A database management system",
                    "A CSS framework",
                    "A backend server",
                ],
                0,
            ),
            mc(
                "q2",
                "What does JSX stand for?",
                [
                    "JavaScript XML",
                    "Java Syntax Extension",
                    "JSON X-factor",
                    "JavaScript Extra",
                ],
                0,
            ),
            mc(
                "q3",
                "Which hook is used for side effects in React?",
                ["useState", "useEffect", "useContext", "useReducer"],
                1,
            ),
            mc(
                "q4",
                "What is TailwindCSS?",
                [
                    "A JavaScript framework",
                    "A utility-first CSS framework",
                    "A testing library",
                    "A state management tool",
                ],
                1,
            ),
            mc(
                "q5",
                "What is the virtual DOM in React?",
                [
                    "A copy of the real DOM kept in memory",
                    "A database structure",
                    "A CSS animation technique",
                    "A routing mechanism",
                ],
                0,
            ),
        ],
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
