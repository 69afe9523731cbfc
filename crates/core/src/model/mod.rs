mod ids;
mod question;
mod quiz;
mod result;
mod settings;
mod user;

pub use ids::{ParseIdError, QUIZ_CODE_ALPHABET, QUIZ_CODE_LEN, QuestionId, QuizCode, QuizId, StudentId};

pub use question::{
    Answer, DEFAULT_ESSAY_POINTS, Question, QuestionKind, TRUE_FALSE_OPTIONS,
    identification_matches,
};
pub use quiz::{
    DEFAULT_DURATION_SECS, DEFAULT_QUIZ_CODE, DEFAULT_QUIZ_ID, Quiz, QuizDraft, QuizError,
    QuizType, default_quiz,
};
pub use result::{AnswerSheet, QuizResult, Score, StudentIdentity, SubmissionRecord};
pub use settings::{EngineSettings, EngineSettingsDraft, EngineSettingsError};
pub use user::{Role, User, UserDraft, UserError};
