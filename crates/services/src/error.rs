//! Shared error types for the services crate.

use std::fmt;

use thiserror::Error;

use quiz_core::ValidationError;
use quiz_core::model::{EngineSettingsError, QuestionId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Why a quiz refuses new attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedReason {
    Released,
    DeadlinePassed,
}

impl fmt::Display for ClosedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClosedReason::Released => f.write_str("scores have been released"),
            ClosedReason::DeadlinePassed => f.write_str("the deadline has passed"),
        }
    }
}

/// Malformed input to a running attempt. User-correctable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),
    #[error("answer does not fit question {0}")]
    InvalidAnswer(QuestionId),
    #[error("answer the current question before moving on")]
    Unanswered,
    #[error("submit is only available on the final question")]
    NotOnFinalQuestion,
}

/// Errors emitted by the session engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no quiz found for code {0}")]
    InvalidCode(String),
    #[error("this quiz has already been attempted")]
    AlreadyAttempted,
    #[error("quiz is closed: {reason}")]
    QuizClosed { reason: ClosedReason },
    #[error(transparent)]
    Validation(#[from] AnswerError),
    #[error("attempt is no longer accepting this action")]
    NotInProgress,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `GradingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GradingError {
    #[error("no results to release")]
    NoResults,
    #[error("scores are already released")]
    AlreadyReleased,
    #[error("quiz not found")]
    QuizNotFound,
    #[error("no result for this student")]
    ResultNotFound,
    #[error("question {0} not found")]
    QuestionNotFound(QuestionId),
    #[error("question {0} is not an essay")]
    NotEssay(QuestionId),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizCatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("quiz not found")]
    NotFound,
    #[error("could not generate a unique quiz code")]
    CodeSpaceExhausted,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `IdentityService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IdentityError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid instructor credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Per-recipient delivery failure. Never rolls back a release.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NotificationError {
    #[error("notifier is not configured")]
    Disabled,
    #[error("notification request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("notification rejected: {0}")]
    Rejected(String),
}

/// Errors raised while reading settings from the environment.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("{var} must be a whole number, got {raw:?}")]
    InvalidNumber { var: &'static str, raw: String },
    #[error(transparent)]
    Engine(#[from] EngineSettingsError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
