use thiserror::Error;

use crate::model::{EngineSettingsError, ParseIdError, QuizError, UserError};

/// Any validation failure raised by the domain model.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValidationError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Settings(#[from] EngineSettingsError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
