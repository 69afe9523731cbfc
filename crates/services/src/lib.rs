#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog;
pub mod error;
pub mod grading;
pub mod identity;
pub mod notifier;
pub mod sessions;
pub mod settings;

pub use quiz_core::Clock;

pub use app_services::QuizServices;
pub use catalog::QuizCatalogService;
pub use error::{
    AnswerError, AppServicesError, CatalogError, ClosedReason, GradingError, IdentityError,
    NotificationError, SessionError, SettingsError,
};
pub use grading::{GradingService, QuizState, ReleaseSummary, StudentResultView};
pub use identity::IdentityService;
pub use notifier::{EmailJsConfig, EmailJsNotifier, Notifier, RecordingNotifier, ScoreNotification};
pub use sessions::{
    Attempt, AttemptDriver, AttemptEvent, AttemptProgress, AttemptStatus, DriveOutcome,
    SessionEngine, SubmitOutcome,
};
pub use settings::QuizSettings;
