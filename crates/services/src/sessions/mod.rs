mod attempt;
mod driver;
mod engine;
mod progress;

// Public API of the session subsystem.
pub use crate::error::{AnswerError, ClosedReason, SessionError};
pub use attempt::{
    Attempt, AttemptStatus, ProctorWarning, SubmitReason, TickOutcome, ViolationOutcome,
};
pub use driver::{AttemptDriver, AttemptEvent, DriveOutcome, TICK_INTERVAL};
pub use engine::{SessionEngine, SubmitOutcome};
pub use progress::AttemptProgress;
