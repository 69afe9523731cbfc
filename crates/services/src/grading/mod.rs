mod release;
mod service;
mod view;

pub use crate::error::GradingError;
pub use release::{DeliveryFailure, ReleaseSummary};
pub use service::GradingService;
pub use view::{QuizOverview, QuizState, ReleasedScore, ResultRow, StudentResultView};
