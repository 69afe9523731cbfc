use chrono::{DateTime, Utc};

use quiz_core::model::{Quiz, QuizCode, QuizId, QuizResult, StudentIdentity};

/// Per-quiz release state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    Open,
    Released,
}

impl QuizState {
    #[must_use]
    pub fn from_flag(released: bool) -> Self {
        if released {
            QuizState::Released
        } else {
            QuizState::Open
        }
    }
}

/// One submission as the instructor sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub student: StudentIdentity,
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    pub violations: u32,
    pub submitted_at: DateTime<Utc>,
    pub auto_submitted: bool,
}

impl From<&QuizResult> for ResultRow {
    fn from(result: &QuizResult) -> Self {
        let score = result.score();
        Self {
            student: result.student().clone(),
            score: score.earned,
            total: score.total,
            percentage: score.percentage(),
            violations: result.violations(),
            submitted_at: result.timestamp(),
            auto_submitted: result.auto_submitted(),
        }
    }
}

/// Instructor dashboard entry for one quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOverview {
    pub quiz_id: QuizId,
    pub code: QuizCode,
    pub title: String,
    pub state: QuizState,
    pub rows: Vec<ResultRow>,
}

impl QuizOverview {
    #[must_use]
    pub fn new(quiz: &Quiz, state: QuizState, results: &[QuizResult]) -> Self {
        Self {
            quiz_id: quiz.id().clone(),
            code: quiz.code().clone(),
            title: quiz.title().to_string(),
            state,
            rows: results.iter().map(ResultRow::from).collect(),
        }
    }

    #[must_use]
    pub fn submissions(&self) -> usize {
        self.rows.len()
    }
}

/// Released score as shown to its student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasedScore {
    pub quiz_title: String,
    pub score: u32,
    pub total: u32,
    pub percentage: u32,
    pub violations: u32,
    pub submitted_at: DateTime<Utc>,
}

/// What a student may see about their own attempt at a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentResultView {
    NotAttempted { state: QuizState },
    /// Submitted; scores are hidden until release.
    Pending { submitted_at: DateTime<Utc> },
    Released(ReleasedScore),
}

impl StudentResultView {
    #[must_use]
    pub fn new(result: Option<&QuizResult>, state: QuizState) -> Self {
        match (result, state) {
            (None, state) => StudentResultView::NotAttempted { state },
            (Some(result), QuizState::Open) => StudentResultView::Pending {
                submitted_at: result.timestamp(),
            },
            (Some(result), QuizState::Released) => {
                let row = ResultRow::from(result);
                StudentResultView::Released(ReleasedScore {
                    quiz_title: result.quiz_title().to_string(),
                    score: row.score,
                    total: row.total,
                    percentage: row.percentage,
                    violations: row.violations,
                    submitted_at: row.submitted_at,
                })
            }
        }
    }
}
