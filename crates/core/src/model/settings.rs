use thiserror::Error;

use crate::model::ids::QUIZ_CODE_LEN;
use crate::model::question::DEFAULT_ESSAY_POINTS;
use crate::model::quiz::DEFAULT_DURATION_SECS;

pub const DEFAULT_MAX_VIOLATIONS: u32 = 3;
pub const DEFAULT_WARNING_SECS: u32 = 3;

/// Tunables for attempts and the instructor gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineSettings {
    max_violations: u32,
    warning_secs: u32,
    default_duration_secs: u32,
    default_essay_points: u32,
    instructor_email: String,
    instructor_password: String,
}

#[derive(Clone, Debug, Default)]
pub struct EngineSettingsDraft {
    pub max_violations: Option<u32>,
    pub warning_secs: Option<u32>,
    pub default_duration_secs: Option<u32>,
    pub default_essay_points: Option<u32>,
    pub instructor_email: Option<String>,
    pub instructor_password: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineSettingsError {
    #[error("violation limit must be > 0")]
    InvalidMaxViolations,
    #[error("warning duration must be > 0")]
    InvalidWarningSecs,
    #[error("default duration must be > 0")]
    InvalidDefaultDuration,
    #[error("default essay points must be > 0")]
    InvalidEssayPoints,
}

impl EngineSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill in defaults and validate.
    ///
    /// # Errors
    ///
    /// Returns `EngineSettingsError` if any numeric setting is zero.
    pub fn validate(self) -> Result<EngineSettings, EngineSettingsError> {
        let defaults = EngineSettings::default();
        let max_violations = self.max_violations.unwrap_or(defaults.max_violations);
        let warning_secs = self.warning_secs.unwrap_or(defaults.warning_secs);
        let default_duration_secs = self
            .default_duration_secs
            .unwrap_or(defaults.default_duration_secs);
        let default_essay_points = self
            .default_essay_points
            .unwrap_or(defaults.default_essay_points);

        if max_violations == 0 {
            return Err(EngineSettingsError::InvalidMaxViolations);
        }
        if warning_secs == 0 {
            return Err(EngineSettingsError::InvalidWarningSecs);
        }
        if default_duration_secs == 0 {
            return Err(EngineSettingsError::InvalidDefaultDuration);
        }
        if default_essay_points == 0 {
            return Err(EngineSettingsError::InvalidEssayPoints);
        }

        Ok(EngineSettings {
            max_violations,
            warning_secs,
            default_duration_secs,
            default_essay_points,
            instructor_email: normalize_optional(self.instructor_email)
                .unwrap_or(defaults.instructor_email),
            instructor_password: normalize_optional(self.instructor_password)
                .unwrap_or(defaults.instructor_password),
        })
    }
}

impl EngineSettings {
    /// Violations at which an attempt is force-submitted.
    #[must_use]
    pub fn max_violations(&self) -> u32 {
        self.max_violations
    }

    /// How long a proctoring warning stays visible.
    #[must_use]
    pub fn warning_secs(&self) -> u32 {
        self.warning_secs
    }

    #[must_use]
    pub fn default_duration_secs(&self) -> u32 {
        self.default_duration_secs
    }

    #[must_use]
    pub fn default_essay_points(&self) -> u32 {
        self.default_essay_points
    }

    #[must_use]
    pub fn code_len(&self) -> usize {
        QUIZ_CODE_LEN
    }

    /// Plain string comparison against the configured instructor pair.
    ///
    /// This is a convenience gate, not authentication.
    #[must_use]
    pub fn instructor_credentials_match(&self, email: &str, password: &str) -> bool {
        email.trim().eq_ignore_ascii_case(&self.instructor_email) && password == self.instructor_password
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_violations: DEFAULT_MAX_VIOLATIONS,
            warning_secs: DEFAULT_WARNING_SECS,
            default_duration_secs: DEFAULT_DURATION_SECS,
            default_essay_points: DEFAULT_ESSAY_POINTS,
            instructor_email: "dhanprof@gmail.com".to_string(),
            instructor_password: "110978123".to_string(),
        }
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
