use std::env;

use quiz_core::model::{EngineSettings, EngineSettingsDraft};

use crate::error::SettingsError;
use crate::notifier::EmailJsConfig;

pub const DEFAULT_DB_URL: &str = "sqlite:quiz.sqlite3?mode=rwc";

/// Everything needed to wire the services, read from the environment.
#[derive(Clone, Debug)]
pub struct QuizSettings {
    pub db_url: String,
    pub engine: EngineSettings,
    pub emailjs: Option<EmailJsConfig>,
}

impl QuizSettings {
    /// Load `.env` (if present) and read `QUIZ_*` variables.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` if a numeric variable does not parse or a
    /// limit is zero.
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from any variable source.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSettings::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let db_url = lookup("QUIZ_DB_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DB_URL.to_string());

        let draft = EngineSettingsDraft {
            max_violations: parse_u32(&lookup, "QUIZ_MAX_VIOLATIONS")?,
            warning_secs: parse_u32(&lookup, "QUIZ_WARNING_SECS")?,
            instructor_email: lookup("QUIZ_INSTRUCTOR_EMAIL"),
            instructor_password: lookup("QUIZ_INSTRUCTOR_PASSWORD"),
            ..EngineSettingsDraft::default()
        };

        Ok(Self {
            db_url,
            engine: draft.validate()?,
            emailjs: EmailJsConfig::from_lookup(&lookup),
        })
    }
}

fn parse_u32(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u32>, SettingsError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| SettingsError::InvalidNumber { var, raw })
}
