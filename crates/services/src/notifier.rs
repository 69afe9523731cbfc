use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;

use quiz_core::model::QuizResult;

use crate::error::NotificationError;

const EMAILJS_SEND_URL: &str = "https://api.emailjs.com/api/v1.0/email/send";

/// Everything a score email needs for one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreNotification {
    pub recipient: String,
    pub student_name: String,
    pub quiz_title: String,
    pub score: u32,
    pub total: u32,
    pub violations: u32,
    pub timestamp: DateTime<Utc>,
    pub instructor: String,
}

impl ScoreNotification {
    #[must_use]
    pub fn for_result(result: &QuizResult, instructor: &str) -> Self {
        let score = result.score();
        Self {
            recipient: result.student().email.clone(),
            student_name: result.student().name.clone(),
            quiz_title: result.quiz_title().to_string(),
            score: score.earned,
            total: score.total,
            violations: result.violations(),
            timestamp: result.timestamp(),
            instructor: instructor.to_string(),
        }
    }

    #[must_use]
    pub fn percentage(&self) -> u32 {
        quiz_core::model::Score::new(self.score, self.total).percentage()
    }
}

/// Best-effort external delivery of released scores.
///
/// Implementations do not retry; the caller aggregates failures.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError` when delivery to this recipient failed.
    async fn notify(&self, notification: &ScoreNotification) -> Result<(), NotificationError>;
}

//
// ─── EMAILJS ───────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

impl EmailJsConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(&|name: &str| env::var(name).ok())
    }

    /// Returns `None` unless all three ids are present and non-blank.
    #[must_use]
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Option<Self> {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Some(Self {
            service_id: read("QUIZ_EMAILJS_SERVICE_ID")?,
            template_id: read("QUIZ_EMAILJS_TEMPLATE_ID")?,
            public_key: read("QUIZ_EMAILJS_PUBLIC_KEY")?,
        })
    }
}

/// Sends score emails through the EmailJS REST API.
#[derive(Clone)]
pub struct EmailJsNotifier {
    client: Client,
    config: Option<EmailJsConfig>,
    endpoint: String,
}

impl EmailJsNotifier {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(EmailJsConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<EmailJsConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
            endpoint: EMAILJS_SEND_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl Notifier for EmailJsNotifier {
    async fn notify(&self, notification: &ScoreNotification) -> Result<(), NotificationError> {
        let config = self.config.as_ref().ok_or(NotificationError::Disabled)?;
        let payload = EmailJsRequest::new(config, notification);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotificationError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct EmailJsRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: TemplateParams<'a>,
}

#[derive(Debug, Serialize)]
struct TemplateParams<'a> {
    to_email: &'a str,
    to_name: &'a str,
    quiz_title: &'a str,
    score: u32,
    total: u32,
    percentage: u32,
    violations: u32,
    submitted_at: String,
    from_name: &'a str,
}

impl<'a> EmailJsRequest<'a> {
    fn new(config: &'a EmailJsConfig, n: &'a ScoreNotification) -> Self {
        Self {
            service_id: &config.service_id,
            template_id: &config.template_id,
            user_id: &config.public_key,
            template_params: TemplateParams {
                to_email: &n.recipient,
                to_name: &n.student_name,
                quiz_title: &n.quiz_title,
                score: n.score,
                total: n.total,
                percentage: n.percentage(),
                violations: n.violations,
                submitted_at: n.timestamp.to_rfc3339(),
                from_name: &n.instructor,
            },
        }
    }
}

//
// ─── IN-PROCESS ────────────────────────────────────────────────────────────────
//

/// Records notifications instead of sending them. Recipients listed in
/// `failing` are rejected.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<ScoreNotification>>>,
    failing: Vec<String>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing_for(mut self, recipient: impl Into<String>) -> Self {
        self.failing.push(recipient.into());
        self
    }

    /// Notifications delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<ScoreNotification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &ScoreNotification) -> Result<(), NotificationError> {
        if self
            .failing
            .iter()
            .any(|r| r.eq_ignore_ascii_case(&notification.recipient))
        {
            return Err(NotificationError::Rejected(notification.recipient.clone()));
        }
        self.sent
            .lock()
            .map_err(|e| NotificationError::Rejected(e.to_string()))?
            .push(notification.clone());
        Ok(())
    }
}
