use futures::future::join_all;

use crate::notifier::{Notifier, ScoreNotification};

/// One recipient whose notification could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub recipient: String,
    pub reason: String,
}

/// What the instructor is told after releasing scores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl ReleaseSummary {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    #[must_use]
    pub fn all_delivered(&self) -> bool {
        self.failed == 0
    }
}

/// Send every notification concurrently and wait for all of them.
///
/// A failure is recorded for its recipient only; the other sends carry on.
pub(crate) async fn notify_all(
    notifier: &dyn Notifier,
    notifications: &[ScoreNotification],
) -> ReleaseSummary {
    let outcomes = join_all(notifications.iter().map(|n| notifier.notify(n))).await;

    let mut summary = ReleaseSummary::default();
    for (notification, outcome) in notifications.iter().zip(outcomes) {
        match outcome {
            Ok(()) => summary.succeeded += 1,
            Err(err) => {
                tracing::warn!(
                    recipient = %notification.recipient,
                    error = %err,
                    "score notification failed"
                );
                summary.failed += 1;
                summary.failures.push(DeliveryFailure {
                    recipient: notification.recipient.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    summary
}
