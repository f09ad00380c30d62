//! User-visible notifications

use crate::error::ClientError;
use crate::resource::RemoteResource;
use musabaha_core::ApprovalStatus;
use std::fmt;

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational
    Info,
    /// An action completed
    Success,
    /// Something degraded but the action completed
    Warning,
    /// An action failed
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A message for the administrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Short heading
    pub title: String,
    /// Message body
    pub body: String,
}

impl Notification {
    /// Create a notification
    pub fn new(level: NotificationLevel, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Status change applied
    #[must_use]
    pub fn transition_succeeded<R: RemoteResource>(target: ApprovalStatus) -> Self {
        Self::new(NotificationLevel::Success, "Success", R::success_text(target))
    }

    /// Status change applied but the list could not be reloaded
    #[must_use]
    pub fn transition_unrefreshed<R: RemoteResource>(target: ApprovalStatus) -> Self {
        Self::new(
            NotificationLevel::Warning,
            "Success",
            format!(
                "{}. The list could not be reloaded and may be stale.",
                R::success_text(target)
            ),
        )
    }

    /// Status change failed
    #[must_use]
    pub fn transition_failed<R: RemoteResource>(
        target: ApprovalStatus,
        error: &ClientError,
    ) -> Self {
        Self::new(NotificationLevel::Error, "Error", R::failure_text(target, error))
    }

    /// Records that appeared since the previous poll
    #[must_use]
    pub fn new_records<R: RemoteResource>(count: usize) -> Self {
        let noun = if count == 1 {
            R::NAME.to_string()
        } else {
            format!("{}s", R::NAME)
        };
        Self::new(
            NotificationLevel::Info,
            format!("New {} Received!", R::LABEL),
            format!("{count} new {noun} arrived. Check the list for details."),
        )
    }

    /// Any error surfaced at the front end
    #[must_use]
    pub fn from_error(error: &ClientError) -> Self {
        Self::new(NotificationLevel::Error, "Error", error.to_string())
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.title, self.body)
    }
}

/// Delivers notifications to the administrator
pub trait Notifier: Send + Sync {
    /// Show a notification
    fn notify(&self, notification: &Notification);
}

/// Writes notifications to the tracing log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        let Notification { level, title, body } = notification;
        match level {
            NotificationLevel::Info | NotificationLevel::Success => {
                tracing::info!(%level, %title, "{body}");
            }
            NotificationLevel::Warning => tracing::warn!(%title, "{body}"),
            NotificationLevel::Error => tracing::error!(%title, "{body}"),
        }
    }
}
