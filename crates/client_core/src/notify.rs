use std::time::Duration;

use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastOptions {
    pub severity: Severity,
    pub duration: Duration,
}

impl ToastOptions {
    pub fn success(duration: Duration) -> Self {
        Self {
            severity: Severity::Success,
            duration,
        }
    }

    pub fn error(duration: Duration) -> Self {
        Self {
            severity: Severity::Error,
            duration,
        }
    }

    pub fn info(duration: Duration) -> Self {
        Self {
            severity: Severity::Info,
            duration,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NotificationPermission {
    Granted,
    Denied,
    #[default]
    Default,
}

/// Implementations swallow their own delivery failures.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, options: ToastOptions);
    fn show_notification(&self, title: &str, body: &str);
    fn permission(&self) -> NotificationPermission {
        NotificationPermission::Default
    }
}

pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, options: ToastOptions) {
        info!(
            severity = ?options.severity,
            duration_ms = options.duration.as_millis() as u64,
            "toast: {message}"
        );
    }

    fn show_notification(&self, title: &str, body: &str) {
        info!(title, "notification: {body}");
    }
}

pub fn show_if_permitted(notifier: &dyn Notifier, title: &str, body: &str) -> bool {
    match notifier.permission() {
        NotificationPermission::Granted => {
            notifier.show_notification(title, body);
            true
        }
        permission => {
            debug!(?permission, title, "notification: skipped without permission");
            false
        }
    }
}

pub fn announce_protection_active(notifier: &dyn Notifier) -> bool {
    show_if_permitted(
        notifier,
        "Sahayak Active",
        "Sahayak is active - Protecting you from scams",
    )
}

pub fn remind_protection(notifier: &dyn Notifier) -> bool {
    show_if_permitted(
        notifier,
        "Sahayak is Watching",
        "Sahayak is watching over you. Stay safe from scams!",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingNotifier;

    #[test]
    fn os_notification_requires_granted_permission() {
        let denied = RecordingNotifier::with_permission(NotificationPermission::Denied);
        assert!(!announce_protection_active(&denied));
        assert!(denied.system_notifications().is_empty());

        let undecided = RecordingNotifier::default();
        assert!(!remind_protection(&undecided));
        assert!(undecided.system_notifications().is_empty());
    }

    #[test]
    fn granted_permission_shows_protection_notice() {
        let granted = RecordingNotifier::with_permission(NotificationPermission::Granted);
        assert!(announce_protection_active(&granted));
        assert_eq!(
            granted.system_notifications(),
            vec![(
                "Sahayak Active".to_string(),
                "Sahayak is active - Protecting you from scams".to_string()
            )]
        );
    }
}
