//! Notifications
//!
//! Single canonical notification interface with named severity variants.
//! Feature services publish here after catching an error (or finishing a
//! mutation worth announcing); subscribers (the UI layer) receive
//! notifications over a tokio broadcast channel.
//!
//! The display duration is persisted in local state so the user's preferred
//! toast duration survives restarts.

use crate::store::{LocalStateError, LocalStateStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error};

/// Local state key holding the preferred display duration in milliseconds.
pub const TOAST_DURATION_KEY: &str = "toast_duration_ms";

/// Display duration used when the user never changed it.
pub const DEFAULT_TOAST_DURATION_MS: u64 = 5_000;

/// Backend message marker for requests made before a session exists.
///
/// Errors carrying this text mean "not logged in yet", not a real failure:
/// they are logged but never shown to the user.
pub const SESSION_MISSING_MARKER: &str = "Auth session missing";

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(name)
    }
}

/// A transient user-facing notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,

    /// How long the UI should display this, in milliseconds
    pub duration_ms: u64,

    pub created_at: DateTime<Utc>,
}

/// Publishes notifications to any number of subscribers.
///
/// Dropping every receiver is fine: publishing into a channel with no
/// subscribers is a no-op, so headless flows (scripts, tests) can run the
/// same services without wiring a UI.
pub struct NotificationCenter {
    sender: broadcast::Sender<Notification>,
    local_state: Arc<LocalStateStore>,
}

impl NotificationCenter {
    /// Create a center backed by the given local state store.
    pub fn new(local_state: Arc<LocalStateStore>) -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            sender,
            local_state,
        }
    }

    /// Subscribe to notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Current display duration, from local state or the default.
    pub fn display_duration_ms(&self) -> u64 {
        self.local_state
            .get(TOAST_DURATION_KEY)
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_TOAST_DURATION_MS)
    }

    /// Persist a new display duration.
    pub fn set_display_duration_ms(&self, ms: u64) -> Result<(), LocalStateError> {
        self.local_state.set(TOAST_DURATION_KEY, json!(ms))
    }

    /// Publish a notification.
    pub fn notify(&self, severity: Severity, title: impl Into<String>, message: impl Into<String>) {
        let notification = Notification {
            severity,
            title: title.into(),
            message: message.into(),
            duration_ms: self.display_duration_ms(),
            created_at: Utc::now(),
        };
        debug!(
            severity = %notification.severity,
            title = %notification.title,
            "notification published"
        );
        // No receivers is not an error.
        let _ = self.sender.send(notification);
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Severity::Info, title, message);
    }

    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Severity::Success, title, message);
    }

    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Severity::Warning, title, message);
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        self.notify(Severity::Error, title, message);
    }

    /// Report a remote-call failure.
    ///
    /// Always logged. Shown to the user unless the backend message matches
    /// [`SESSION_MISSING_MARKER`], which only means no session exists yet.
    pub fn report_remote_error(&self, context: &str, err: &dyn fmt::Display) {
        let message = err.to_string();
        error!("{context}: {message}");
        if message.contains(SESSION_MISSING_MARKER) {
            return;
        }
        self.error(context.to_string(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn center() -> (NotificationCenter, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let local_state = Arc::new(LocalStateStore::open(dir.path().join("state.json")));
        (NotificationCenter::new(local_state), dir)
    }

    #[tokio::test]
    async fn test_subscribers_receive_notifications() {
        let (center, _dir) = center();
        let mut receiver = center.subscribe();

        center.success("Saved", "Category created");

        let notification = receiver.recv().await.unwrap();
        assert_eq!(notification.severity, Severity::Success);
        assert_eq!(notification.title, "Saved");
        assert_eq!(notification.duration_ms, DEFAULT_TOAST_DURATION_MS);
    }

    #[tokio::test]
    async fn test_display_duration_persists() {
        let (center, _dir) = center();
        center.set_display_duration_ms(2_000).unwrap();
        assert_eq!(center.display_duration_ms(), 2_000);

        let mut receiver = center.subscribe();
        center.info("Note", "duration follows setting");
        assert_eq!(receiver.recv().await.unwrap().duration_ms, 2_000);
    }

    #[tokio::test]
    async fn test_session_missing_errors_are_suppressed() {
        let (center, _dir) = center();
        let mut receiver = center.subscribe();

        center.report_remote_error("Loading categories", &"Auth session missing!");
        center.report_remote_error("Loading categories", &"backend exploded");

        // Only the real error arrives.
        let notification = receiver.recv().await.unwrap();
        assert_eq!(notification.message, "backend exploded");
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_notify_without_subscribers_is_a_noop() {
        let (center, _dir) = center();
        center.warning("Nobody", "listening");
    }

    #[test]
    fn test_notification_wire_format() {
        let notification = Notification {
            severity: Severity::Warning,
            title: "Reorder".to_string(),
            message: "1 of 5 updates failed".to_string(),
            duration_ms: 5_000,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["durationMs"], 5_000);
    }
}
