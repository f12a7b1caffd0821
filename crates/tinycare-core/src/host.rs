//! Host editor boundary.
//!
//! The editor owns the workspace and the notification tray; tinycare only
//! sees two lifecycle events and a way to show messages.

use serde::{Deserialize, Serialize};

/// Lifecycle events delivered by the host editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// A document was opened. Carries the open count after the open.
    DocumentOpened { open_count: usize },
    /// The active document changed. `has_active` is false when focus left
    /// every editor.
    ActiveDocumentChanged { open_count: usize, has_active: bool },
}

impl HostEvent {
    pub fn open_count(&self) -> usize {
        match *self {
            HostEvent::DocumentOpened { open_count }
            | HostEvent::ActiveDocumentChanged { open_count, .. } => open_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
}

/// A message shown in the host's notification area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub detail: String,
}

/// Host notification API.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn info(&self, title: &str, detail: &str) {
        self.notify(Notification {
            level: NotificationLevel::Info,
            title: title.to_string(),
            detail: detail.to_string(),
        });
    }

    fn warning(&self, title: &str, detail: &str) {
        self.notify(Notification {
            level: NotificationLevel::Warning,
            title: title.to_string(),
            detail: detail.to_string(),
        });
    }
}
