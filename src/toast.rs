//! Short-lived toast stack with one expiry timer per entry.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use nexo_api::{Notification, Priority};
use tokio::time::sleep;

/// One visible toast derived from a notification.
#[derive(Debug, Clone)]
pub struct ToastEntry {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub priority: Priority,
    pub shown_at: DateTime<Utc>,
    pub duration: Duration,
}

/// Holds the active toast stack. Cloning shares the underlying stack.
#[derive(Clone)]
pub struct ToastCenter {
    entries: Arc<Mutex<Vec<ToastEntry>>>,
    critical_duration: Duration,
    default_duration: Duration,
}

impl ToastCenter {
    pub fn new(critical_duration: Duration, default_duration: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Vec::new())),
            critical_duration,
            default_duration,
        }
    }

    pub fn duration_for(&self, priority: Priority) -> Duration {
        if priority == Priority::Critica {
            self.critical_duration
        } else {
            self.default_duration
        }
    }

    /// Shows a toast for the notification and schedules its expiry. Each
    /// entry runs on its own timer; expiry of one never disturbs another.
    pub fn push(&self, notification: &Notification) {
        let duration = self.duration_for(notification.priority);
        let entry = ToastEntry {
            id: notification.id,
            title: notification.title.clone(),
            message: notification.message.clone(),
            priority: notification.priority,
            shown_at: Utc::now(),
            duration,
        };
        self.entries.lock().unwrap().push(entry);

        let center = self.clone();
        let id = notification.id;
        tokio::spawn(async move {
            sleep(duration).await;
            center.dismiss(id);
        });
    }

    /// Removes the toast if it is still shown; dismissing an absent id is a no-op.
    pub fn dismiss(&self, id: u64) {
        self.entries.lock().unwrap().retain(|entry| entry.id != id);
    }

    pub fn active(&self) -> Vec<ToastEntry> {
        self.entries.lock().unwrap().clone()
    }
}
