//! Notification inbox: loading, reconciliation, optimistic mutations and
//! the one-shot retry policy.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use nexo_api::{CrmError, Notification, Result};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::commands::{MarkAllRead, MarkRead};
use crate::config::DeskConfig;
use crate::gateway::CrmGateway;
use crate::toast::ToastCenter;

/// Failure class recorded in the load state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    AccessDenied,
    Other,
}

impl FailureKind {
    pub fn of(err: &CrmError) -> Self {
        if err.is_network_class() {
            FailureKind::Network
        } else if err.is_access_denied() {
            FailureKind::AccessDenied
        } else {
            FailureKind::Other
        }
    }
}

/// List loading state: `Idle → Loading → {Loaded, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed(FailureKind),
}

/// Snapshot of the inbox as a renderer sees it.
#[derive(Debug, Clone)]
pub struct Inbox {
    pub notifications: Vec<Notification>,
    pub unread_count: u32,
    pub seen_toast_ids: HashSet<u64>,
    pub connection_ok: bool,
    pub phase: LoadPhase,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for Inbox {
    fn default() -> Self {
        Self {
            notifications: Vec::new(),
            unread_count: 0,
            seen_toast_ids: HashSet::new(),
            connection_ok: true,
            phase: LoadPhase::Idle,
            last_updated: None,
        }
    }
}

/// Session-scoped notification state and the operations that mutate it.
///
/// Cloning shares the session: all clones see the same inbox, toast stack
/// and liveness flag.
pub struct NotificationCenter<G> {
    gateway: Arc<G>,
    state: Arc<Mutex<Inbox>>,
    toasts: ToastCenter,
    closed: Arc<AtomicBool>,
    retry_pending: Arc<AtomicBool>,
    cancel: CancellationToken,
    retry_delay: Duration,
}

impl<G> Clone for NotificationCenter<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            state: Arc::clone(&self.state),
            toasts: self.toasts.clone(),
            closed: Arc::clone(&self.closed),
            retry_pending: Arc::clone(&self.retry_pending),
            cancel: self.cancel.clone(),
            retry_delay: self.retry_delay,
        }
    }
}

impl<G: CrmGateway + 'static> NotificationCenter<G> {
    pub fn new(gateway: Arc<G>, config: &DeskConfig) -> Self {
        Self {
            gateway,
            state: Arc::new(Mutex::new(Inbox::default())),
            toasts: ToastCenter::new(
                config.toast_critical_duration(),
                config.toast_default_duration(),
            ),
            closed: Arc::new(AtomicBool::new(false)),
            retry_pending: Arc::new(AtomicBool::new(false)),
            cancel: CancellationToken::new(),
            retry_delay: config.retry_delay(),
        }
    }

    pub fn snapshot(&self) -> Inbox {
        self.state.lock().unwrap().clone()
    }

    pub fn toasts(&self) -> &ToastCenter {
        &self.toasts
    }

    /// Marks the session dead: pending retries die and in-flight responses
    /// are dropped without touching state.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.cancel.cancel();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Startup sequence: connectivity probe first, then an unconditional
    /// foreground load. The probe result never gates the load.
    pub async fn bootstrap(&self) {
        let reachable = self.gateway.test_connection().await;
        if self.is_closed() {
            return;
        }
        self.state.lock().unwrap().connection_ok = reachable;
        let _ = self.load_all(false).await;
    }

    /// Fetches the full list and the server-side unread total.
    ///
    /// On success the list is replaced wholesale and the counter is taken
    /// from the server, never recomputed locally. On failure a silent call
    /// leaves the last-known-good state in place while a foreground call
    /// clears it; only network-class failures schedule the single retry.
    pub async fn load_all(&self, silent: bool) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        if !silent {
            self.state.lock().unwrap().phase = LoadPhase::Loading;
        }

        match self.gateway.fetch_notifications().await {
            Ok(page) => {
                if self.is_closed() {
                    return Ok(());
                }
                let fresh = {
                    let mut state = self.state.lock().unwrap();
                    let fresh = toast_candidates(&state, &page.items);
                    for notification in &fresh {
                        state.seen_toast_ids.insert(notification.id);
                    }
                    state.notifications = page.items;
                    state.unread_count = page.total_unread;
                    state.connection_ok = true;
                    state.phase = LoadPhase::Loaded;
                    state.last_updated = Some(Utc::now());
                    fresh
                };
                for notification in &fresh {
                    self.toasts.push(notification);
                }
                Ok(())
            }
            Err(err) => {
                if self.is_closed() {
                    return Err(err);
                }
                let kind = FailureKind::of(&err);
                {
                    let mut state = self.state.lock().unwrap();
                    state.connection_ok = false;
                    if !silent {
                        state.notifications.clear();
                        state.unread_count = 0;
                        state.phase = LoadPhase::Failed(kind);
                    }
                }
                warn!("Notification load failed");
                debug!("Notification load details: {}", err);
                if err.is_network_class() {
                    self.schedule_retry(silent);
                }
                Err(err)
            }
        }
    }

    /// Count-endpoint-only refresh used by the polling cadence. Touches the
    /// counter and the connection flag, nothing else: no list replacement,
    /// no toasts, no retry.
    pub async fn refresh_count_only(&self) {
        if self.is_closed() {
            return;
        }
        match self.gateway.fetch_unread_count().await {
            Ok(count) => {
                if self.is_closed() {
                    return;
                }
                let mut state = self.state.lock().unwrap();
                state.unread_count = count;
                state.connection_ok = true;
            }
            Err(err) => {
                if self.is_closed() {
                    return;
                }
                self.state.lock().unwrap().connection_ok = false;
                debug!("Unread count refresh failed: {}", err);
            }
        }
    }

    /// Optimistically marks one notification read, then settles the command
    /// against the server answer: commit on success, exact rollback on
    /// rejection.
    pub async fn mark_read(&self, id: u64) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        let mut command = MarkRead::new(id, Utc::now());
        {
            let mut guard = self.state.lock().unwrap();
            let inbox = &mut *guard;
            command.apply(&mut inbox.notifications, &mut inbox.unread_count);
        }

        match self.gateway.mark_notification_read(id).await {
            Ok(()) => {
                command.commit();
                Ok(())
            }
            Err(err) => {
                if !self.is_closed() {
                    let mut guard = self.state.lock().unwrap();
                    let inbox = &mut *guard;
                    command.rollback(&mut inbox.notifications, &mut inbox.unread_count);
                }
                warn!("Mark-read failed for notification {}", id);
                Err(err)
            }
        }
    }

    /// Optimistically zeroes the whole inbox. A rejected bulk call is not
    /// selectively revertible, so the fallback is a full foreground reload
    /// of the authoritative server state.
    pub async fn mark_all_read(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        let command = MarkAllRead::new(Utc::now());
        {
            let mut guard = self.state.lock().unwrap();
            let inbox = &mut *guard;
            command.apply(&mut inbox.notifications, &mut inbox.unread_count);
        }

        match self.gateway.mark_all_notifications_read().await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!("Bulk mark-read failed, reloading authoritative state");
                if !self.is_closed() {
                    let _ = self.load_all(false).await;
                }
                Err(err)
            }
        }
    }

    fn schedule_retry(&self, silent: bool) {
        if self.is_closed() {
            return;
        }
        // At most one pending retry; a second failure while one is armed
        // must not stack another.
        if self
            .retry_pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let center = self.clone();
        let delay = self.retry_delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = center.cancel.cancelled() => {
                    center.retry_pending.store(false, Ordering::SeqCst);
                }
                _ = sleep(delay) => {
                    center.retry_pending.store(false, Ordering::SeqCst);
                    if !center.is_closed() {
                        debug!("Retrying notification load");
                        let _ = center.load_all(silent).await;
                    }
                }
            }
        });
    }
}

/// New-to-this-reload entries that deserve a toast. Empty when the previous
/// list was empty so the first load never storms.
fn toast_candidates(state: &Inbox, incoming: &[Notification]) -> Vec<Notification> {
    if state.notifications.is_empty() {
        return Vec::new();
    }
    let known: HashSet<u64> = state.notifications.iter().map(|n| n.id).collect();
    incoming
        .iter()
        .filter(|n| !known.contains(&n.id))
        .filter(|n| n.priority.is_high() && !n.read && !state.seen_toast_ids.contains(&n.id))
        .cloned()
        .collect()
}
