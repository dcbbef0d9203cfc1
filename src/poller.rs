//! Background cadence that keeps the unread counter fresh while the
//! window is visible.

use std::time::Duration;

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::gateway::CrmGateway;
use crate::notifications::NotificationCenter;

/// Periodic count refresh with visibility gating.
///
/// Ticks hit only the unread-count endpoint and are skipped entirely while
/// the window is hidden. A hidden-to-visible transition does not wait for
/// the next tick: it runs one silent full reload immediately.
pub struct Poller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn<G: CrmGateway + 'static>(
        center: NotificationCenter<G>,
        mut visibility: watch::Receiver<bool>,
        interval: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut visible = *visibility.borrow();
            let mut visibility_closed = false;
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    changed = visibility.changed(), if !visibility_closed => {
                        match changed {
                            Ok(()) => {
                                let now_visible = *visibility.borrow_and_update();
                                if now_visible && !visible {
                                    debug!("Window visible again, reloading notifications");
                                    let _ = center.load_all(true).await;
                                }
                                visible = now_visible;
                            }
                            // Sender gone: keep ticking with the last known
                            // visibility.
                            Err(_) => visibility_closed = true,
                        }
                    }
                    _ = ticker.tick() => {
                        if visible {
                            center.refresh_count_only().await;
                        }
                    }
                }
            }
        });
        Self { cancel, handle }
    }

    /// Stops the cadence and waits for the loop to finish. The notification
    /// session itself stays usable.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}
