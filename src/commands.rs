//! Optimistic mark-read commands with explicit commit and rollback.
//!
//! A command mutates the plain notification list and unread counter before
//! the network call is issued; the caller then either commits (drop) or
//! rolls back to the exact pre-call state.

use chrono::{DateTime, Utc};
use nexo_api::Notification;

/// Marks one notification read ahead of the server acknowledgment.
#[derive(Debug)]
pub struct MarkRead {
    id: u64,
    stamp_at: DateTime<Utc>,
    undo: Option<MarkReadUndo>,
}

#[derive(Debug)]
struct MarkReadUndo {
    prev_read: bool,
    prev_read_at: Option<DateTime<Utc>>,
    decremented: bool,
}

impl MarkRead {
    pub fn new(id: u64, stamp_at: DateTime<Utc>) -> Self {
        Self {
            id,
            stamp_at,
            undo: None,
        }
    }

    /// Applies the optimistic flip. Returns false when the id is not in the
    /// list, in which case nothing changes and rollback is inert.
    ///
    /// An already-read entry is left untouched so the counter is never
    /// decremented twice for the same id.
    pub fn apply(&mut self, notifications: &mut [Notification], unread_count: &mut u32) -> bool {
        let Some(entry) = notifications.iter_mut().find(|n| n.id == self.id) else {
            return false;
        };

        let was_already_read = entry.read;
        let prev_read_at = entry.read_at;
        let mut decremented = false;

        if !was_already_read {
            entry.read = true;
            entry.read_at = Some(self.stamp_at);
            if *unread_count > 0 {
                *unread_count -= 1;
                decremented = true;
            }
        }

        self.undo = Some(MarkReadUndo {
            prev_read: was_already_read,
            prev_read_at,
            decremented,
        });
        true
    }

    /// Keeps the optimistic state; the server confirmed it.
    pub fn commit(self) {}

    /// Restores the flag, the stamp and the counter to their pre-apply values.
    pub fn rollback(self, notifications: &mut [Notification], unread_count: &mut u32) {
        let Some(undo) = self.undo else {
            return;
        };
        if let Some(entry) = notifications.iter_mut().find(|n| n.id == self.id) {
            entry.read = undo.prev_read;
            entry.read_at = undo.prev_read_at;
        }
        if undo.decremented {
            *unread_count += 1;
        }
    }
}

/// Bulk variant: zeroes the counter and flips every entry at once. There is
/// no rollback; a failed bulk call is answered with a full re-fetch because
/// the server does not report which subset failed.
#[derive(Debug)]
pub struct MarkAllRead {
    stamp_at: DateTime<Utc>,
}

impl MarkAllRead {
    pub fn new(stamp_at: DateTime<Utc>) -> Self {
        Self { stamp_at }
    }

    /// Returns how many entries were actually flipped.
    pub fn apply(&self, notifications: &mut [Notification], unread_count: &mut u32) -> u32 {
        let mut flipped = 0;
        for entry in notifications.iter_mut() {
            if !entry.read {
                entry.read = true;
                entry.read_at = Some(self.stamp_at);
                flipped += 1;
            }
        }
        *unread_count = 0;
        flipped
    }
}
