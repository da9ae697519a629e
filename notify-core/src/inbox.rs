//! Local notification view for notify-sync.
//!
//! The [`Inbox`] is the single source of truth for the notification list
//! and the unread counter. All mutations pass through it; the client
//! only calls in from its own event-handling paths (push ingestion,
//! REST completions), so no locking discipline lives here.
//!
//! The list and the counter are tracked independently: the list holds
//! whatever page is loaded, while the counter is the server's
//! authoritative unread total and may exceed what is loaded locally.

use notify_types::{Notification, NotificationId};

/// Notification list (newest first) plus unread counter.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    items: Vec<Notification>,
    unread: u64,
}

impl Inbox {
    /// Create an empty inbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded notifications, newest first.
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    /// The unread counter.
    pub fn unread(&self) -> u64 {
        self.unread
    }

    /// Whether anything is unread.
    pub fn has_unread(&self) -> bool {
        self.unread > 0
    }

    /// Ingest a pushed notification.
    ///
    /// Prepends (front = newest) and bumps the counter for unread
    /// pushes. A push whose id is already present is a complete no-op,
    /// guarding against duplicate delivery. Returns whether the push
    /// was applied.
    pub fn apply_push(&mut self, notification: Notification) -> bool {
        if self.contains(notification.id) {
            return false;
        }
        if !notification.is_read {
            self.unread = self.unread.saturating_add(1);
        }
        self.items.insert(0, notification);
        true
    }

    /// Replace the list with a REST-fetched page.
    ///
    /// Full replace, not a merge; the counter is fetched independently
    /// and is not touched here.
    pub fn replace(&mut self, items: Vec<Notification>) {
        self.items = items;
    }

    /// Overwrite the counter with the server-reported value.
    pub fn set_unread(&mut self, count: u64) {
        self.unread = count;
    }

    /// Mark every loaded notification read and zero the counter.
    ///
    /// Idempotent; call only after the server acknowledged a clear-all.
    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.is_read = true;
        }
        self.unread = 0;
    }

    /// Mark one notification read and decrement the counter.
    ///
    /// Only applies when the entry is present AND currently unread;
    /// anything else is a safe no-op. The "currently unread" guard is
    /// what makes racing clears on the same id unable to
    /// double-decrement. The counter is floored at zero. Returns
    /// whether a transition happened.
    pub fn mark_read(&mut self, id: NotificationId) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) if !n.is_read => {
                n.is_read = true;
                self.unread = self.unread.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    fn contains(&self, id: NotificationId) -> bool {
        self.items.iter().any(|n| n.id == id)
    }
}
