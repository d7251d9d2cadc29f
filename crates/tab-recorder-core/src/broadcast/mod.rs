//! Relays session state to presentation surfaces.
//!
//! Latest status lives in a `watch` channel so queries never wait on the
//! controller; transitions are also pushed as [`Notification`]s on a
//! `broadcast` channel.

mod notification;

pub use notification::Notification;

use crate::session::SessionStatus;

use tokio::sync::{broadcast, watch};
use tracing::trace;

/// Capacity of the notification channel per subscriber.
const NOTIFICATION_CAPACITY: usize = 100;

/// Publishing half, owned by the controller.
#[derive(Debug)]
pub struct StatusBroadcaster {
    status_tx: watch::Sender<SessionStatus>,
    events_tx: broadcast::Sender<Notification>,
}

impl StatusBroadcaster {
    /// Broadcaster starting from the idle status.
    pub fn new() -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::default());
        let (events_tx, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            status_tx,
            events_tx,
        }
    }

    /// Record a completed transition and push it to all surfaces.
    pub fn publish(&self, status: SessionStatus) {
        trace!(active = status.active, phase = ?status.phase, "Publishing status");
        self.status_tx.send_replace(status.clone());
        // No subscribers is fine; the watch channel still holds the value.
        let _ = self.events_tx.send(Notification::Status(status));
    }

    /// Push a lifecycle notification.
    pub fn notify(&self, notification: Notification) {
        let _ = self.events_tx.send(notification);
    }

    /// Latest published status.
    pub fn status(&self) -> SessionStatus {
        self.status_tx.borrow().clone()
    }

    /// Read-only view that can be handed to other contexts.
    pub fn reader(&self) -> StatusReader {
        StatusReader {
            status_rx: self.status_tx.subscribe(),
            events_tx: self.events_tx.clone(),
        }
    }
}

impl Default for StatusBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable, read-only access to the broadcaster.
#[derive(Debug, Clone)]
pub struct StatusReader {
    status_rx: watch::Receiver<SessionStatus>,
    events_tx: broadcast::Sender<Notification>,
}

impl StatusReader {
    /// Latest published status; never blocks on the controller.
    pub fn status(&self) -> SessionStatus {
        self.status_rx.borrow().clone()
    }

    /// Stream of status values, for surfaces that only render state.
    pub fn watch(&self) -> watch::Receiver<SessionStatus> {
        self.status_rx.clone()
    }

    /// Subscribe to all notifications published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.events_tx.subscribe()
    }
}
