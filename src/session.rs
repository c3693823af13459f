//! Session lifecycle notifications for the presentation layer.

use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn,
    Refreshed,
    /// Refresh failed and stored credentials were cleared; the user must sign in again.
    SessionExpired { reason: String },
    /// Refresh failed but the store refused to drop the credentials. The session is
    /// in an unknown state; `reason` is the store error.
    ClearFailed { reason: String },
    /// Backend did not confirm logout. Local credentials are cleared anyway.
    LogoutWarning { message: String },
    LoggedOut,
}

/// Fan-out of [`SessionEvent`]s. Emitting with no subscribers is not an error.
#[derive(Clone)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}
