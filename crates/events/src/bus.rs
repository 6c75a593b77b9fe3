//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is shared via `Arc<EventBus>` in the API state. Handlers
//! publish after their database write has committed.

use chrono::{DateTime, Utc};
use nextmove_core::types::DbId;
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PortalEvent
// ---------------------------------------------------------------------------

/// Recipient details carried by every account event, so subscribers need no
/// database access.
#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    pub user_id: DbId,
    pub email: String,
    pub first_name: String,
}

/// An account lifecycle event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PortalEvent {
    /// A customer registered and awaits approval.
    UserRegistered {
        recipient: Recipient,
        at: DateTime<Utc>,
    },
    /// An admin approved a customer.
    UserApproved {
        recipient: Recipient,
        at: DateTime<Utc>,
    },
    /// A customer asked for a password reset link.
    PasswordResetRequested {
        recipient: Recipient,
        reset_link: String,
        at: DateTime<Utc>,
    },
}

impl PortalEvent {
    pub fn user_registered(recipient: Recipient) -> Self {
        Self::UserRegistered {
            recipient,
            at: Utc::now(),
        }
    }

    pub fn user_approved(recipient: Recipient) -> Self {
        Self::UserApproved {
            recipient,
            at: Utc::now(),
        }
    }

    pub fn password_reset_requested(recipient: Recipient, reset_link: String) -> Self {
        Self::PasswordResetRequested {
            recipient,
            reset_link,
            at: Utc::now(),
        }
    }

    /// Dot-separated event name used in logs, e.g. `"user.approved"`.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::UserRegistered { .. } => "user.registered",
            Self::UserApproved { .. } => "user.approved",
            Self::PasswordResetRequested { .. } => "password_reset.requested",
        }
    }

    pub fn recipient(&self) -> &Recipient {
        match self {
            Self::UserRegistered { recipient, .. }
            | Self::UserApproved { recipient, .. }
            | Self::PasswordResetRequested { recipient, .. } => recipient,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out event bus.
pub struct EventBus {
    sender: broadcast::Sender<PortalEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest unread events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is dropped.
    pub fn publish(&self, event: PortalEvent) {
        tracing::debug!(event_type = event.event_type(), "Publishing event");
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PortalEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
