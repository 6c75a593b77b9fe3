//! Background task that turns [`PortalEvent`]s into emails.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::bus::PortalEvent;
use crate::email::{
    account_approved_email, password_reset_email, registration_email, Mailer, RenderedEmail,
};

/// Subscribes to the event bus and emails the affected user.
///
/// Delivery failures are logged and never reach the request that published
/// the event.
pub struct EmailNotifier {
    mailer: Arc<dyn Mailer>,
    client_url: String,
}

impl EmailNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, client_url: impl Into<String>) -> Self {
        Self {
            mailer,
            client_url: client_url.into(),
        }
    }

    /// Render the email for an event.
    pub fn render(&self, event: &PortalEvent) -> RenderedEmail {
        match event {
            PortalEvent::UserRegistered { recipient, .. } => {
                registration_email(&recipient.first_name)
            }
            PortalEvent::UserApproved { recipient, .. } => {
                account_approved_email(&recipient.first_name, &self.client_url)
            }
            PortalEvent::PasswordResetRequested {
                recipient,
                reset_link,
                ..
            } => password_reset_email(&recipient.first_name, reset_link),
        }
    }

    /// Send the email for one event, logging any failure.
    pub async fn handle(&self, event: &PortalEvent) {
        let recipient = event.recipient();
        let email = self.render(event);
        if let Err(e) = self.mailer.send(&recipient.email, &email).await {
            tracing::error!(
                error = %e,
                event_type = event.event_type(),
                user_id = recipient.user_id,
                "Failed to send notification email"
            );
        }
    }

    /// Run until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<PortalEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Email notifier lagged, some emails were not sent");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, email notifier shutting down");
                    break;
                }
            }
        }
    }
}
