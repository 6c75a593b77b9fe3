//! NextMove event bus and account notification emails.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PortalEvent`]: account lifecycle events published by the API.
//! - [`email`]: German email templates and the [`Mailer`] transports.
//! - [`EmailNotifier`]: background task turning events into emails.

pub mod bus;
pub mod email;
pub mod notifier;

pub use bus::{EventBus, PortalEvent, Recipient};
pub use email::{EmailConfig, LogMailer, Mailer, RecordingMailer, SmtpMailer};
pub use notifier::EmailNotifier;
