//! Account emails: templates, configuration, and transports.
//!
//! [`Mailer`] is the seam between the notifier and the outside world.
//! [`SmtpMailer`] sends through `lettre`; [`LogMailer`] only logs, for
//! deployments without `SMTP_HOST`; [`RecordingMailer`] keeps messages in
//! memory for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(#[from] lettre::error::Error),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (implicit TLS).
const DEFAULT_SMTP_PORT: u16 = 465;

/// Port that selects implicit TLS instead of STARTTLS.
const IMPLICIT_TLS_PORT: u16 = 465;

/// Display name on every outgoing email.
pub const SENDER_NAME: &str = "NextMove Solution";

/// SMTP settings.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// Sender address; falls back to `SMTP_USER`.
    pub from_address: String,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, or if no sender address
    /// can be determined.
    ///
    /// | Variable        | Required | Default       |
    /// |-----------------|----------|---------------|
    /// | `SMTP_HOST`     | yes      | --            |
    /// | `SMTP_PORT`     | no       | `465`         |
    /// | `SMTP_FROM`     | no       | `SMTP_USER`   |
    /// | `SMTP_USER`     | no       | --            |
    /// | `SMTP_PASSWORD` | no       | --            |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok().filter(|h| !h.is_empty())?;
        let smtp_user = std::env::var("SMTP_USER").ok();
        let from_address = std::env::var("SMTP_FROM")
            .ok()
            .or_else(|| smtp_user.clone())?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address,
            smtp_user,
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

/// A rendered email ready to hand to a [`Mailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

const SIGN_OFF_TEXT: &str = "Mit freundlichen Grüßen,\nIhr NextMove Solution Team";

fn wrap_html(content: &str) -> String {
    format!(
        "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;\">\
         {content}\
         <div style=\"margin-top: 30px; padding-top: 20px; border-top: 1px solid #eee;\">\
         <p style=\"color: #666;\">Mit freundlichen Grüßen,<br>Ihr NextMove Solution Team</p>\
         </div></div>"
    )
}

fn paragraph(text: &str) -> String {
    format!("<p style=\"color: #666; line-height: 1.6;\">{text}</p>")
}

fn button(href: &str, label: &str) -> String {
    format!(
        "<p style=\"margin: 30px 0;\"><a href=\"{}\" style=\"background-color: #007bff; \
         color: white; padding: 12px 24px; text-decoration: none; border-radius: 4px; \
         display: inline-block;\">{label}</a></p>",
        escape_html(href)
    )
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Welcome email sent right after registration.
pub fn registration_email(first_name: &str) -> RenderedEmail {
    let name = escape_html(first_name);
    let html = wrap_html(&format!(
        "<h2 style=\"color: #333; margin-bottom: 20px;\">Willkommen bei NextMove Solution, {name}!</h2>{}{}",
        paragraph("Vielen Dank für Ihre Registrierung. Ihr Konto wird derzeit von unserem Admin-Team überprüft."),
        paragraph("Sobald Ihr Konto freigegeben wurde, erhalten Sie eine weitere E-Mail von uns."),
    ));
    let text = format!(
        "Willkommen bei NextMove Solution, {first_name}!\n\n\
         Vielen Dank für Ihre Registrierung. Ihr Konto wird derzeit von unserem Admin-Team überprüft.\n\
         Sobald Ihr Konto freigegeben wurde, erhalten Sie eine weitere E-Mail von uns.\n\n{SIGN_OFF_TEXT}"
    );
    RenderedEmail {
        subject: "Willkommen bei NextMove Solution".into(),
        html,
        text,
    }
}

/// Email sent when an admin approves the account.
pub fn account_approved_email(first_name: &str, client_url: &str) -> RenderedEmail {
    let login_url = format!("{}/login", client_url.trim_end_matches('/'));
    let html = wrap_html(&format!(
        "<h2 style=\"color: #333; margin-bottom: 20px;\">Ihr Konto wurde freigegeben!</h2>{}{}{}{}",
        paragraph(&format!("Hallo {},", escape_html(first_name))),
        paragraph("Ihr Konto wurde erfolgreich von unserem Admin-Team überprüft und freigegeben."),
        paragraph("Sie können sich jetzt in Ihrem Konto anmelden und alle Funktionen nutzen."),
        button(&login_url, "Jetzt anmelden"),
    ));
    let text = format!(
        "Hallo {first_name},\n\n\
         Ihr Konto wurde erfolgreich von unserem Admin-Team überprüft und freigegeben.\n\
         Sie können sich jetzt unter {login_url} anmelden und alle Funktionen nutzen.\n\n{SIGN_OFF_TEXT}"
    );
    RenderedEmail {
        subject: "Ihr Konto wurde freigegeben".into(),
        html,
        text,
    }
}

/// Email carrying the one-hour password reset link.
pub fn password_reset_email(first_name: &str, reset_link: &str) -> RenderedEmail {
    let html = wrap_html(&format!(
        "<h2 style=\"color: #333; margin-bottom: 20px;\">Passwort zurücksetzen</h2>{}{}{}{}{}",
        paragraph(&format!("Hallo {},", escape_html(first_name))),
        paragraph("Sie haben angefordert, Ihr Passwort zurückzusetzen. Klicken Sie auf den folgenden Link, um ein neues Passwort zu erstellen:"),
        button(reset_link, "Passwort zurücksetzen"),
        paragraph("Dieser Link ist aus Sicherheitsgründen nur 1 Stunde gültig."),
        paragraph("Falls Sie kein neues Passwort angefordert haben, können Sie diese E-Mail ignorieren."),
    ));
    let text = format!(
        "Hallo {first_name},\n\n\
         Sie haben angefordert, Ihr Passwort zurückzusetzen. Öffnen Sie den folgenden Link, \
         um ein neues Passwort zu erstellen:\n{reset_link}\n\n\
         Dieser Link ist aus Sicherheitsgründen nur 1 Stunde gültig.\n\
         Falls Sie kein neues Passwort angefordert haben, können Sie diese E-Mail ignorieren.\n\n{SIGN_OFF_TEXT}"
    );
    RenderedEmail {
        subject: "Passwort zurücksetzen - NextMove Solution".into(),
        html,
        text,
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Delivers rendered emails.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, email: &RenderedEmail) -> Result<(), EmailError>;
}

/// Sends email over SMTP.
pub struct SmtpMailer {
    from: Mailbox,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the transport. Port 465 uses implicit TLS, anything else
    /// STARTTLS.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let from = Mailbox::new(Some(SENDER_NAME.to_string()), config.from_address.parse()?);

        let mut builder = if config.smtp_port == IMPLICIT_TLS_PORT {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
        }
        .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            from,
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, email: &RenderedEmail) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(email.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))?;

        self.transport.send(message).await?;
        tracing::info!(to, subject = %email.subject, "Email sent");
        Ok(())
    }
}

/// Logs instead of sending. Used when SMTP is not configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, email: &RenderedEmail) -> Result<(), EmailError> {
        tracing::info!(to, subject = %email.subject, "SMTP not configured, email not sent");
        Ok(())
    }
}

/// Keeps every email in memory.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, RenderedEmail)>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(recipient, email)` pairs sent so far.
    pub fn sent(&self) -> Vec<(String, RenderedEmail)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, email: &RenderedEmail) -> Result<(), EmailError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((to.to_string(), email.clone()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
