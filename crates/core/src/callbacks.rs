//! Callback request rules.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Minimum time between two callback requests from the same customer.
pub const CALLBACK_COOLDOWN_SECS: i64 = 60 * 60;

/// Message returned when a customer asks again inside the cooldown.
pub const CALLBACK_RATE_LIMIT_MESSAGE: &str = "Sie haben bereits einen Rückruf angefordert. \
     Bitte warten Sie eine Stunde, bevor Sie einen weiteren Rückruf anfordern.";

const MIN_PHONE_DIGITS: usize = 6;
const MAX_PHONE_DIGITS: usize = 15;

/// Lifecycle of a callback request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallbackStatus {
    Pending,
    Completed,
}

impl CallbackStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(CoreError::Validation(format!(
                "Invalid callback status '{other}'. Must be one of: pending, completed"
            ))),
        }
    }
}

/// Start of the window in which an earlier request blocks a new one.
pub fn cooldown_window_start(now: Timestamp) -> Timestamp {
    now - chrono::Duration::seconds(CALLBACK_COOLDOWN_SECS)
}

/// Validate a phone number and return it trimmed.
///
/// Accepts digits with an optional leading `+` and the usual separators
/// (space, `-`, `/`, `(`, `)`).
pub fn normalize_phone(phone: &str) -> Result<String, CoreError> {
    let phone = phone.trim();
    if phone.is_empty() {
        return Err(CoreError::Validation("Telefonnummer ist erforderlich".into()));
    }

    let body = phone.strip_prefix('+').unwrap_or(phone);
    let valid_chars = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '/' | '(' | ')'));
    let digits = body.chars().filter(char::is_ascii_digit).count();

    if !valid_chars || !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(CoreError::Validation(format!(
            "Ungültige Telefonnummer '{phone}'"
        )));
    }
    Ok(phone.to_string())
}
