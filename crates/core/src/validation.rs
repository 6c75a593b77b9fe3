//! Input validation for account fields.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum password length on register, change, and reset.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Upper bound on password length, keeps argon2 input bounded.
pub const MAX_PASSWORD_LEN: usize = 128;

/// Maximum length of names (first, last, company).
pub const MAX_NAME_LEN: usize = 100;

/// Trim, lowercase, and validate an email address.
pub fn normalize_email(email: &str) -> Result<String, CoreError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(CoreError::Validation("Email is required".into()));
    }
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "Invalid email address '{email}'"
        )));
    }
    Ok(email)
}

/// Check password length bounds.
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "Password must not exceed {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Trim a required name field and check its length.
pub fn normalize_name(field: &str, value: &str) -> Result<String, CoreError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must not exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(value.to_string())
}
