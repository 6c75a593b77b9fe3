//! HTTP error mapping.
//!
//! Every handler returns [`AppResult`]. Failures render as
//! `{"error": <message>, "code": <CODE>}` with a matching status, and internal
//! details are logged but never sent to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nextmove_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `nextmove_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx. Constraint violations with a known
    /// prefix become client errors; see [`classify_violation`].
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A malformed request the domain layer never saw.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A failure in hashing, signing, or serialization. The message is
    /// logged, not returned.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// Status, machine-readable code, and client-facing message.
type ErrorParts = (StatusCode, &'static str, String);

/// Messages for unique constraints whose generic text would confuse a
/// customer. These match what the handlers return from their own pre-checks,
/// so a request that loses a race sees the same error.
const UNIQUE_MESSAGES: &[(&str, &str)] = &[
    ("uq_users_email", "Email is already registered"),
    ("uq_customer_checklists_user_id", "Checklist was already submitted"),
    ("uq_referrals_active_referrer", "Referral link already exists"),
];

const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
const PG_CHECK_VIOLATION: &str = "23514";

impl AppError {
    fn parts(&self) -> ErrorParts {
        match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = json!({
            "error": message,
            "code": code,
        });
        (status, axum::Json(body)).into_response()
    }
}

fn core_parts(err: &CoreError) -> ErrorParts {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::RateLimited(msg) => {
            (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", msg.clone())
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

fn internal() -> ErrorParts {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Named constraint violations map to client errors via [`classify_violation`].
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> ErrorParts {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            if let Some(parts) =
                classify_violation(db_err.code().as_deref(), db_err.constraint())
            {
                tracing::debug!(error = %db_err, "Constraint violation");
                return parts;
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}

/// Map a PostgreSQL constraint violation to a client error.
///
/// Only constraints named by the schema conventions are mapped:
/// - `uq_*` unique violations become 409 `CONFLICT`.
/// - `fk_*` or `*_fkey` foreign key violations become 404 `NOT_FOUND`.
/// - `ck_*` check violations become 400 `VALIDATION_ERROR`.
///
/// Returns `None` for anything else, which the caller treats as internal.
fn classify_violation(sqlstate: Option<&str>, constraint: Option<&str>) -> Option<ErrorParts> {
    let constraint = constraint?;
    match sqlstate? {
        PG_UNIQUE_VIOLATION if constraint.starts_with("uq_") => {
            let message = UNIQUE_MESSAGES
                .iter()
                .find(|(name, _)| *name == constraint)
                .map(|(_, msg)| msg.to_string())
                .unwrap_or_else(|| {
                    format!("Duplicate value violates unique constraint: {constraint}")
                });
            Some((StatusCode::CONFLICT, "CONFLICT", message))
        }
        PG_FOREIGN_KEY_VIOLATION
            if constraint.starts_with("fk_") || constraint.ends_with("_fkey") =>
        {
            Some((
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                "Referenced record not found".to_string(),
            ))
        }
        PG_CHECK_VIOLATION if constraint.starts_with("ck_") => Some((
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            format!("Value violates check constraint: {constraint}"),
        )),
        _ => None,
    }
}
