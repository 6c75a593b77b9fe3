//! Handlers for the `/password-reset` resource.
//!
//! A customer requests a link by email, the frontend verifies the token when
//! the link is opened, and the reset redeems it. Tokens are stored only as
//! SHA-256 digests and expire after an hour.

use axum::extract::State;
use axum::Json;
use chrono::{Duration, Utc};
use nextmove_core::error::CoreError;
use nextmove_core::roles::ROLE_CUSTOMER;
use nextmove_core::tokens::{generate_reset_token, hash_token, RESET_TOKEN_TTL_SECS};
use nextmove_core::validation::normalize_email;
use nextmove_db::repositories::{PasswordResetRepo, UserRepo};
use nextmove_events::PortalEvent;
use serde::{Deserialize, Serialize};

use crate::auth::password::hash_new_password;
use crate::error::{AppError, AppResult};
use crate::handlers::recipient_for;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

const INVALID_TOKEN: &str = "Invalid or expired token";

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

/// POST /api/v1/password-reset/request
///
/// Only approved customers can reset their password this way. Earlier
/// tokens of the user are invalidated.
pub async fn request_reset(
    State(state): State<AppState>,
    Json(input): Json<ResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    let email = normalize_email(&input.email)?;

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "This email address is not registered".into(),
            ))
        })?;

    if user.role != ROLE_CUSTOMER {
        return Err(AppError::Core(CoreError::Validation(
            "Password reset is only available for customers".into(),
        )));
    }
    if !user.is_approved {
        return Err(AppError::Core(CoreError::Validation(
            "Account has not been approved yet".into(),
        )));
    }

    let token = generate_reset_token();
    let expires_at = Utc::now() + Duration::seconds(RESET_TOKEN_TTL_SECS);
    PasswordResetRepo::replace_for_user(&state.pool, user.id, &token.hash, expires_at).await?;

    let reset_link = format!("{}/reset-password/{}", state.config.client_url, token.plaintext);
    state.event_bus.publish(PortalEvent::password_reset_requested(
        recipient_for(&user),
        reset_link,
    ));

    tracing::info!(user_id = user.id, "Password reset requested");

    Ok(Json(MessageResponse::new(
        "An email with instructions to reset your password has been sent",
    )))
}

/// POST /api/v1/password-reset/verify
pub async fn verify_token(
    State(state): State<AppState>,
    Json(input): Json<VerifyRequest>,
) -> AppResult<Json<DataResponse<VerifyResponse>>> {
    PasswordResetRepo::find_valid(&state.pool, &hash_token(&input.token))
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Validation(INVALID_TOKEN.into())))?;

    Ok(Json(DataResponse {
        data: VerifyResponse { valid: true },
    }))
}

/// PUT /api/v1/password-reset/reset
///
/// Set the new password and consume the token in one transaction. Existing
/// refresh sessions of the user are revoked.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let password_hash = hash_new_password(&input.new_password)?;

    let user_id = PasswordResetRepo::redeem(&state.pool, &hash_token(&input.token), &password_hash)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Validation(INVALID_TOKEN.into())))?;

    tracing::info!(user_id, "Password reset completed");

    Ok(Json(MessageResponse::new("Password has been reset")))
}
