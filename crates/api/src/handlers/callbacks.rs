//! Handlers for callback requests.
//!
//! A customer may request one callback per hour. The check and the insert
//! run under a lock on the customer's row, so concurrent requests cannot
//! both pass.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use nextmove_core::callbacks::{
    cooldown_window_start, normalize_phone, CallbackStatus, CALLBACK_RATE_LIMIT_MESSAGE,
};
use nextmove_core::error::CoreError;
use nextmove_core::types::DbId;
use nextmove_db::models::callback::{Callback, CallbackWithUser};
use nextmove_db::repositories::CallbackRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireCustomer};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateCallbackRequest {
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCallbackRequest {
    pub status: String,
}

/// POST /api/v1/callbacks
pub async fn request_callback(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Json(input): Json<CreateCallbackRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Callback>>)> {
    let phone = normalize_phone(&input.phone)?;

    let callback = CallbackRepo::create_if_allowed(
        &state.pool,
        auth.user_id,
        &phone,
        cooldown_window_start(Utc::now()),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::RateLimited(
            CALLBACK_RATE_LIMIT_MESSAGE.to_string(),
        ))
    })?;

    tracing::info!(user_id = auth.user_id, callback_id = callback.id, "Callback requested");
    Ok((StatusCode::CREATED, Json(DataResponse { data: callback })))
}

/// GET /api/v1/admin/callbacks
pub async fn list_callbacks(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<CallbackWithUser>>>> {
    let callbacks = CallbackRepo::list_with_users(&state.pool).await?;
    Ok(Json(DataResponse { data: callbacks }))
}

/// PATCH /api/v1/admin/callbacks/{id}
pub async fn update_callback(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCallbackRequest>,
) -> AppResult<Json<DataResponse<Callback>>> {
    let status = CallbackStatus::parse(&input.status)?;

    let callback = CallbackRepo::update_status(&state.pool, id, status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Callback",
            id,
        }))?;

    tracing::info!(
        callback_id = id,
        admin_id = admin.user_id,
        status = status.as_str(),
        "Callback status updated"
    );
    Ok(Json(DataResponse { data: callback }))
}
