//! Handlers for onboarding videos and tutorials.
//!
//! Videos are referenced by URL; hosting is external.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use nextmove_core::error::CoreError;
use nextmove_core::types::DbId;
use nextmove_db::models::tutorial::{CreateTutorial, Tutorial, TutorialWithProgress};
use nextmove_db::models::user_progress::UserProgress;
use nextmove_db::repositories::{TutorialRepo, UserProgressRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/onboarding-videos
pub async fn onboarding_videos(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<Tutorial>>>> {
    let videos = TutorialRepo::list_onboarding(&state.pool).await?;
    Ok(Json(DataResponse { data: videos }))
}

/// GET /api/v1/tutorials
///
/// Regular tutorials with the caller's completion flag.
pub async fn list_tutorials(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<TutorialWithProgress>>>> {
    let tutorials = TutorialRepo::list_with_progress(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: tutorials }))
}

/// POST /api/v1/tutorials/{id}/complete
pub async fn complete_tutorial(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserProgress>>> {
    TutorialRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Tutorial",
            id,
        }))?;

    let progress = UserProgressRepo::complete(&state.pool, user.user_id, id).await?;
    tracing::info!(user_id = user.user_id, tutorial_id = id, "Tutorial completed");

    Ok(Json(DataResponse { data: progress }))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/videos
pub async fn admin_list_videos(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<Tutorial>>>> {
    let tutorials = TutorialRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: tutorials }))
}

/// POST /api/v1/admin/videos
pub async fn admin_create_video(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(mut input): Json<CreateTutorial>,
) -> AppResult<(StatusCode, Json<DataResponse<Tutorial>>)> {
    input.title = required("title", &input.title)?;
    input.video_url = required("videoUrl", &input.video_url)?;
    input.category = required("category", &input.category)?;
    input.description = input.description.trim().to_string();
    if let Some(order) = input.sort_order {
        if order < 0 {
            return Err(AppError::Core(CoreError::Validation(
                "order must not be negative".into(),
            )));
        }
    }

    let tutorial = TutorialRepo::create(&state.pool, &input).await?;
    tracing::info!(
        tutorial_id = tutorial.id,
        admin_id = admin.user_id,
        onboarding = tutorial.is_onboarding,
        "Tutorial created"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: tutorial })))
}

/// DELETE /api/v1/admin/videos/{id}
pub async fn admin_delete_video(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if TutorialRepo::delete(&state.pool, id).await? {
        tracing::info!(tutorial_id = id, admin_id = admin.user_id, "Tutorial deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Tutorial",
            id,
        }))
    }
}

fn required(field: &str, value: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{field} is required"
        ))));
    }
    Ok(value.to_string())
}
