//! Phase tracker endpoints.
//!
//! Customers read their own progress and post the end of the onboarding
//! wizard. Admins read any customer's progress and move customers through
//! the journey. Every mutation goes through [`UserRepo::transition_phase`]
//! or [`UserRepo::move_phase`], which lock the user row and write all cached
//! phase columns together. Admin moves forward also mark the new phase's
//! tutorials complete in the same transaction.

use axum::extract::{Path, State};
use axum::Json;
use nextmove_core::error::CoreError;
use nextmove_core::phase::{Phase, PhaseState, PHASE_SEQUENCE};
use nextmove_core::types::DbId;
use nextmove_db::models::user::{PhaseProgressResponse, User};
use nextmove_db::repositories::UserRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireCustomer};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /admin/customers/{id}/phase`.
#[derive(Debug, Deserialize)]
pub struct SetPhaseRequest {
    pub phase: String,
}

type ProgressResult = AppResult<Json<DataResponse<PhaseProgressResponse>>>;

// ---------------------------------------------------------------------------
// Customer
// ---------------------------------------------------------------------------

/// GET /api/v1/customer/progress
pub async fn my_progress(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
) -> ProgressResult {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    Ok(progress_response(&user))
}

/// POST /api/v1/customer/onboarding/complete
///
/// Explicit end of the onboarding wizard. Idempotent.
pub async fn complete_onboarding(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
) -> ProgressResult {
    let user = transition(&state, auth.user_id, PhaseState::complete_onboarding).await?;
    tracing::info!(user_id = user.id, progress = user.progress, "Onboarding completed");
    Ok(progress_response(&user))
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/customers/{id}/progress
pub async fn customer_progress(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> ProgressResult {
    let user = find_customer(&state, id).await?;
    Ok(progress_response(&user))
}

/// POST /api/v1/admin/customers/{id}/phase
///
/// Put the customer into the given phase. The completed list is replaced by
/// every phase before it, and tutorials of the phase's category are marked
/// complete for the customer.
pub async fn set_phase(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetPhaseRequest>,
) -> ProgressResult {
    let target = Phase::parse(&input.phase).ok_or_else(|| {
        let allowed: Vec<&str> = PHASE_SEQUENCE.iter().map(|p| p.as_str()).collect();
        AppError::Core(CoreError::Validation(format!(
            "Invalid phase '{}'. Must be one of: {}",
            input.phase.trim(),
            allowed.join(", ")
        )))
    })?;

    find_customer(&state, id).await?;
    let user = move_customer(&state, id, |s| s.move_to(target)).await?;

    tracing::info!(
        user_id = id,
        admin_id = admin.user_id,
        phase = %target,
        progress = user.progress,
        "Customer phase set"
    );
    Ok(progress_response(&user))
}

/// POST /api/v1/admin/customers/{id}/phase/advance
///
/// No-op when the customer is already in the last phase.
pub async fn advance_phase(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> ProgressResult {
    find_customer(&state, id).await?;
    let user = move_customer(&state, id, PhaseState::advance).await?;

    tracing::info!(
        user_id = id,
        admin_id = admin.user_id,
        phase = %user.current_phase,
        "Customer phase advanced"
    );
    Ok(progress_response(&user))
}

/// POST /api/v1/admin/customers/{id}/phase/rollback
///
/// No-op when the customer is in the first phase.
pub async fn rollback_phase(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> ProgressResult {
    find_customer(&state, id).await?;
    let user = transition(&state, id, PhaseState::rollback).await?;

    tracing::info!(
        user_id = id,
        admin_id = admin.user_id,
        phase = %user.current_phase,
        "Customer phase rolled back"
    );
    Ok(progress_response(&user))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_customer(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_customer(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Customer",
            id,
        }))
}

async fn transition<F>(state: &AppState, id: DbId, f: F) -> AppResult<User>
where
    F: FnOnce(PhaseState) -> PhaseState,
{
    UserRepo::transition_phase(&state.pool, id, f)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Phase move that also completes the new phase's tutorials.
async fn move_customer<F>(state: &AppState, id: DbId, f: F) -> AppResult<User>
where
    F: FnOnce(PhaseState) -> PhaseState,
{
    let (user, marked) = UserRepo::move_phase(&state.pool, id, f)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    if marked > 0 {
        tracing::debug!(user_id = user.id, phase = %user.current_phase, marked, "Phase tutorials completed");
    }
    Ok(user)
}

fn progress_response(user: &User) -> Json<DataResponse<PhaseProgressResponse>> {
    Json(DataResponse {
        data: PhaseProgressResponse::for_user(user),
    })
}
