//! Handlers for the `/customer` resource: dashboard, checklist, and account
//! settings. All handlers require the `customer` role.

use axum::extract::State;
use axum::Json;
use nextmove_core::checklist::ChecklistInput;
use nextmove_core::error::CoreError;
use nextmove_core::types::DbId;
use nextmove_core::validation::{normalize_email, normalize_name};
use nextmove_db::models::checklist::CustomerChecklist;
use nextmove_db::models::user::{PhaseProgressResponse, UpdateProfile, User, UserResponse};
use nextmove_db::repositories::{ChecklistRepo, CompanySettingsRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::password::{check_password, hash_new_password};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireCustomer;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub show_onboarding: bool,
    pub user: UserResponse,
    pub checklist: Option<CustomerChecklist>,
}

/// Result of a checklist submission: the stored checklist and the phase
/// state after onboarding was marked complete.
#[derive(Debug, Serialize)]
pub struct ChecklistSubmitted {
    pub checklist: CustomerChecklist,
    pub progress: PhaseProgressResponse,
}

/// Request body for both change-password endpoints.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Portal operator contact shown to customers.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminInfo {
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub logo_url: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/customer/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
) -> AppResult<Json<DataResponse<DashboardResponse>>> {
    let user = find_user(&state, auth.user_id).await?;
    let checklist = ChecklistRepo::find_by_user(&state.pool, user.id).await?;
    UserRepo::touch_last_active(&state.pool, user.id).await?;

    Ok(Json(DataResponse {
        data: DashboardResponse {
            show_onboarding: !user.onboarding_completed,
            user: UserResponse::from(user),
            checklist,
        },
    }))
}

/// GET /api/v1/customer/checklist
pub async fn get_checklist(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
) -> AppResult<Json<DataResponse<CustomerChecklist>>> {
    let checklist = ChecklistRepo::find_by_user(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Checklist",
            id: auth.user_id,
        }))?;
    Ok(Json(DataResponse { data: checklist }))
}

/// POST /api/v1/customer/checklist
///
/// Store the checklist (overwriting an earlier one) and mark onboarding
/// complete in the same transaction.
pub async fn submit_checklist(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Json(mut input): Json<ChecklistInput>,
) -> AppResult<Json<DataResponse<ChecklistSubmitted>>> {
    input.normalize()?;

    let (checklist, user) = ChecklistRepo::submit(&state.pool, auth.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    tracing::info!(
        user_id = user.id,
        checklist_id = checklist.id,
        progress = user.progress,
        "Checklist submitted"
    );

    Ok(Json(DataResponse {
        data: ChecklistSubmitted {
            progress: PhaseProgressResponse::for_user(&user),
            checklist,
        },
    }))
}

/// PUT /api/v1/customer/checklist
///
/// Edit an existing checklist. Phase state is left untouched.
pub async fn update_checklist(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Json(mut input): Json<ChecklistInput>,
) -> AppResult<Json<DataResponse<CustomerChecklist>>> {
    input.normalize()?;

    let checklist = ChecklistRepo::update_existing(&state.pool, auth.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Checklist",
            id: auth.user_id,
        }))?;

    tracing::info!(user_id = auth.user_id, "Checklist updated");
    Ok(Json(DataResponse { data: checklist }))
}

/// PUT /api/v1/customer/settings
pub async fn update_settings(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Json(input): Json<UpdateProfile>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let input = UpdateProfile {
        first_name: input
            .first_name
            .map(|v| normalize_name("firstName", &v))
            .transpose()?,
        last_name: input
            .last_name
            .map(|v| normalize_name("lastName", &v))
            .transpose()?,
        email: input.email.map(|v| normalize_email(&v)).transpose()?,
    };

    if let Some(email) = &input.email {
        if let Some(other) = UserRepo::find_by_email(&state.pool, email).await? {
            if other.id != auth.user_id {
                return Err(AppError::Core(CoreError::Conflict(
                    "Email is already registered".into(),
                )));
            }
        }
    }

    let user = UserRepo::update_profile(&state.pool, auth.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// POST /api/v1/customer/change-password
pub async fn change_password(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    change_own_password(&state, auth.user_id, &input).await?;
    Ok(Json(MessageResponse::new("Password changed")))
}

/// GET /api/v1/customer/admin-info
pub async fn admin_info(
    State(state): State<AppState>,
    RequireCustomer(_auth): RequireCustomer,
) -> AppResult<Json<DataResponse<AdminInfo>>> {
    let settings = CompanySettingsRepo::get(&state.pool).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "CompanySettings",
            id: 1,
        })
    })?;

    Ok(Json(DataResponse {
        data: AdminInfo {
            company_name: settings.company_name,
            email: settings.email,
            phone: settings.phone,
            logo_url: settings.logo_url,
        },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(state: &AppState, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Verify the current password and store the new one. Shared by customers
/// and admins.
pub(crate) async fn change_own_password(
    state: &AppState,
    user_id: DbId,
    input: &ChangePasswordRequest,
) -> AppResult<()> {
    let user = find_user(state, user_id).await?;

    if !check_password(&input.current_password, &user.password_hash)? {
        return Err(AppError::Core(CoreError::Validation(
            "Current password is incorrect".into(),
        )));
    }
    let password_hash = hash_new_password(&input.new_password)?;

    let mut conn = state.pool.acquire().await?;
    UserRepo::update_password(&mut conn, user_id, &password_hash).await?;

    tracing::info!(user_id, "Password changed");
    Ok(())
}
