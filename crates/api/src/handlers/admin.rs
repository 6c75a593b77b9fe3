//! Handlers for the `/admin` resource: approvals, customer management,
//! companies, dashboard stats, and portal settings.
//!
//! All handlers require the `admin` role via [`RequireAdmin`]. Phase
//! changes live in [`crate::handlers::phase`].

use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use nextmove_core::checklist::strip_empty_fields;
use nextmove_core::error::CoreError;
use nextmove_core::types::{DbId, Timestamp};
use nextmove_core::validation::{normalize_email, normalize_name};
use nextmove_db::models::checklist::CustomerChecklist;
use nextmove_db::models::company::{Company, CompanyWithUserCount, CreateCompany};
use nextmove_db::models::company_settings::{CompanySettings, UpsertCompanySettings};
use nextmove_db::models::user::{User, UserResponse};
use nextmove_db::repositories::stats_repo::AdminStats;
use nextmove_db::repositories::{
    ChecklistRepo, CompanyRepo, CompanySettingsRepo, ReferralRepo, StatsRepo, UserRepo,
};
use nextmove_events::PortalEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::handlers::customer::{change_own_password, ChangePasswordRequest};
use crate::handlers::recipient_for;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

/// Window for the "active users" dashboard count.
const ACTIVE_WINDOW_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A customer with the name of their company.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    #[serde(flatten)]
    pub user: UserResponse,
    pub company_name: Option<String>,
}

/// One row of the admin tracking overview.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEntry {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub current_phase: String,
    pub completed_phases: Vec<String>,
    pub progress: i32,
    pub last_active: Option<Timestamp>,
    pub onboarding_completed: bool,
    /// Answered checklist fields only; `None` before submission.
    pub checklist_data: Option<Value>,
}

/// Request body for `POST /admin/customers/{id}/company`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignCompanyRequest {
    pub company_id: DbId,
}

// ---------------------------------------------------------------------------
// Approvals
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users/pending
pub async fn pending_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<CustomerSummary>>>> {
    let users = UserRepo::list_pending(&state.pool).await?;
    Ok(Json(DataResponse {
        data: with_company_names(&state, users).await?,
    }))
}

/// PATCH /api/v1/admin/users/{id}/approve
///
/// Approve a customer, complete a pending referral for them, and send the
/// approval email. Approving an already approved customer returns it
/// unchanged and sends nothing.
pub async fn approve_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let Some(user) = UserRepo::approve(&state.pool, id).await? else {
        let user = UserRepo::find_customer(&state.pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Customer",
                id,
            }))?;
        tracing::debug!(user_id = id, admin_id = admin.user_id, "Customer already approved");
        return Ok(Json(DataResponse {
            data: UserResponse::from(user),
        }));
    };

    let referral_completed = ReferralRepo::complete_for_referred(&state.pool, id).await?;

    tracing::info!(user_id = id, admin_id = admin.user_id, referral_completed, "Customer approved");
    state
        .event_bus
        .publish(PortalEvent::user_approved(recipient_for(&user)));

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/customers
pub async fn list_customers(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<CustomerSummary>>>> {
    let users = UserRepo::list_customers(&state.pool).await?;
    Ok(Json(DataResponse {
        data: with_company_names(&state, users).await?,
    }))
}

/// GET /api/v1/admin/customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CustomerSummary>>> {
    let user = find_customer(&state, id).await?;
    let company_name = match user.company_id {
        Some(company_id) => CompanyRepo::find_by_id(&state.pool, company_id)
            .await?
            .map(|c| c.name),
        None => None,
    };

    Ok(Json(DataResponse {
        data: CustomerSummary {
            user: UserResponse::from(user),
            company_name,
        },
    }))
}

/// DELETE /api/v1/admin/customers/{id}
///
/// Sessions, checklist, progress, metrics, callbacks, and referrals of the
/// customer are removed by cascade.
pub async fn delete_customer(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if UserRepo::delete_customer(&state.pool, id).await? {
        tracing::info!(user_id = id, admin_id = admin.user_id, "Customer deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Customer",
            id,
        }))
    }
}

/// POST /api/v1/admin/customers/{id}/company
pub async fn assign_company(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignCompanyRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    find_customer(&state, id).await?;
    CompanyRepo::find_by_id(&state.pool, input.company_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Company",
            id: input.company_id,
        }))?;

    let user = UserRepo::assign_company(&state.pool, id, input.company_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Customer",
            id,
        }))?;

    tracing::info!(
        user_id = id,
        company_id = input.company_id,
        admin_id = admin.user_id,
        "Customer company assigned"
    );
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// GET /api/v1/admin/customers/tracking
///
/// Every customer with phase state and the answered checklist fields.
pub async fn tracking(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<TrackingEntry>>>> {
    let customers = UserRepo::list_customers(&state.pool).await?;
    let mut checklists: HashMap<DbId, CustomerChecklist> = ChecklistRepo::list_all(&state.pool)
        .await?
        .into_iter()
        .map(|c| (c.user_id, c))
        .collect();

    let mut entries = Vec::with_capacity(customers.len());
    for user in customers {
        let checklist_data = checklists
            .remove(&user.id)
            .map(|c| serde_json::to_value(c).map(strip_empty_fields))
            .transpose()
            .map_err(|e| AppError::InternalError(format!("Checklist serialization error: {e}")))?;
        let phase = user.phase_state();
        entries.push(TrackingEntry {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            current_phase: phase.current().as_str().to_string(),
            completed_phases: phase.completed_names(),
            progress: phase.progress(),
            last_active: user.last_active,
            onboarding_completed: phase.onboarding_completed(),
            checklist_data,
        });
    }

    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/admin/customers/{id}/checklist
pub async fn customer_checklist(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CustomerChecklist>>> {
    find_customer(&state, id).await?;
    let checklist = ChecklistRepo::find_by_user(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Checklist",
            id,
        }))?;
    Ok(Json(DataResponse { data: checklist }))
}

// ---------------------------------------------------------------------------
// Companies
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/companies
pub async fn list_companies(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<CompanyWithUserCount>>>> {
    let companies = CompanyRepo::list_with_user_count(&state.pool).await?;
    Ok(Json(DataResponse { data: companies }))
}

/// POST /api/v1/admin/companies
pub async fn create_company(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateCompany>,
) -> AppResult<(StatusCode, Json<DataResponse<Company>>)> {
    let name = normalize_name("name", &input.name)?;

    let mut conn = state.pool.acquire().await?;
    let company = CompanyRepo::create(&mut conn, &name).await?;

    tracing::info!(company_id = company.id, admin_id = admin.user_id, "Company created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: company })))
}

// ---------------------------------------------------------------------------
// Dashboard, settings, profile
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<AdminStats>>> {
    let since = Utc::now() - Duration::hours(ACTIVE_WINDOW_HOURS);
    let stats = StatsRepo::admin_stats(&state.pool, since).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/v1/admin/settings
///
/// `data` is `null` until the settings are saved for the first time.
pub async fn get_settings(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Option<CompanySettings>>>> {
    let settings = CompanySettingsRepo::get(&state.pool).await?;
    Ok(Json(DataResponse { data: settings }))
}

/// PUT /api/v1/admin/settings
pub async fn update_settings(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<UpsertCompanySettings>,
) -> AppResult<Json<DataResponse<CompanySettings>>> {
    let input = UpsertCompanySettings {
        company_name: normalize_name("companyName", &input.company_name)?,
        email: normalize_email(&input.email)?,
        phone: input.phone.trim().to_string(),
        address: input.address.trim().to_string(),
        logo_url: input
            .logo_url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty()),
    };

    let settings = CompanySettingsRepo::upsert(&state.pool, &input).await?;
    tracing::info!(admin_id = admin.user_id, "Company settings updated");
    Ok(Json(DataResponse { data: settings }))
}

/// GET /api/v1/admin/profile
pub async fn profile(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, admin.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: admin.user_id,
        }))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// POST /api/v1/admin/change-password
pub async fn change_password(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    change_own_password(&state, admin.user_id, &input).await?;
    Ok(Json(MessageResponse::new("Password changed")))
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

/// Attach company names, fetching all companies once to avoid N+1 queries.
async fn with_company_names(state: &AppState, users: Vec<User>) -> AppResult<Vec<CustomerSummary>> {
    let names: HashMap<DbId, String> = CompanyRepo::list_with_user_count(&state.pool)
        .await?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    Ok(users
        .into_iter()
        .map(|user| CustomerSummary {
            company_name: user.company_id.and_then(|id| names.get(&id).cloned()),
            user: UserResponse::from(user),
        })
        .collect())
}
