//! Handlers for the `/auth` resource (registration, login, token refresh,
//! logout, session lookup, admin bootstrap).

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use nextmove_core::error::CoreError;
use nextmove_core::referral::validate_code;
use nextmove_core::roles::{ROLE_ADMIN, ROLE_CUSTOMER};
use nextmove_core::validation::{normalize_email, normalize_name};
use nextmove_db::models::session::CreateSession;
use nextmove_db::models::user::{CreateUser, User, UserResponse};
use nextmove_db::repositories::{CompanyRepo, ReferralRepo, SessionRepo, UserRepo};
use nextmove_events::PortalEvent;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{check_password, hash_new_password};
use crate::error::{AppError, AppResult};
use crate::handlers::recipient_for;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub referral_code: Option<String>,
}

/// Request body for both login endpoints.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/admin/seed`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedAdminRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Successful authentication response returned by login and refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
    /// Set on customer login: whether the frontend should open the
    /// onboarding wizard.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_redirect_to_onboarding: Option<bool>,
}

/// Current user as returned by `GET /auth/session`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(flatten)]
    pub user: UserResponse,
    pub has_completed_onboarding: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a company and an unapproved customer in onboarding. A valid
/// referral code records the new customer as a pending referral of the
/// code's owner; unknown codes are ignored.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    let email = normalize_email(&input.email)?;
    let first_name = normalize_name("firstName", &input.first_name)?;
    let last_name = normalize_name("lastName", &input.last_name)?;
    let company_name = normalize_name("companyName", &input.company_name)?;
    let password_hash = hash_new_password(&input.password)?;

    if UserRepo::email_exists(&state.pool, &email).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already registered".into(),
        )));
    }

    let mut tx = state.pool.begin().await?;

    let company = CompanyRepo::create(&mut *tx, &company_name).await?;
    let user = UserRepo::create(
        &mut *tx,
        &CreateUser {
            company_id: Some(company.id),
            email,
            password_hash,
            first_name,
            last_name,
            role: ROLE_CUSTOMER.to_string(),
            is_approved: false,
            assigned_admin: state.config.default_admin_email.clone(),
        },
    )
    .await?;

    let code = input
        .referral_code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());
    if let Some(code) = code {
        let link = match validate_code(code) {
            Ok(code) => ReferralRepo::find_link_by_code(&mut *tx, code).await?,
            Err(_) => None,
        };
        match link {
            Some(link) => {
                ReferralRepo::record_referred(&mut *tx, &link, user.id).await?;
                tracing::info!(
                    user_id = user.id,
                    referrer_id = link.referrer_id,
                    "Referred registration recorded"
                );
            }
            None => tracing::debug!(code, "Ignoring unknown referral code"),
        }
    }

    tx.commit().await?;

    tracing::info!(user_id = user.id, company_id = company.id, "Customer registered");
    state
        .event_bus
        .publish(PortalEvent::user_registered(recipient_for(&user)));

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(user),
        }),
    ))
}

/// POST /api/v1/auth/login
///
/// Customer login. The account must be approved by an admin first.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = find_with_password(&state, &input, ROLE_CUSTOMER).await?;

    if !user.is_approved {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account has not been approved yet".into(),
        )));
    }

    UserRepo::record_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, first_login = user.is_first_login, "Customer logged in");

    let should_redirect = !user.onboarding_completed;
    let mut response = create_auth_response(&state, user).await?;
    response.should_redirect_to_onboarding = Some(should_redirect);
    Ok(Json(response))
}

/// POST /api/v1/auth/admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = find_with_password(&state, &input, ROLE_ADMIN).await?;

    UserRepo::touch_last_active(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "Admin logged in");

    Ok(Json(create_auth_response(&state, user).await?))
}

/// POST /api/v1/auth/refresh
///
/// Exchange a valid refresh token for new access + refresh tokens. The old
/// session is revoked, so each refresh token works once.
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::find_active_by_hash(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    if !SessionRepo::revoke(&state.pool, session.id).await? {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid or expired refresh token".into(),
        )));
    }

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if user.role == ROLE_CUSTOMER && !user.is_approved {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account has not been approved yet".into(),
        )));
    }

    Ok(Json(create_auth_response(&state, user).await?))
}

/// POST /api/v1/auth/logout
///
/// Revoke all sessions for the authenticated user. Returns 204 No Content.
pub async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> AppResult<StatusCode> {
    let mut conn = state.pool.acquire().await?;
    let revoked = SessionRepo::revoke_all_for_user(&mut conn, auth_user.user_id).await?;
    tracing::info!(user_id = auth_user.user_id, revoked, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/session
///
/// The authenticated user, without credentials.
pub async fn session(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<SessionUser>>> {
    let user = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    let has_completed_onboarding = user.onboarding_completed;
    Ok(Json(DataResponse {
        data: SessionUser {
            user: UserResponse::from(user),
            has_completed_onboarding,
        },
    }))
}

/// POST /api/v1/auth/admin/seed
///
/// Create an admin account. Open while no admin exists yet; afterwards the
/// caller must be an admin. 409 if the email is taken.
pub async fn seed_admin(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<SeedAdminRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    if UserRepo::admin_exists(&state.pool).await? {
        let caller = AuthUser::from_headers(&headers, &state.config.jwt)?;
        if !caller.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
    }

    let email = normalize_email(&input.email)?;
    if UserRepo::email_exists(&state.pool, &email).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "Admin already exists".into(),
        )));
    }

    let first_name = normalize_name("firstName", input.first_name.as_deref().unwrap_or("Admin"))?;
    let last_name = normalize_name("lastName", input.last_name.as_deref().unwrap_or("User"))?;
    let password_hash = hash_new_password(&input.password)?;

    let mut conn = state.pool.acquire().await?;
    let admin = UserRepo::create(
        &mut conn,
        &CreateUser {
            company_id: None,
            assigned_admin: email.clone(),
            email,
            password_hash,
            first_name,
            last_name,
            role: ROLE_ADMIN.to_string(),
            is_approved: true,
        },
    )
    .await?;

    tracing::info!(user_id = admin.id, "Admin account created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from(admin),
        }),
    ))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Look up a user of `role` by email and verify the password. Every failure
/// yields the same 401 so callers cannot tell which emails exist.
async fn find_with_password(state: &AppState, input: &LoginRequest, role: &str) -> AppResult<User> {
    let email = input.email.trim().to_lowercase();
    let invalid = || AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()));

    let user = UserRepo::find_by_email(&state.pool, &email)
        .await?
        .filter(|u| u.role == role)
        .ok_or_else(invalid)?;

    if !check_password(&input.password, &user.password_hash)? {
        return Err(invalid());
    }
    Ok(user)
}

/// Generate access + refresh tokens, persist a session row, and build the response.
async fn create_auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let refresh = generate_refresh_token();

    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::create(
        &state.pool,
        &CreateSession {
            user_id: user.id,
            refresh_token_hash: refresh.hash,
            expires_at,
            user_agent: None,
            ip_address: None,
        },
    )
    .await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.plaintext,
        expires_in: state.config.jwt.access_token_ttl_secs(),
        user: UserResponse::from(user),
        should_redirect_to_onboarding: None,
    })
}
