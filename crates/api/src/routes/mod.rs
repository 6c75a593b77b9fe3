pub mod admin;
pub mod auth;
pub mod customer;
pub mod health;
pub mod password_reset;
pub mod tutorials;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{callbacks, metrics, referrals};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /auth/...                        registration, login, tokens, session
/// /password-reset/...              request, verify, reset (public)
/// /customer/...                    dashboard, progress, checklist, settings
/// /admin/...                       approvals, customers, phases, settings
///
/// /onboarding-videos               onboarding videos (auth)
/// /tutorials                       tutorials with completion (auth)
/// /tutorials/{id}/complete         mark tutorial complete (auth)
/// /callbacks                       request a callback (customer)
/// /referrals/my-link               referral link and stats (customer)
/// /metrics/{user_id}               latest metric snapshots (own or admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/password-reset", password_reset::router())
        .nest("/customer", customer::router())
        .nest("/admin", admin::router())
        .merge(tutorials::router())
        .route("/callbacks", post(callbacks::request_callback))
        .route("/referrals/my-link", get(referrals::my_link))
        .route("/metrics/{user_id}", get(metrics::user_metrics))
}
