//! Route definitions for the `/customer` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{customer, phase};
use crate::state::AppState;

/// Routes mounted at `/customer`. All require the customer role.
///
/// ```text
/// GET            /dashboard
/// GET            /progress
/// POST           /onboarding/complete
/// GET|POST|PUT   /checklist
/// PUT            /settings
/// POST           /change-password
/// GET            /admin-info
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(customer::dashboard))
        .route("/progress", get(phase::my_progress))
        .route("/onboarding/complete", post(phase::complete_onboarding))
        .route(
            "/checklist",
            get(customer::get_checklist)
                .post(customer::submit_checklist)
                .put(customer::update_checklist),
        )
        .route("/settings", put(customer::update_settings))
        .route("/change-password", post(customer::change_password))
        .route("/admin-info", get(customer::admin_info))
}
