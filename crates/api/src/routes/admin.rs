//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::{admin, callbacks, metrics, phase, tutorials};
use crate::state::AppState;

/// Routes mounted at `/admin`. All require the admin role.
///
/// ```text
/// GET    /users/pending
/// PATCH  /users/{id}/approve
///
/// GET    /customers
/// GET    /customers/tracking
/// GET    /customers/{id}
/// DELETE /customers/{id}
/// POST   /customers/{id}/company
/// GET    /customers/{id}/checklist
/// GET    /customers/{id}/progress
/// POST   /customers/{id}/phase
/// POST   /customers/{id}/phase/advance
/// POST   /customers/{id}/phase/rollback
/// POST   /customers/{id}/metrics
///
/// GET|POST /companies
/// GET      /callbacks
/// PATCH    /callbacks/{id}
/// GET|POST /videos
/// DELETE   /videos/{id}
///
/// GET      /stats
/// GET|PUT  /settings
/// GET      /profile
/// POST     /change-password
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/pending", get(admin::pending_users))
        .route("/users/{id}/approve", patch(admin::approve_user))
        .route("/customers", get(admin::list_customers))
        .route("/customers/tracking", get(admin::tracking))
        .route(
            "/customers/{id}",
            get(admin::get_customer).delete(admin::delete_customer),
        )
        .route("/customers/{id}/company", post(admin::assign_company))
        .route("/customers/{id}/checklist", get(admin::customer_checklist))
        .route("/customers/{id}/progress", get(phase::customer_progress))
        .route("/customers/{id}/phase", post(phase::set_phase))
        .route("/customers/{id}/phase/advance", post(phase::advance_phase))
        .route("/customers/{id}/phase/rollback", post(phase::rollback_phase))
        .route("/customers/{id}/metrics", post(metrics::record_metric))
        .route(
            "/companies",
            get(admin::list_companies).post(admin::create_company),
        )
        .route("/callbacks", get(callbacks::list_callbacks))
        .route("/callbacks/{id}", patch(callbacks::update_callback))
        .route(
            "/videos",
            get(tutorials::admin_list_videos).post(tutorials::admin_create_video),
        )
        .route("/videos/{id}", delete(tutorials::admin_delete_video))
        .route("/stats", get(admin::stats))
        .route(
            "/settings",
            get(admin::get_settings).put(admin::update_settings),
        )
        .route("/profile", get(admin::profile))
        .route("/change-password", post(admin::change_password))
}
