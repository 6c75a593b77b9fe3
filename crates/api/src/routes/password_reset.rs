//! Route definitions for the `/password-reset` resource.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::password_reset;
use crate::state::AppState;

/// Routes mounted at `/password-reset`. All public.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(password_reset::request_reset))
        .route("/verify", post(password_reset::verify_token))
        .route("/reset", put(password_reset::reset_password))
}
