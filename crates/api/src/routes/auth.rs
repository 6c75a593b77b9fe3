//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register      -> register
/// POST /login         -> login (customers)
/// POST /admin/login   -> admin_login
/// POST /admin/seed    -> seed_admin
/// POST /refresh       -> refresh
/// POST /logout        -> logout (requires auth)
/// GET  /session       -> session (requires auth)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/admin/login", post(auth::admin_login))
        .route("/admin/seed", post(auth::seed_admin))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
}
