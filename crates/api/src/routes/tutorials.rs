//! Route definitions for onboarding videos and tutorials.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tutorials;
use crate::state::AppState;

/// Routes merged at the `/api/v1` root.
///
/// ```text
/// GET  /onboarding-videos
/// GET  /tutorials
/// POST /tutorials/{id}/complete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/onboarding-videos", get(tutorials::onboarding_videos))
        .route("/tutorials", get(tutorials::list_tutorials))
        .route("/tutorials/{id}/complete", post(tutorials::complete_tutorial))
}
