//! Handlers for ad-performance metrics.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use nextmove_core::error::CoreError;
use nextmove_core::types::DbId;
use nextmove_db::models::metric::{CreateMetric, Metric};
use nextmove_db::repositories::metric_repo::RECENT_METRICS_LIMIT;
use nextmove_db::repositories::{MetricRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/metrics/{userId}
///
/// The latest snapshots, oldest first. Customers may only read their own.
pub async fn user_metrics(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    Path(user_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Metric>>>> {
    if !auth.is_admin() && auth.user_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Metrics of other customers are not accessible".into(),
        )));
    }

    let metrics = MetricRepo::recent_for_user(&state.pool, user_id, RECENT_METRICS_LIMIT).await?;
    Ok(Json(DataResponse { data: metrics }))
}

/// POST /api/v1/admin/customers/{id}/metrics
pub async fn record_metric(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<CreateMetric>,
) -> AppResult<(StatusCode, Json<DataResponse<Metric>>)> {
    if [input.leads, input.ad_spend, input.clicks, input.impressions]
        .iter()
        .any(|v| *v < 0)
    {
        return Err(AppError::Core(CoreError::Validation(
            "Metric values must not be negative".into(),
        )));
    }

    UserRepo::find_customer(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Customer",
            id,
        }))?;

    let metric = MetricRepo::create(&state.pool, id, &input).await?;
    tracing::info!(user_id = id, admin_id = admin.user_id, metric_id = metric.id, "Metric recorded");

    Ok((StatusCode::CREATED, Json(DataResponse { data: metric })))
}
