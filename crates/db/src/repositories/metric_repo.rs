//! Repository for the `metrics` table.

use nextmove_core::types::DbId;
use sqlx::PgPool;

use crate::models::metric::{CreateMetric, Metric};

const COLUMNS: &str =
    "id, user_id, leads, ad_spend, clicks, impressions, recorded_at, created_at";

/// Number of snapshots returned to the dashboard chart.
pub const RECENT_METRICS_LIMIT: i64 = 7;

pub struct MetricRepo;

impl MetricRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateMetric,
    ) -> Result<Metric, sqlx::Error> {
        let query = format!(
            "INSERT INTO metrics (user_id, leads, ad_spend, clicks, impressions, recorded_at)
             VALUES ($1, $2, $3, $4, $5, COALESCE($6, NOW()))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Metric>(&query)
            .bind(user_id)
            .bind(input.leads)
            .bind(input.ad_spend)
            .bind(input.clicks)
            .bind(input.impressions)
            .bind(input.recorded_at)
            .fetch_one(pool)
            .await
    }

    /// The latest `limit` snapshots of a user, oldest first.
    pub async fn recent_for_user(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<Metric>, sqlx::Error> {
        let query = format!(
            "SELECT * FROM (
                SELECT {COLUMNS} FROM metrics
                WHERE user_id = $1
                ORDER BY recorded_at DESC, id DESC
                LIMIT $2
             ) recent
             ORDER BY recorded_at ASC, id ASC"
        );
        sqlx::query_as::<_, Metric>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
