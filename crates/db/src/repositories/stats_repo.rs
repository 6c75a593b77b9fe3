//! Aggregate counts for the admin dashboard.

use nextmove_core::roles::ROLE_CUSTOMER;
use nextmove_core::types::Timestamp;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// Headline numbers shown on the admin dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Customers active since the cutoff who are past the onboarding phase.
    pub active_users: i64,
    pub pending_approvals: i64,
    pub total_tutorials: i64,
    pub pending_callbacks: i64,
}

pub struct StatsRepo;

impl StatsRepo {
    pub async fn admin_stats(pool: &PgPool, active_since: Timestamp) -> Result<AdminStats, sqlx::Error> {
        sqlx::query_as::<_, AdminStats>(
            "SELECT
                (SELECT COUNT(*) FROM users
                  WHERE role = $1 AND last_active >= $2 AND current_phase <> 'onboarding')
                    AS active_users,
                (SELECT COUNT(*) FROM users WHERE role = $1 AND is_approved = false)
                    AS pending_approvals,
                (SELECT COUNT(*) FROM tutorials) AS total_tutorials,
                (SELECT COUNT(*) FROM callbacks WHERE status = 'pending') AS pending_callbacks",
        )
        .bind(ROLE_CUSTOMER)
        .bind(active_since)
        .fetch_one(pool)
        .await
    }
}
