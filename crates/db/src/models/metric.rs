//! Ad-performance metric snapshots.

use nextmove_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `metrics` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: DbId,
    pub user_id: DbId,
    pub leads: i32,
    pub ad_spend: i32,
    pub clicks: i32,
    pub impressions: i32,
    #[serde(rename = "date")]
    pub recorded_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for recording a metric snapshot.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMetric {
    #[serde(default)]
    pub leads: i32,
    #[serde(default)]
    pub ad_spend: i32,
    #[serde(default)]
    pub clicks: i32,
    #[serde(default)]
    pub impressions: i32,
    /// Defaults to now.
    #[serde(rename = "date")]
    pub recorded_at: Option<Timestamp>,
}
