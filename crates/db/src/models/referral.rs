//! Referral entity model.

use nextmove_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `referrals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: DbId,
    pub referrer_id: DbId,
    pub referred_id: Option<DbId>,
    pub code: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
