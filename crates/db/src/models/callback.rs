//! Callback request model.

use nextmove_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `callbacks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Callback {
    pub id: DbId,
    pub user_id: DbId,
    pub phone: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Callback joined with the requesting customer, for the admin list.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackWithUser {
    pub id: DbId,
    pub user_id: DbId,
    pub phone: String,
    pub status: String,
    pub created_at: Timestamp,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
