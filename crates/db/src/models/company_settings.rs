//! Portal operator settings (single row).

use nextmove_core::types::Timestamp;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The single row of the `company_settings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub logo_url: Option<String>,
    pub updated_at: Timestamp,
}

/// DTO for replacing the settings.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertCompanySettings {
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub logo_url: Option<String>,
}
