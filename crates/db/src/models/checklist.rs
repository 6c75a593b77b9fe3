//! Customer checklist entity model.
//!
//! Inserts and updates take [`nextmove_core::checklist::ChecklistInput`]
//! directly, after it has been normalized.

use nextmove_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `customer_checklists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerChecklist {
    pub id: DbId,
    pub user_id: DbId,
    pub payment_option: String,
    pub payment_method: Option<String>,
    pub tax_id: String,
    pub domain: String,
    pub target_audience: Option<String>,
    pub company_info: Option<String>,
    pub target_group_gender: Option<String>,
    pub target_group_age: Option<String>,
    pub target_group_location: Option<String>,
    pub target_group_interests: Vec<String>,
    pub unique_selling_point: Option<String>,
    pub market_size: Option<String>,
    pub web_design: Value,
    pub market_research: Value,
    pub legal_info: Value,
    pub ideal_customer_profile: Value,
    pub qualification_questions: Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
