//! Handler for the customer's referral link.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use nextmove_core::referral::{generate_code, referral_link, ReferralStats};
use nextmove_db::repositories::ReferralRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::rbac::RequireCustomer;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralLinkResponse {
    pub code: String,
    pub referral_link: String,
    pub stats: ReferralStats,
}

/// GET /api/v1/referrals/my-link
///
/// Returns the caller's referral link, creating the code on first use.
pub async fn my_link(
    State(state): State<AppState>,
    RequireCustomer(auth): RequireCustomer,
) -> AppResult<Json<DataResponse<ReferralLinkResponse>>> {
    let link = match ReferralRepo::find_link(&state.pool, auth.user_id).await? {
        Some(link) => link,
        None => {
            let code = generate_code(auth.user_id, Utc::now().timestamp_millis());
            let link = ReferralRepo::create_link(&state.pool, auth.user_id, &code).await?;
            tracing::info!(user_id = auth.user_id, code = %link.code, "Referral code created");
            link
        }
    };

    let stats = ReferralRepo::stats(&state.pool, auth.user_id).await?;

    Ok(Json(DataResponse {
        data: ReferralLinkResponse {
            referral_link: referral_link(&state.config.client_url, &link.code),
            code: link.code,
            stats,
        },
    }))
}
