//! Repository for the `referrals` table.

use nextmove_core::referral::{referred_code, ReferralStats, ReferralStatus};
use nextmove_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::referral::Referral;

const COLUMNS: &str = "id, referrer_id, referred_id, code, status, created_at, updated_at";

pub struct ReferralRepo;

impl ReferralRepo {
    /// The referrer's own shareable link row, if created.
    pub async fn find_link(
        pool: &PgPool,
        referrer_id: DbId,
    ) -> Result<Option<Referral>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM referrals
             WHERE referrer_id = $1 AND status = $2
             ORDER BY id ASC LIMIT 1"
        );
        sqlx::query_as::<_, Referral>(&query)
            .bind(referrer_id)
            .bind(ReferralStatus::Active.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Create the referrer's link row with the given code.
    ///
    /// A referrer has at most one active link (`uq_referrals_active_referrer`).
    /// If a concurrent request created it first, that row is returned and
    /// `code` is discarded.
    pub async fn create_link(
        pool: &PgPool,
        referrer_id: DbId,
        code: &str,
    ) -> Result<Referral, sqlx::Error> {
        let query = format!(
            "INSERT INTO referrals (referrer_id, code, status)
             VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Referral>(&query)
            .bind(referrer_id)
            .bind(code)
            .bind(ReferralStatus::Active.as_str())
            .fetch_optional(pool)
            .await?;
        match created {
            Some(link) => Ok(link),
            None => Self::find_link(pool, referrer_id)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// Resolve a shared code to its link row.
    pub async fn find_link_by_code(
        conn: &mut PgConnection,
        code: &str,
    ) -> Result<Option<Referral>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM referrals WHERE code = $1 AND status = $2");
        sqlx::query_as::<_, Referral>(&query)
            .bind(code)
            .bind(ReferralStatus::Active.as_str())
            .fetch_optional(conn)
            .await
    }

    /// Record a customer who registered through `link`, as `pending`.
    pub async fn record_referred(
        conn: &mut PgConnection,
        link: &Referral,
        referred_id: DbId,
    ) -> Result<Referral, sqlx::Error> {
        let query = format!(
            "INSERT INTO referrals (referrer_id, referred_id, code, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Referral>(&query)
            .bind(link.referrer_id)
            .bind(referred_id)
            .bind(referred_code(&link.code, referred_id))
            .bind(ReferralStatus::Pending.as_str())
            .fetch_one(conn)
            .await
    }

    /// Mark the referral of an approved customer as `completed`.
    pub async fn complete_for_referred(
        pool: &PgPool,
        referred_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE referrals SET status = $2 WHERE referred_id = $1 AND status = $3",
        )
        .bind(referred_id)
        .bind(ReferralStatus::Completed.as_str())
        .bind(ReferralStatus::Pending.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Pending and completed counts for a referrer.
    pub async fn stats(pool: &PgPool, referrer_id: DbId) -> Result<ReferralStats, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT status, COUNT(*) FROM referrals WHERE referrer_id = $1 GROUP BY status",
        )
        .bind(referrer_id)
        .fetch_all(pool)
        .await?;
        Ok(ReferralStats::from_counts(
            rows.iter().map(|(status, count)| (status.as_str(), *count)),
        ))
    }
}
