//! Repository for the `password_reset_tokens` table.

use nextmove_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::password_reset::PasswordResetToken;
use crate::repositories::{SessionRepo, UserRepo};

const COLUMNS: &str = "id, user_id, token_hash, expires_at, used, created_at, updated_at";

pub struct PasswordResetRepo;

impl PasswordResetRepo {
    /// Replace all earlier tokens of the user with a new one.
    pub async fn replace_for_user(
        pool: &PgPool,
        user_id: DbId,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<PasswordResetToken, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "INSERT INTO password_reset_tokens (user_id, token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let token = sqlx::query_as::<_, PasswordResetToken>(&query)
            .bind(user_id)
            .bind(token_hash)
            .bind(expires_at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(token)
    }

    /// Find an unused, unexpired token by its digest.
    pub async fn find_valid(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<PasswordResetToken>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM password_reset_tokens
             WHERE token_hash = $1 AND used = false AND expires_at > NOW()"
        );
        sqlx::query_as::<_, PasswordResetToken>(&query)
            .bind(token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Redeem a token: set the new password, mark the token used, and revoke
    /// the user's refresh sessions, all in one transaction.
    ///
    /// Returns the user id, or `None` if the token is unknown, used, or
    /// expired by the time the row is locked.
    pub async fn redeem(
        pool: &PgPool,
        token_hash: &str,
        new_password_hash: &str,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let row: Option<(DbId, DbId)> = sqlx::query_as(
            "SELECT id, user_id FROM password_reset_tokens
             WHERE token_hash = $1 AND used = false AND expires_at > NOW()
             FOR UPDATE",
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((token_id, user_id)) = row else {
            return Ok(None);
        };

        UserRepo::update_password(&mut *tx, user_id, new_password_hash).await?;
        sqlx::query("UPDATE password_reset_tokens SET used = true WHERE id = $1")
            .bind(token_id)
            .execute(&mut *tx)
            .await?;
        SessionRepo::revoke_all_for_user(&mut *tx, user_id).await?;

        tx.commit().await?;
        Ok(Some(user_id))
    }
}
