//! Repository for the `callbacks` table.

use nextmove_core::callbacks::CallbackStatus;
use nextmove_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::models::callback::{Callback, CallbackWithUser};

const COLUMNS: &str = "id, user_id, phone, status, created_at, updated_at";

pub struct CallbackRepo;

impl CallbackRepo {
    /// Insert a callback request unless the user already made one at or
    /// after `window_start`.
    ///
    /// Runs in its own transaction; see [`Self::create_if_allowed_in`].
    /// Returns `None` when the request was refused.
    pub async fn create_if_allowed(
        pool: &PgPool,
        user_id: DbId,
        phone: &str,
        window_start: Timestamp,
    ) -> Result<Option<Callback>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let created = Self::create_if_allowed_in(&mut *tx, user_id, phone, window_start).await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Rate-limited insert on an open transaction.
    ///
    /// Locks the requesting user's row first, so a second request for the
    /// same user waits until this transaction ends and then sees its row.
    /// Must run inside a transaction; the lock is held until commit.
    pub async fn create_if_allowed_in(
        conn: &mut PgConnection,
        user_id: DbId,
        phone: &str,
        window_start: Timestamp,
    ) -> Result<Option<Callback>, sqlx::Error> {
        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *conn)
                .await?;
        if locked.is_none() {
            return Err(sqlx::Error::RowNotFound);
        }

        let query = format!(
            "INSERT INTO callbacks (user_id, phone, status)
             SELECT $1, $2, $3
             WHERE NOT EXISTS (
                SELECT 1 FROM callbacks WHERE user_id = $1 AND created_at >= $4
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Callback>(&query)
            .bind(user_id)
            .bind(phone)
            .bind(CallbackStatus::Pending.as_str())
            .bind(window_start)
            .fetch_optional(conn)
            .await
    }

    /// All callbacks with the requesting customer, newest first.
    pub async fn list_with_users(pool: &PgPool) -> Result<Vec<CallbackWithUser>, sqlx::Error> {
        sqlx::query_as::<_, CallbackWithUser>(
            "SELECT c.id, c.user_id, c.phone, c.status, c.created_at,
                    u.first_name, u.last_name, u.email
             FROM callbacks c
             JOIN users u ON u.id = c.user_id
             ORDER BY c.created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Set the status of a callback. Returns `None` if it does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: CallbackStatus,
    ) -> Result<Option<Callback>, sqlx::Error> {
        let query = format!("UPDATE callbacks SET status = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Callback>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }
}
