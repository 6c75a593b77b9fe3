//! Repository for the `user_progress` table.

use nextmove_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::user_progress::UserProgress;

const COLUMNS: &str = "id, user_id, tutorial_id, completed, completed_at, created_at, updated_at";

pub struct UserProgressRepo;

impl UserProgressRepo {
    /// Mark one tutorial complete for a user. Idempotent; the first
    /// completion time is kept.
    pub async fn complete(
        pool: &PgPool,
        user_id: DbId,
        tutorial_id: DbId,
    ) -> Result<UserProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_progress (user_id, tutorial_id, completed, completed_at)
             VALUES ($1, $2, true, NOW())
             ON CONFLICT (user_id, tutorial_id) DO UPDATE SET
                completed = true,
                completed_at = COALESCE(user_progress.completed_at, EXCLUDED.completed_at)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProgress>(&query)
            .bind(user_id)
            .bind(tutorial_id)
            .fetch_one(pool)
            .await
    }

    /// Mark every tutorial in `category` complete for a user. Returns the
    /// number of tutorials touched.
    ///
    /// Takes a connection so phase moves can run it inside their transaction.
    pub async fn complete_category(
        conn: &mut PgConnection,
        user_id: DbId,
        category: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_progress (user_id, tutorial_id, completed, completed_at)
             SELECT $1, t.id, true, NOW() FROM tutorials t WHERE LOWER(t.category) = LOWER($2)
             ON CONFLICT (user_id, tutorial_id) DO UPDATE SET
                completed = true,
                completed_at = COALESCE(user_progress.completed_at, EXCLUDED.completed_at)",
        )
        .bind(user_id)
        .bind(category)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }
}
