//! Repository for the `tutorials` table.

use nextmove_core::types::DbId;
use sqlx::PgPool;

use crate::models::tutorial::{CreateTutorial, Tutorial, TutorialWithProgress};

const COLUMNS: &str = "id, title, description, video_url, thumbnail_url, category, \
                        is_onboarding, sort_order, created_at, updated_at";

pub struct TutorialRepo;

impl TutorialRepo {
    /// Insert a tutorial. Without an explicit order it is appended after the
    /// last tutorial of the same kind (onboarding or regular).
    pub async fn create(pool: &PgPool, input: &CreateTutorial) -> Result<Tutorial, sqlx::Error> {
        let query = format!(
            "INSERT INTO tutorials (title, description, video_url, thumbnail_url, category, \
                                    is_onboarding, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6,
                     COALESCE($7, (SELECT COALESCE(MAX(sort_order), 0) + 1
                                   FROM tutorials WHERE is_onboarding = $6)))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tutorial>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.video_url)
            .bind(&input.thumbnail_url)
            .bind(&input.category)
            .bind(input.is_onboarding)
            .bind(input.sort_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tutorial>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tutorials WHERE id = $1");
        sqlx::query_as::<_, Tutorial>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Every tutorial, onboarding videos first, each group in display order.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Tutorial>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tutorials ORDER BY is_onboarding DESC, sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, Tutorial>(&query).fetch_all(pool).await
    }

    /// Onboarding videos in display order.
    pub async fn list_onboarding(pool: &PgPool) -> Result<Vec<Tutorial>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tutorials
             WHERE is_onboarding = true
             ORDER BY sort_order ASC, id ASC"
        );
        sqlx::query_as::<_, Tutorial>(&query).fetch_all(pool).await
    }

    /// Regular tutorials with the given user's completion flag.
    pub async fn list_with_progress(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<TutorialWithProgress>, sqlx::Error> {
        sqlx::query_as::<_, TutorialWithProgress>(
            "SELECT t.id, t.title, t.description, t.video_url, t.thumbnail_url, t.category,
                    t.sort_order, COALESCE(p.completed, false) AS completed
             FROM tutorials t
             LEFT JOIN user_progress p ON p.tutorial_id = t.id AND p.user_id = $1
             WHERE t.is_onboarding = false
             ORDER BY t.sort_order ASC, t.id ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a tutorial. Progress rows cascade. Returns `true` if removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tutorials WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
