//! Repository for the `companies` table.

use nextmove_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::company::{Company, CompanyWithUserCount};

const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct CompanyRepo;

impl CompanyRepo {
    /// Insert a company. Takes a connection so registration can run it in
    /// the same transaction as the user insert.
    pub async fn create(conn: &mut PgConnection, name: &str) -> Result<Company, sqlx::Error> {
        let query = format!("INSERT INTO companies (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Company>(&query)
            .bind(name)
            .fetch_one(conn)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All companies with their user counts, alphabetically.
    pub async fn list_with_user_count(
        pool: &PgPool,
    ) -> Result<Vec<CompanyWithUserCount>, sqlx::Error> {
        sqlx::query_as::<_, CompanyWithUserCount>(
            "SELECT c.id, c.name, COUNT(u.id) AS user_count, c.created_at
             FROM companies c
             LEFT JOIN users u ON u.company_id = c.id
             GROUP BY c.id
             ORDER BY c.name ASC",
        )
        .fetch_all(pool)
        .await
    }
}
