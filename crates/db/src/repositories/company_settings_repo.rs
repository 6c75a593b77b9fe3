//! Repository for the single-row `company_settings` table.

use sqlx::PgPool;

use crate::models::company_settings::{CompanySettings, UpsertCompanySettings};

const COLUMNS: &str = "company_name, email, phone, address, logo_url, updated_at";

pub struct CompanySettingsRepo;

impl CompanySettingsRepo {
    pub async fn get(pool: &PgPool) -> Result<Option<CompanySettings>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM company_settings WHERE id = 1");
        sqlx::query_as::<_, CompanySettings>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Create or replace the settings row.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertCompanySettings,
    ) -> Result<CompanySettings, sqlx::Error> {
        let query = format!(
            "INSERT INTO company_settings (id, company_name, email, phone, address, logo_url)
             VALUES (1, $1, $2, $3, $4, $5)
             ON CONFLICT (id) DO UPDATE SET
                company_name = EXCLUDED.company_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                logo_url = EXCLUDED.logo_url
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CompanySettings>(&query)
            .bind(&input.company_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.logo_url)
            .fetch_one(pool)
            .await
    }
}
