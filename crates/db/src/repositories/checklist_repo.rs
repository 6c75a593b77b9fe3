//! Repository for the `customer_checklists` table.

use nextmove_core::checklist::ChecklistInput;
use nextmove_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::checklist::CustomerChecklist;
use crate::models::user::User;
use crate::repositories::UserRepo;

const COLUMNS: &str = "id, user_id, payment_option, payment_method, tax_id, domain, \
                        target_audience, company_info, target_group_gender, target_group_age, \
                        target_group_location, target_group_interests, unique_selling_point, \
                        market_size, web_design, market_research, legal_info, \
                        ideal_customer_profile, qualification_questions, created_at, updated_at";

/// Column order of the 18 writable fields, bound as `$1..$18`.
const WRITE_COLUMNS: &str = "user_id, payment_option, payment_method, tax_id, domain, \
                              target_audience, company_info, target_group_gender, \
                              target_group_age, target_group_location, target_group_interests, \
                              unique_selling_point, market_size, web_design, market_research, \
                              legal_info, ideal_customer_profile, qualification_questions";

/// One checklist per user, keyed by `user_id`.
pub struct ChecklistRepo;

impl ChecklistRepo {
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<CustomerChecklist>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customer_checklists WHERE user_id = $1");
        sqlx::query_as::<_, CustomerChecklist>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Every stored checklist, for the admin tracking overview.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<CustomerChecklist>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customer_checklists ORDER BY user_id");
        sqlx::query_as::<_, CustomerChecklist>(&query)
            .fetch_all(pool)
            .await
    }

    /// Insert the user's checklist or overwrite every field of the existing one.
    pub async fn upsert(
        conn: &mut PgConnection,
        user_id: DbId,
        input: &ChecklistInput,
    ) -> Result<CustomerChecklist, sqlx::Error> {
        let query = format!(
            "INSERT INTO customer_checklists ({WRITE_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
             ON CONFLICT (user_id) DO UPDATE SET
                payment_option = EXCLUDED.payment_option,
                payment_method = EXCLUDED.payment_method,
                tax_id = EXCLUDED.tax_id,
                domain = EXCLUDED.domain,
                target_audience = EXCLUDED.target_audience,
                company_info = EXCLUDED.company_info,
                target_group_gender = EXCLUDED.target_group_gender,
                target_group_age = EXCLUDED.target_group_age,
                target_group_location = EXCLUDED.target_group_location,
                target_group_interests = EXCLUDED.target_group_interests,
                unique_selling_point = EXCLUDED.unique_selling_point,
                market_size = EXCLUDED.market_size,
                web_design = EXCLUDED.web_design,
                market_research = EXCLUDED.market_research,
                legal_info = EXCLUDED.legal_info,
                ideal_customer_profile = EXCLUDED.ideal_customer_profile,
                qualification_questions = EXCLUDED.qualification_questions
             RETURNING {COLUMNS}"
        );
        bind_input(sqlx::query_as::<_, CustomerChecklist>(&query), user_id, input)
            .fetch_one(conn)
            .await
    }

    /// Overwrite an existing checklist without touching phase state.
    ///
    /// Returns `None` if the user has no checklist yet.
    pub async fn update_existing(
        pool: &PgPool,
        user_id: DbId,
        input: &ChecklistInput,
    ) -> Result<Option<CustomerChecklist>, sqlx::Error> {
        let query = format!(
            "UPDATE customer_checklists SET
                payment_option = $2,
                payment_method = $3,
                tax_id = $4,
                domain = $5,
                target_audience = $6,
                company_info = $7,
                target_group_gender = $8,
                target_group_age = $9,
                target_group_location = $10,
                target_group_interests = $11,
                unique_selling_point = $12,
                market_size = $13,
                web_design = $14,
                market_research = $15,
                legal_info = $16,
                ideal_customer_profile = $17,
                qualification_questions = $18
             WHERE user_id = $1
             RETURNING {COLUMNS}"
        );
        bind_input(sqlx::query_as::<_, CustomerChecklist>(&query), user_id, input)
            .fetch_optional(pool)
            .await
    }

    /// Store the checklist and mark onboarding complete in one transaction.
    ///
    /// The user row is locked first, so a concurrent admin phase change
    /// cannot interleave. Returns `None` if the user does not exist.
    pub async fn submit(
        pool: &PgPool,
        user_id: DbId,
        input: &ChecklistInput,
    ) -> Result<Option<(CustomerChecklist, User)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(state) = UserRepo::lock_phase_state(&mut *tx, user_id).await? else {
            return Ok(None);
        };
        let checklist = Self::upsert(&mut *tx, user_id, input).await?;
        let user = UserRepo::write_phase_state(&mut *tx, user_id, &state.complete_onboarding())
            .await?;

        tx.commit().await?;
        Ok(Some((checklist, user)))
    }
}

type ChecklistQuery<'q> =
    sqlx::query::QueryAs<'q, sqlx::Postgres, CustomerChecklist, sqlx::postgres::PgArguments>;

fn bind_input<'q>(
    query: ChecklistQuery<'q>,
    user_id: DbId,
    input: &'q ChecklistInput,
) -> ChecklistQuery<'q> {
    query
        .bind(user_id)
        .bind(&input.payment_option)
        .bind(&input.payment_method)
        .bind(&input.tax_id)
        .bind(&input.domain)
        .bind(&input.target_audience)
        .bind(&input.company_info)
        .bind(&input.target_group_gender)
        .bind(&input.target_group_age)
        .bind(&input.target_group_location)
        .bind(&input.target_group_interests)
        .bind(&input.unique_selling_point)
        .bind(&input.market_size)
        .bind(&input.web_design)
        .bind(&input.market_research)
        .bind(&input.legal_info)
        .bind(&input.ideal_customer_profile)
        .bind(&input.qualification_questions)
}
