//! Repository for the `users` table.
//!
//! The phase columns (`current_phase`, `completed_phases`, `progress`,
//! `onboarding_completed`) are only ever written by [`UserRepo::write_phase_state`],
//! which takes them from one [`PhaseState`] value.

use nextmove_core::phase::PhaseState;
use nextmove_core::roles::{ROLE_ADMIN, ROLE_CUSTOMER};
use nextmove_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use crate::models::user::{CreateUser, UpdateProfile, User};
use crate::repositories::UserProgressRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, company_id, email, password_hash, first_name, last_name, role, \
                        is_approved, profile_image, assigned_admin, is_first_login, \
                        onboarding_completed, current_phase, completed_phases, progress, \
                        last_active, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    ///
    /// Runs on a connection so registration can create the company, the
    /// user, and the referral row in one transaction.
    pub async fn create(conn: &mut PgConnection, input: &CreateUser) -> Result<User, sqlx::Error> {
        let initial = PhaseState::initial();
        let query = format!(
            "INSERT INTO users (company_id, email, password_hash, first_name, last_name, role, \
                                is_approved, assigned_admin, current_phase, completed_phases, \
                                progress, onboarding_completed)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(input.company_id)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.role)
            .bind(input.is_approved)
            .bind(&input.assigned_admin)
            .bind(initial.current().as_str())
            .bind(Json(initial.completed_names()))
            .bind(initial.progress())
            .bind(initial.onboarding_completed())
            .fetch_one(conn)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a customer by ID. Admin rows are not returned.
    pub async fn find_customer(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND role = $2");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(ROLE_CUSTOMER)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email. Emails are stored lowercased.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// All customers, newest first.
    pub async fn list_customers(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE role = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, User>(&query)
            .bind(ROLE_CUSTOMER)
            .fetch_all(pool)
            .await
    }

    /// Customers waiting for admin approval, oldest first.
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE role = $1 AND is_approved = false
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(ROLE_CUSTOMER)
            .fetch_all(pool)
            .await
    }

    /// Approve a customer that is still pending.
    ///
    /// Returns `None` if no pending customer has that id, including when the
    /// customer was already approved. Of two concurrent calls only one gets
    /// the row back.
    pub async fn approve(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET is_approved = true
             WHERE id = $1 AND role = $2 AND is_approved = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(ROLE_CUSTOMER)
            .fetch_optional(pool)
            .await
    }

    /// Record a successful login: clear `is_first_login` and set
    /// `last_active` to now.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET is_first_login = false, last_active = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Touch `last_active` without any other change.
    pub async fn touch_last_active(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_active = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Update name and email. Only non-`None` fields are applied.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        conn: &mut PgConnection,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Attach a user to a company.
    pub async fn assign_company(
        pool: &PgPool,
        id: DbId,
        company_id: DbId,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET company_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(company_id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a customer. Dependent rows cascade. Returns `true` if removed.
    pub async fn delete_customer(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role = $2")
            .bind(id)
            .bind(ROLE_CUSTOMER)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Phase state
    // -----------------------------------------------------------------------

    /// Lock a user row and load its phase state.
    ///
    /// Must run inside a transaction; the lock is held until commit.
    pub async fn lock_phase_state(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<PhaseState>, sqlx::Error> {
        let row: Option<(String, Json<Vec<String>>)> = sqlx::query_as(
            "SELECT current_phase, completed_phases FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(row.map(|(current, completed)| PhaseState::from_stored(&current, &completed.0)))
    }

    /// Write every cached phase column from `state` in one statement.
    pub async fn write_phase_state(
        conn: &mut PgConnection,
        id: DbId,
        state: &PhaseState,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                current_phase = $2,
                completed_phases = $3,
                progress = $4,
                onboarding_completed = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(state.current().as_str())
            .bind(Json(state.completed_names()))
            .bind(state.progress())
            .bind(state.onboarding_completed())
            .fetch_one(conn)
            .await
    }

    /// Apply a phase transition atomically.
    ///
    /// Locks the row, hands the current state to `transition`, and writes the
    /// result before committing. Concurrent transitions on the same user
    /// serialize. Returns `None` if the user does not exist.
    pub async fn transition_phase<F>(
        pool: &PgPool,
        id: DbId,
        transition: F,
    ) -> Result<Option<User>, sqlx::Error>
    where
        F: FnOnce(PhaseState) -> PhaseState,
    {
        let mut tx = pool.begin().await?;
        let user = Self::transition_phase_in(&mut *tx, id, transition).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// Admin phase move: apply `transition` and mark every tutorial of the
    /// resulting phase's category complete, in one transaction.
    ///
    /// If the tutorial update fails the phase change is rolled back too.
    /// Returns the user and the number of tutorials marked, or `None` if the
    /// user does not exist.
    pub async fn move_phase<F>(
        pool: &PgPool,
        id: DbId,
        transition: F,
    ) -> Result<Option<(User, u64)>, sqlx::Error>
    where
        F: FnOnce(PhaseState) -> PhaseState,
    {
        let mut tx = pool.begin().await?;
        let Some(user) = Self::transition_phase_in(&mut *tx, id, transition).await? else {
            return Ok(None);
        };
        let marked =
            UserProgressRepo::complete_category(&mut *tx, id, &user.current_phase).await?;
        tx.commit().await?;
        Ok(Some((user, marked)))
    }

    /// Lock, transform, and write on an open transaction.
    async fn transition_phase_in<F>(
        conn: &mut PgConnection,
        id: DbId,
        transition: F,
    ) -> Result<Option<User>, sqlx::Error>
    where
        F: FnOnce(PhaseState) -> PhaseState,
    {
        let Some(state) = Self::lock_phase_state(&mut *conn, id).await? else {
            return Ok(None);
        };
        let next = transition(state);
        Self::write_phase_state(conn, id, &next).await.map(Some)
    }

    /// Whether at least one admin account exists.
    pub async fn admin_exists(pool: &PgPool) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE role = $1)")
                .bind(ROLE_ADMIN)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Whether any user (of any role) has this email.
    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }
}
