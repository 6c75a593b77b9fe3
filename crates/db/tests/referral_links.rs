//! Integration tests for referral link creation.

use nextmove_core::roles::ROLE_CUSTOMER;
use nextmove_db::models::user::{CreateUser, User};
use nextmove_db::repositories::{ReferralRepo, UserRepo};
use sqlx::PgPool;

async fn seed_customer(pool: &PgPool, email: &str) -> User {
    let mut conn = pool.acquire().await.unwrap();
    UserRepo::create(
        &mut conn,
        &CreateUser {
            company_id: None,
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            first_name: "Max".to_string(),
            last_name: "Muster".to_string(),
            role: ROLE_CUSTOMER.to_string(),
            is_approved: true,
            assigned_admin: "admin@nextmove.de".to_string(),
        },
    )
    .await
    .unwrap()
}

async fn active_links(pool: &PgPool, referrer_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM referrals WHERE referrer_id = $1 AND status = 'active'")
        .bind(referrer_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_create_returns_existing_link(pool: PgPool) {
    let user = seed_customer(&pool, "link@example.de").await;

    let first = ReferralRepo::create_link(&pool, user.id, "NMAAAA11").await.unwrap();
    let second = ReferralRepo::create_link(&pool, user.id, "NMBBBB22").await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.code, "NMAAAA11");
    assert_eq!(active_links(&pool, user.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_creates_share_one_link(pool: PgPool) {
    let user = seed_customer(&pool, "race@example.de").await;

    let (a, b) = tokio::join!(
        ReferralRepo::create_link(&pool, user.id, "NMCCCC33"),
        ReferralRepo::create_link(&pool, user.id, "NMDDDD44"),
    );

    assert_eq!(a.unwrap().id, b.unwrap().id);
    assert_eq!(active_links(&pool, user.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_active_row_is_rejected_by_schema(pool: PgPool) {
    let user = seed_customer(&pool, "schema@example.de").await;
    ReferralRepo::create_link(&pool, user.id, "NMEEEE55").await.unwrap();

    let err = sqlx::query("INSERT INTO referrals (referrer_id, code, status) VALUES ($1, $2, 'active')")
        .bind(user.id)
        .bind("NMFFFF66")
        .execute(&pool)
        .await
        .unwrap_err();

    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("uq_referrals_active_referrer"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn links_are_per_referrer(pool: PgPool) {
    let a = seed_customer(&pool, "a@example.de").await;
    let b = seed_customer(&pool, "b@example.de").await;

    let link_a = ReferralRepo::create_link(&pool, a.id, "NMGGGG77").await.unwrap();
    let link_b = ReferralRepo::create_link(&pool, b.id, "NMHHHH88").await.unwrap();

    assert_ne!(link_a.id, link_b.id);
    assert_eq!(ReferralRepo::find_link(&pool, b.id).await.unwrap().unwrap().code, "NMHHHH88");
}
