//! Integration tests for the per-customer callback cooldown.

use std::time::Duration;

use chrono::Utc;
use nextmove_core::callbacks::cooldown_window_start;
use nextmove_core::roles::ROLE_CUSTOMER;
use nextmove_db::models::user::{CreateUser, User};
use nextmove_db::repositories::{CallbackRepo, UserRepo};
use sqlx::PgPool;

async fn seed_customer(pool: &PgPool, email: &str) -> User {
    let mut conn = pool.acquire().await.unwrap();
    UserRepo::create(
        &mut conn,
        &CreateUser {
            company_id: None,
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
            first_name: "Erika".to_string(),
            last_name: "Muster".to_string(),
            role: ROLE_CUSTOMER.to_string(),
            is_approved: true,
            assigned_admin: "admin@nextmove.de".to_string(),
        },
    )
    .await
    .unwrap()
}

async fn callbacks_for(pool: &PgPool, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM callbacks WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_request_inside_window_is_refused(pool: PgPool) {
    let user = seed_customer(&pool, "once@example.de").await;
    let window = cooldown_window_start(Utc::now());

    let first = CallbackRepo::create_if_allowed(&pool, user.id, "+49 30 1234567", window)
        .await
        .unwrap();
    let second = CallbackRepo::create_if_allowed(&pool, user.id, "+49 30 1234567", window)
        .await
        .unwrap();

    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(callbacks_for(&pool, user.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn overlapping_requests_insert_one_row(pool: PgPool) {
    let user = seed_customer(&pool, "race@example.de").await;
    let window = cooldown_window_start(Utc::now());

    // First request holds its transaction open across the second one.
    let mut tx = pool.begin().await.unwrap();
    let first = CallbackRepo::create_if_allowed_in(&mut *tx, user.id, "+49 30 1111111", window)
        .await
        .unwrap();
    assert!(first.is_some());

    let second = tokio::spawn({
        let pool = pool.clone();
        let user_id = user.id;
        async move {
            CallbackRepo::create_if_allowed(&pool, user_id, "+49 30 2222222", window)
                .await
                .unwrap()
        }
    });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!second.is_finished(), "second request must wait for the row lock");

    tx.commit().await.unwrap();
    let second = second.await.unwrap();

    assert!(second.is_none());
    assert_eq!(callbacks_for(&pool, user.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_requests_accept_exactly_one(pool: PgPool) {
    let user = seed_customer(&pool, "burst@example.de").await;
    let window = cooldown_window_start(Utc::now());

    let (a, b) = tokio::join!(
        CallbackRepo::create_if_allowed(&pool, user.id, "+49 30 3333333", window),
        CallbackRepo::create_if_allowed(&pool, user.id, "+49 30 4444444", window),
    );
    let accepted = [a.unwrap(), b.unwrap()]
        .iter()
        .filter(|c| c.is_some())
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(callbacks_for(&pool, user.id).await, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cooldown_is_per_customer(pool: PgPool) {
    let a = seed_customer(&pool, "a@example.de").await;
    let b = seed_customer(&pool, "b@example.de").await;
    let window = cooldown_window_start(Utc::now());

    let first = CallbackRepo::create_if_allowed(&pool, a.id, "+49 30 5555555", window)
        .await
        .unwrap();
    let other = CallbackRepo::create_if_allowed(&pool, b.id, "+49 30 6666666", window)
        .await
        .unwrap();

    assert!(first.is_some());
    assert!(other.is_some());
}
