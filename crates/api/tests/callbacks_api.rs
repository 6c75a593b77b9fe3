//! HTTP-level integration tests for callback requests and ad metrics.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_admin, create_customer, get_auth, patch_json_auth, post_json_auth,
    token_for,
};
use nextmove_core::callbacks::CALLBACK_RATE_LIMIT_MESSAGE;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Callbacks
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_callback_within_an_hour_is_rate_limited(pool: PgPool) {
    let customer = create_customer(&pool, "rueckruf@example.com").await;
    let app = common::build_test_app(pool);
    let token = token_for(&customer);

    let body = json!({ "phone": " +49 170 1234567 " });
    let response = post_json_auth(app.clone(), "/api/v1/callbacks", body.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["phone"], "+49 170 1234567");
    assert_eq!(json["data"]["status"], "pending");

    let response = post_json_auth(app, "/api/v1/callbacks", body, &token).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");
    assert_eq!(json["error"], CALLBACK_RATE_LIMIT_MESSAGE);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn callback_cooldown_is_per_customer(pool: PgPool) {
    let first = create_customer(&pool, "erster@example.com").await;
    let second = create_customer(&pool, "zweiter@example.com").await;
    let app = common::build_test_app(pool);

    let body = json!({ "phone": "030 123456" });
    let response = post_json_auth(app.clone(), "/api/v1/callbacks", body.clone(), &token_for(&first)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(app, "/api/v1/callbacks", body, &token_for(&second)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_phone_is_rejected(pool: PgPool) {
    let customer = create_customer(&pool, "telefon@example.com").await;
    let app = common::build_test_app(pool);

    let body = json!({ "phone": "ruf mich an" });
    let response = post_json_auth(app, "/api/v1/callbacks", body, &token_for(&customer)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_lists_and_completes_callbacks(pool: PgPool) {
    let admin = create_admin(&pool).await;
    let customer = create_customer(&pool, "liste@example.com").await;
    let app = common::build_test_app(pool);
    let admin_token = token_for(&admin);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/callbacks",
        json!({ "phone": "0171-1234567" }),
        &token_for(&customer),
    )
    .await;
    let callback_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let response = get_auth(app.clone(), "/api/v1/admin/callbacks", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"][0]["email"], "liste@example.com");

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/admin/callbacks/{callback_id}"),
        json!({ "status": "completed" }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "completed");

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/v1/admin/callbacks/{callback_id}"),
        json!({ "status": "erledigt" }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json_auth(
        app,
        "/api/v1/admin/callbacks/999999",
        json!({ "status": "completed" }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn customers_read_only_their_own_metrics(pool: PgPool) {
    let admin = create_admin(&pool).await;
    let customer = create_customer(&pool, "zahlen@example.com").await;
    let other = create_customer(&pool, "fremd@example.com").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/admin/customers/{}/metrics", customer.id),
        json!({ "leads": 12, "adSpend": 300, "clicks": 540, "impressions": 12000 }),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let uri = format!("/api/v1/metrics/{}", customer.id);

    let response = get_auth(app.clone(), &uri, &token_for(&customer)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["leads"], 12);
    assert_eq!(json["data"][0]["adSpend"], 300);

    let response = get_auth(app.clone(), &uri, &token_for(&other)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, &uri, &token_for(&admin)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn negative_metric_values_are_rejected(pool: PgPool) {
    let admin = create_admin(&pool).await;
    let customer = create_customer(&pool, "negativ@example.com").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/customers/{}/metrics", customer.id),
        json!({ "leads": -1 }),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
