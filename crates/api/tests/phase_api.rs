//! HTTP-level integration tests for the phase tracker: onboarding
//! completion, admin phase moves, progress, and role enforcement.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_admin, create_customer, get_auth, post_auth, post_json_auth, put_json_auth,
    token_for,
};
use serde_json::json;
use sqlx::PgPool;

fn checklist_body() -> serde_json::Value {
    json!({
        "paymentOption": "ja",
        "taxId": "DE123456789",
        "domain": "muster.de",
        "targetAudience": "  ",
        "targetGroupInterests": ["Fitness", " ", "Ernährung"],
        "webDesign": { "colors": "blau" },
    })
}

// ---------------------------------------------------------------------------
// Customer side
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn new_customer_starts_at_zero_progress(pool: PgPool) {
    let customer = create_customer(&pool, "start@example.com").await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/customer/progress", &token_for(&customer)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["currentPhase"], "onboarding");
    assert_eq!(json["data"]["progress"], 0);
    assert_eq!(json["data"]["onboardingCompleted"], false);
    assert_eq!(json["data"]["roadmap"].as_array().unwrap().len(), 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn submitting_checklist_completes_onboarding(pool: PgPool) {
    let customer = create_customer(&pool, "checklist@example.com").await;
    let app = common::build_test_app(pool);
    let token = token_for(&customer);

    let response = post_json_auth(app.clone(), "/api/v1/customer/checklist", checklist_body(), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let checklist = &json["data"]["checklist"];
    assert_eq!(checklist["paymentOption"], "ja");
    assert!(checklist["targetAudience"].is_null());
    assert_eq!(checklist["targetGroupInterests"], json!(["Fitness", "Ernährung"]));

    let progress = &json["data"]["progress"];
    assert_eq!(progress["progress"], 20);
    assert_eq!(progress["completedPhases"], json!(["onboarding"]));
    assert_eq!(progress["currentPhase"], "onboarding");

    // Dashboard no longer offers the onboarding wizard.
    let response = get_auth(app, "/api/v1/customer/dashboard", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["showOnboarding"], false);
    assert_eq!(json["data"]["checklist"]["domain"], "muster.de");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn checklist_requires_payment_method_when_none_is_set_up(pool: PgPool) {
    let customer = create_customer(&pool, "zahlung@example.com").await;
    let app = common::build_test_app(pool);

    let mut body = checklist_body();
    body["paymentOption"] = "nein".into();
    let response = post_json_auth(app, "/api/v1/customer/checklist", body, &token_for(&customer)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn updating_missing_checklist_returns_404(pool: PgPool) {
    let customer = create_customer(&pool, "leer@example.com").await;
    let app = common::build_test_app(pool);
    let token = token_for(&customer);

    let response = get_auth(app.clone(), "/api/v1/customer/checklist", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = put_json_auth(app, "/api/v1/customer/checklist", checklist_body(), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn explicit_onboarding_completion_is_idempotent(pool: PgPool) {
    let customer = create_customer(&pool, "wizard@example.com").await;
    let app = common::build_test_app(pool);
    let token = token_for(&customer);

    for _ in 0..2 {
        let response = post_auth(app.clone(), "/api/v1/customer/onboarding/complete", &token).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["completedPhases"], json!(["onboarding"]));
        assert_eq!(json["data"]["progress"], 20);
    }
}

// ---------------------------------------------------------------------------
// Admin phase moves
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_sets_phase_and_prior_phases_are_completed(pool: PgPool) {
    let admin = create_admin(&pool).await;
    let customer = create_customer(&pool, "ads@example.com").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/admin/customers/{}/phase", customer.id),
        json!({ "phase": "ADS" }),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["currentPhase"], "ads");
    assert_eq!(json["data"]["progress"], 60);
    assert_eq!(json["data"]["completedPhases"], json!(["onboarding", "landingpage"]));

    // The customer sees the same state.
    let response = get_auth(app, "/api/v1/customer/progress", &token_for(&customer)).await;
    assert_eq!(body_json(response).await["data"]["progress"], 60);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_phase_lists_allowed_values(pool: PgPool) {
    let admin = create_admin(&pool).await;
    let customer = create_customer(&pool, "invalid@example.com").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/customers/{}/phase", customer.id),
        json!({ "phase": "tiktok" }),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let message = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(message.contains("onboarding, landingpage, ads, whatsapp, webinar"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn advance_and_rollback_walk_the_sequence(pool: PgPool) {
    let admin = create_admin(&pool).await;
    let customer = create_customer(&pool, "walk@example.com").await;
    let app = common::build_test_app(pool);
    let token = token_for(&admin);
    let base = format!("/api/v1/admin/customers/{}/phase", customer.id);

    let mut phases = Vec::new();
    for _ in 0..5 {
        let response = post_auth(app.clone(), &format!("{base}/advance"), &token).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        phases.push(json["data"]["currentPhase"].as_str().unwrap().to_string());
    }
    // The last advance is a no-op at webinar.
    assert_eq!(phases, ["landingpage", "ads", "whatsapp", "webinar", "webinar"]);

    let response = post_auth(app.clone(), &format!("{base}/rollback"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["currentPhase"], "whatsapp");
    assert_eq!(json["data"]["progress"], 80);
    assert_eq!(
        json["data"]["completedPhases"],
        json!(["onboarding", "landingpage", "ads"])
    );

    let response = get_auth(app, &format!("/api/v1/admin/customers/{}/progress", customer.id), &token).await;
    assert_eq!(body_json(response).await["data"]["currentPhase"], "whatsapp");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rollback_to_onboarding_keeps_onboarding_credit(pool: PgPool) {
    let admin = create_admin(&pool).await;
    let customer = create_customer(&pool, "credit@example.com").await;
    let app = common::build_test_app(pool);
    let token = token_for(&admin);
    let base = format!("/api/v1/admin/customers/{}/phase", customer.id);

    post_auth(app.clone(), "/api/v1/customer/onboarding/complete", &token_for(&customer)).await;
    post_auth(app.clone(), &format!("{base}/advance"), &token).await;

    let response = post_auth(app, &format!("{base}/rollback"), &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["currentPhase"], "onboarding");
    assert_eq!(json["data"]["completedPhases"], json!(["onboarding"]));
    assert_eq!(json["data"]["progress"], 20);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn setting_a_phase_completes_its_tutorials(pool: PgPool) {
    let admin = create_admin(&pool).await;
    let customer = create_customer(&pool, "tutorials@example.com").await;
    let app = common::build_test_app(pool);
    let admin_token = token_for(&admin);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/videos",
        json!({
            "title": "Landingpage Grundlagen",
            "description": "Aufbau einer Landingpage",
            "videoUrl": "https://videos.example.com/lp.mp4",
            "category": "landingpage",
            "order": 1,
        }),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get_auth(app.clone(), "/api/v1/tutorials", &token_for(&customer)).await;
    assert_eq!(body_json(response).await["data"][0]["completed"], false);

    post_json_auth(
        app.clone(),
        &format!("/api/v1/admin/customers/{}/phase", customer.id),
        json!({ "phase": "landingpage" }),
        &admin_token,
    )
    .await;

    let response = get_auth(app, "/api/v1/tutorials", &token_for(&customer)).await;
    assert_eq!(body_json(response).await["data"][0]["completed"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn phase_moves_on_unknown_customer_return_404(pool: PgPool) {
    let admin = create_admin(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_auth(app.clone(), "/api/v1/admin/customers/999999/phase/advance", &token_for(&admin)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // An admin is not a customer either.
    let response = post_auth(
        app,
        &format!("/api/v1/admin/customers/{}/phase/advance", admin.id),
        &token_for(&admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Role enforcement
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn customer_cannot_call_admin_routes(pool: PgPool) {
    let customer = create_customer(&pool, "neugierig@example.com").await;
    let app = common::build_test_app(pool);
    let token = token_for(&customer);

    let response = post_auth(
        app.clone(),
        &format!("/api/v1/admin/customers/{}/phase/advance", customer.id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/admin/customers", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_cannot_call_customer_routes(pool: PgPool) {
    let admin = create_admin(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/v1/customer/progress", &token_for(&admin)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_token_returns_401(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = common::get(app, "/api/v1/customer/progress").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn onboarding_videos_are_filtered_and_ordered(pool: PgPool) {
    let admin = create_admin(&pool).await;
    let customer = create_customer(&pool, "videos@example.com").await;
    let app = common::build_test_app(pool);
    let admin_token = token_for(&admin);

    let videos = [
        ("Willkommen Teil 2", "onboarding", true, 2),
        ("Regulär früh", "marketing", false, 0),
        ("Willkommen Teil 1", "onboarding", true, 1),
        ("Willkommen Teil 0", "onboarding", true, 0),
    ];
    for (title, category, onboarding, order) in videos {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/admin/videos",
            json!({
                "title": title,
                "description": "",
                "videoUrl": "https://videos.example.com/v.mp4",
                "category": category,
                "isOnboarding": onboarding,
                "order": order,
            }),
            &admin_token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get_auth(app, "/api/v1/onboarding-videos", &token_for(&customer)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let titles: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        ["Willkommen Teil 0", "Willkommen Teil 1", "Willkommen Teil 2"]
    );
    assert!(json["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|v| v["isOnboarding"] == true));
}
