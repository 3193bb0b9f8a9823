mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{
    body_json, create_test_user, generate_unique_email, get_request, json_request, setup_test_app,
    token_for,
};
use scorebook::bootstrap;
use scorebook::modules::users::model::UserRole;

#[sqlx::test(migrations = "./migrations")]
async fn test_bootstrap_seed_is_idempotent(pool: PgPool) {
    bootstrap::initialize(&pool).await.unwrap();

    let first: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(first >= 5);

    bootstrap::initialize(&pool).await.unwrap();

    let second: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM settings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_seed_does_not_clobber_operator_changes(pool: PgPool) {
    bootstrap::initialize(&pool).await.unwrap();

    sqlx::query("UPDATE settings SET value = '55' WHERE key = 'PASSING_PERCENTAGE'")
        .execute(&pool)
        .await
        .unwrap();

    bootstrap::initialize(&pool).await.unwrap();

    let (value,): (serde_json::Value,) =
        sqlx::query_as("SELECT value FROM settings WHERE key = 'PASSING_PERCENTAGE'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(value, serde_json::json!(55));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_settings_require_admin(pool: PgPool) {
    bootstrap::initialize(&pool).await.unwrap();

    let student =
        create_test_user(&pool, &generate_unique_email(), "studpass123", UserRole::Student).await;

    let app = setup_test_app(pool);
    let token = token_for(student.id, UserRole::Student);

    let response = app
        .oneshot(get_request("/api/v1/settings", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_admin_can_update_setting_by_key(pool: PgPool) {
    bootstrap::initialize(&pool).await.unwrap();

    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;

    let app = setup_test_app(pool);
    let token = token_for(admin.id, UserRole::Admin);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/settings/ATTENDANCE_THRESHOLD",
            Some(&token),
            json!({"value": 80}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["value"], 80);
    assert_eq!(body["updated_by"], admin.id.to_string());

    let response = app
        .oneshot(get_request(
            "/api/v1/settings/ATTENDANCE_THRESHOLD",
            Some(&token),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["value"], 80);
}
