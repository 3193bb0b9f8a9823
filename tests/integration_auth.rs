mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{
    body_json, create_test_user, generate_unique_email, get_request, json_request, setup_test_app,
};
use scorebook::modules::users::model::UserRole;

#[sqlx::test(migrations = "./migrations")]
async fn test_register_returns_token_pair(pool: PgPool) {
    let app = setup_test_app(pool);

    let email = generate_unique_email();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": email,
                "password": "password123"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert!(body.get("access_token").is_some());
    assert!(body.get("refresh_token").is_some());
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["role"], "student");
    assert!(body["user"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_duplicate_email_conflicts(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "password123", UserRole::Student).await;

    let app = setup_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/register",
            None,
            json!({
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": email,
                "password": "password123"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_success(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123", UserRole::Student).await;

    let app = setup_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": email, "password": "testpass123"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body.get("access_token").is_some());
    assert_eq!(body["user"]["email"], email);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_invalid_credentials(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123", UserRole::Student).await;

    let app = setup_test_app(pool);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": email, "password": "wrongpass"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": "nobody@test.com", "password": "whatever1"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_deactivated_user_cannot_login(pool: PgPool) {
    let email = generate_unique_email();
    let user = create_test_user(&pool, &email, "testpass123", UserRole::Student).await;

    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let app = setup_test_app(pool);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": email, "password": "testpass123"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_requires_token(pool: PgPool) {
    let app = setup_test_app(pool);

    let response = app
        .oneshot(get_request("/api/v1/auth/profile", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_logout_revokes_outstanding_tokens(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123", UserRole::Student).await;

    let app = setup_test_app(pool);

    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": email, "password": "testpass123"}),
        ))
        .await
        .unwrap();
    let body = body_json(login).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    // Token works before logout.
    let response = app
        .clone()
        .oneshot(get_request("/api/v1/auth/profile", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/logout",
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The version bump orphans the token issued before logout.
    let response = app
        .oneshot(get_request("/api/v1/auth/profile", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_refresh_rotates_and_invalidates_prior_token(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123", UserRole::Student).await;

    let app = setup_test_app(pool);

    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": email, "password": "testpass123"}),
        ))
        .await
        .unwrap();
    let body = body_json(login).await;
    let old_refresh = body["refresh_token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/refresh",
            None,
            json!({"refresh_token": old_refresh}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let new_refresh = body["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(old_refresh, new_refresh);

    // Only the most recently issued refresh token is honored.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/refresh",
            None,
            json!({"refresh_token": old_refresh}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_change_password_revokes_all_tokens(pool: PgPool) {
    let email = generate_unique_email();
    create_test_user(&pool, &email, "testpass123", UserRole::Student).await;

    let app = setup_test_app(pool);

    let login = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": email, "password": "testpass123"}),
        ))
        .await
        .unwrap();
    let body = body_json(login).await;
    let token = body["access_token"].as_str().unwrap().to_string();
    let refresh = body["refresh_token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/change-password",
            Some(&token),
            json!({"current_password": "testpass123", "new_password": "newpass12345"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Both tokens issued before the change are now rejected.
    let response = app
        .clone()
        .oneshot(get_request("/api/v1/auth/profile", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/refresh",
            None,
            json!({"refresh_token": refresh}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The new password works.
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login",
            None,
            json!({"email": email, "password": "newpass12345"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
