mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

use common::{
    body_json, create_test_student, create_test_user, generate_unique_email, get_request,
    json_request, setup_test_app, token_for,
};
use scorebook::modules::users::model::UserRole;

fn student_payload(email: &str, roll_no: &str) -> serde_json::Value {
    json!({
        "first_name": "John",
        "last_name": "Doe",
        "email": email,
        "password": "password123",
        "roll_no": roll_no,
        "department": "Computer Science",
        "batch": "2024",
        "semester": 1
    })
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_creates_user_and_profile(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;

    let app = setup_test_app(pool.clone());
    let token = token_for(admin.id, UserRole::Admin);

    let email = generate_unique_email();
    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/students",
            Some(&token),
            student_payload(&email, "CS-2024-001"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["roll_no"], "CS-2024-001");
    assert_eq!(body["email"], email);
    assert_eq!(body["first_name"], "John");

    let (role,): (String,) = sqlx::query_as("SELECT role::TEXT FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(role, "student");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_duplicate_roll_no_conflicts(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    create_test_student(&pool, "CS-2024-001", None).await;

    let app = setup_test_app(pool.clone());
    let token = token_for(admin.id, UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/students",
            Some(&token),
            student_payload(&generate_unique_email(), "CS-2024-001"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    // The failed profile insert must not leave an orphaned user behind.
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'student'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(users, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_create_student_requires_admin(pool: PgPool) {
    let teacher =
        create_test_user(&pool, &generate_unique_email(), "teachpass123", UserRole::Teacher).await;

    let app = setup_test_app(pool);
    let token = token_for(teacher.id, UserRole::Teacher);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/students",
            Some(&token),
            student_payload(&generate_unique_email(), "CS-2024-001"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_students_with_search(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    create_test_student(&pool, "CS-2024-001", None).await;
    create_test_student(&pool, "EE-2024-001", None).await;

    let app = setup_test_app(pool);
    let token = token_for(admin.id, UserRole::Admin);

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/students?search=CS-2024", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["roll_no"], "CS-2024-001");

    let response = app
        .oneshot(get_request("/api/v1/students", Some(&token)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["meta"]["total"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_student_deactivates_user(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    let student = create_test_student(&pool, "CS-2024-001", None).await;

    let app = setup_test_app(pool.clone());
    let token = token_for(admin.id, UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "DELETE",
            &format!("/api/v1/students/{}", student.id),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Soft delete: the profile row stays, the user is deactivated.
    let (is_active, token_version): (bool, i32) =
        sqlx::query_as("SELECT is_active, token_version FROM users WHERE id = $1")
            .bind(student.user_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert!(!is_active);
    assert_eq!(token_version, 1);

    let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(profiles, 1);
}
