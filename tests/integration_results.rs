mod common;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use common::{
    body_json, create_test_student, create_test_subject, create_test_user, generate_unique_email,
    get_request, json_request, setup_test_app, token_for,
};
use scorebook::modules::users::model::UserRole;

#[sqlx::test(migrations = "./migrations")]
async fn test_enter_marks_computes_derived_fields(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    let subject = create_test_subject(&pool, "CS101", 100.0, 40.0).await;
    let student = create_test_student(&pool, "CS-001", None).await;

    let app = setup_test_app(pool);
    let token = token_for(admin.id, UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/results/enter-marks",
            Some(&token),
            json!({
                "subject_id": subject,
                "semester": 1,
                "exam_type": "final",
                "entries": [{"student_id": student.id, "marks_obtained": 85.0}]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["created"], 1);
    assert_eq!(body["failed"], 0);

    let result = &body["results"][0];
    assert_eq!(result["percentage"], 85.0);
    assert_eq!(result["grade"], "A");
    assert_eq!(result["grade_point"], 9.0);
    assert_eq!(result["is_passed"], true);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_enter_marks_failing_student(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    let subject = create_test_subject(&pool, "PH102", 50.0, 20.0).await;
    let student = create_test_student(&pool, "PH-001", None).await;

    let app = setup_test_app(pool);
    let token = token_for(admin.id, UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/results/enter-marks",
            Some(&token),
            json!({
                "subject_id": subject,
                "semester": 1,
                "exam_type": "mid",
                "entries": [{"student_id": student.id, "marks_obtained": 15.0}]
            }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    let result = &body["results"][0];
    assert_eq!(result["percentage"], 30.0);
    assert_eq!(result["grade"], "F");
    assert_eq!(result["grade_point"], 0.0);
    assert_eq!(result["is_passed"], false);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bulk_entry_partial_failure(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    let subject = create_test_subject(&pool, "CS101", 100.0, 40.0).await;
    let student1 = create_test_student(&pool, "CS-001", None).await;
    let student2 = create_test_student(&pool, "CS-002", None).await;
    let missing = Uuid::new_v4();

    let app = setup_test_app(pool.clone());
    let token = token_for(admin.id, UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/results/enter-marks",
            Some(&token),
            json!({
                "subject_id": subject,
                "semester": 1,
                "exam_type": "final",
                "entries": [
                    {"student_id": student1.id, "marks_obtained": 70.0},
                    {"student_id": missing, "marks_obtained": 55.0},
                    {"student_id": student2.id, "marks_obtained": 42.0}
                ]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["created"], 2);
    assert_eq!(body["failed"], 1);
    assert_eq!(body["errors"][0]["student_id"], missing.to_string());

    // The successful siblings were committed despite the failure.
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM results")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reentry_updates_existing_result(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    let subject = create_test_subject(&pool, "CS101", 100.0, 40.0).await;
    let student = create_test_student(&pool, "CS-001", None).await;

    let app = setup_test_app(pool.clone());
    let token = token_for(admin.id, UserRole::Admin);

    for marks in [35.0, 65.0] {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/results/enter-marks",
                Some(&token),
                json!({
                    "subject_id": subject,
                    "semester": 1,
                    "exam_type": "final",
                    "entries": [{"student_id": student.id, "marks_obtained": marks}]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // One row per composite key; derived fields follow the latest marks.
    let rows: Vec<(f64, String, bool)> =
        sqlx::query_as("SELECT marks_obtained, grade, is_passed FROM results")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, 65.0);
    assert_eq!(rows[0].1, "B");
    assert!(rows[0].2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_composite_key_rejected_by_store(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    let subject = create_test_subject(&pool, "CS101", 100.0, 40.0).await;
    let student = create_test_student(&pool, "CS-001", None).await;

    let insert = "INSERT INTO results \
         (student_id, subject_id, marks_obtained, semester, exam_type, grade, grade_point, \
          percentage, is_passed, created_by) \
         VALUES ($1, $2, 50.0, 1, 'final', 'C', 6.0, 50.0, TRUE, $3)";

    sqlx::query(insert)
        .bind(student.id)
        .bind(subject)
        .bind(admin.id)
        .execute(&pool)
        .await
        .unwrap();

    let err = sqlx::query(insert)
        .bind(student.id)
        .bind(subject)
        .bind(admin.id)
        .execute(&pool)
        .await
        .unwrap_err();

    match err {
        sqlx::Error::Database(db_err) => assert!(db_err.is_unique_violation()),
        other => panic!("expected unique violation, got {:?}", other),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_approved_result_rejects_updates(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    let subject = create_test_subject(&pool, "CS101", 100.0, 40.0).await;
    let student = create_test_student(&pool, "CS-001", None).await;

    let app = setup_test_app(pool.clone());
    let token = token_for(admin.id, UserRole::Admin);

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/results/enter-marks",
            Some(&token),
            json!({
                "subject_id": subject,
                "semester": 1,
                "exam_type": "final",
                "entries": [{"student_id": student.id, "marks_obtained": 80.0}]
            }),
        ))
        .await
        .unwrap();

    let (result_id,): (Uuid,) = sqlx::query_as("SELECT id FROM results")
        .fetch_one(&pool)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PATCH",
            &format!("/api/v1/results/{}/approve", result_id),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["is_approved"], true);
    assert!(body.get("approved_at").is_some());

    // Mutable until approved; immutable after.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/results/{}", result_id),
            Some(&token),
            json!({"marks_obtained": 95.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .clone()
        .oneshot(json_request(
            "DELETE",
            &format!("/api/v1/results/{}", result_id),
            Some(&token),
            json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Approval issued an in-app notification to the student.
    let notified: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND resource_id = $2",
    )
    .bind(student.user_id)
    .bind(result_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(notified, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_recomputes_derived_fields(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    let subject = create_test_subject(&pool, "CS101", 100.0, 40.0).await;
    let student = create_test_student(&pool, "CS-001", None).await;

    let app = setup_test_app(pool.clone());
    let token = token_for(admin.id, UserRole::Admin);

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/results/enter-marks",
            Some(&token),
            json!({
                "subject_id": subject,
                "semester": 1,
                "exam_type": "final",
                "entries": [{"student_id": student.id, "marks_obtained": 92.0}]
            }),
        ))
        .await
        .unwrap();

    let (result_id,): (Uuid,) = sqlx::query_as("SELECT id FROM results")
        .fetch_one(&pool)
        .await
        .unwrap();

    let response = app
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/results/{}", result_id),
            Some(&token),
            json!({"marks_obtained": 38.0}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["percentage"], 38.0);
    assert_eq!(body["grade"], "F");
    assert_eq!(body["is_passed"], false);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_students_only_see_their_own_results(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    let subject = create_test_subject(&pool, "CS101", 100.0, 40.0).await;
    let student1 = create_test_student(&pool, "CS-001", None).await;
    let student2 = create_test_student(&pool, "CS-002", None).await;

    let app = setup_test_app(pool.clone());
    let admin_token = token_for(admin.id, UserRole::Admin);

    app.clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/results/enter-marks",
            Some(&admin_token),
            json!({
                "subject_id": subject,
                "semester": 1,
                "exam_type": "final",
                "entries": [
                    {"student_id": student1.id, "marks_obtained": 70.0},
                    {"student_id": student2.id, "marks_obtained": 60.0}
                ]
            }),
        ))
        .await
        .unwrap();

    let student_token = token_for(student1.user_id, UserRole::Student);
    let response = app
        .clone()
        .oneshot(get_request("/api/v1/results/", Some(&student_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["student_id"], student1.id.to_string());

    // A student cannot fetch another student's result by id.
    let (other_result,): (Uuid,) =
        sqlx::query_as("SELECT id FROM results WHERE student_id = $1")
            .bind(student2.id)
            .fetch_one(&pool)
            .await
            .unwrap();

    let response = app
        .oneshot(get_request(
            &format!("/api/v1/results/{}", other_result),
            Some(&student_token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_teacher_must_be_assigned_to_subject(pool: PgPool) {
    let teacher_user =
        create_test_user(&pool, &generate_unique_email(), "teachpass123", UserRole::Teacher).await;
    sqlx::query(
        "INSERT INTO teachers (user_id, employee_id, department) VALUES ($1, 'EMP-1', 'CS')",
    )
    .bind(teacher_user.id)
    .execute(&pool)
    .await
    .unwrap();

    let subject = create_test_subject(&pool, "CS101", 100.0, 40.0).await;
    let student = create_test_student(&pool, "CS-001", None).await;

    let app = setup_test_app(pool);
    let token = token_for(teacher_user.id, UserRole::Teacher);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/results/enter-marks",
            Some(&token),
            json!({
                "subject_id": subject,
                "semester": 1,
                "exam_type": "final",
                "entries": [{"student_id": student.id, "marks_obtained": 50.0}]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_grade_mapping_setting_overrides_bands(pool: PgPool) {
    let admin =
        create_test_user(&pool, &generate_unique_email(), "adminpass123", UserRole::Admin).await;
    let subject = create_test_subject(&pool, "CS101", 100.0, 40.0).await;
    let student = create_test_student(&pool, "CS-001", None).await;

    sqlx::query(
        "INSERT INTO settings (key, value, category) VALUES ('GRADE_MAPPING', $1, 'grading')",
    )
    .bind(serde_json::json!([
        {"min": 50.0, "grade": "PASS", "grade_point": 1.0},
        {"min": 0.0, "grade": "FAIL", "grade_point": 0.0}
    ]))
    .execute(&pool)
    .await
    .unwrap();

    let app = setup_test_app(pool);
    let token = token_for(admin.id, UserRole::Admin);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/results/enter-marks",
            Some(&token),
            json!({
                "subject_id": subject,
                "semester": 1,
                "exam_type": "final",
                "entries": [{"student_id": student.id, "marks_obtained": 85.0}]
            }),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["results"][0]["grade"], "PASS");
    assert_eq!(body["results"][0]["grade_point"], 1.0);
}
