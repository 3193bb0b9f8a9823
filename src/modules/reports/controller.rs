use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::ensure_staff;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::reports::model::{ClassReport, StudentReport};
use crate::modules::reports::service::ReportService;
use crate::modules::students::service::StudentService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::serde::deserialize_optional_i32;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportParams {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub semester: Option<i32>,
}

/// Report summary for a student; student callers can only fetch their own
#[utoipa::path(
    get,
    path = "/api/v1/reports/student/{student_id}",
    params(
        ("student_id" = Uuid, Path, description = "Student ID"),
        ReportParams
    ),
    responses(
        (status = 200, description = "Student report", body = StudentReport),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_student_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(student_id): Path<Uuid>,
    Query(params): Query<ReportParams>,
) -> Result<Json<StudentReport>, AppError> {
    if auth_user.role() == UserRole::Student {
        let owned = StudentService::find_by_user_id(&state.db, auth_user.user_id())
            .await?
            .map(|student| student.id == student_id)
            .unwrap_or(false);
        if !owned {
            return Err(AppError::forbidden("Access denied"));
        }
    }

    let report = ReportService::student_report(&state.db, student_id, params.semester).await?;
    Ok(Json(report))
}

/// Performance report for a class
#[utoipa::path(
    get,
    path = "/api/v1/reports/class/{class_id}",
    params(
        ("class_id" = Uuid, Path, description = "Class ID"),
        ReportParams
    ),
    responses(
        (status = 200, description = "Class report", body = ClassReport),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Staff only", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_class_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(class_id): Path<Uuid>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ClassReport>, AppError> {
    ensure_staff(&auth_user)?;
    let report = ReportService::class_report(&state.db, class_id, params.semester).await?;
    Ok(Json(report))
}
