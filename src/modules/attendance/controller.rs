use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::ensure_staff;
use crate::modules::attendance::model::{
    AttendanceFilterParams, AttendanceSummary, AttendanceSummaryParams, BulkAttendanceResponse,
    MarkAttendanceDto, PaginatedAttendanceResponse,
};
use crate::modules::attendance::service::AttendanceService;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::students::service::StudentService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;
use crate::validator::ValidatedJson;

/// Mark attendance in bulk for a subject on one day
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = MarkAttendanceDto,
    responses(
        (status = 201, description = "Attendance marked, including per-item failures", body = BulkAttendanceResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Staff only", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<MarkAttendanceDto>,
) -> Result<(StatusCode, Json<BulkAttendanceResponse>), AppError> {
    ensure_staff(&auth_user)?;

    let (results, errors) = AttendanceService::mark_attendance(
        &state.db,
        dto.subject_id,
        dto.date,
        dto.entries,
        auth_user.user_id(),
    )
    .await?;

    let response = BulkAttendanceResponse {
        marked: results.len(),
        failed: errors.len(),
        results,
        errors: if errors.is_empty() {
            None
        } else {
            Some(errors)
        },
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// List attendance records with filters; students see only their own
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(
        ("student_id" = Option<Uuid>, Query, description = "Filter by student"),
        ("subject_id" = Option<Uuid>, Query, description = "Filter by subject"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("from" = Option<String>, Query, description = "Start date (inclusive)"),
        ("to" = Option<String>, Query, description = "End date (inclusive)"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Results per page")
    ),
    responses(
        (status = 200, description = "Paginated attendance records", body = PaginatedAttendanceResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<AttendanceFilterParams>,
) -> Result<Json<PaginatedAttendanceResponse>, AppError> {
    let (records, total) = AttendanceService::get_attendance(
        &state.db,
        &params,
        auth_user.user_id(),
        auth_user.role(),
    )
    .await?;

    Ok(Json(PaginatedAttendanceResponse {
        data: records,
        meta: PaginationMeta::new(params.pagination.page(), params.pagination.limit(), total),
    }))
}

/// Attendance summary for a student, optionally filtered by subject and
/// date range; student callers can only fetch their own
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary/{student_id}",
    params(
        ("student_id" = Uuid, Path, description = "Student ID"),
        AttendanceSummaryParams
    ),
    responses(
        (status = 200, description = "Attendance summary", body = AttendanceSummary),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_attendance_summary(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(student_id): Path<Uuid>,
    Query(params): Query<AttendanceSummaryParams>,
) -> Result<Json<AttendanceSummary>, AppError> {
    if auth_user.role() == UserRole::Student {
        let owned = StudentService::find_by_user_id(&state.db, auth_user.user_id())
            .await?
            .map(|student| student.id == student_id)
            .unwrap_or(false);
        if !owned {
            return Err(AppError::forbidden("Access denied"));
        }
    }

    let summary = AttendanceService::get_summary(&state.db, student_id, &params).await?;
    Ok(Json(summary))
}
