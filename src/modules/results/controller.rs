use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{ensure_admin, ensure_staff};
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::MessageResponse;
use crate::modules::results::model::{
    BulkEntryResponse, EnterMarksDto, ExamResult, PaginatedResultsResponse, ResultFilterParams,
    ResultWithContext, UpdateResultDto,
};
use crate::modules::results::service::ResultService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;
use crate::validator::ValidatedJson;

/// Enter marks in bulk for a subject/semester/exam-type slice
#[utoipa::path(
    post,
    path = "/api/v1/results/enter-marks",
    request_body = EnterMarksDto,
    responses(
        (status = 201, description = "Marks entry completed, including per-item failures", body = BulkEntryResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Staff only, teachers must be assigned", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Results"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn enter_marks(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<EnterMarksDto>,
) -> Result<(StatusCode, Json<BulkEntryResponse>), AppError> {
    ensure_staff(&auth_user)?;

    let (results, errors) = ResultService::enter_marks(
        &state.db,
        dto.subject_id,
        dto.semester,
        dto.exam_type,
        dto.entries,
        auth_user.user_id(),
        auth_user.role(),
    )
    .await?;

    let response = BulkEntryResponse {
        created: results.len(),
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

/// List results with filters; students see only their own
#[utoipa::path(
    get,
    path = "/api/v1/results",
    params(
        ("student_id" = Option<Uuid>, Query, description = "Filter by student"),
        ("subject_id" = Option<Uuid>, Query, description = "Filter by subject"),
        ("semester" = Option<i32>, Query, description = "Filter by semester"),
        ("exam_type" = Option<String>, Query, description = "Filter by exam type"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Results per page")
    ),
    responses(
        (status = 200, description = "Paginated list of results", body = PaginatedResultsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Results"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_results(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ResultFilterParams>,
) -> Result<Json<PaginatedResultsResponse>, AppError> {
    let (results, total) = ResultService::get_results(
        &state.db,
        &params,
        auth_user.user_id(),
        auth_user.role(),
    )
    .await?;

    Ok(Json(PaginatedResultsResponse {
        data: results,
        meta: PaginationMeta::new(params.pagination.page(), params.pagination.limit(), total),
    }))
}

/// Get a result by ID; students can only view their own
#[utoipa::path(
    get,
    path = "/api/v1/results/{id}",
    params(("id" = Uuid, Path, description = "Result ID")),
    responses(
        (status = 200, description = "Result details", body = ResultWithContext),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Result not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Results"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_result(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResultWithContext>, AppError> {
    let result =
        ResultService::get_result_by_id(&state.db, id, auth_user.user_id(), auth_user.role())
            .await?;
    Ok(Json(result))
}

/// Update a result's marks or remarks; derived fields are recomputed
#[utoipa::path(
    put,
    path = "/api/v1/results/{id}",
    params(("id" = Uuid, Path, description = "Result ID")),
    request_body = UpdateResultDto,
    responses(
        (status = 200, description = "Result updated", body = ExamResult),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Staff only", body = ErrorResponse),
        (status = 404, description = "Result not found", body = ErrorResponse),
        (status = 409, description = "Result already approved", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Results"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_result(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateResultDto>,
) -> Result<Json<ExamResult>, AppError> {
    ensure_staff(&auth_user)?;
    let result = ResultService::update_result(&state.db, id, dto, auth_user.user_id()).await?;
    Ok(Json(result))
}

/// Approve a result, freezing it and notifying the student
#[utoipa::path(
    patch,
    path = "/api/v1/results/{id}/approve",
    params(("id" = Uuid, Path, description = "Result ID")),
    responses(
        (status = 200, description = "Result approved", body = ExamResult),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Result not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Results"
)]
#[instrument(skip(state, auth_user))]
pub async fn approve_result(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExamResult>, AppError> {
    ensure_admin(&auth_user)?;
    let result = ResultService::approve_result(&state.db, id, auth_user.user_id()).await?;
    Ok(Json(result))
}

/// Delete a result
#[utoipa::path(
    delete,
    path = "/api/v1/results/{id}",
    params(("id" = Uuid, Path, description = "Result ID")),
    responses(
        (status = 200, description = "Result deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Result not found", body = ErrorResponse),
        (status = 409, description = "Result already approved", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Results"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_result(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_admin(&auth_user)?;
    ResultService::delete_result(&state.db, id, auth_user.user_id()).await?;
    Ok(Json(MessageResponse {
        message: "Result deleted successfully".to_string(),
    }))
}
