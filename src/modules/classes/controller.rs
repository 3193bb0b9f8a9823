use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::ensure_admin;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::auth::model::MessageResponse;
use crate::modules::classes::model::{
    AssignStudentDto, Class, ClassFilterParams, CreateClassDto, PaginatedClassesResponse,
    UpdateClassDto,
};
use crate::modules::classes::service::ClassService;
use crate::modules::students::model::StudentWithUser;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;
use crate::validator::ValidatedJson;

/// Create a new class
#[utoipa::path(
    post,
    path = "/api/v1/classes",
    request_body = CreateClassDto,
    responses(
        (status = 201, description = "Class created successfully", body = Class),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 409, description = "Class code already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateClassDto>,
) -> Result<(StatusCode, Json<Class>), AppError> {
    ensure_admin(&auth_user)?;
    let class = ClassService::create_class(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(class)))
}

/// List classes with filters and pagination
#[utoipa::path(
    get,
    path = "/api/v1/classes",
    params(
        ("year" = Option<i32>, Query, description = "Filter by year"),
        ("semester" = Option<i32>, Query, description = "Filter by semester"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Results per page")
    ),
    responses(
        (status = 200, description = "Paginated list of classes", body = PaginatedClassesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_classes(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(params): Query<ClassFilterParams>,
) -> Result<Json<PaginatedClassesResponse>, AppError> {
    let (classes, total) = ClassService::get_classes(&state.db, &params).await?;

    Ok(Json(PaginatedClassesResponse {
        data: classes,
        meta: PaginationMeta::new(params.pagination.page(), params.pagination.limit(), total),
    }))
}

/// Get a class by ID
#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class details", body = Class),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_class(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Class>, AppError> {
    let class = ClassService::get_class_by_id(&state.db, id).await?;
    Ok(Json(class))
}

/// Update a class
#[utoipa::path(
    put,
    path = "/api/v1/classes/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = UpdateClassDto,
    responses(
        (status = 200, description = "Class updated successfully", body = Class),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateClassDto>,
) -> Result<Json<Class>, AppError> {
    ensure_admin(&auth_user)?;
    let class = ClassService::update_class(&state.db, id, dto).await?;
    Ok(Json(class))
}

/// List the students in a class
#[utoipa::path(
    get,
    path = "/api/v1/classes/{id}/students",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class roster", body = Vec<StudentWithUser>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_class_roster(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StudentWithUser>>, AppError> {
    let students = ClassService::get_roster(&state.db, id).await?;
    Ok(Json(students))
}

/// Add a student to a class roster
#[utoipa::path(
    post,
    path = "/api/v1/classes/{id}/students",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = AssignStudentDto,
    responses(
        (status = 200, description = "Student added to class", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Class or student not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn assign_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
    Json(dto): Json<AssignStudentDto>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_admin(&auth_user)?;
    ClassService::assign_student(&state.db, id, dto.student_id).await?;
    Ok(Json(MessageResponse {
        message: "Student added to class".to_string(),
    }))
}

/// Remove a student from a class roster
#[utoipa::path(
    delete,
    path = "/api/v1/classes/{id}/students/{student_id}",
    params(
        ("id" = Uuid, Path, description = "Class ID"),
        ("student_id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student removed from class", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Membership not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, auth_user))]
pub async fn remove_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_admin(&auth_user)?;
    ClassService::remove_student(&state.db, id, student_id).await?;
    Ok(Json(MessageResponse {
        message: "Student removed from class".to_string(),
    }))
}

/// Delete a class, detaching its students
#[utoipa::path(
    delete,
    path = "/api/v1/classes/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class deleted successfully", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Classes"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_class(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ensure_admin(&auth_user)?;
    ClassService::delete_class(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "Class deleted successfully".to_string(),
    }))
}
