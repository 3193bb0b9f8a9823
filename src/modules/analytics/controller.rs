use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::analytics::model::{
    DistributionParams, SubjectDistribution, TopPerformer, TopPerformersParams, TrendParams,
    TrendPoint,
};
use crate::modules::analytics::service::AnalyticsService;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Top performers in a class
#[utoipa::path(
    get,
    path = "/api/v1/analytics/class/{class_id}/top-performers",
    params(
        ("class_id" = Uuid, Path, description = "Class ID"),
        TopPerformersParams
    ),
    responses(
        (status = 200, description = "Top performers ordered by mean marks", body = Vec<TopPerformer>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Staff only", body = ErrorResponse),
        (status = 404, description = "Class not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_top_performers(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(class_id): Path<Uuid>,
    Query(params): Query<TopPerformersParams>,
) -> Result<Json<Vec<TopPerformer>>, AppError> {
    let limit = i64::from(params.limit.unwrap_or(10).clamp(1, 100));
    let performers =
        AnalyticsService::top_performers(&state.db, class_id, params.semester, limit).await?;
    Ok(Json(performers))
}

/// Marks distribution for a subject
#[utoipa::path(
    get,
    path = "/api/v1/analytics/subject/{subject_id}/distribution",
    params(
        ("subject_id" = Uuid, Path, description = "Subject ID"),
        DistributionParams
    ),
    responses(
        (status = 200, description = "Per-grade distribution with overall statistics", body = SubjectDistribution),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Staff only", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_subject_distribution(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(subject_id): Path<Uuid>,
    Query(params): Query<DistributionParams>,
) -> Result<Json<SubjectDistribution>, AppError> {
    let distribution =
        AnalyticsService::subject_distribution(&state.db, subject_id, params.semester).await?;
    Ok(Json(distribution))
}

/// Performance trends over time
#[utoipa::path(
    get,
    path = "/api/v1/analytics/trends",
    params(TrendParams),
    responses(
        (status = 200, description = "Chronological performance buckets", body = Vec<TrendPoint>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Staff only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Analytics"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_performance_trends(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(params): Query<TrendParams>,
) -> Result<Json<Vec<TrendPoint>>, AppError> {
    let trends = AnalyticsService::performance_trends(&state.db, &params).await?;
    Ok(Json(trends))
}
