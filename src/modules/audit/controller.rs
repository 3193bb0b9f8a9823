use axum::{
    Json,
    extract::{Query, State},
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::audit::model::{AuditFilterParams, PaginatedAuditResponse};
use crate::modules::audit::service::AuditService;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;

/// List audit log entries with filters
#[utoipa::path(
    get,
    path = "/api/v1/audit",
    params(
        ("actor_id" = Option<Uuid>, Query, description = "Filter by actor"),
        ("action" = Option<String>, Query, description = "Filter by action"),
        ("resource_type" = Option<String>, Query, description = "Filter by resource type"),
        ("resource_id" = Option<Uuid>, Query, description = "Filter by resource id"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Results per page")
    ),
    responses(
        (status = 200, description = "Paginated audit trail", body = PaginatedAuditResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Audit"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_audit_logs(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(params): Query<AuditFilterParams>,
) -> Result<Json<PaginatedAuditResponse>, AppError> {
    let (logs, total) = AuditService::get_logs(&state.db, &params).await?;

    Ok(Json(PaginatedAuditResponse {
        data: logs,
        meta: PaginationMeta::new(params.pagination.page(), params.pagination.limit(), total),
    }))
}
