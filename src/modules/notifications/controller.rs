use axum::{
    Json,
    extract::{Path, Query, State},
};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::notifications::model::{
    Notification, NotificationFilterParams, PaginatedNotificationsResponse, UnreadCountResponse,
};
use crate::modules::notifications::service::NotificationService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;

/// List the caller's notifications
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(
        ("unread_only" = Option<bool>, Query, description = "Only unread notifications"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("limit" = Option<i64>, Query, description = "Results per page")
    ),
    responses(
        (status = 200, description = "Paginated notifications", body = PaginatedNotificationsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_notifications(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<NotificationFilterParams>,
) -> Result<Json<PaginatedNotificationsResponse>, AppError> {
    let (notifications, total) =
        NotificationService::get_notifications(&state.db, auth_user.user_id(), &params).await?;

    Ok(Json(PaginatedNotificationsResponse {
        data: notifications,
        meta: PaginationMeta::new(params.pagination.page(), params.pagination.limit(), total),
    }))
}

/// Count the caller's unread notifications
#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    responses(
        (status = 200, description = "Unread notification count", body = UnreadCountResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state, auth_user))]
pub async fn unread_count(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let unread = NotificationService::unread_count(&state.db, auth_user.user_id()).await?;
    Ok(Json(UnreadCountResponse { unread }))
}

/// Mark a notification as read
#[utoipa::path(
    patch,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = Uuid, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Notification not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Notifications"
)]
#[instrument(skip(state, auth_user))]
pub async fn mark_read(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification =
        NotificationService::mark_read(&state.db, id, auth_user.user_id()).await?;
    Ok(Json(notification))
}
