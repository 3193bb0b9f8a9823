use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::modules::settings::model::{Setting, UpdateSettingDto};
use crate::modules::settings::service::SettingService;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// List all settings
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "All settings", body = Vec<Setting>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_settings(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<Setting>>, AppError> {
    let settings = SettingService::get_settings(&state.db).await?;
    Ok(Json(settings))
}

/// Get a setting by key
#[utoipa::path(
    get,
    path = "/api/v1/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting details", body = Setting),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse),
        (status = 404, description = "Setting not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_setting(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(key): Path<String>,
) -> Result<Json<Setting>, AppError> {
    let setting = SettingService::get_setting(&state.db, &key).await?;
    Ok(Json(setting))
}

/// Create or update a setting by key
#[utoipa::path(
    put,
    path = "/api/v1/settings/{key}",
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpdateSettingDto,
    responses(
        (status = 200, description = "Setting upserted", body = Setting),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Forbidden - Admin only", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn upsert_setting(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(key): Path<String>,
    Json(dto): Json<UpdateSettingDto>,
) -> Result<Json<Setting>, AppError> {
    let setting =
        SettingService::upsert_setting(&state.db, &key, dto, auth_user.user_id()).await?;
    Ok(Json(setting))
}
