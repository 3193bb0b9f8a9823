//! Role-based authorization for Axum routes.
//!
//! Two forms, both grounded in the same role set:
//! 1. Layer middleware (`require_admin`, `require_staff`) for whole route
//!    groups, applied with `middleware::from_fn_with_state`
//! 2. Helper functions (`ensure_admin`, `ensure_staff`) for checks inside
//!    individual handlers

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: &[UserRole],
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if !allowed_roles.contains(&auth_user.role()) {
        return Err(AppError::forbidden(
            "Access denied. Insufficient permissions.",
        ));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

/// Middleware for admin-only route groups.
pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(State(state), req, next, &[UserRole::Admin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Middleware for staff (admin or teacher) route groups.
pub async fn require_staff(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        &[UserRole::Admin, UserRole::Teacher],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Handler-side admin check for routes that are otherwise open to a wider
/// audience.
pub fn ensure_admin(auth_user: &AuthUser) -> Result<(), AppError> {
    if !auth_user.is_admin() {
        return Err(AppError::forbidden(
            "Access denied. Administrator privileges required.",
        ));
    }
    Ok(())
}

/// Handler-side staff check (admin or teacher).
pub fn ensure_staff(auth_user: &AuthUser) -> Result<(), AppError> {
    if !auth_user.is_staff() {
        return Err(AppError::forbidden(
            "Access denied. Staff privileges required.",
        ));
    }
    Ok(())
}
