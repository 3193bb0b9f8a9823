use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::modules::users::model::{User, UserRole};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_access_token;

/// Extractor that authenticates the request and provides the current user.
///
/// Verification is two-step: the token's signature and expiry are checked
/// first (pure, no store access), then the user is re-fetched and the token
/// is rejected when the account is inactive or the claimed `token_version`
/// no longer matches the stored one. The second step is what makes logout
/// and password changes revoke every outstanding token without a blacklist.
///
/// Every failure collapses into the same generic 401 so callers cannot
/// tell which check failed.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }

    pub fn is_admin(&self) -> bool {
        self.user.role == UserRole::Admin
    }

    /// Admin or teacher.
    pub fn is_staff(&self) -> bool {
        matches!(self.user.role, UserRole::Admin | UserRole::Teacher)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

        let claims = verify_access_token(token, &state.jwt_config)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

        let row = UserService::find_auth_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

        if !row.is_active {
            return Err(AppError::unauthorized("Invalid or expired token"));
        }

        // Revocation check: a version bump on logout or password change
        // orphans every previously issued token.
        if claims.token_version != row.token_version {
            return Err(AppError::unauthorized("Invalid or expired token"));
        }

        Ok(AuthUser {
            user: row.into_public(),
        })
    }
}
