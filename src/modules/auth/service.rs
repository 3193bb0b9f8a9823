use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::users::model::{ChangePasswordDto, User, UserRole};
use crate::modules::users::service::UserService;
use crate::utils::errors::{AppError, conflict_on_unique};
use crate::utils::jwt::{issue_token_pair, verify_refresh_token};
use crate::utils::password::{hash_password, verify_password};

use super::model::{AuthResponse, LoginRequest, RegisterRequestDto};

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, dto, jwt_config))]
    pub async fn register(
        db: &PgPool,
        dto: RegisterRequestDto,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        if UserService::find_auth_by_email(db, &dto.email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        let hashed_password = hash_password(&dto.password)?;
        let role = dto.role.unwrap_or(UserRole::Student);

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (first_name, last_name, email, password, role, phone) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, first_name, last_name, email, role, phone, is_active, \
                       last_login_at, login_count, created_at, updated_at",
        )
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(role)
        .bind(&dto.phone)
        .fetch_one(db)
        .await
        .map_err(|e| conflict_on_unique(e, "Email already registered"))?;

        let tokens = issue_token_pair(user.id, &user.role, 0, jwt_config)?;
        UserService::record_login(db, user.id, &tokens.refresh_token).await?;

        Ok(AuthResponse {
            user,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    #[instrument(skip(db, dto, jwt_config))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let row = UserService::find_auth_by_email(db, &dto.email)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

        if !row.is_active {
            return Err(AppError::unauthorized("Account is deactivated"));
        }

        if !verify_password(&dto.password, &row.password)? {
            return Err(AppError::unauthorized("Invalid credentials"));
        }

        let tokens = issue_token_pair(row.id, &row.role, row.token_version, jwt_config)?;
        UserService::record_login(db, row.id, &tokens.refresh_token).await?;

        Ok(AuthResponse {
            user: row.into_public(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Rotates the token pair. Only the most recently issued refresh token
    /// is honored: issuing a new one invalidates the prior one even
    /// without a version bump. Every failure is the same generic 401.
    #[instrument(skip(db, refresh_token, jwt_config))]
    pub async fn refresh(
        db: &PgPool,
        refresh_token: &str,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let claims = verify_refresh_token(refresh_token, jwt_config)?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

        let row = UserService::find_auth_by_id(db, user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))?;

        if !row.is_active {
            return Err(AppError::unauthorized("Invalid or expired token"));
        }

        if row.refresh_token.as_deref() != Some(refresh_token) {
            return Err(AppError::unauthorized("Invalid or expired token"));
        }

        if claims.token_version != row.token_version {
            return Err(AppError::unauthorized("Invalid or expired token"));
        }

        let tokens = issue_token_pair(row.id, &row.role, row.token_version, jwt_config)?;
        UserService::rotate_refresh_token(db, row.id, &tokens.refresh_token).await?;

        Ok(AuthResponse {
            user: row.into_public(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Invalidates all outstanding tokens for the user.
    #[instrument(skip(db))]
    pub async fn logout(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
        UserService::revoke_sessions(db, user_id).await
    }

    /// Verifies the current password, then swaps the hash and revokes all
    /// sessions in a single statement.
    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        user_id: Uuid,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let row = UserService::find_auth_by_id(db, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if !verify_password(&dto.current_password, &row.password)? {
            return Err(AppError::unauthorized("Current password is incorrect"));
        }

        let hashed = hash_password(&dto.new_password)?;
        UserService::change_password(db, user_id, &hashed).await
    }
}
