use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::users::model::{UpdateProfileDto, User, UserAuthRow, UserFilterParams};
use crate::utils::errors::AppError;

const PUBLIC_COLUMNS: &str = "id, first_name, last_name, email, role, phone, is_active, \
     last_login_at, login_count, created_at, updated_at";

const AUTH_COLUMNS: &str = "id, first_name, last_name, email, password, role, phone, is_active, \
     refresh_token, token_version, last_login_at, login_count, created_at, updated_at";

pub struct UserService;

impl UserService {
    #[instrument(skip(db))]
    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {PUBLIC_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
    }

    pub async fn find_auth_by_id(db: &PgPool, id: Uuid) -> Result<Option<UserAuthRow>, AppError> {
        let row = sqlx::query_as::<_, UserAuthRow>(&format!(
            "SELECT {AUTH_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(row)
    }

    pub async fn find_auth_by_email(
        db: &PgPool,
        email: &str,
    ) -> Result<Option<UserAuthRow>, AppError> {
        let row = sqlx::query_as::<_, UserAuthRow>(&format!(
            "SELECT {AUTH_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;

        Ok(row)
    }

    #[instrument(skip(db, params))]
    pub async fn get_users(
        db: &PgPool,
        params: &UserFilterParams,
    ) -> Result<(Vec<User>, i64), AppError> {
        let filter = "($1::user_role IS NULL OR role = $1) \
             AND ($2::TEXT IS NULL OR first_name ILIKE '%' || $2 || '%' \
                  OR last_name ILIKE '%' || $2 || '%' OR email ILIKE '%' || $2 || '%') \
             AND ($3::BOOLEAN IS NULL OR is_active = $3)";

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {PUBLIC_COLUMNS} FROM users WHERE {filter} \
             ORDER BY created_at DESC LIMIT $4 OFFSET $5"
        ))
        .bind(params.role)
        .bind(params.search.as_deref())
        .bind(params.is_active)
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM users WHERE {filter}"))
                .bind(params.role)
                .bind(params.search.as_deref())
                .bind(params.is_active)
                .fetch_one(db)
                .await?;

        Ok((users, total))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET first_name = COALESCE($1, first_name), \
                 last_name = COALESCE($2, last_name), \
                 phone = COALESCE($3, phone), \
                 updated_at = NOW() \
             WHERE id = $4 \
             RETURNING {PUBLIC_COLUMNS}"
        ))
        .bind(dto.first_name)
        .bind(dto.last_name)
        .bind(dto.phone)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
    }

    /// Soft-deactivates a user and revokes all outstanding tokens in the
    /// same statement. Users are never hard-deleted.
    #[instrument(skip(db))]
    pub async fn deactivate(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users \
             SET is_active = FALSE, token_version = token_version + 1, \
                 refresh_token = NULL, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PUBLIC_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User"))
    }

    /// Stores the newly issued refresh token and updates login metadata.
    /// Only the most recently issued refresh token is honored.
    pub async fn record_login(
        db: &PgPool,
        id: Uuid,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users \
             SET refresh_token = $1, last_login_at = NOW(), \
                 login_count = login_count + 1, updated_at = NOW() \
             WHERE id = $2",
        )
        .bind(refresh_token)
        .bind(id)
        .execute(db)
        .await?;

        Ok(())
    }

    pub async fn rotate_refresh_token(
        db: &PgPool,
        id: Uuid,
        refresh_token: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token = $1, updated_at = NOW() WHERE id = $2")
            .bind(refresh_token)
            .bind(id)
            .execute(db)
            .await?;

        Ok(())
    }

    /// Increments the token version and clears the stored refresh token in
    /// one statement, invalidating every previously issued token.
    pub async fn revoke_sessions(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users \
             SET token_version = token_version + 1, refresh_token = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(db)
        .await?;

        Ok(())
    }

    /// Replaces the password hash and revokes all sessions atomically: the
    /// hash swap and the version bump land in the same UPDATE.
    pub async fn change_password(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users \
             SET password = $1, token_version = token_version + 1, \
                 refresh_token = NULL, updated_at = NOW() \
             WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(db)
        .await?;

        Ok(())
    }
}
