//! CLI commands that bypass the HTTP surface. Admin accounts are created
//! here rather than through the open registration endpoint.

use sqlx::PgPool;
use uuid::Uuid;

use crate::modules::users::model::UserRole;
use crate::utils::errors::AppError;
use crate::utils::password::hash_password;

pub async fn create_admin(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<Uuid, AppError> {
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::conflict("Email already registered"));
    }

    let hashed = hash_password(password)?;

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO users (first_name, last_name, email, password, role) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(first_name)
    .bind(last_name)
    .bind(email)
    .bind(&hashed)
    .bind(UserRole::Admin)
    .fetch_one(db)
    .await?;

    Ok(id)
}
