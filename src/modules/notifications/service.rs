use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::notifications::model::{Notification, NotificationFilterParams};
use crate::utils::errors::AppError;

const COLUMNS: &str =
    "id, user_id, title, body, priority, resource_type, resource_id, read_at, created_at";

pub struct NotificationService;

impl NotificationService {
    /// Issues an in-app notification to a user. Called internally by
    /// domain flows (e.g. result approval).
    #[instrument(skip(db, title, body))]
    pub async fn notify(
        db: &PgPool,
        user_id: Uuid,
        title: &str,
        body: &str,
        priority: &str,
        resource_type: Option<&str>,
        resource_id: Option<Uuid>,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notifications \
                 (user_id, title, body, priority, resource_type, resource_id) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        ))
        .bind(user_id)
        .bind(title)
        .bind(body)
        .bind(priority)
        .bind(resource_type)
        .bind(resource_id)
        .fetch_one(db)
        .await?;

        Ok(notification)
    }

    #[instrument(skip(db, params))]
    pub async fn get_notifications(
        db: &PgPool,
        user_id: Uuid,
        params: &NotificationFilterParams,
    ) -> Result<(Vec<Notification>, i64), AppError> {
        let filter = "user_id = $1 AND ($2::BOOLEAN IS NOT TRUE OR read_at IS NULL)";

        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {COLUMNS} FROM notifications WHERE {filter} \
             ORDER BY created_at DESC LIMIT $3 OFFSET $4"
        ))
        .bind(user_id)
        .bind(params.unread_only)
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM notifications WHERE {filter}"))
                .bind(user_id)
                .bind(params.unread_only)
                .fetch_one(db)
                .await?;

        Ok((notifications, total))
    }

    pub async fn unread_count(db: &PgPool, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(db)
        .await?;

        Ok(count)
    }

    /// Marks one of the caller's notifications as read.
    #[instrument(skip(db))]
    pub async fn mark_read(
        db: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Notification, AppError> {
        sqlx::query_as::<_, Notification>(&format!(
            "UPDATE notifications SET read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Notification"))
    }
}
