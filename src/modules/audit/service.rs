use sqlx::PgPool;
use tracing::{instrument, warn};

use crate::modules::audit::model::{AuditEntry, AuditFilterParams, AuditLog};
use crate::utils::errors::AppError;

const COLUMNS: &str = "id, actor_id, action, resource_type, resource_id, before, after, ip, \
     user_agent, status, created_at";

pub struct AuditService;

impl AuditService {
    /// Records an audit entry, fire-and-forget. Called by handlers after a
    /// successful mutation with before/after snapshots. Failures are logged
    /// locally and never surfaced to the caller.
    pub fn record(db: &PgPool, entry: AuditEntry) {
        let db = db.clone();
        tokio::spawn(async move {
            if let Err(err) = Self::insert(&db, &entry).await {
                warn!(action = %entry.action, error = %err, "audit logging failed");
            }
        });
    }

    async fn insert(db: &PgPool, entry: &AuditEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO audit_logs \
                 (actor_id, action, resource_type, resource_id, before, after, ip, user_agent) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(entry.actor_id)
        .bind(&entry.action)
        .bind(&entry.resource_type)
        .bind(entry.resource_id)
        .bind(&entry.before)
        .bind(&entry.after)
        .bind(&entry.ip)
        .bind(&entry.user_agent)
        .execute(db)
        .await?;

        Ok(())
    }

    #[instrument(skip(db, params))]
    pub async fn get_logs(
        db: &PgPool,
        params: &AuditFilterParams,
    ) -> Result<(Vec<AuditLog>, i64), AppError> {
        let filter = "($1::UUID IS NULL OR actor_id = $1) \
             AND ($2::TEXT IS NULL OR action = UPPER($2)) \
             AND ($3::TEXT IS NULL OR resource_type = $3) \
             AND ($4::UUID IS NULL OR resource_id = $4)";

        let logs = sqlx::query_as::<_, AuditLog>(&format!(
            "SELECT {COLUMNS} FROM audit_logs WHERE {filter} \
             ORDER BY created_at DESC LIMIT $5 OFFSET $6"
        ))
        .bind(params.actor_id)
        .bind(params.action.as_deref())
        .bind(params.resource_type.as_deref())
        .bind(params.resource_id)
        .bind(params.pagination.limit())
        .bind(params.pagination.offset())
        .fetch_all(db)
        .await?;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM audit_logs WHERE {filter}"))
                .bind(params.actor_id)
                .bind(params.action.as_deref())
                .bind(params.resource_type.as_deref())
                .bind(params.resource_id)
                .fetch_one(db)
                .await?;

        Ok((logs, total))
    }

    /// Deletes entries older than the retention window. Runs at process
    /// start; the store has no TTL mechanism of its own.
    #[instrument(skip(db))]
    pub async fn purge_expired(db: &PgPool, retention_days: i32) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM audit_logs WHERE created_at < NOW() - make_interval(days => $1)",
        )
        .bind(retention_days)
        .execute(db)
        .await?;

        Ok(result.rows_affected())
    }
}
