//! One-shot process initialization, invoked from `main` after the state is
//! built and before the server accepts traffic.

use sqlx::PgPool;
use tracing::{info, warn};

use crate::modules::audit::service::AuditService;
use crate::modules::settings::model::keys;
use crate::modules::settings::service::SettingService;
use crate::utils::errors::AppError;

const DEFAULT_AUDIT_RETENTION_DAYS: i32 = 90;

/// Seeds the default settings rows (idempotent upsert by key) and purges
/// audit entries older than the retention window.
pub async fn initialize(db: &PgPool) -> Result<(), AppError> {
    SettingService::seed_defaults(db).await?;
    info!("default settings seeded");

    let retention_days = match SettingService::get_value(db, keys::AUDIT_RETENTION_DAYS).await {
        Ok(Some(value)) => value
            .as_i64()
            .map(|days| days as i32)
            .unwrap_or(DEFAULT_AUDIT_RETENTION_DAYS),
        Ok(None) => DEFAULT_AUDIT_RETENTION_DAYS,
        Err(err) => {
            warn!(error = ?err, "failed to read audit retention setting, using default");
            DEFAULT_AUDIT_RETENTION_DAYS
        }
    };

    let purged = AuditService::purge_expired(db, retention_days).await?;
    if purged > 0 {
        info!(purged, retention_days, "expired audit log entries removed");
    }

    Ok(())
}
