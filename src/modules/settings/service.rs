use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::audit::model::AuditEntry;
use crate::modules::audit::service::AuditService;
use crate::modules::results::grading;
use crate::modules::settings::model::{Setting, UpdateSettingDto, keys};
use crate::utils::errors::AppError;

const COLUMNS: &str =
    "id, key, value, category, description, is_active, updated_by, created_at, updated_at";

pub struct SettingService;

impl SettingService {
    /// Seeds the default configuration rows, upserting by key so the call
    /// is idempotent. Invoked once at process start.
    #[instrument(skip(db))]
    pub async fn seed_defaults(db: &PgPool) -> Result<(), AppError> {
        let defaults: [(&str, serde_json::Value, &str, &str); 5] = [
            (
                keys::GRADE_MAPPING,
                serde_json::to_value(grading::default_bands())
                    .map_err(AppError::internal)?,
                "grading",
                "Percentage bands mapped to letter grades and grade points",
            ),
            (
                keys::PASSING_PERCENTAGE,
                serde_json::json!(40),
                "grading",
                "Minimum passing percentage",
            ),
            (
                keys::ATTENDANCE_THRESHOLD,
                serde_json::json!(75),
                "academic",
                "Minimum attendance percentage required",
            ),
            (
                keys::EXAM_TYPES,
                serde_json::json!(["mid", "final", "practical", "assignment"]),
                "exam",
                "Available exam types",
            ),
            (
                keys::AUDIT_RETENTION_DAYS,
                serde_json::json!(90),
                "system",
                "Days audit log entries are retained",
            ),
        ];

        for (key, value, category, description) in defaults {
            sqlx::query(
                "INSERT INTO settings (key, value, category, description) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (key) DO NOTHING",
            )
            .bind(key)
            .bind(value)
            .bind(category)
            .bind(description)
            .execute(db)
            .await?;
        }

        Ok(())
    }

    /// Fetches the value of an active setting, `None` when absent or
    /// inactive.
    pub async fn get_value(
        db: &PgPool,
        key: &str,
    ) -> Result<Option<serde_json::Value>, AppError> {
        let value: Option<(serde_json::Value,)> = sqlx::query_as(
            "SELECT value FROM settings WHERE key = UPPER($1) AND is_active = TRUE",
        )
        .bind(key)
        .fetch_optional(db)
        .await?;

        Ok(value.map(|(v,)| v))
    }

    /// The grade band table currently in effect.
    pub async fn grade_bands(db: &PgPool) -> Result<Vec<grading::GradeBand>, AppError> {
        let value = Self::get_value(db, keys::GRADE_MAPPING).await?;
        Ok(grading::bands_from_config(value))
    }

    #[instrument(skip(db))]
    pub async fn get_settings(db: &PgPool) -> Result<Vec<Setting>, AppError> {
        let settings =
            sqlx::query_as::<_, Setting>(&format!("SELECT {COLUMNS} FROM settings ORDER BY key"))
                .fetch_all(db)
                .await?;

        Ok(settings)
    }

    #[instrument(skip(db))]
    pub async fn get_setting(db: &PgPool, key: &str) -> Result<Setting, AppError> {
        sqlx::query_as::<_, Setting>(&format!(
            "SELECT {COLUMNS} FROM settings WHERE key = UPPER($1)"
        ))
        .bind(key)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("Setting"))
    }

    /// Upserts a setting by key, recording who changed it.
    #[instrument(skip(db, dto))]
    pub async fn upsert_setting(
        db: &PgPool,
        key: &str,
        dto: UpdateSettingDto,
        updated_by: Uuid,
    ) -> Result<Setting, AppError> {
        let before = sqlx::query_as::<_, Setting>(&format!(
            "SELECT {COLUMNS} FROM settings WHERE key = UPPER($1)"
        ))
        .bind(key)
        .fetch_optional(db)
        .await?;

        let setting = sqlx::query_as::<_, Setting>(&format!(
            "INSERT INTO settings (key, value, category, description, is_active, updated_by) \
             VALUES (UPPER($1), $2, COALESCE($3, 'system'), $4, COALESCE($5, TRUE), $6) \
             ON CONFLICT (key) DO UPDATE \
             SET value = EXCLUDED.value, \
                 category = COALESCE($3, settings.category), \
                 description = COALESCE($4, settings.description), \
                 is_active = COALESCE($5, settings.is_active), \
                 updated_by = EXCLUDED.updated_by, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        ))
        .bind(key)
        .bind(&dto.value)
        .bind(dto.category.as_deref())
        .bind(dto.description.as_deref())
        .bind(dto.is_active)
        .bind(updated_by)
        .fetch_one(db)
        .await?;

        let mut entry = AuditEntry::new(updated_by, "UPDATE_SETTING", "Setting")
            .resource(setting.id)
            .after(&setting);
        if let Some(before) = &before {
            entry = entry.before(before);
        }
        AuditService::record(db, entry);

        Ok(setting)
    }
}
