//! Keyed configuration rows.
//!
//! Settings are JSONB values addressed by an uppercased key. The grade
//! band table, passing percentage, and audit retention window live here so
//! they can be changed without a code change.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Setting {
    pub id: Uuid,
    pub key: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
    pub category: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub updated_by: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSettingDto {
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Well-known setting keys seeded at boot.
pub mod keys {
    pub const GRADE_MAPPING: &str = "GRADE_MAPPING";
    pub const PASSING_PERCENTAGE: &str = "PASSING_PERCENTAGE";
    pub const ATTENDANCE_THRESHOLD: &str = "ATTENDANCE_THRESHOLD";
    pub const EXAM_TYPES: &str = "EXAM_TYPES";
    pub const AUDIT_RETENTION_DAYS: &str = "AUDIT_RETENTION_DAYS";
}
