//! Attendance models and DTOs.
//!
//! One record per (student, subject, date): the composite key is unique
//! and dates are day-keyed.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};
use crate::utils::serde::deserialize_optional_uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
    Late,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub date: chrono::NaiveDate,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
    pub created_by: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Attendance record joined with student and subject for read endpoints.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AttendanceWithContext {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub date: chrono::NaiveDate,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
    pub roll_no: String,
    pub first_name: String,
    pub last_name: String,
    pub subject_code: String,
    pub subject_name: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    pub student_id: Uuid,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
}

/// Bulk attendance marking for one subject on one day.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MarkAttendanceDto {
    pub subject_id: Uuid,
    /// Defaults to today when omitted
    pub date: Option<chrono::NaiveDate>,
    #[validate(length(min = 1))]
    pub entries: Vec<AttendanceEntry>,
}

/// Per-item failure in a bulk marking. One entry failing never aborts its
/// siblings.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceEntryError {
    pub student_id: Uuid,
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkAttendanceResponse {
    pub marked: usize,
    pub failed: usize,
    pub results: Vec<AttendanceRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<AttendanceEntryError>>,
}

#[derive(Debug, Deserialize)]
pub struct AttendanceFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub subject_id: Option<Uuid>,
    pub status: Option<AttendanceStatus>,
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedAttendanceResponse {
    pub data: Vec<AttendanceWithContext>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttendanceSummaryParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub subject_id: Option<Uuid>,
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: AttendanceStatus,
    pub count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceSummary {
    pub student_id: Uuid,
    pub roll_no: String,
    pub total: i64,
    pub present: i64,
    /// present / total, rounded to two decimals
    pub percentage: f64,
    pub breakdown: Vec<StatusCount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_wise: Option<Vec<SubjectAttendance>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectAttendance {
    pub subject_id: Uuid,
    pub subject_code: String,
    pub subject_name: String,
    pub total: i64,
    pub breakdown: Vec<StatusCount>,
}
