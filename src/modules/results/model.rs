//! Result models and DTOs.
//!
//! One result per (student, subject, semester, exam type): the composite
//! key is unique. `percentage`, `grade`, `grade_point`, and `is_passed`
//! are derived from `marks_obtained` and the subject's marking scheme on
//! every write; they are never independently settable.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};
use crate::utils::serde::{deserialize_optional_i32, deserialize_optional_uuid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "exam_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Mid,
    Final,
    Practical,
    Assignment,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ExamResult {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub marks_obtained: f64,
    pub semester: i32,
    pub exam_type: ExamType,
    pub grade: String,
    pub grade_point: f64,
    pub percentage: f64,
    pub is_passed: bool,
    pub remarks: Option<String>,
    pub created_by: Uuid,
    pub is_approved: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Result joined with its student and subject for read endpoints.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ResultWithContext {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub marks_obtained: f64,
    pub semester: i32,
    pub exam_type: ExamType,
    pub grade: String,
    pub grade_point: f64,
    pub percentage: f64,
    pub is_passed: bool,
    pub remarks: Option<String>,
    pub created_by: Uuid,
    pub is_approved: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<chrono::DateTime<chrono::Utc>>,
    pub roll_no: String,
    pub first_name: String,
    pub last_name: String,
    pub subject_code: String,
    pub subject_name: String,
    pub max_marks: f64,
    pub pass_marks: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct MarkEntry {
    pub student_id: Uuid,
    #[validate(range(min = 0.0))]
    pub marks_obtained: f64,
    pub remarks: Option<String>,
}

/// Bulk mark entry for one (subject, semester, exam type) slice.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EnterMarksDto {
    pub subject_id: Uuid,
    #[validate(range(min = 1))]
    pub semester: i32,
    pub exam_type: ExamType,
    #[validate(length(min = 1), nested)]
    pub entries: Vec<MarkEntry>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateResultDto {
    #[validate(range(min = 0.0))]
    pub marks_obtained: Option<f64>,
    pub remarks: Option<String>,
}

/// Per-item failure in a bulk entry. One entry failing never aborts its
/// siblings.
#[derive(Debug, Serialize, ToSchema)]
pub struct EntryError {
    pub student_id: Uuid,
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkEntryResponse {
    pub created: usize,
    pub failed: usize,
    pub results: Vec<ExamResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<EntryError>>,
}

#[derive(Debug, Deserialize)]
pub struct ResultFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub student_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub subject_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub semester: Option<i32>,
    pub exam_type: Option<ExamType>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResultsResponse {
    pub data: Vec<ResultWithContext>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exam_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ExamType::Mid).unwrap(), r#""mid""#);
        assert_eq!(
            serde_json::to_string(&ExamType::Assignment).unwrap(),
            r#""assignment""#
        );
    }

    #[test]
    fn test_enter_marks_dto_rejects_empty_entries() {
        let dto = EnterMarksDto {
            subject_id: Uuid::new_v4(),
            semester: 1,
            exam_type: ExamType::Final,
            entries: vec![],
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_enter_marks_dto_rejects_negative_marks() {
        let dto = EnterMarksDto {
            subject_id: Uuid::new_v4(),
            semester: 1,
            exam_type: ExamType::Final,
            entries: vec![MarkEntry {
                student_id: Uuid::new_v4(),
                marks_obtained: -5.0,
                remarks: None,
            }],
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_enter_marks_dto_valid() {
        let dto = EnterMarksDto {
            subject_id: Uuid::new_v4(),
            semester: 2,
            exam_type: ExamType::Mid,
            entries: vec![MarkEntry {
                student_id: Uuid::new_v4(),
                marks_obtained: 72.5,
                remarks: Some("good".to_string()),
            }],
        };
        assert!(dto.validate().is_ok());
    }
}
