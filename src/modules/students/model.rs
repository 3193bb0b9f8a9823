//! Student profile models and DTOs.
//!
//! A student is a profile entity owning a one-to-one reference to a user.
//! Most read paths return [`StudentWithUser`], the profile joined with the
//! public columns of its user.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};
use crate::utils::serde::{deserialize_optional_i32, deserialize_optional_uuid};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: Uuid,
    pub user_id: Uuid,
    pub roll_no: String,
    pub department: String,
    pub batch: String,
    pub semester: i32,
    pub class_id: Option<Uuid>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Student profile joined with its user's public columns.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StudentWithUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub roll_no: String,
    pub department: String,
    pub batch: String,
    pub semester: i32,
    pub class_id: Option<Uuid>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl StudentWithUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// DTO for creating a student: the identity record and the profile are
/// created together.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudentDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub roll_no: String,
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    #[validate(length(min = 1, max = 20))]
    pub batch: String,
    #[validate(range(min = 1))]
    pub semester: i32,
    pub class_id: Option<Uuid>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStudentDto {
    #[validate(length(min = 1, max = 50))]
    pub roll_no: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub department: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub batch: Option<String>,
    #[validate(range(min = 1))]
    pub semester: Option<i32>,
    pub class_id: Option<Uuid>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StudentFilterParams {
    pub department: Option<String>,
    pub batch: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub semester: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub class_id: Option<Uuid>,
    /// Case-insensitive match against name, email, or roll number
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedStudentsResponse {
    pub data: Vec<StudentWithUser>,
    pub meta: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dto() -> CreateStudentDto {
        CreateStudentDto {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            password: "password123".to_string(),
            phone: None,
            roll_no: "CS-2024-001".to_string(),
            department: "Computer Science".to_string(),
            batch: "2024".to_string(),
            semester: 1,
            class_id: None,
            guardian_name: None,
            guardian_phone: None,
        }
    }

    #[test]
    fn test_create_student_dto_valid() {
        assert!(valid_dto().validate().is_ok());
    }

    #[test]
    fn test_create_student_dto_invalid_email() {
        let mut dto = valid_dto();
        dto.email = "not-an-email".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_student_dto_short_password() {
        let mut dto = valid_dto();
        dto.password = "short".to_string();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_create_student_dto_semester_lower_bound() {
        let mut dto = valid_dto();
        dto.semester = 0;
        assert!(dto.validate().is_err());
    }

    #[test]
    fn test_update_student_dto_empty_is_valid() {
        let dto = UpdateStudentDto {
            roll_no: None,
            department: None,
            batch: None,
            semester: None,
            class_id: None,
            guardian_name: None,
            guardian_phone: None,
        };
        assert!(dto.validate().is_ok());
    }
}
