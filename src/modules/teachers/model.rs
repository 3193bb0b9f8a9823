//! Teacher profile models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Teacher {
    pub id: Uuid,
    pub user_id: Uuid,
    pub employee_id: String,
    pub department: String,
    pub qualification: Option<String>,
    pub specialization: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Teacher profile joined with its user's public columns.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeacherWithUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub employee_id: String,
    pub department: String,
    pub qualification: Option<String>,
    pub specialization: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A teacher together with the subjects assigned to them.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherDetail {
    #[serde(flatten)]
    pub teacher: TeacherWithUser,
    pub subjects: Vec<AssignedSubject>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AssignedSubject {
    pub id: Uuid,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTeacherDto {
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
    pub employee_id: String,
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    #[serde(default)]
    pub subject_ids: Vec<Uuid>,
    pub qualification: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateTeacherDto {
    #[validate(length(min = 1, max = 100))]
    pub department: Option<String>,
    pub qualification: Option<String>,
    pub specialization: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignSubjectsDto {
    pub subject_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct TeacherFilterParams {
    pub department: Option<String>,
    /// Case-insensitive match against name, email, or employee id
    pub search: Option<String>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedTeachersResponse {
    pub data: Vec<TeacherWithUser>,
    pub meta: PaginationMeta,
}
