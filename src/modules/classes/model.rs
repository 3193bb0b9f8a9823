//! Class (roster) models and DTOs.
//!
//! A class is the roster entity: students reference it through their
//! `class_id` column and `current_strength` is derived from that membership
//! count at read time, never stored.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};
use crate::utils::serde::{deserialize_optional_bool, deserialize_optional_i32};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub year: i32,
    pub semester: i32,
    pub class_teacher_id: Option<Uuid>,
    pub max_strength: i32,
    pub is_active: bool,
    pub current_strength: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    pub year: Option<i32>,
    #[validate(range(min = 1))]
    pub semester: i32,
    pub class_teacher_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub max_strength: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateClassDto {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub year: Option<i32>,
    #[validate(range(min = 1))]
    pub semester: Option<i32>,
    pub class_teacher_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub max_strength: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignStudentDto {
    pub student_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct ClassFilterParams {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub year: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub semester: Option<i32>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedClassesResponse {
    pub data: Vec<Class>,
    pub meta: PaginationMeta,
}
