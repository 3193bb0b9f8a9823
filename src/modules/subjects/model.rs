//! Subject models and DTOs.
//!
//! A subject carries the marking scheme (`max_marks`, `pass_marks`) that
//! every result references for grade computation.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::pagination::{PaginationMeta, PaginationParams};
use crate::utils::serde::deserialize_optional_bool;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Subject {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub max_marks: f64,
    pub pass_marks: f64,
    pub credits: i32,
    pub category: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSubjectDto {
    #[validate(length(min = 1, max = 20))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1.0))]
    pub max_marks: Option<f64>,
    #[validate(range(min = 0.0))]
    pub pass_marks: Option<f64>,
    #[validate(range(min = 0))]
    pub credits: Option<i32>,
    pub category: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSubjectDto {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(range(min = 1.0))]
    pub max_marks: Option<f64>,
    #[validate(range(min = 0.0))]
    pub pass_marks: Option<f64>,
    #[validate(range(min = 0))]
    pub credits: Option<i32>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SubjectFilterParams {
    pub category: Option<String>,
    /// Case-insensitive match against code or name
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_bool")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSubjectsResponse {
    pub data: Vec<Subject>,
    pub meta: PaginationMeta,
}
