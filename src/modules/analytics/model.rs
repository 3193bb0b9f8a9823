//! Analytics aggregate models. All derived on demand from results.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::utils::serde::{deserialize_optional_i32, deserialize_optional_uuid};

#[derive(Debug, Deserialize, IntoParams)]
pub struct TopPerformersParams {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub semester: Option<i32>,
    /// Number of students to return, default 10
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub limit: Option<i32>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TopPerformer {
    pub student_id: Uuid,
    pub roll_no: String,
    pub first_name: String,
    pub last_name: String,
    pub avg_marks: f64,
    pub avg_grade_point: f64,
    pub total_subjects: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DistributionParams {
    #[serde(default, deserialize_with = "deserialize_optional_i32")]
    pub semester: Option<i32>,
}

/// Count and mean marks for one grade label.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct GradeBucket {
    pub grade: String,
    pub count: i64,
    pub avg_marks: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DistributionStats {
    pub total_students: i64,
    pub avg_marks: f64,
    pub max_marks: f64,
    pub min_marks: f64,
    pub passed_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectSummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub max_marks: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectDistribution {
    pub subject: SubjectSummary,
    pub distribution: Vec<GradeBucket>,
    pub statistics: DistributionStats,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TrendParams {
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub class_id: Option<Uuid>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub subject_id: Option<Uuid>,
}

/// One (year, month, semester) bucket in the performance trend.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrendPoint {
    pub period: String,
    pub year: i32,
    pub month: i32,
    pub semester: i32,
    pub avg_marks: f64,
    pub avg_grade_point: f64,
    /// Percentage of passed results in the bucket
    pub pass_rate: f64,
    pub total_results: i64,
}
