//! Report aggregate models. All derived on demand; nothing here is
//! persisted.

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::modules::classes::model::Class;
use crate::modules::results::model::ExamType;
use crate::modules::students::model::StudentWithUser;

/// One result line in a student report, joined with the subject scheme.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ReportLine {
    pub result_id: Uuid,
    pub subject_id: Uuid,
    pub subject_code: String,
    pub subject_name: String,
    pub max_marks: f64,
    pub pass_marks: f64,
    pub marks_obtained: f64,
    pub percentage: f64,
    pub grade: String,
    pub grade_point: f64,
    pub is_passed: bool,
    pub exam_type: ExamType,
    pub semester: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportSummary {
    pub total_subjects: usize,
    pub total_marks: f64,
    pub max_possible: f64,
    /// total_marks / max_possible, rounded to two decimals
    pub percentage: f64,
    /// Mean grade point across all result lines
    pub cgpa: f64,
    /// AND across all result lines
    pub passed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentReport {
    pub student: StudentWithUser,
    pub semester: Option<i32>,
    pub summary: ReportSummary,
    pub results: Vec<ReportLine>,
}

/// Per-student aggregate inside a class report. `passed` is the AND of
/// `is_passed` over the student's results, while grade points are
/// averaged; the two reducers are intentionally different.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct StudentPerformance {
    pub student_id: Uuid,
    pub roll_no: String,
    pub first_name: String,
    pub last_name: String,
    pub avg_marks: f64,
    pub avg_grade_point: f64,
    pub total_subjects: i64,
    pub passed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassStatistics {
    pub total_students: i64,
    pub passed_students: i64,
    pub failed_students: i64,
    pub pass_percentage: f64,
    /// Mean of the per-student mean marks
    pub avg_class_performance: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassReport {
    pub class: Class,
    pub semester: Option<i32>,
    pub statistics: ClassStatistics,
    pub performance: Vec<StudentPerformance>,
}
