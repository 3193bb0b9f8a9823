use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::classes::service::ClassService;
use crate::modules::reports::model::{
    ClassReport, ClassStatistics, ReportLine, ReportSummary, StudentPerformance, StudentReport,
};
use crate::modules::results::grading::round2;
use crate::modules::students::service::StudentService;
use crate::utils::errors::AppError;

pub struct ReportService;

impl ReportService {
    /// Summary for one student: totals across all their results, overall
    /// percentage, CGPA (mean grade point), and an overall passed flag
    /// (AND across all results).
    #[instrument(skip(db))]
    pub async fn student_report(
        db: &PgPool,
        student_id: Uuid,
        semester: Option<i32>,
    ) -> Result<StudentReport, AppError> {
        let student = StudentService::get_student_by_id(db, student_id).await?;

        let results = sqlx::query_as::<_, ReportLine>(
            "SELECT r.id AS result_id, r.subject_id, sub.code AS subject_code, \
                    sub.name AS subject_name, sub.max_marks, sub.pass_marks, \
                    r.marks_obtained, r.percentage, r.grade, r.grade_point, r.is_passed, \
                    r.exam_type, r.semester \
             FROM results r \
             JOIN subjects sub ON sub.id = r.subject_id \
             WHERE r.student_id = $1 AND ($2::INT IS NULL OR r.semester = $2) \
             ORDER BY sub.code, r.semester",
        )
        .bind(student_id)
        .bind(semester)
        .fetch_all(db)
        .await?;

        let total_subjects = results.len();
        let total_marks: f64 = results.iter().map(|r| r.marks_obtained).sum();
        let max_possible: f64 = results.iter().map(|r| r.max_marks).sum();
        let percentage = if max_possible > 0.0 {
            round2(total_marks / max_possible * 100.0)
        } else {
            0.0
        };
        let total_grade_points: f64 = results.iter().map(|r| r.grade_point).sum();
        let cgpa = if total_subjects > 0 {
            round2(total_grade_points / total_subjects as f64)
        } else {
            0.0
        };
        let passed = results.iter().all(|r| r.is_passed);

        Ok(StudentReport {
            student,
            semester,
            summary: ReportSummary {
                total_subjects,
                total_marks,
                max_possible,
                percentage,
                cgpa,
                passed,
            },
            results,
        })
    }

    /// Per-class report: results of the roster grouped by student, with
    /// pass/fail headcounts and the mean of per-student mean marks.
    ///
    /// A student's `passed` is `BOOL_AND(is_passed)` over their results
    /// (one failed subject fails the student) while grade points are
    /// averaged. The two reducers stay distinct.
    #[instrument(skip(db))]
    pub async fn class_report(
        db: &PgPool,
        class_id: Uuid,
        semester: Option<i32>,
    ) -> Result<ClassReport, AppError> {
        let class = ClassService::get_class_by_id(db, class_id).await?;

        let mut performance = sqlx::query_as::<_, StudentPerformance>(
            "SELECT st.id AS student_id, st.roll_no, u.first_name, u.last_name, \
                    AVG(r.marks_obtained) AS avg_marks, \
                    AVG(r.grade_point) AS avg_grade_point, \
                    COUNT(*) AS total_subjects, \
                    BOOL_AND(r.is_passed) AS passed \
             FROM results r \
             JOIN students st ON st.id = r.student_id \
             JOIN users u ON u.id = st.user_id \
             WHERE st.class_id = $1 AND ($2::INT IS NULL OR r.semester = $2) \
             GROUP BY st.id, st.roll_no, u.first_name, u.last_name \
             ORDER BY avg_marks DESC",
        )
        .bind(class_id)
        .bind(semester)
        .fetch_all(db)
        .await?;

        for row in &mut performance {
            row.avg_marks = round2(row.avg_marks);
            row.avg_grade_point = round2(row.avg_grade_point);
        }

        let total_students = performance.len() as i64;
        let passed_students = performance.iter().filter(|s| s.passed).count() as i64;
        let avg_class_performance = if total_students > 0 {
            round2(
                performance.iter().map(|s| s.avg_marks).sum::<f64>() / total_students as f64,
            )
        } else {
            0.0
        };
        let pass_percentage = if total_students > 0 {
            round2(passed_students as f64 / total_students as f64 * 100.0)
        } else {
            0.0
        };

        Ok(ClassReport {
            class,
            semester,
            statistics: ClassStatistics {
                total_students,
                passed_students,
                failed_students: total_students - passed_students,
                pass_percentage,
                avg_class_performance,
            },
            performance,
        })
    }
}
